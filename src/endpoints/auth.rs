use axum::{
    extract::{Extension, State},
    middleware as axum_middleware,
    routing::{get, post, put},
    Json, Router,
};
use sea_orm::{ActiveModelTrait, Set};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthenticatedUser;
use crate::middleware::rate_limit::rate_limit;
use crate::models::user;
use crate::services::otp;
use crate::services::security::validate_phone_number;
use crate::state::AppState;

/// OTP routes, each behind its own per-IP budget
pub fn public_routes(state: AppState) -> Router {
    let send = Router::new()
        .route("/api/send-otp", post(send_otp))
        .route_layer(axum_middleware::from_fn_with_state(
            state.otp_limiter.clone(),
            rate_limit,
        ));

    let verify = Router::new()
        .route("/api/verify-otp", post(verify_otp))
        .route_layer(axum_middleware::from_fn_with_state(
            state.verify_limiter.clone(),
            rate_limit,
        ));

    send.merge(verify).with_state(state)
}

pub fn protected_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/validate-token", get(validate_token))
        .route("/api/user/profile", put(update_profile))
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub phone: Option<String>,
    pub otp: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
}

/// User object shown to clients; the "+91" prefix is stripped
fn user_payload(user: &user::Model) -> serde_json::Value {
    json!({
        "id": user.id,
        "phone": user.phone.trim_start_matches("+91"),
        "name": user.name,
        "isVerified": user.is_verified,
        "memberSince": user.created_at.to_rfc3339(),
    })
}

// ============================================================================
// Handlers
// ============================================================================

async fn send_otp(
    State(state): State<AppState>,
    Json(payload): Json<SendOtpRequest>,
) -> Result<Json<serde_json::Value>> {
    let phone = payload
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("Phone number is required".to_string()))?;

    if !validate_phone_number(phone) {
        return Err(AppError::Validation(
            "Please provide a valid Indian phone number".to_string(),
        ));
    }

    let expires_in = otp::issue_code(&state.db, &state.sms, phone).await?;

    Ok(Json(json!({
        "success": true,
        "message": "OTP sent successfully",
        "expiresIn": expires_in,
    })))
}

async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<Json<serde_json::Value>> {
    let (Some(phone), Some(code)) = (
        payload.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()),
        payload.otp.as_deref().map(str::trim).filter(|c| !c.is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Phone number and OTP are required".to_string(),
        ));
    };

    if !validate_phone_number(phone) {
        return Err(AppError::Validation(
            "Please provide a valid Indian phone number".to_string(),
        ));
    }

    let session = otp::verify_code(&state.db, phone, code).await?;

    let mut user = user_payload(&session.user);
    if let Some(obj) = user.as_object_mut() {
        obj.insert("isNewUser".to_string(), json!(session.is_new_user));
    }

    Ok(Json(json!({
        "success": true,
        "message": "OTP verified successfully",
        "token": session.token,
        "user": user,
    })))
}

async fn validate_token(
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": "Token is valid",
        "user": user_payload(&user),
    }))
}

async fn update_profile(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<serde_json::Value>> {
    let name = payload
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Validation("Name is required".to_string()))?;

    let mut active: user::ActiveModel = user.into();
    active.name = Set(Some(name.to_string()));
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(&state.db).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Profile updated successfully",
        "user": user_payload(&updated),
    })))
}
