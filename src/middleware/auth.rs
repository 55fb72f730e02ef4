//! Authentication middleware for protected API routes
//!
//! Requires a valid Bearer token. The user is re-resolved from the database
//! on every request, so a deleted account invalidates outstanding tokens.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::error::AppError;
use crate::models::prelude::*;
use crate::models::user;
use crate::services::security::{decode_session_token, TokenError};
use crate::state::AppState;

/// Authenticated user stored in request extensions
#[derive(Clone)]
pub struct AuthenticatedUser(pub user::Model);

/// Auth middleware that validates Bearer tokens
///
/// Returns 401 Unauthorized if the token is missing, malformed, expired, or
/// no longer matches a user.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let token = match extract_bearer_token(&req) {
        Some(t) => t,
        None => {
            return AppError::Unauthorized("Access token is required".to_string()).into_response();
        }
    };

    let claims = match decode_session_token(&token) {
        Ok(claims) => claims,
        Err(TokenError::Expired) => {
            return AppError::Unauthorized("Token has expired".to_string()).into_response();
        }
        Err(TokenError::Invalid) => {
            return AppError::Unauthorized("Invalid token".to_string()).into_response();
        }
    };

    let found = User::find()
        .filter(user::Column::Phone.eq(&claims.phone))
        .one(&state.db)
        .await;

    let user = match found {
        Ok(Some(user)) => user,
        Ok(None) => {
            return AppError::Unauthorized("User not found".to_string()).into_response();
        }
        Err(e) => return AppError::Database(e).into_response(),
    };

    req.extensions_mut().insert(AuthenticatedUser(user));

    next.run(req).await
}

/// Extract Bearer token from Authorization header
fn extract_bearer_token(req: &Request) -> Option<String> {
    let auth_header = req.headers().get(AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?;
    Some(token.to_string())
}
