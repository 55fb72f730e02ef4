pub mod auth;
pub mod complaints;

use std::time::Instant;

use axum::{middleware as axum_middleware, routing::get, Json, Router};
use serde_json::json;

use crate::error::Result;
use crate::middleware::auth::require_auth;
use crate::middleware::rate_limit::rate_limit;
use crate::state::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/health", get(health_check))
        .with_state(state.clone())
        .merge(auth::public_routes(state.clone()))
        .merge(complaints::public_routes(state.clone()));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .merge(auth::protected_routes(state.clone()))
        .merge(complaints::protected_routes(state.clone()))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    public_routes
        .merge(protected_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.general_limiter.clone(),
            rate_limit,
        ))
}

/// Health check: database round-trip plus process uptime
async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<Json<serde_json::Value>> {
    let started = Instant::now();
    let db_result = state.db.ping().await;
    let response_time_ms = started.elapsed().as_millis() as u64;

    let connected = db_result.is_ok();
    if let Err(e) = db_result {
        tracing::error!(error = %e, "Health check database ping failed");
    }

    Ok(Json(json!({
        "success": connected,
        "status": if connected { "healthy" } else { "degraded" },
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "database": {
            "connected": connected,
            "responseTime": response_time_ms,
        },
        "server": {
            "uptime": state.started_at.elapsed().as_secs(),
        },
    })))
}
