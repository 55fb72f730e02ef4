use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::config::CONFIG;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limit exceeded")]
    RateLimited { retry_after: u64 },

    #[error("SMS dispatch failed: {0}")]
    Sms(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, detail) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone(), None),
            AppError::RateLimited { retry_after } => {
                let body = json!({
                    "success": false,
                    "message": "Too many requests from this IP. Please try again later.",
                    "retryAfter": retry_after,
                });
                return (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
            }
            AppError::Sms(e) => {
                tracing::error!("SMS dispatch error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to send OTP".to_string(),
                    Some(e.clone()),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(e.to_string()),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(e.clone()),
                )
            }
        };

        // Driver/internal detail is only surfaced in development builds.
        let body = match detail {
            Some(detail) if CONFIG.is_development() => json!({
                "success": false,
                "message": message,
                "error": detail,
            }),
            _ => json!({
                "success": false,
                "message": message,
            }),
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn response_parts(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_error_is_400_with_envelope() {
        let (status, body) =
            response_parts(AppError::Validation("Phone number is required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Phone number is required");
    }

    #[tokio::test]
    async fn test_not_found_error_is_404() {
        let (status, body) = response_parts(AppError::NotFound("Complaint not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Complaint not found");
    }

    #[tokio::test]
    async fn test_unauthorized_error_is_401() {
        let (status, _) = response_parts(AppError::Unauthorized("Token has expired".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_rate_limited_includes_retry_after() {
        let (status, body) = response_parts(AppError::RateLimited { retry_after: 600 }).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["retryAfter"], 600);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_internal_error_message_is_generic() {
        let (status, body) =
            response_parts(AppError::Internal("connection refused".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
    }
}
