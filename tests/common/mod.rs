//! Test helpers shared by the integration suites.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use sea_orm::{ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use sea_orm_migration::MigratorTrait;
use tokio::sync::Mutex;
use tower::util::ServiceExt;

use naiyaksetu_backend::endpoints::create_router;
use naiyaksetu_backend::error::{AppError, Result};
use naiyaksetu_backend::migrations::Migrator;
use naiyaksetu_backend::models::otp_code;
use naiyaksetu_backend::models::prelude::*;
use naiyaksetu_backend::services::sms::SmsProvider;
use naiyaksetu_backend::state::AppState;

/// Create an in-memory SQLite database for testing
pub async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run test migrations");

    db
}

/// SMS provider that records messages instead of sending them.
/// Flip `fail` to make dispatch return an error.
pub struct RecordingProvider {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: AtomicBool,
}

impl RecordingProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl SmsProvider for RecordingProvider {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, phone: &str, message: &str) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Sms("gateway unavailable".to_string()));
        }
        self.sent
            .lock()
            .await
            .push((phone.to_string(), message.to_string()));
        Ok(())
    }
}

pub fn build_app_state(db: DatabaseConnection) -> (AppState, Arc<RecordingProvider>) {
    let provider = RecordingProvider::new();
    let state = AppState::new(db, provider.clone());
    (state, provider)
}

/// Fire a request at a fresh router over the shared state.
/// Returns (status, parsed JSON body).
pub async fn send_request(
    state: &AppState,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let app = create_router(state.clone());

    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::json!({}));

    (status, json)
}

/// Newest unused OTP code stored for a phone
pub async fn latest_code(db: &DatabaseConnection, phone: &str) -> Option<String> {
    OtpCode::find()
        .filter(otp_code::Column::Phone.eq(phone))
        .filter(otp_code::Column::IsUsed.eq(false))
        .order_by_desc(otp_code::Column::CreatedAt)
        .one(db)
        .await
        .unwrap()
        .map(|c| c.code)
}

/// Run the full OTP dance for a phone and return a session token
pub async fn authenticate(state: &AppState, phone: &str) -> String {
    let (status, _) = send_request(
        state,
        "POST",
        "/api/send-otp",
        None,
        Some(serde_json::json!({"phone": phone})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let code = latest_code(&state.db, phone).await.expect("OTP stored");

    let (status, body) = send_request(
        state,
        "POST",
        "/api/verify-otp",
        None,
        Some(serde_json::json!({"phone": phone, "otp": code})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    body["token"].as_str().expect("token in response").to_string()
}

/// Create a complaint through the API and return its tracking id
pub async fn submit_complaint(
    state: &AppState,
    token: &str,
    title: &str,
    category: &str,
) -> String {
    let (status, body) = send_request(
        state,
        "POST",
        "/api/complaints",
        Some(token),
        Some(serde_json::json!({
            "title": title,
            "category": category,
            "description": "Integration test complaint",
            "location": {"address": "Test street", "latitude": 12.97, "longitude": 77.59},
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    body["data"]["complaintId"].as_str().unwrap().to_string()
}
