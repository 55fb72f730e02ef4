//! Complaint lifecycle integration tests
//!
//! Covers creation (authenticated and anonymous), ownership checks on the
//! detail endpoint, status updates with history, listing with pagination and
//! filters, and the per-owner statistics.

use axum::http::StatusCode;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

mod common;
use common::{authenticate, build_app_state, create_test_db, send_request, submit_complaint};

use naiyaksetu_backend::models::complaint;
use naiyaksetu_backend::models::prelude::*;

const PHONE: &str = "+919876543210";
const OTHER_PHONE: &str = "+919876500000";

// ============================================================================
// Creation
// ============================================================================

#[tokio::test]
async fn test_create_complaint_requires_auth() {
    let (state, _) = build_app_state(create_test_db().await);

    let (status, _) = send_request(
        &state,
        "POST",
        "/api/complaints",
        None,
        Some(serde_json::json!({
            "title": "Pothole",
            "category": "Roads & Infrastructure",
            "description": "Deep pothole near the market",
            "location": {"latitude": 12.97, "longitude": 77.59},
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_complaint_validates_required_fields() {
    let (state, _) = build_app_state(create_test_db().await);
    let token = authenticate(&state, PHONE).await;

    let (status, body) = send_request(
        &state,
        "POST",
        "/api/complaints",
        Some(&token),
        Some(serde_json::json!({"title": "Pothole"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Title, category, and description are required");
}

#[tokio::test]
async fn test_create_complaint_rejects_unknown_priority() {
    let (state, _) = build_app_state(create_test_db().await);
    let token = authenticate(&state, PHONE).await;

    let (status, _) = send_request(
        &state,
        "POST",
        "/api/complaints",
        Some(&token),
        Some(serde_json::json!({
            "title": "Pothole",
            "category": "Roads & Infrastructure",
            "description": "Deep pothole",
            "priority": "catastrophic",
            "location": {"latitude": 12.97, "longitude": 77.59},
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_complaint_requires_location() {
    let (state, _) = build_app_state(create_test_db().await);
    let token = authenticate(&state, PHONE).await;

    let (status, body) = send_request(
        &state,
        "POST",
        "/api/complaints",
        Some(&token),
        Some(serde_json::json!({
            "title": "Pothole",
            "category": "Roads & Infrastructure",
            "description": "Deep pothole",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Location with both latitude and longitude is required"
    );
}

#[tokio::test]
async fn test_create_complaint_rejects_partial_coordinates() {
    let (state, _) = build_app_state(create_test_db().await);
    let token = authenticate(&state, PHONE).await;

    let (status, body) = send_request(
        &state,
        "POST",
        "/api/complaints",
        Some(&token),
        Some(serde_json::json!({
            "title": "Pothole",
            "category": "Roads & Infrastructure",
            "description": "Deep pothole",
            "location": {"latitude": 12.97},
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Location with both latitude and longitude is required"
    );
}

#[tokio::test]
async fn test_create_complaint_returns_tracking_data() {
    let (state, _) = build_app_state(create_test_db().await);
    let token = authenticate(&state, PHONE).await;

    let (status, body) = send_request(
        &state,
        "POST",
        "/api/complaints",
        Some(&token),
        Some(serde_json::json!({
            "title": "Streetlight out",
            "category": "Street Lighting",
            "description": "Lamp post 14 is dark",
            "priority": "high",
            "location": {"address": "MG Road", "latitude": 12.97, "longitude": 77.59},
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "submitted");

    let tracking_id = body["data"]["complaintId"].as_str().unwrap();
    assert!(tracking_id.starts_with("CMP"));
    assert!(tracking_id.len() <= 20);
    assert!(tracking_id[3..11].chars().all(|c| c.is_ascii_digit()));

    // Routing defaults to the category
    let stored = Complaint::find()
        .filter(complaint::Column::ComplaintId.eq(tracking_id))
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.department.as_deref(), Some("Street Lighting"));
    assert_eq!(stored.priority, "high");
}

#[tokio::test]
async fn test_anonymous_complaint_has_no_owner() {
    let (state, _) = build_app_state(create_test_db().await);

    let (status, body) = send_request(
        &state,
        "POST",
        "/api/complaints/anonymous",
        None,
        Some(serde_json::json!({
            "title": "Garbage pileup",
            "category": "Sanitation & Waste",
            "description": "Uncollected garbage for a week",
            "location": {"address": "4th Main", "latitude": 12.91, "longitude": 77.62},
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);

    let tracking_id = body["data"]["complaintId"].as_str().unwrap();
    let stored = Complaint::find()
        .filter(complaint::Column::ComplaintId.eq(tracking_id))
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.user_id, None);
    assert_eq!(stored.reporter_type, "anonymous");
}

// ============================================================================
// Detail and ownership
// ============================================================================

#[tokio::test]
async fn test_detail_shows_history_and_children() {
    let (state, _) = build_app_state(create_test_db().await);
    let token = authenticate(&state, PHONE).await;

    let (status, body) = send_request(
        &state,
        "POST",
        "/api/complaints",
        Some(&token),
        Some(serde_json::json!({
            "title": "Water leakage",
            "category": "Water Supply",
            "description": "Pipe burst on 5th cross",
            "location": {"address": "5th cross", "latitude": 12.93, "longitude": 77.61},
            "reporterType": "verified",
            "aadhaarData": {
                "idNumber": "XXXX-XXXX-1234",
                "name": "Asha Rao",
                "state": "Karnataka",
            },
            "attachments": [
                {"filename": "leak.jpg", "fileType": "image/jpeg", "fileSize": 204800},
            ],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let tracking_id = body["data"]["complaintId"].as_str().unwrap().to_string();

    let (status, body) = send_request(
        &state,
        "GET",
        &format!("/api/complaints/{}", tracking_id),
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["complaintId"], tracking_id.as_str());
    assert_eq!(data["department"]["displayName"], "Water Supply Department");
    assert_eq!(data["aadhaarData"]["name"], "Asha Rao");
    assert_eq!(data["attachments"][0]["filename"], "leak.jpg");

    let history = data["statusHistory"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["status"], "submitted");
}

#[tokio::test]
async fn test_detail_hides_foreign_complaints() {
    let (state, _) = build_app_state(create_test_db().await);
    let owner_token = authenticate(&state, PHONE).await;
    let other_token = authenticate(&state, OTHER_PHONE).await;

    let tracking_id = submit_complaint(&state, &owner_token, "Pothole", "Roads & Infrastructure").await;

    let (status, _) = send_request(
        &state,
        "GET",
        &format!("/api/complaints/{}", tracking_id),
        Some(&other_token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_detail_resolves_numeric_id_too() {
    let (state, _) = build_app_state(create_test_db().await);
    let token = authenticate(&state, PHONE).await;
    let tracking_id = submit_complaint(&state, &token, "Pothole", "Roads & Infrastructure").await;

    let stored = Complaint::find()
        .filter(complaint::Column::ComplaintId.eq(tracking_id.as_str()))
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();

    let (status, body) = send_request(
        &state,
        "GET",
        &format!("/api/complaints/{}", stored.id),
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["complaintId"], tracking_id.as_str());
}

// ============================================================================
// Status updates
// ============================================================================

#[tokio::test]
async fn test_status_update_appends_history_and_stamps_resolution() {
    let (state, _) = build_app_state(create_test_db().await);
    let token = authenticate(&state, PHONE).await;
    let tracking_id = submit_complaint(&state, &token, "Pothole", "Roads & Infrastructure").await;

    let (status, _) = send_request(
        &state,
        "PUT",
        &format!("/api/complaints/{}/status", tracking_id),
        Some(&token),
        Some(serde_json::json!({"status": "in_progress", "notes": "Crew dispatched"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_request(
        &state,
        "PUT",
        &format!("/api/complaints/{}/status", tracking_id),
        Some(&token),
        Some(serde_json::json!({"status": "resolved"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "resolved");

    let stored = Complaint::find()
        .filter(complaint::Column::ComplaintId.eq(tracking_id.as_str()))
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.resolved_at.is_some());

    // History is newest first: resolved, in_progress, submitted
    let (_, body) = send_request(
        &state,
        "GET",
        &format!("/api/complaints/{}", tracking_id),
        Some(&token),
        None,
    )
    .await;
    let history = body["data"]["statusHistory"].as_array().unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0]["status"], "resolved");
    assert_eq!(history[0]["notes"], "Status changed to resolved");
    assert_eq!(history[1]["notes"], "Crew dispatched");
    assert_eq!(history[2]["status"], "submitted");
}

#[tokio::test]
async fn test_status_update_rejects_unknown_status() {
    let (state, _) = build_app_state(create_test_db().await);
    let token = authenticate(&state, PHONE).await;
    let tracking_id = submit_complaint(&state, &token, "Pothole", "Roads & Infrastructure").await;

    let (status, _) = send_request(
        &state,
        "PUT",
        &format!("/api/complaints/{}/status", tracking_id),
        Some(&token),
        Some(serde_json::json!({"status": "fixed"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_status_update_unknown_complaint_is_404() {
    let (state, _) = build_app_state(create_test_db().await);
    let token = authenticate(&state, PHONE).await;

    let (status, _) = send_request(
        &state,
        "PUT",
        "/api/complaints/CMP00000000XXXX/status",
        Some(&token),
        Some(serde_json::json!({"status": "resolved"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_my_complaints_paginates() {
    let (state, _) = build_app_state(create_test_db().await);
    let token = authenticate(&state, PHONE).await;

    for n in 0..3 {
        submit_complaint(
            &state,
            &token,
            &format!("Complaint {}", n),
            "Roads & Infrastructure",
        )
        .await;
    }

    let (status, body) = send_request(
        &state,
        "GET",
        "/api/complaints/my?page=1&limit=2",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["complaints"].as_array().unwrap().len(), 2);
    assert_eq!(data["pagination"]["totalCount"], 3);
    assert_eq!(data["pagination"]["totalPages"], 2);
    assert_eq!(data["pagination"]["hasNext"], true);
    assert_eq!(data["pagination"]["hasPrev"], false);

    let (_, body) = send_request(
        &state,
        "GET",
        "/api/complaints/my?page=2&limit=2",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"]["complaints"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["pagination"]["hasPrev"], true);
}

#[tokio::test]
async fn test_my_complaints_limit_is_capped() {
    let (state, _) = build_app_state(create_test_db().await);
    let token = authenticate(&state, PHONE).await;
    submit_complaint(&state, &token, "Pothole", "Roads & Infrastructure").await;

    let (status, body) = send_request(
        &state,
        "GET",
        "/api/complaints/my?limit=500",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["limit"], 50);
}

#[tokio::test]
async fn test_my_complaints_only_shows_own_rows() {
    let (state, _) = build_app_state(create_test_db().await);
    let token = authenticate(&state, PHONE).await;
    let other_token = authenticate(&state, OTHER_PHONE).await;

    submit_complaint(&state, &token, "Mine", "Roads & Infrastructure").await;
    submit_complaint(&state, &other_token, "Theirs", "Water Supply").await;

    let (_, body) = send_request(&state, "GET", "/api/complaints/my", Some(&token), None).await;

    let complaints = body["data"]["complaints"].as_array().unwrap();
    assert_eq!(complaints.len(), 1);
    assert_eq!(complaints[0]["title"], "Mine");
}

#[tokio::test]
async fn test_my_complaints_filters_by_status() {
    let (state, _) = build_app_state(create_test_db().await);
    let token = authenticate(&state, PHONE).await;

    let first = submit_complaint(&state, &token, "First", "Roads & Infrastructure").await;
    submit_complaint(&state, &token, "Second", "Roads & Infrastructure").await;

    send_request(
        &state,
        "PUT",
        &format!("/api/complaints/{}/status", first),
        Some(&token),
        Some(serde_json::json!({"status": "resolved"})),
    )
    .await;

    let (_, body) = send_request(
        &state,
        "GET",
        "/api/complaints/my?status=resolved",
        Some(&token),
        None,
    )
    .await;

    let complaints = body["data"]["complaints"].as_array().unwrap();
    assert_eq!(complaints.len(), 1);
    assert_eq!(complaints[0]["title"], "First");
}

// ============================================================================
// Statistics
// ============================================================================

#[tokio::test]
async fn test_my_stats_counts_and_resolution_average() {
    let (state, _) = build_app_state(create_test_db().await);
    let token = authenticate(&state, PHONE).await;

    let first = submit_complaint(&state, &token, "First", "Roads & Infrastructure").await;
    submit_complaint(&state, &token, "Second", "Water Supply").await;

    send_request(
        &state,
        "PUT",
        &format!("/api/complaints/{}/status", first),
        Some(&token),
        Some(serde_json::json!({"status": "resolved"})),
    )
    .await;

    let (status, body) = send_request(
        &state,
        "GET",
        "/api/complaints/stats/my",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["totalComplaints"], 2);
    assert_eq!(data["statusCounts"]["resolved"], 1);
    assert_eq!(data["statusCounts"]["submitted"], 1);
    assert_eq!(data["priorityCounts"]["medium"], 2);
    // Resolved within the test run, so the average is a small non-negative number
    let avg = data["averageResolutionDays"].as_f64().unwrap();
    assert!(avg >= 0.0);
    assert!(avg < 1.0);
}
