use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthenticatedUser;
use crate::services::complaints::{
    self, ComplaintDetail, CreateComplaintRequest, ListQuery, Statistics,
};
use crate::state::AppState;

pub fn public_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/complaints/anonymous", post(create_anonymous))
        .route("/api/complaints/recent", get(recent))
        .route("/api/complaints/stats", get(public_stats))
        .route("/api/track/:complaint_id", get(track))
        .with_state(state)
}

pub fn protected_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/complaints", post(create))
        .route("/api/complaints/my", get(my_complaints))
        .route("/api/complaints/stats/my", get(my_stats))
        .route("/api/complaints/:id", get(detail))
        .route("/api/complaints/:id/status", put(update_status))
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<u64>,
}

fn counts_object(counts: &[(String, i64)]) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for (key, count) in counts {
        map.insert(key.clone(), json!(count));
    }
    serde_json::Value::Object(map)
}

fn created_response(created: &crate::models::complaint::Model) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Complaint submitted successfully",
            "data": {
                "complaintId": created.complaint_id,
                "id": created.id,
                "status": created.status,
                "createdAt": created.created_at.to_rfc3339(),
                "tracking": {
                    "trackingId": created.complaint_id,
                    "trackingUrl": format!("/api/track/{}", created.complaint_id),
                },
            },
        })),
    )
}

fn detail_payload(detail: &ComplaintDetail, include_reporter: bool) -> serde_json::Value {
    let c = &detail.complaint;

    let mut payload = json!({
        "id": c.id,
        "complaintId": c.complaint_id,
        "title": c.title,
        "category": c.category,
        "description": c.description,
        "priority": c.priority,
        "status": c.status,
        "reporterType": c.reporter_type,
        "location": {
            "address": c.location_address,
            "latitude": c.location_latitude,
            "longitude": c.location_longitude,
            "formatted": c.location_formatted,
        },
        "department": detail.department.as_ref().map(|d| json!({
            "name": d.name,
            "displayName": d.display_name,
            "contactEmail": d.contact_email,
        })),
        "assignedTo": c.assigned_to,
        "estimatedResolutionDate": c.estimated_resolution_date.map(|d| d.to_rfc3339()),
        "resolvedAt": c.resolved_at.map(|d| d.to_rfc3339()),
        "createdAt": c.created_at.to_rfc3339(),
        "updatedAt": c.updated_at.to_rfc3339(),
        "statusHistory": detail.history.iter().map(|h| json!({
            "status": h.status,
            "notes": h.notes,
            "changedAt": h.changed_at.to_rfc3339(),
        })).collect::<Vec<_>>(),
    });

    if include_reporter {
        if let Some(obj) = payload.as_object_mut() {
            obj.insert("contactMethod".to_string(), json!(c.contact_method));
            obj.insert("phone".to_string(), json!(c.phone));
            obj.insert(
                "attachments".to_string(),
                json!(detail
                    .attachments
                    .iter()
                    .map(|a| json!({
                        "filename": a.filename,
                        "originalName": a.original_name,
                        "fileType": a.file_type,
                        "fileSize": a.file_size,
                        "url": a.url,
                        "createdAt": a.created_at.to_rfc3339(),
                    }))
                    .collect::<Vec<_>>()),
            );
            obj.insert(
                "aadhaarData".to_string(),
                detail
                    .identity
                    .as_ref()
                    .map(|i| {
                        json!({
                            "idNumber": i.id_number,
                            "name": i.name,
                            "gender": i.gender,
                            "state": i.state,
                            "district": i.district,
                            "verifiedAt": i.verified_at.to_rfc3339(),
                        })
                    })
                    .unwrap_or(serde_json::Value::Null),
            );
        }
    }

    payload
}

fn stats_data(stats: &Statistics) -> serde_json::Value {
    json!({
        "totalComplaints": stats.total,
        "statusCounts": counts_object(&stats.status_counts),
        "priorityCounts": counts_object(&stats.priority_counts),
        "averageResolutionDays": stats.average_resolution_days,
    })
}

// ============================================================================
// Handlers
// ============================================================================

async fn create(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(payload): Json<CreateComplaintRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let created = complaints::create_complaint(&state.db, payload, Some(&user)).await?;
    Ok(created_response(&created))
}

async fn create_anonymous(
    State(state): State<AppState>,
    Json(payload): Json<CreateComplaintRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let created = complaints::create_complaint(&state.db, payload, None).await?;
    Ok(created_response(&created))
}

async fn my_complaints(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>> {
    let (rows, page) = complaints::list_complaints(&state.db, &query, Some(user.id)).await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "complaints": rows.iter().map(|r| json!({
                "id": r.id,
                "complaintId": r.complaint_id,
                "title": r.title,
                "category": r.category,
                "description": r.description,
                "priority": r.priority,
                "status": r.status,
                "reporterType": r.reporter_type,
                "location": {
                    "address": r.location_address,
                    "formatted": r.location_formatted,
                },
                "department": r.department,
                "resolvedAt": r.resolved_at.map(|d| d.to_rfc3339()),
                "createdAt": r.created_at.to_rfc3339(),
                "updatedAt": r.updated_at.to_rfc3339(),
            })).collect::<Vec<_>>(),
            "pagination": {
                "page": page.page,
                "limit": page.limit,
                "totalCount": page.total_count,
                "totalPages": page.total_pages,
                "hasNext": page.has_next,
                "hasPrev": page.has_prev,
            },
        },
    })))
}

async fn detail(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(reference): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let detail = complaints::get_complaint_detail(&state.db, &reference).await?;

    // Owners only; a foreign id is indistinguishable from a missing one
    if detail.complaint.user_id != Some(user.id) {
        return Err(AppError::NotFound("Complaint not found".to_string()));
    }

    Ok(Json(json!({
        "success": true,
        "data": detail_payload(&detail, true),
    })))
}

async fn update_status(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(reference): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<serde_json::Value>> {
    let status = payload
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("Status is required".to_string()))?;

    let updated =
        complaints::update_status(&state.db, &reference, status, payload.notes, Some(&user))
            .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Status updated successfully",
        "data": {
            "complaintId": updated.complaint_id,
            "status": updated.status,
            "updatedAt": updated.updated_at.to_rfc3339(),
        },
    })))
}

async fn my_stats(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Result<Json<serde_json::Value>> {
    let stats = complaints::compute_statistics(&state.db, Some(user.id)).await?;

    Ok(Json(json!({
        "success": true,
        "data": stats_data(&stats),
    })))
}

async fn track(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let detail = complaints::get_complaint_detail(&state.db, &reference).await?;

    Ok(Json(json!({
        "success": true,
        "complaint": detail_payload(&detail, false),
    })))
}

async fn recent(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<serde_json::Value>> {
    let rows = complaints::recent_complaints(&state.db, query.limit).await?;

    Ok(Json(json!({
        "success": true,
        "complaints": rows.iter().map(|c| json!({
            "complaintId": c.complaint_id,
            "title": c.title,
            "category": c.category,
            "status": c.status,
            "priority": c.priority,
            "reporterType": c.reporter_type,
            "createdAt": c.created_at.to_rfc3339(),
        })).collect::<Vec<_>>(),
        "count": rows.len(),
    })))
}

async fn public_stats(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let stats = complaints::compute_statistics(&state.db, None).await?;

    Ok(Json(json!({
        "success": true,
        "stats": {
            "total": stats.total,
            "status": counts_object(&stats.status_counts),
            "byCategory": stats.category_counts.iter().map(|(category, count)| json!({
                "category": category,
                "count": count,
            })).collect::<Vec<_>>(),
        },
    })))
}
