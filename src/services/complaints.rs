//! Complaint lifecycle: creation, listing, detail, status updates, stats
//!
//! Tracking ids look like "CMP" + 8 digits + 4 random uppercase
//! alphanumerics. The digit core comes from a process-wide counter seeded
//! from the current time in microseconds, so concurrent creations can never
//! collide; the unique index on complaint_id stays as a backstop.

use chrono::Utc;
use once_cell::sync::Lazy;
use rand::Rng;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, FromQueryResult, Order, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::db::DbConn;
use crate::error::{AppError, Result};
use crate::models::complaint::{Priority, ReporterType, Status};
use crate::models::prelude::*;
use crate::models::{
    complaint, complaint_attachment, complaint_identity_record, complaint_status_history,
    department, user,
};

pub const MAX_PAGE_SIZE: u64 = 50;
pub const DEFAULT_PAGE_SIZE: u64 = 10;

static TRACKING_SEQ: Lazy<AtomicU64> =
    Lazy::new(|| AtomicU64::new(Utc::now().timestamp_micros() as u64));

/// Generate a citizen-facing tracking id, at most 15 characters
pub fn generate_tracking_id() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    let seq = TRACKING_SEQ.fetch_add(1, Ordering::Relaxed) % 100_000_000;
    let mut rng = rand::thread_rng();
    let suffix: String = (0..4)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();

    format!("CMP{:08}{}", seq, suffix)
}

// ============================================================================
// Request payloads
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComplaintRequest {
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub reporter_type: Option<String>,
    pub contact_method: Option<String>,
    pub phone: Option<String>,
    pub location: Option<LocationInput>,
    pub aadhaar_data: Option<AadhaarInput>,
    #[serde(default)]
    pub attachments: Vec<AttachmentInput>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInput {
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub formatted: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AadhaarInput {
    pub id_number: String,
    pub name: String,
    pub gender: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentInput {
    pub filename: String,
    pub original_name: Option<String>,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    pub file_path: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

// ============================================================================
// Creation
// ============================================================================

fn validated_priority(raw: Option<&str>) -> Result<Priority> {
    match raw {
        None => Ok(Priority::Medium),
        Some(s) => Priority::parse(s).ok_or_else(|| {
            AppError::Validation(format!(
                "Invalid priority '{}'. Must be one of: low, medium, high, urgent",
                s
            ))
        }),
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Create a complaint with its initial history row and optional children.
///
/// `acting_user` is the authenticated owner, or None for the anonymous
/// endpoint.
pub async fn create_complaint(
    db: &DbConn,
    payload: CreateComplaintRequest,
    acting_user: Option<&user::Model>,
) -> Result<complaint::Model> {
    let title = non_empty(payload.title.as_ref());
    let category = non_empty(payload.category.as_ref());
    let description = non_empty(payload.description.as_ref());

    let (Some(title), Some(category), Some(description)) = (title, category, description) else {
        return Err(AppError::Validation(
            "Title, category, and description are required".to_string(),
        ));
    };

    let priority = validated_priority(payload.priority.as_deref())?;

    let reporter_type = match payload.reporter_type.as_deref() {
        None => ReporterType::Anonymous,
        Some(s) => ReporterType::parse(s).ok_or_else(|| {
            AppError::Validation(format!(
                "Invalid reporterType '{}'. Must be one of: anonymous, pseudonymous, verified",
                s
            ))
        })?,
    };

    let location = payload
        .location
        .filter(|l| l.latitude.is_some() && l.longitude.is_some())
        .ok_or_else(|| {
            AppError::Validation(
                "Location with both latitude and longitude is required".to_string(),
            )
        })?;

    let now = Utc::now();
    let tracking_id = generate_tracking_id();

    let txn = db.begin().await?;

    let new_complaint = complaint::ActiveModel {
        complaint_id: Set(tracking_id),
        title: Set(title),
        category: Set(category.clone()),
        description: Set(description),
        priority: Set(priority.as_str().to_string()),
        status: Set(Status::Submitted.as_str().to_string()),
        reporter_type: Set(reporter_type.as_str().to_string()),
        contact_method: Set(payload.contact_method),
        phone: Set(payload.phone),
        location_address: Set(location.address),
        location_latitude: Set(location.latitude),
        location_longitude: Set(location.longitude),
        location_formatted: Set(location.formatted),
        user_id: Set(acting_user.map(|u| u.id)),
        // Routing defaults to the category until a clerk reassigns it
        department: Set(Some(category)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = new_complaint.insert(&txn).await?;

    if reporter_type == ReporterType::Verified {
        if let Some(aadhaar) = payload.aadhaar_data {
            let record = complaint_identity_record::ActiveModel {
                complaint_id: Set(created.id),
                id_number: Set(aadhaar.id_number),
                name: Set(aadhaar.name),
                gender: Set(aadhaar.gender),
                state: Set(aadhaar.state),
                district: Set(aadhaar.district),
                verified_at: Set(now),
                created_at: Set(now),
                ..Default::default()
            };
            record.insert(&txn).await?;
        }
    }

    for attachment in payload.attachments {
        let row = complaint_attachment::ActiveModel {
            complaint_id: Set(created.id),
            filename: Set(attachment.filename),
            original_name: Set(attachment.original_name),
            file_type: Set(attachment.file_type),
            file_size: Set(attachment.file_size),
            file_path: Set(attachment.file_path),
            url: Set(attachment.url),
            created_at: Set(now),
            ..Default::default()
        };
        row.insert(&txn).await?;
    }

    let initial_history = complaint_status_history::ActiveModel {
        complaint_id: Set(created.id),
        status: Set(Status::Submitted.as_str().to_string()),
        notes: Set(Some("Complaint submitted".to_string())),
        changed_by: Set(acting_user.map(|u| u.id)),
        changed_at: Set(now),
        ..Default::default()
    };
    initial_history.insert(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        complaint_id = %created.complaint_id,
        category = %created.category,
        "Complaint created"
    );

    Ok(created)
}

// ============================================================================
// Lookup
// ============================================================================

/// Resolve a complaint by numeric id or by tracking id
pub async fn find_by_reference(db: &DbConn, reference: &str) -> Result<Option<complaint::Model>> {
    if let Ok(id) = reference.parse::<i64>() {
        if let Some(found) = Complaint::find_by_id(id).one(db).await? {
            return Ok(Some(found));
        }
    }

    Ok(Complaint::find()
        .filter(complaint::Column::ComplaintId.eq(reference))
        .one(db)
        .await?)
}

/// Everything the detail endpoint shows for one complaint
pub struct ComplaintDetail {
    pub complaint: complaint::Model,
    pub department: Option<department::Model>,
    pub attachments: Vec<complaint_attachment::Model>,
    pub identity: Option<complaint_identity_record::Model>,
    pub history: Vec<complaint_status_history::Model>,
}

pub async fn get_complaint_detail(db: &DbConn, reference: &str) -> Result<ComplaintDetail> {
    let complaint = find_by_reference(db, reference)
        .await?
        .ok_or_else(|| AppError::NotFound("Complaint not found".to_string()))?;

    let department_row = match &complaint.department {
        Some(name) => {
            Department::find()
                .filter(department::Column::Name.eq(name))
                .one(db)
                .await?
        }
        None => None,
    };

    let attachments = ComplaintAttachment::find()
        .filter(complaint_attachment::Column::ComplaintId.eq(complaint.id))
        .order_by_asc(complaint_attachment::Column::CreatedAt)
        .all(db)
        .await?;

    let identity = ComplaintIdentityRecord::find()
        .filter(complaint_identity_record::Column::ComplaintId.eq(complaint.id))
        .one(db)
        .await?;

    let history = ComplaintStatusHistory::find()
        .filter(complaint_status_history::Column::ComplaintId.eq(complaint.id))
        .order_by_desc(complaint_status_history::Column::ChangedAt)
        .all(db)
        .await?;

    Ok(ComplaintDetail {
        complaint,
        department: department_row,
        attachments,
        identity,
        history,
    })
}

// ============================================================================
// Listing
// ============================================================================

#[derive(Debug, FromQueryResult)]
pub struct ComplaintListRow {
    pub id: i64,
    pub complaint_id: String,
    pub title: String,
    pub category: String,
    pub description: String,
    pub priority: String,
    pub status: String,
    pub reporter_type: String,
    pub location_address: Option<String>,
    pub location_formatted: Option<String>,
    pub department: Option<String>,
    pub resolved_at: Option<chrono::DateTime<Utc>>,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
    pub total_count: i64,
}

pub struct Page {
    pub page: u64,
    pub limit: u64,
    pub total_count: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

fn sort_column(name: &str) -> Option<complaint::Column> {
    match name {
        "created_at" => Some(complaint::Column::CreatedAt),
        "updated_at" => Some(complaint::Column::UpdatedAt),
        "priority" => Some(complaint::Column::Priority),
        "status" => Some(complaint::Column::Status),
        "category" => Some(complaint::Column::Category),
        "title" => Some(complaint::Column::Title),
        _ => None,
    }
}

/// List complaints with filters and pagination.
///
/// The total row count rides along in the same select via a window
/// function, so a filtered page costs one query.
pub async fn list_complaints(
    db: &DbConn,
    query: &ListQuery,
    owner: Option<i64>,
) -> Result<(Vec<ComplaintListRow>, Page)> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = (page - 1) * limit;

    let mut condition = Condition::all();
    if let Some(owner_id) = owner {
        condition = condition.add(complaint::Column::UserId.eq(owner_id));
    }
    if let Some(status) = &query.status {
        let status = Status::parse(status)
            .ok_or_else(|| AppError::Validation(format!("Invalid status '{}'", status)))?;
        condition = condition.add(complaint::Column::Status.eq(status.as_str()));
    }
    if let Some(category) = &query.category {
        condition = condition.add(complaint::Column::Category.eq(category.clone()));
    }
    if let Some(priority) = &query.priority {
        let priority = Priority::parse(priority)
            .ok_or_else(|| AppError::Validation(format!("Invalid priority '{}'", priority)))?;
        condition = condition.add(complaint::Column::Priority.eq(priority.as_str()));
    }

    let column = query
        .sort_by
        .as_deref()
        .and_then(sort_column)
        .unwrap_or(complaint::Column::CreatedAt);
    let order = match query.sort_order.as_deref() {
        Some(o) if o.eq_ignore_ascii_case("asc") => Order::Asc,
        _ => Order::Desc,
    };

    let rows = Complaint::find()
        .select_only()
        .columns([
            complaint::Column::Id,
            complaint::Column::ComplaintId,
            complaint::Column::Title,
            complaint::Column::Category,
            complaint::Column::Description,
            complaint::Column::Priority,
            complaint::Column::Status,
            complaint::Column::ReporterType,
            complaint::Column::LocationAddress,
            complaint::Column::LocationFormatted,
            complaint::Column::Department,
            complaint::Column::ResolvedAt,
            complaint::Column::CreatedAt,
            complaint::Column::UpdatedAt,
        ])
        .column_as(Expr::cust("COUNT(*) OVER ()"), "total_count")
        .filter(condition)
        .order_by(column, order)
        .offset(offset)
        .limit(limit)
        .into_model::<ComplaintListRow>()
        .all(db)
        .await?;

    let total_count = rows.first().map(|r| r.total_count as u64).unwrap_or(0);
    let total_pages = total_count.div_ceil(limit);

    let pagination = Page {
        page,
        limit,
        total_count,
        total_pages,
        has_next: page < total_pages,
        has_prev: page > 1,
    };

    Ok((rows, pagination))
}

/// Recent complaints for the public feed, newest first
pub async fn recent_complaints(db: &DbConn, limit: Option<u64>) -> Result<Vec<complaint::Model>> {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    Ok(Complaint::find()
        .order_by_desc(complaint::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await?)
}

// ============================================================================
// Status updates
// ============================================================================

pub async fn update_status(
    db: &DbConn,
    reference: &str,
    new_status: &str,
    notes: Option<String>,
    actor: Option<&user::Model>,
) -> Result<complaint::Model> {
    let status = Status::parse(new_status).ok_or_else(|| {
        AppError::Validation(format!(
            "Invalid status '{}'. Must be one of: submitted, in_progress, under_review, resolved, closed, rejected",
            new_status
        ))
    })?;

    let complaint = find_by_reference(db, reference)
        .await?
        .ok_or_else(|| AppError::NotFound("Complaint not found".to_string()))?;

    let now = Utc::now();

    let txn = db.begin().await?;

    let was_resolved = complaint.resolved_at.is_some();
    let complaint_pk = complaint.id;

    let mut active: complaint::ActiveModel = complaint.into();
    active.status = Set(status.as_str().to_string());
    active.updated_at = Set(now);
    if status == Status::Resolved && !was_resolved {
        active.resolved_at = Set(Some(now));
    }
    let updated = active.update(&txn).await?;

    let history = complaint_status_history::ActiveModel {
        complaint_id: Set(complaint_pk),
        status: Set(status.as_str().to_string()),
        notes: Set(Some(
            notes.unwrap_or_else(|| format!("Status changed to {}", status)),
        )),
        changed_by: Set(actor.map(|u| u.id)),
        changed_at: Set(now),
        ..Default::default()
    };
    history.insert(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        complaint_id = %updated.complaint_id,
        status = %updated.status,
        "Complaint status updated"
    );

    Ok(updated)
}

// ============================================================================
// Statistics
// ============================================================================

pub struct Statistics {
    pub total: u64,
    pub status_counts: Vec<(String, i64)>,
    pub priority_counts: Vec<(String, i64)>,
    pub category_counts: Vec<(String, i64)>,
    pub average_resolution_days: Option<f64>,
}

async fn grouped_counts(
    db: &DbConn,
    column: complaint::Column,
    owner: Option<i64>,
) -> Result<Vec<(String, i64)>> {
    let mut query = Complaint::find()
        .select_only()
        .column(column)
        .column_as(complaint::Column::Id.count(), "count");
    if let Some(owner_id) = owner {
        query = query.filter(complaint::Column::UserId.eq(owner_id));
    }
    Ok(query
        .group_by(column)
        .into_tuple::<(String, i64)>()
        .all(db)
        .await?)
}

/// Counts per status/priority/category and mean resolution time.
///
/// The average is computed in Rust from (created_at, resolved_at) pairs so
/// it behaves the same on SQLite and Postgres.
pub async fn compute_statistics(db: &DbConn, owner: Option<i64>) -> Result<Statistics> {
    let status_counts = grouped_counts(db, complaint::Column::Status, owner).await?;
    let priority_counts = grouped_counts(db, complaint::Column::Priority, owner).await?;
    let category_counts = grouped_counts(db, complaint::Column::Category, owner).await?;

    let total: u64 = status_counts.iter().map(|(_, n)| *n as u64).sum();

    let mut resolved = Complaint::find()
        .select_only()
        .column(complaint::Column::CreatedAt)
        .column(complaint::Column::ResolvedAt)
        .filter(complaint::Column::ResolvedAt.is_not_null());
    if let Some(owner_id) = owner {
        resolved = resolved.filter(complaint::Column::UserId.eq(owner_id));
    }
    let pairs = resolved
        .into_tuple::<(chrono::DateTime<Utc>, Option<chrono::DateTime<Utc>>)>()
        .all(db)
        .await?;

    let durations: Vec<f64> = pairs
        .into_iter()
        .filter_map(|(created, resolved)| {
            resolved.map(|r| (r - created).num_seconds() as f64 / 86_400.0)
        })
        .collect();

    let average_resolution_days = if durations.is_empty() {
        None
    } else {
        Some(durations.iter().sum::<f64>() / durations.len() as f64)
    };

    Ok(Statistics {
        total,
        status_counts,
        priority_counts,
        category_counts,
        average_resolution_days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tracking_id_shape() {
        let id = generate_tracking_id();
        assert!(id.starts_with("CMP"));
        assert_eq!(id.len(), 15);
        assert!(id.len() <= 20);
        assert!(id[3..11].chars().all(|c| c.is_ascii_digit()));
        assert!(id[11..]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_tracking_ids_are_unique() {
        let mut seen = HashSet::new();
        for _ in 0..100_000 {
            assert!(seen.insert(generate_tracking_id()));
        }
    }

    #[test]
    fn test_sort_column_whitelist() {
        assert!(sort_column("created_at").is_some());
        assert!(sort_column("priority").is_some());
        assert!(sort_column("complaint_id; DROP TABLE complaints").is_none());
        assert!(sort_column("phone").is_none());
    }
}
