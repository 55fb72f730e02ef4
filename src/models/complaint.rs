use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "complaints")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Citizen-facing tracking id, e.g. "CMP12345678AB3X"
    #[sea_orm(unique)]
    pub complaint_id: String,
    pub title: String,
    pub category: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub priority: String,
    pub status: String,
    pub reporter_type: String,
    pub contact_method: Option<String>,
    pub phone: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub location_address: Option<String>,
    pub location_latitude: Option<f64>,
    pub location_longitude: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub location_formatted: Option<String>,
    pub user_id: Option<i64>,
    pub department: Option<String>,
    pub assigned_to: Option<String>,
    pub estimated_resolution_date: Option<DateTimeUtc>,
    pub resolved_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::complaint_status_history::Entity")]
    StatusHistory,
    #[sea_orm(has_many = "super::complaint_attachment::Entity")]
    Attachments,
    #[sea_orm(has_one = "super::complaint_identity_record::Entity")]
    IdentityRecord,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::complaint_status_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusHistory.def()
    }
}

impl Related<super::complaint_attachment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attachments.def()
    }
}

impl Related<super::complaint_identity_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IdentityRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Complaint priority levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "urgent" => Some(Priority::Urgent),
            _ => None,
        }
    }
}

/// Complaint lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Submitted,
    InProgress,
    UnderReview,
    Resolved,
    Closed,
    Rejected,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Submitted => "submitted",
            Status::InProgress => "in_progress",
            Status::UnderReview => "under_review",
            Status::Resolved => "resolved",
            Status::Closed => "closed",
            Status::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "submitted" => Some(Status::Submitted),
            "in_progress" => Some(Status::InProgress),
            "under_review" => Some(Status::UnderReview),
            "resolved" => Some(Status::Resolved),
            "closed" => Some(Status::Closed),
            "rejected" => Some(Status::Rejected),
            _ => None,
        }
    }

    pub fn all() -> Vec<Status> {
        vec![
            Status::Submitted,
            Status::InProgress,
            Status::UnderReview,
            Status::Resolved,
            Status::Closed,
            Status::Rejected,
        ]
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How much identity the reporter attached to the complaint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReporterType {
    Anonymous,
    Pseudonymous,
    Verified,
}

impl ReporterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReporterType::Anonymous => "anonymous",
            ReporterType::Pseudonymous => "pseudonymous",
            ReporterType::Verified => "verified",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "anonymous" => Some(ReporterType::Anonymous),
            "pseudonymous" => Some(ReporterType::Pseudonymous),
            "verified" => Some(ReporterType::Verified),
            _ => None,
        }
    }
}
