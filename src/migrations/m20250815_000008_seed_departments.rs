//! Migration: Seed civic departments
//!
//! Complaint categories map onto these rows by name, so the seed list
//! doubles as the category catalogue.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        use crate::models::department;
        use crate::models::prelude::*;

        let db = manager.get_connection();

        let existing = Department::find().count(db).await?;
        if existing > 0 {
            return Ok(());
        }

        let now = chrono::Utc::now();

        let defaults = [
            (
                "Roads & Infrastructure",
                "Public Works Department",
                Some("pwd@naiyaksetu.gov.in"),
            ),
            (
                "Water Supply",
                "Water Supply Department",
                Some("water@naiyaksetu.gov.in"),
            ),
            (
                "Electricity",
                "Electricity Board",
                Some("power@naiyaksetu.gov.in"),
            ),
            (
                "Sanitation & Waste",
                "Sanitation Department",
                Some("sanitation@naiyaksetu.gov.in"),
            ),
            (
                "Street Lighting",
                "Municipal Lighting Division",
                Some("lighting@naiyaksetu.gov.in"),
            ),
            (
                "Drainage & Sewage",
                "Drainage Division",
                Some("drainage@naiyaksetu.gov.in"),
            ),
            (
                "Parks & Recreation",
                "Parks Department",
                Some("parks@naiyaksetu.gov.in"),
            ),
            (
                "Public Safety",
                "Public Safety Cell",
                Some("safety@naiyaksetu.gov.in"),
            ),
            ("Other", "General Administration", None),
        ];

        for (name, display_name, contact_email) in defaults {
            let dept = department::ActiveModel {
                name: Set(name.to_string()),
                display_name: Set(display_name.to_string()),
                contact_email: Set(contact_email.map(|e| e.to_string())),
                created_at: Set(now),
                ..Default::default()
            };
            dept.insert(db).await?;
        }

        Ok(())
    }

    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        // Seed data may have been edited in place
        Ok(())
    }
}
