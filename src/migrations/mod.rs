pub use sea_orm_migration::prelude::*;

mod m20250815_000001_create_users;
mod m20250815_000002_create_otp_codes;
mod m20250815_000003_create_departments;
mod m20250815_000004_create_complaints;
mod m20250815_000005_create_complaint_status_history;
mod m20250815_000006_create_complaint_attachments;
mod m20250815_000007_create_complaint_identity_records;
mod m20250815_000008_seed_departments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250815_000001_create_users::Migration),
            Box::new(m20250815_000002_create_otp_codes::Migration),
            Box::new(m20250815_000003_create_departments::Migration),
            Box::new(m20250815_000004_create_complaints::Migration),
            Box::new(m20250815_000005_create_complaint_status_history::Migration),
            Box::new(m20250815_000006_create_complaint_attachments::Migration),
            Box::new(m20250815_000007_create_complaint_identity_records::Migration),
            Box::new(m20250815_000008_seed_departments::Migration),
        ]
    }
}
