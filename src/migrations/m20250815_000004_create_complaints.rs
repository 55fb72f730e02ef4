//! Migration: Create complaints table

use sea_orm_migration::prelude::*;

use super::m20250815_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Complaints::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Complaints::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Complaints::ComplaintId)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Complaints::Title).string().not_null())
                    .col(ColumnDef::new(Complaints::Category).string().not_null())
                    .col(ColumnDef::new(Complaints::Description).text().not_null())
                    .col(
                        ColumnDef::new(Complaints::Priority)
                            .string()
                            .not_null()
                            .default("medium"),
                    )
                    .col(
                        ColumnDef::new(Complaints::Status)
                            .string()
                            .not_null()
                            .default("submitted"),
                    )
                    .col(
                        ColumnDef::new(Complaints::ReporterType)
                            .string()
                            .not_null()
                            .default("anonymous"),
                    )
                    .col(ColumnDef::new(Complaints::ContactMethod).string().null())
                    .col(ColumnDef::new(Complaints::Phone).string_len(15).null())
                    .col(ColumnDef::new(Complaints::LocationAddress).text().null())
                    .col(ColumnDef::new(Complaints::LocationLatitude).double().null())
                    .col(
                        ColumnDef::new(Complaints::LocationLongitude)
                            .double()
                            .null(),
                    )
                    .col(ColumnDef::new(Complaints::LocationFormatted).text().null())
                    .col(ColumnDef::new(Complaints::UserId).big_integer().null())
                    .col(ColumnDef::new(Complaints::Department).string().null())
                    .col(ColumnDef::new(Complaints::AssignedTo).string().null())
                    .col(
                        ColumnDef::new(Complaints::EstimatedResolutionDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Complaints::ResolvedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Complaints::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Complaints::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_complaints_user_id")
                            .from(Complaints::Table, Complaints::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_complaints_complaint_id")
                    .table(Complaints::Table)
                    .col(Complaints::ComplaintId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_complaints_user_id")
                    .table(Complaints::Table)
                    .col(Complaints::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_complaints_status")
                    .table(Complaints::Table)
                    .col(Complaints::Status)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_complaints_category")
                    .table(Complaints::Table)
                    .col(Complaints::Category)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_complaints_created_at")
                    .table(Complaints::Table)
                    .col(Complaints::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(Complaints::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
pub enum Complaints {
    Table,
    Id,
    #[iden = "complaint_id"]
    ComplaintId,
    Title,
    Category,
    Description,
    Priority,
    Status,
    #[iden = "reporter_type"]
    ReporterType,
    #[iden = "contact_method"]
    ContactMethod,
    Phone,
    #[iden = "location_address"]
    LocationAddress,
    #[iden = "location_latitude"]
    LocationLatitude,
    #[iden = "location_longitude"]
    LocationLongitude,
    #[iden = "location_formatted"]
    LocationFormatted,
    #[iden = "user_id"]
    UserId,
    Department,
    #[iden = "assigned_to"]
    AssignedTo,
    #[iden = "estimated_resolution_date"]
    EstimatedResolutionDate,
    #[iden = "resolved_at"]
    ResolvedAt,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}
