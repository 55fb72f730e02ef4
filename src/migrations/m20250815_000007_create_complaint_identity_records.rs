//! Migration: Create complaint_identity_records table

use sea_orm_migration::prelude::*;

use super::m20250815_000004_create_complaints::Complaints;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ComplaintIdentityRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ComplaintIdentityRecords::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ComplaintIdentityRecords::ComplaintId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ComplaintIdentityRecords::IdNumber)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ComplaintIdentityRecords::Name)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ComplaintIdentityRecords::Gender).string().null())
                    .col(ColumnDef::new(ComplaintIdentityRecords::State).string().null())
                    .col(
                        ColumnDef::new(ComplaintIdentityRecords::District)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ComplaintIdentityRecords::VerifiedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ComplaintIdentityRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_identity_records_complaint_id")
                            .from(
                                ComplaintIdentityRecords::Table,
                                ComplaintIdentityRecords::ComplaintId,
                            )
                            .to(Complaints::Table, Complaints::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(ComplaintIdentityRecords::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
pub enum ComplaintIdentityRecords {
    Table,
    Id,
    #[iden = "complaint_id"]
    ComplaintId,
    #[iden = "id_number"]
    IdNumber,
    Name,
    Gender,
    State,
    District,
    #[iden = "verified_at"]
    VerifiedAt,
    #[iden = "created_at"]
    CreatedAt,
}
