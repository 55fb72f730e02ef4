//! Migration: Create complaint_status_history table

use sea_orm_migration::prelude::*;

use super::m20250815_000001_create_users::Users;
use super::m20250815_000004_create_complaints::Complaints;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ComplaintStatusHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ComplaintStatusHistory::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ComplaintStatusHistory::ComplaintId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ComplaintStatusHistory::Status)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ComplaintStatusHistory::Notes).text().null())
                    .col(
                        ColumnDef::new(ComplaintStatusHistory::ChangedBy)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ComplaintStatusHistory::ChangedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_status_history_complaint_id")
                            .from(
                                ComplaintStatusHistory::Table,
                                ComplaintStatusHistory::ComplaintId,
                            )
                            .to(Complaints::Table, Complaints::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_status_history_changed_by")
                            .from(
                                ComplaintStatusHistory::Table,
                                ComplaintStatusHistory::ChangedBy,
                            )
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_status_history_complaint_id")
                    .table(ComplaintStatusHistory::Table)
                    .col(ComplaintStatusHistory::ComplaintId)
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
                    .table(ComplaintStatusHistory::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
pub enum ComplaintStatusHistory {
    Table,
    Id,
    #[iden = "complaint_id"]
    ComplaintId,
    Status,
    Notes,
    #[iden = "changed_by"]
    ChangedBy,
    #[iden = "changed_at"]
    ChangedAt,
}
