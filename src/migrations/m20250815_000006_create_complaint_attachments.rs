//! Migration: Create complaint_attachments table

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
                    .table(ComplaintAttachments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ComplaintAttachments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ComplaintAttachments::ComplaintId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ComplaintAttachments::Filename)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ComplaintAttachments::OriginalName)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(ComplaintAttachments::FileType).string().null())
                    .col(
                        ColumnDef::new(ComplaintAttachments::FileSize)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(ComplaintAttachments::FilePath).text().null())
                    .col(ColumnDef::new(ComplaintAttachments::Url).text().null())
                    .col(
                        ColumnDef::new(ComplaintAttachments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attachments_complaint_id")
                            .from(
                                ComplaintAttachments::Table,
                                ComplaintAttachments::ComplaintId,
                            )
                            .to(Complaints::Table, Complaints::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_attachments_complaint_id")
                    .table(ComplaintAttachments::Table)
                    .col(ComplaintAttachments::ComplaintId)
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
                    .table(ComplaintAttachments::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
pub enum ComplaintAttachments {
    Table,
    Id,
    #[iden = "complaint_id"]
    ComplaintId,
    Filename,
    #[iden = "original_name"]
    OriginalName,
    #[iden = "file_type"]
    FileType,
    #[iden = "file_size"]
    FileSize,
    #[iden = "file_path"]
    FilePath,
    Url,
    #[iden = "created_at"]
    CreatedAt,
}
