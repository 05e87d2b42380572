//! Create the `status` catalog table.
//!
//! Fixed lifecycle states referenced by both services and proposals. Ids are
//! assigned by the seed migration, so the primary key is a plain integer.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Status::Table)
                    .if_not_exists()
                    .col(integer(Status::Id).primary_key())
                    .col(string_len(Status::Name, 50).not_null())
                    .col(string_len(Status::Description, 255).not_null())
                    .col(string_len(Status::Color, 16).not_null())
                    .col(boolean(Status::IsActive).not_null())
                    .col(timestamp_with_time_zone(Status::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Status::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Status::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Status {
    Table,
    Id,
    Name,
    Description,
    Color,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
