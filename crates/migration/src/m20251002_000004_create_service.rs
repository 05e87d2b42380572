//! Create `service` table: a posted job request.
//!
//! Status references the catalog with Restrict so catalog rows can never be
//! cascaded away. Soft delete is the `is_active` flag, not row removal.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Service::Table)
                    .if_not_exists()
                    .col(pk_auto(Service::Id))
                    .col(uuid(Service::UserId).not_null())
                    .col(string_len(Service::Title, 200).not_null())
                    .col(string_len(Service::Description, 2000).not_null())
                    .col(string_len(Service::ServiceType, 100).not_null())
                    .col(string_len(Service::Location, 255).not_null())
                    .col(string_len(Service::LocationType, 50).not_null())
                    .col(timestamp_with_time_zone(Service::PreferredStartDate).not_null())
                    .col(timestamp_with_time_zone(Service::PreferredEndDate).not_null())
                    .col(string_len(Service::PreferredTime, 100).not_null())
                    .col(boolean(Service::RequiresMaterials).not_null())
                    .col(
                        ColumnDef::new(Service::MaterialsDescription)
                            .string_len(1000)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Service::BudgetRange)
                            .decimal_len(12, 2)
                            .null(),
                    )
                    .col(integer(Service::StatusId).not_null())
                    .col(timestamp_with_time_zone(Service::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Service::UpdatedAt).not_null())
                    .col(boolean(Service::IsActive).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_user")
                            .from(Service::Table, Service::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_status")
                            .from(Service::Table, Service::StatusId)
                            .to(Status::Table, Status::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Service::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Service {
    Table,
    Id,
    UserId,
    Title,
    Description,
    ServiceType,
    Location,
    LocationType,
    PreferredStartDate,
    PreferredEndDate,
    PreferredTime,
    RequiresMaterials,
    MaterialsDescription,
    BudgetRange,
    StatusId,
    CreatedAt,
    UpdatedAt,
    IsActive,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Status {
    Table,
    Id,
}
