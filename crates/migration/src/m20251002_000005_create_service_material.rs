//! Create `service_material` table: estimated material lines owned by a
//! service; removed together with their parent, deactivated otherwise.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceMaterial::Table)
                    .if_not_exists()
                    .col(pk_auto(ServiceMaterial::Id))
                    .col(integer(ServiceMaterial::ServiceId).not_null())
                    .col(string_len(ServiceMaterial::Name, 200).not_null())
                    .col(
                        ColumnDef::new(ServiceMaterial::Brand)
                            .string_len(100)
                            .null(),
                    )
                    .col(integer(ServiceMaterial::Quantity).not_null())
                    .col(string_len(ServiceMaterial::Unit, 32).not_null())
                    .col(
                        ColumnDef::new(ServiceMaterial::EstimatedPrice)
                            .decimal_len(12, 2)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ServiceMaterial::Notes)
                            .string_len(500)
                            .null(),
                    )
                    .col(timestamp_with_time_zone(ServiceMaterial::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(ServiceMaterial::UpdatedAt).not_null())
                    .col(boolean(ServiceMaterial::IsActive).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_material_service")
                            .from(ServiceMaterial::Table, ServiceMaterial::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServiceMaterial::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ServiceMaterial {
    Table,
    Id,
    ServiceId,
    Name,
    Brand,
    Quantity,
    Unit,
    EstimatedPrice,
    Notes,
    CreatedAt,
    UpdatedAt,
    IsActive,
}

#[derive(DeriveIden)]
enum Service {
    Table,
    Id,
}
