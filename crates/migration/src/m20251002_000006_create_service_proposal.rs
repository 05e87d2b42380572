//! Create `service_proposal` table: a contractor's bid on a service.
//!
//! `total_cost` is stored but always recomputed from labor + material on
//! write; it is never authoritative on its own. Proposals are removed with
//! their service; the contractor is a weak reference, so a user row with
//! live proposals cannot be deleted out from under them.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceProposal::Table)
                    .if_not_exists()
                    .col(pk_auto(ServiceProposal::Id))
                    .col(integer(ServiceProposal::ServiceId).not_null())
                    .col(uuid(ServiceProposal::ContractorId).not_null())
                    .col(string_len(ServiceProposal::Description, 2000).not_null())
                    .col(decimal_len(ServiceProposal::LaborCost, 12, 2).not_null())
                    .col(
                        ColumnDef::new(ServiceProposal::MaterialCost)
                            .decimal_len(12, 2)
                            .null(),
                    )
                    .col(decimal_len(ServiceProposal::TotalCost, 12, 2).not_null())
                    .col(timestamp_with_time_zone(ServiceProposal::EstimatedStartDate).not_null())
                    .col(timestamp_with_time_zone(ServiceProposal::EstimatedEndDate).not_null())
                    .col(integer(ServiceProposal::StatusId).not_null())
                    .col(
                        ColumnDef::new(ServiceProposal::Notes)
                            .string_len(1000)
                            .null(),
                    )
                    .col(ColumnDef::new(ServiceProposal::Rating).integer().null())
                    .col(
                        ColumnDef::new(ServiceProposal::EvaluationComment)
                            .string_len(1000)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ServiceProposal::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(timestamp_with_time_zone(ServiceProposal::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(ServiceProposal::UpdatedAt).not_null())
                    .col(boolean(ServiceProposal::IsActive).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_proposal_service")
                            .from(ServiceProposal::Table, ServiceProposal::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_proposal_contractor")
                            .from(ServiceProposal::Table, ServiceProposal::ContractorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_proposal_status")
                            .from(ServiceProposal::Table, ServiceProposal::StatusId)
                            .to(Status::Table, Status::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServiceProposal::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ServiceProposal {
    Table,
    Id,
    ServiceId,
    ContractorId,
    Description,
    LaborCost,
    MaterialCost,
    TotalCost,
    EstimatedStartDate,
    EstimatedEndDate,
    StatusId,
    Notes,
    Rating,
    EvaluationComment,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
    IsActive,
}

#[derive(DeriveIden)]
enum Service {
    Table,
    Id,
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
