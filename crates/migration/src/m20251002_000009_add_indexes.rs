use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Service: owner and status lookups back the listing queries
        manager
            .create_index(
                Index::create()
                    .name("idx_service_user")
                    .table(Service::Table)
                    .col(Service::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_service_status")
                    .table(Service::Table)
                    .col(Service::StatusId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_service_type")
                    .table(Service::Table)
                    .col(Service::ServiceType)
                    .to_owned(),
            )
            .await?;

        // Materials: parent lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_service_material_service")
                    .table(ServiceMaterial::Table)
                    .col(ServiceMaterial::ServiceId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_proposal_material_proposal")
                    .table(ProposalMaterial::Table)
                    .col(ProposalMaterial::ProposalId)
                    .to_owned(),
            )
            .await?;

        // Proposals: service, contractor and status lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_service_proposal_service")
                    .table(ServiceProposal::Table)
                    .col(ServiceProposal::ServiceId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_service_proposal_contractor")
                    .table(ServiceProposal::Table)
                    .col(ServiceProposal::ContractorId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_service_proposal_status")
                    .table(ServiceProposal::Table)
                    .col(ServiceProposal::StatusId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_service_user",
            "idx_service_status",
            "idx_service_type",
        ] {
            manager
                .drop_index(Index::drop().name(name).table(Service::Table).to_owned())
                .await?;
        }
        manager
            .drop_index(
                Index::drop()
                    .name("idx_service_material_service")
                    .table(ServiceMaterial::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_proposal_material_proposal")
                    .table(ProposalMaterial::Table)
                    .to_owned(),
            )
            .await?;
        for name in [
            "idx_service_proposal_service",
            "idx_service_proposal_contractor",
            "idx_service_proposal_status",
        ] {
            manager
                .drop_index(
                    Index::drop()
                        .name(name)
                        .table(ServiceProposal::Table)
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Service {
    Table,
    UserId,
    StatusId,
    ServiceType,
}

#[derive(DeriveIden)]
enum ServiceMaterial {
    Table,
    ServiceId,
}

#[derive(DeriveIden)]
enum ServiceProposal {
    Table,
    ServiceId,
    ContractorId,
    StatusId,
}

#[derive(DeriveIden)]
enum ProposalMaterial {
    Table,
    ProposalId,
}
