//! Create `proposal_material` table: priced material lines owned by a
//! proposal; `total_price` is recomputed as quantity * unit_price on write.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProposalMaterial::Table)
                    .if_not_exists()
                    .col(pk_auto(ProposalMaterial::Id))
                    .col(integer(ProposalMaterial::ProposalId).not_null())
                    .col(string_len(ProposalMaterial::Name, 200).not_null())
                    .col(
                        ColumnDef::new(ProposalMaterial::Brand)
                            .string_len(100)
                            .null(),
                    )
                    .col(integer(ProposalMaterial::Quantity).not_null())
                    .col(string_len(ProposalMaterial::Unit, 32).not_null())
                    .col(decimal_len(ProposalMaterial::UnitPrice, 12, 2).not_null())
                    .col(decimal_len(ProposalMaterial::TotalPrice, 12, 2).not_null())
                    .col(
                        ColumnDef::new(ProposalMaterial::Notes)
                            .string_len(500)
                            .null(),
                    )
                    .col(timestamp_with_time_zone(ProposalMaterial::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(ProposalMaterial::UpdatedAt).not_null())
                    .col(boolean(ProposalMaterial::IsActive).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_proposal_material_proposal")
                            .from(ProposalMaterial::Table, ProposalMaterial::ProposalId)
                            .to(ServiceProposal::Table, ServiceProposal::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProposalMaterial::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ProposalMaterial {
    Table,
    Id,
    ProposalId,
    Name,
    Brand,
    Quantity,
    Unit,
    UnitPrice,
    TotalPrice,
    Notes,
    CreatedAt,
    UpdatedAt,
    IsActive,
}

#[derive(DeriveIden)]
enum ServiceProposal {
    Table,
    Id,
}
