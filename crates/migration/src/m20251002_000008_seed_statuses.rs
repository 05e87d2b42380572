//! Seed the status catalog.
//!
//! Ids 1-4 are the service range (Active, InProgress, Completed, Cancelled);
//! ids 5-7 are the proposal range (Pending, Accepted, Rejected). Completed
//! proposals reuse id 3. These ids are load-bearing and must never change.
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const STATUSES: &[(i32, &str, &str, &str)] = &[
    (1, "Active", "Active - accepting proposals", "#28a745"),
    (2, "InProgress", "In progress - a proposal was accepted", "#ffc107"),
    (3, "Completed", "Completed - work finished", "#6c757d"),
    (4, "Cancelled", "Cancelled by the owner", "#dc3545"),
    (5, "Pending", "Pending - awaiting owner review", "#17a2b8"),
    (6, "Accepted", "Accepted - proposal approved", "#28a745"),
    (7, "Rejected", "Rejected - proposal declined", "#dc3545"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (id, name, description, color) in STATUSES {
            let insert = Query::insert()
                .into_table(Status::Table)
                .columns([
                    Status::Id,
                    Status::Name,
                    Status::Description,
                    Status::Color,
                    Status::IsActive,
                    Status::CreatedAt,
                    Status::UpdatedAt,
                ])
                .values_panic([
                    (*id).into(),
                    (*name).into(),
                    (*description).into(),
                    (*color).into(),
                    true.into(),
                    Expr::current_timestamp().into(),
                    Expr::current_timestamp().into(),
                ])
                .to_owned();
            manager.exec_stmt(insert).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete().from_table(Status::Table).to_owned();
        manager.exec_stmt(delete).await?;
        Ok(())
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
