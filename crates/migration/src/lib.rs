//! Migrator registering entity-specific migrations in dependency order.
//! The status catalog comes first (both service and proposal reference it),
//! then users, then the service aggregate. Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20251002_000001_create_status;
mod m20251002_000002_create_user;
mod m20251002_000003_create_user_credentials;
mod m20251002_000004_create_service;
mod m20251002_000005_create_service_material;
mod m20251002_000006_create_service_proposal;
mod m20251002_000007_create_proposal_material;
mod m20251002_000008_seed_statuses;
mod m20251002_000009_add_indexes;

pub struct Migrator;

impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251002_000001_create_status::Migration),
            Box::new(m20251002_000002_create_user::Migration),
            Box::new(m20251002_000003_create_user_credentials::Migration),
            Box::new(m20251002_000004_create_service::Migration),
            Box::new(m20251002_000005_create_service_material::Migration),
            Box::new(m20251002_000006_create_service_proposal::Migration),
            Box::new(m20251002_000007_create_proposal_material::Migration),
            Box::new(m20251002_000008_seed_statuses::Migration),
            // Indexes should always be applied last
            Box::new(m20251002_000009_add_indexes::Migration),
        ]
    }
}
