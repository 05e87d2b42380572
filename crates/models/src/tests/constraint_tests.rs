//! Referential behavior the cleanup paths and the soft-delete model rely
//! on: owned children go with their parent, weak references hold it back.
use anyhow::Result;
use chrono::Utc;
use migration::MigratorTrait;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

use crate::db::connect;
use crate::service::{self, ServiceFields};
use crate::service_proposal::{self, ProposalFields};
use crate::user;

async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = connect().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn service_fields() -> ServiceFields {
    let now = Utc::now();
    ServiceFields {
        title: "fk test service".into(),
        description: "tile the bathroom".into(),
        service_type: "tiling".into(),
        location: "midtown".into(),
        location_type: "residential".into(),
        preferred_start_date: now.into(),
        preferred_end_date: (now + chrono::Duration::days(5)).into(),
        preferred_time: "afternoons".into(),
        requires_materials: false,
        materials_description: None,
        budget_range: None,
    }
}

fn proposal_fields() -> ProposalFields {
    let now = Utc::now();
    ProposalFields {
        description: "tiling bid".into(),
        labor_cost: Decimal::new(20000, 2),
        material_cost: None,
        estimated_start_date: now.into(),
        estimated_end_date: (now + chrono::Duration::days(2)).into(),
        notes: None,
    }
}

#[tokio::test]
async fn contractor_rows_block_user_deletion() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let db = setup_test_db().await?;

    let owner_email = format!("fk_owner_{}@example.com", Uuid::new_v4());
    let contractor_email = format!("fk_contractor_{}@example.com", Uuid::new_v4());
    let owner = user::create(&db, &owner_email, "Fk Owner", None).await?;
    let contractor = user::create(&db, &contractor_email, "Fk Contractor", None).await?;
    let svc = service::create(&db, owner.id, &service_fields()).await?;
    let proposal = service_proposal::create(&db, svc.id, contractor.id, &proposal_fields()).await?;

    // The contractor is a weak reference: the user row cannot go while
    // their proposal exists
    assert!(user::Entity::delete_by_id(contractor.id).exec(&db).await.is_err());

    // Removing the owner cascades through the service to its proposals
    user::Entity::delete_by_id(owner.id).exec(&db).await?;
    let found = service_proposal::Entity::find_by_id(proposal.id).one(&db).await?;
    assert!(found.is_none());

    // With the proposal gone the contractor can be deleted
    user::Entity::delete_by_id(contractor.id).exec(&db).await?;
    Ok(())
}
