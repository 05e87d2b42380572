//! Transaction behavior the lifecycle engine relies on: an aborted
//! transaction must leave no partial state behind.
use anyhow::Result;
use chrono::Utc;
use migration::MigratorTrait;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait, TransactionTrait};
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
        title: "tx test service".into(),
        description: "fix the roof".into(),
        service_type: "roofing".into(),
        location: "downtown".into(),
        location_type: "residential".into(),
        preferred_start_date: now.into(),
        preferred_end_date: (now + chrono::Duration::days(7)).into(),
        preferred_time: "mornings".into(),
        requires_materials: false,
        materials_description: None,
        budget_range: None,
    }
}

fn proposal_fields() -> ProposalFields {
    let now = Utc::now();
    ProposalFields {
        description: "roof repair bid".into(),
        labor_cost: Decimal::new(10000, 2),
        material_cost: Some(Decimal::new(5000, 2)),
        estimated_start_date: now.into(),
        estimated_end_date: (now + chrono::Duration::days(3)).into(),
        notes: None,
    }
}

#[tokio::test]
async fn test_transaction_commit() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let db = setup_test_db().await?;

    let email = format!("tx_commit_{}@example.com", Uuid::new_v4());
    let txn = db.begin().await?;
    let owner = user::create(&txn, &email, "Tx Owner", None).await?;
    let svc = service::create(&txn, owner.id, &service_fields()).await?;
    txn.commit().await?;

    let found = service::Entity::find_by_id(svc.id).one(&db).await?;
    assert!(found.is_some());

    // Cleanup: removing the user cascades through service and children
    user::Entity::delete_by_id(owner.id).exec(&db).await?;
    Ok(())
}

#[tokio::test]
async fn test_transaction_rollback_leaves_no_partial_state() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let db = setup_test_db().await?;

    let owner_email = format!("tx_rb_owner_{}@example.com", Uuid::new_v4());
    let contractor_email = format!("tx_rb_contractor_{}@example.com", Uuid::new_v4());
    let owner = user::create(&db, &owner_email, "Rollback Owner", None).await?;
    let contractor = user::create(&db, &contractor_email, "Rollback Contractor", None).await?;
    let svc = service::create(&db, owner.id, &service_fields()).await?;

    // Insert a proposal inside a transaction and roll it back
    let txn = db.begin().await?;
    let proposal = service_proposal::create(&txn, svc.id, contractor.id, &proposal_fields()).await?;
    txn.rollback().await?;

    let found = service_proposal::Entity::find_by_id(proposal.id).one(&db).await?;
    assert!(found.is_none());

    user::Entity::delete_by_id(owner.id).exec(&db).await?;
    user::Entity::delete_by_id(contractor.id).exec(&db).await?;
    Ok(())
}
