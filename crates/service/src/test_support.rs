//! Shared plumbing for the DB-backed tests. Connects and runs migrations
//! before handing out the connection; set `SKIP_DB_TESTS` to skip every
//! test that calls in here.
//!
//! Each call connects fresh: every `#[tokio::test]` runs on its own
//! runtime, and a pooled connection created on one runtime's reactor
//! never wakes when awaited from another, so a pool cached in a static
//! hangs the second DB test in the binary.
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use migration::{Migrator, MigratorTrait};
use models::service::ServiceFields;
use models::service_proposal::ProposalFields;
use models::user;

pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    dotenvy::dotenv().ok();
    let db = models::db::connect().await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// Insert a throwaway user with a unique email. Callers delete the row
/// when they are done; cascades take the dependent rows with it.
pub async fn unique_user(
    db: &DatabaseConnection,
    prefix: &str,
) -> Result<user::Model, anyhow::Error> {
    let email = format!("{}_{}@example.com", prefix, Uuid::new_v4());
    let created = user::create(db, &email, "Test User", None).await?;
    Ok(created)
}

pub fn sample_service_fields() -> ServiceFields {
    let start = Utc::now() + Duration::days(7);
    ServiceFields {
        title: "Repaint living room".into(),
        description: "Two coats of off-white paint, walls and ceiling".into(),
        service_type: "painting".into(),
        location: "Sao Paulo, SP".into(),
        location_type: "residential".into(),
        preferred_start_date: start.into(),
        preferred_end_date: (start + Duration::days(3)).into(),
        preferred_time: "morning".into(),
        requires_materials: true,
        materials_description: Some("paint and rollers".into()),
        budget_range: Some(Decimal::new(150000, 2)),
    }
}

pub fn sample_proposal_fields(labor: Decimal, material: Option<Decimal>) -> ProposalFields {
    let start = Utc::now() + Duration::days(10);
    ProposalFields {
        description: "Can start next week, three day job".into(),
        labor_cost: labor,
        material_cost: material,
        estimated_start_date: start.into(),
        estimated_end_date: (start + Duration::days(3)).into(),
        notes: None,
    }
}
