//! Proposal lifecycle engine.
//!
//! All cross-entity invariants live here. Entities are passive state
//! holders; every guarded edge of the two state machines goes through one
//! of these operations:
//!
//! Proposal: Pending -> accept -> Accepted -> complete -> Completed
//!           Pending -> reject -> Rejected
//!           Pending -> update/delete (self-loop)
//! Service:  Active -> (proposal accepted) -> InProgress
//!           InProgress -> (that proposal completes) -> Completed
//!
//! Accept and Complete move two entities at once and commit both writes in
//! a single transaction; the service-side write is a conditional update on
//! its expected prior status, so a concurrent sibling accept loses with
//! `InvalidState` instead of double-promoting the service.
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::service_listing;
use crate::user_directory;
use models::proposal_material::{self, ProposalMaterialFields};
use models::service;
use models::service_proposal::{self, ProposalFields};
use models::status::{ProposalStatus, ServiceStatus};

/// A proposal together with its active material lines.
pub type ProposalWithMaterials = (service_proposal::Model, Vec<proposal_material::Model>);

/// Submit a proposal against a service.
///
/// Preconditions, in order, each a distinct failure: the service exists,
/// the contractor exists, the contractor is not the service owner, and the
/// service is still accepting proposals.
#[instrument(skip(db, fields, materials), fields(contractor_id = %contractor_id))]
pub async fn create_proposal(
    db: &DatabaseConnection,
    service_id: i32,
    contractor_id: Uuid,
    fields: &ProposalFields,
    materials: &[ProposalMaterialFields],
) -> Result<ProposalWithMaterials, ServiceError> {
    let svc = service_listing::find_active(db, service_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("service"))?;
    if user_directory::get_user(db, contractor_id).await?.is_none() {
        return Err(ServiceError::not_found("user"));
    }
    if svc.user_id == contractor_id {
        return Err(ServiceError::Validation(
            "you cannot submit a proposal for your own service".into(),
        ));
    }
    if svc.status_id != ServiceStatus::Active.id() {
        return Err(ServiceError::invalid_state(
            "this service is no longer accepting proposals",
        ));
    }

    let txn = db.begin().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let created = service_proposal::create(&txn, service_id, contractor_id, fields).await?;
    let mut lines = Vec::with_capacity(materials.len());
    for m in materials {
        lines.push(proposal_material::create(&txn, created.id, m).await?);
    }
    txn.commit().await.map_err(|e| ServiceError::Db(e.to_string()))?;

    info!(proposal_id = created.id, service_id, "proposal_created");
    Ok((created, lines))
}

/// Edit a pending proposal. Only its contractor may do so, and only while
/// it is still Pending; the total cost is recomputed from the new inputs.
pub async fn update_proposal(
    db: &DatabaseConnection,
    id: i32,
    caller: Uuid,
    fields: &ProposalFields,
    materials: Option<&[ProposalMaterialFields]>,
) -> Result<ProposalWithMaterials, ServiceError> {
    let proposal = find_active(db, id).await?.ok_or_else(|| ServiceError::not_found("proposal"))?;
    if proposal.contractor_id != caller {
        return Err(ServiceError::forbidden("only the contractor may edit this proposal"));
    }
    if proposal.status_id != ProposalStatus::Pending.id() {
        return Err(ServiceError::invalid_state("only pending proposals can be edited"));
    }

    let txn = db.begin().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let am = service_proposal::apply_update(proposal, fields)?;
    let updated = am.update(&txn).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    if let Some(replacement) = materials {
        let existing = active_materials(&txn, updated.id).await?;
        for line in existing {
            proposal_material::deactivate(line)
                .update(&txn)
                .await
                .map_err(|e| ServiceError::Db(e.to_string()))?;
        }
        for m in replacement {
            proposal_material::create(&txn, updated.id, m).await?;
        }
    }
    txn.commit().await.map_err(|e| ServiceError::Db(e.to_string()))?;

    let lines = active_materials(db, updated.id).await?;
    Ok((updated, lines))
}

/// Withdraw a pending-or-any proposal; soft delete, contractor only.
pub async fn delete_proposal(
    db: &DatabaseConnection,
    id: i32,
    caller: Uuid,
) -> Result<(), ServiceError> {
    let proposal = find_active(db, id).await?.ok_or_else(|| ServiceError::not_found("proposal"))?;
    if proposal.contractor_id != caller {
        return Err(ServiceError::forbidden("only the contractor may delete this proposal"));
    }
    service_proposal::deactivate(proposal)
        .update(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(())
}

///// Accept a pending proposal: the proposal becomes Accepted and its parent
/// service becomes InProgress in the same transaction. Requires the service
/// to still be Active. Both writes are conditional on the status each
/// precondition observed, so racing sibling accepts and a concurrent
/// reject of this proposal both lose with `InvalidState`.
#[instrument(skip(db), fields(proposal_id = id, caller = %caller))]
pub async fn accept_proposal(
    db: &DatabaseConnection,
    id: i32,
    caller: Uuid,
) -> Result<service_proposal::Model, ServiceError> {
    let (proposal, svc) = load_for_owner_action(db, id, caller).await?;
    if proposal.status_id != ProposalStatus::Pending.id() {
        return Err(ServiceError::invalid_state("only pending proposals can be accepted"));
    }
    if svc.status_id != ServiceStatus::Active.id() {
        return Err(ServiceError::invalid_state("this service is no longer accepting proposals"));
    }

    let txn = db.begin().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let updated =
        advance_proposal(&txn, proposal.id, ProposalStatus::Pending, ProposalStatus::Accepted)
            .await?;
    promote_service(&txn, svc.id, ServiceStatus::Active, ServiceStatus::InProgress).await?;
    txn.commit().await.map_err(|e| ServiceError::Db(e.to_string()))?;

    info!(proposal_id = id, service_id = svc.id, "proposal_accepted");
    Ok(updated)
}

/// Reject a pending proposal. Only the proposal moves; the service stays
/// Active and sibling proposals are untouched.
#[instrument(skip(db), fields(proposal_id = id, caller = %caller))]
pub async fn reject_proposal(
    db: &DatabaseConnection,
    id: i32,
    caller: Uuid,
) -> Result<service_proposal::Model, ServiceError> {
    let (proposal, _svc) = load_for_owner_action(db, id, caller).await?;
    if proposal.status_id != ProposalStatus::Pending.id() {
        return Err(ServiceError::invalid_state("only pending proposals can be rejected"));
    }
    let updated =
        advance_proposal(db, proposal.id, ProposalStatus::Pending, ProposalStatus::Rejected)
            .await?;
    info!(proposal_id = id, "proposal_rejected");
    Ok(updated)
}

/// Mark accepted work as done: the proposal becomes Completed (stamping
/// completed_at) and the service becomes Completed, atomically.
#[instrument(skip(db), fields(proposal_id = id, caller = %caller))]
pub async fn complete_proposal(
    db: &DatabaseConnection,
    id: i32,
    caller: Uuid,
) -> Result<service_proposal::Model, ServiceError> {
    let (proposal, svc) = load_for_owner_action(db, id, caller).await?;
    if proposal.status_id != ProposalStatus::Accepted.id() {
        return Err(ServiceError::invalid_state("only accepted proposals can be completed"));
    }

    let txn = db.begin().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let updated =
        advance_proposal(&txn, proposal.id, ProposalStatus::Accepted, ProposalStatus::Completed)
            .await?;
    promote_service(&txn, svc.id, ServiceStatus::InProgress, ServiceStatus::Completed).await?;
    txn.commit().await.map_err(|e| ServiceError::Db(e.to_string()))?;

    info!(proposal_id = id, service_id = svc.id, "proposal_completed");
    Ok(updated)
}

/// Rate completed work. Status does not change; a rating outside [0, 5]
/// never gets through.
#[instrument(skip(db, comment), fields(proposal_id = id, caller = %caller))]
pub async fn evaluate_proposal(
    db: &DatabaseConnection,
    id: i32,
    caller: Uuid,
    rating: i32,
    comment: Option<String>,
) -> Result<service_proposal::Model, ServiceError> {
    let (proposal, _svc) = load_for_owner_action(db, id, caller).await?;
    if proposal.status_id != ProposalStatus::Completed.id() {
        return Err(ServiceError::invalid_state("only completed proposals can be evaluated"));
    }
    let am = service_proposal::apply_evaluation(proposal, rating, comment)?;
    let updated = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(proposal_id = id, rating, "proposal_evaluated");
    Ok(updated)
}

pub async fn get_proposal(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<ProposalWithMaterials>, ServiceError> {
    let Some(proposal) = find_active(db, id).await? else {
        return Ok(None);
    };
    let lines = active_materials(db, proposal.id).await?;
    Ok(Some((proposal, lines)))
}

pub async fn list_proposals_by_service(
    db: &DatabaseConnection,
    service_id: i32,
) -> Result<Vec<ProposalWithMaterials>, ServiceError> {
    let rows = service_proposal::Entity::find()
        .filter(service_proposal::Column::ServiceId.eq(service_id))
        .filter(service_proposal::Column::IsActive.eq(true))
        .order_by_desc(service_proposal::Column::CreatedAt)
        .find_with_related(proposal_material::Entity)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(filter_material_rows(rows))
}

pub async fn list_proposals_by_contractor(
    db: &DatabaseConnection,
    contractor_id: Uuid,
) -> Result<Vec<ProposalWithMaterials>, ServiceError> {
    let rows = service_proposal::Entity::find()
        .filter(service_proposal::Column::ContractorId.eq(contractor_id))
        .filter(service_proposal::Column::IsActive.eq(true))
        .order_by_desc(service_proposal::Column::CreatedAt)
        .find_with_related(proposal_material::Entity)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(filter_material_rows(rows))
}

pub async fn list_proposals_by_status(
    db: &DatabaseConnection,
    status: ProposalStatus,
) -> Result<Vec<ProposalWithMaterials>, ServiceError> {
    let rows = service_proposal::Entity::find()
        .filter(service_proposal::Column::StatusId.eq(status.id()))
        .filter(service_proposal::Column::IsActive.eq(true))
        .order_by_desc(service_proposal::Column::CreatedAt)
        .find_with_related(proposal_material::Entity)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(filter_material_rows(rows))
}

/// Shared preamble of the owner-side transitions: the proposal exists, its
/// parent service exists, and the caller owns that service.
async fn load_for_owner_action(
    db: &DatabaseConnection,
    id: i32,
    caller: Uuid,
) -> Result<(service_proposal::Model, service::Model), ServiceError> {
    let proposal = find_active(db, id).await?.ok_or_else(|| ServiceError::not_found("proposal"))?;
    let svc = service_listing::find_active(db, proposal.service_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("service"))?;
    if svc.user_id != caller {
        return Err(ServiceError::forbidden("only the service owner may manage this proposal"));
    }
    Ok((proposal, svc))
}

/// Conditional one-row status move: `from -> to` only while the service is
/// still at `from`. Zero rows affected means another writer got there
/// first; the surrounding transaction is rolled back so the paired
/// proposal write is discarded with it.
async fn promote_service(
    txn: &DatabaseTransaction,
    service_id: i32,
    from: ServiceStatus,
    to: ServiceStatus,
) -> Result<(), ServiceError> {
    let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
    let res = service::Entity::update_many()
        .col_expr(service::Column::StatusId, Expr::value(to.id()))
        .col_expr(service::Column::UpdatedAt, Expr::value(now))
        .filter(service::Column::Id.eq(service_id))
        .filter(service::Column::StatusId.eq(from.id()))
        .filter(service::Column::IsActive.eq(true))
        .exec(txn)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if res.rows_affected == 0 {
        return Err(ServiceError::invalid_state("service state changed concurrently"));
    }
    Ok(())
}

/// Conditional status move for the proposal itself, same shape as
/// `promote_service`: `from -> to` only while the row is still at `from`.
/// Completion also stamps `completed_at`. Zero rows affected means the
/// proposal moved since the precondition read.
async fn advance_proposal<C: sea_orm::ConnectionTrait>(
    conn: &C,
    proposal_id: i32,
    from: ProposalStatus,
    to: ProposalStatus,
) -> Result<service_proposal::Model, ServiceError> {
    let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
    let mut update = service_proposal::Entity::update_many()
        .col_expr(service_proposal::Column::StatusId, Expr::value(to.id()))
        .col_expr(service_proposal::Column::UpdatedAt, Expr::value(now))
        .filter(service_proposal::Column::Id.eq(proposal_id))
        .filter(service_proposal::Column::StatusId.eq(from.id()))
        .filter(service_proposal::Column::IsActive.eq(true));
    if to == ProposalStatus::Completed {
        update = update.col_expr(service_proposal::Column::CompletedAt, Expr::value(Some(now)));
    }
    let res = update.exec(conn).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    if res.rows_affected == 0 {
        return Err(ServiceError::invalid_state("proposal state changed concurrently"));
    }
    service_proposal::Entity::find_by_id(proposal_id)
        .one(conn)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("proposal"))
}

async fn find_active(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<service_proposal::Model>, ServiceError> {
    service_proposal::Entity::find_by_id(id)
        .filter(service_proposal::Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

async fn active_materials<C: sea_orm::ConnectionTrait>(
    conn: &C,
    proposal_id: i32,
) -> Result<Vec<proposal_material::Model>, ServiceError> {
    proposal_material::Entity::find()
        .filter(proposal_material::Column::ProposalId.eq(proposal_id))
        .filter(proposal_material::Column::IsActive.eq(true))
        .all(conn)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

fn filter_material_rows(
    rows: Vec<(service_proposal::Model, Vec<proposal_material::Model>)>,
) -> Vec<ProposalWithMaterials> {
    rows.into_iter()
        .map(|(p, mats)| (p, mats.into_iter().filter(|m| m.is_active).collect()))
        .collect()
}
