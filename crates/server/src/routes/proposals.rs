//! Proposal lifecycle endpoints. Every handler resolves the caller and
//! hands the id straight to the lifecycle engine, which owns the
//! ownership and state checks; here we only shape JSON.
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::proposal_material::{self, ProposalMaterialFields};
use models::service_proposal::{self, ProposalFields};
use models::status::ProposalStatus;
use service::errors::ServiceError;
use service::proposal_lifecycle::{self, ProposalWithMaterials};

use crate::auth::{AuthUser, ServerState};
use crate::errors::JsonApiError;

/// `materials` is optional so a PUT can tell "leave my lines alone" (field
/// absent) apart from "replace them with nothing" (empty array).
#[derive(Deserialize)]
pub struct ProposalBody {
    #[serde(flatten)]
    pub fields: ProposalFields,
    #[serde(default)]
    pub materials: Option<Vec<ProposalMaterialFields>>,
}

#[derive(Deserialize)]
pub struct EvaluateBody {
    pub rating: i32,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Serialize)]
pub struct ProposalMaterialView {
    pub id: i32,
    pub name: String,
    pub brand: Option<String>,
    pub quantity: i32,
    pub unit: String,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub notes: Option<String>,
}

impl From<proposal_material::Model> for ProposalMaterialView {
    fn from(m: proposal_material::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            brand: m.brand,
            quantity: m.quantity,
            unit: m.unit,
            unit_price: m.unit_price,
            total_price: m.total_price,
            notes: m.notes,
        }
    }
}

#[derive(Serialize)]
pub struct ProposalView {
    pub id: i32,
    pub service_id: i32,
    pub contractor_id: Uuid,
    pub description: String,
    pub labor_cost: Decimal,
    pub material_cost: Option<Decimal>,
    pub total_cost: Decimal,
    pub estimated_start_date: chrono::DateTime<chrono::FixedOffset>,
    pub estimated_end_date: chrono::DateTime<chrono::FixedOffset>,
    pub status: String,
    pub notes: Option<String>,
    pub rating: Option<i32>,
    pub evaluation_comment: Option<String>,
    pub completed_at: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub materials: Vec<ProposalMaterialView>,
}

impl ProposalView {
    fn build(p: service_proposal::Model, materials: Vec<proposal_material::Model>) -> Self {
        let status = ProposalStatus::from_id(p.status_id)
            .map(|s| s.label().to_string())
            .unwrap_or_else(|| p.status_id.to_string());
        Self {
            id: p.id,
            service_id: p.service_id,
            contractor_id: p.contractor_id,
            description: p.description,
            labor_cost: p.labor_cost,
            material_cost: p.material_cost,
            total_cost: p.total_cost,
            estimated_start_date: p.estimated_start_date,
            estimated_end_date: p.estimated_end_date,
            status,
            notes: p.notes,
            rating: p.rating,
            evaluation_comment: p.evaluation_comment,
            completed_at: p.completed_at,
            created_at: p.created_at,
            materials: materials.into_iter().map(Into::into).collect(),
        }
    }
}

fn views(rows: Vec<ProposalWithMaterials>) -> Vec<ProposalView> {
    rows.into_iter().map(|(p, mats)| ProposalView::build(p, mats)).collect()
}

pub async fn create(
    State(state): State<ServerState>,
    caller: AuthUser,
    Path(service_id): Path<i32>,
    Json(body): Json<ProposalBody>,
) -> Result<(StatusCode, Json<ProposalView>), JsonApiError> {
    let materials = body.materials.unwrap_or_default();
    let (p, mats) = proposal_lifecycle::create_proposal(
        &state.db,
        service_id,
        caller.user_id,
        &body.fields,
        &materials,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(ProposalView::build(p, mats))))
}

pub async fn update(
    State(state): State<ServerState>,
    caller: AuthUser,
    Path(id): Path<i32>,
    Json(body): Json<ProposalBody>,
) -> Result<Json<ProposalView>, JsonApiError> {
    let (p, mats) = proposal_lifecycle::update_proposal(
        &state.db,
        id,
        caller.user_id,
        &body.fields,
        body.materials.as_deref(),
    )
    .await?;
    Ok(Json(ProposalView::build(p, mats)))
}

pub async fn delete(
    State(state): State<ServerState>,
    caller: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, JsonApiError> {
    proposal_lifecycle::delete_proposal(&state.db, id, caller.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn accept(
    State(state): State<ServerState>,
    caller: AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<ProposalView>, JsonApiError> {
    let p = proposal_lifecycle::accept_proposal(&state.db, id, caller.user_id).await?;
    Ok(Json(ProposalView::build(p, Vec::new())))
}

pub async fn reject(
    State(state): State<ServerState>,
    caller: AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<ProposalView>, JsonApiError> {
    let p = proposal_lifecycle::reject_proposal(&state.db, id, caller.user_id).await?;
    Ok(Json(ProposalView::build(p, Vec::new())))
}

pub async fn complete(
    State(state): State<ServerState>,
    caller: AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<ProposalView>, JsonApiError> {
    let p = proposal_lifecycle::complete_proposal(&state.db, id, caller.user_id).await?;
    Ok(Json(ProposalView::build(p, Vec::new())))
}

pub async fn evaluate(
    State(state): State<ServerState>,
    caller: AuthUser,
    Path(id): Path<i32>,
    Json(body): Json<EvaluateBody>,
) -> Result<Json<ProposalView>, JsonApiError> {
    let p = proposal_lifecycle::evaluate_proposal(
        &state.db,
        id,
        caller.user_id,
        body.rating,
        body.comment,
    )
    .await?;
    Ok(Json(ProposalView::build(p, Vec::new())))
}

pub async fn get_one(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<ProposalView>, JsonApiError> {
    let (p, mats) = proposal_lifecycle::get_proposal(&state.db, id)
        .await?
        .ok_or_else(|| JsonApiError::from(ServiceError::not_found("proposal")))?;
    Ok(Json(ProposalView::build(p, mats)))
}

pub async fn list_by_service(
    State(state): State<ServerState>,
    Path(service_id): Path<i32>,
) -> Result<Json<Vec<ProposalView>>, JsonApiError> {
    let rows = proposal_lifecycle::list_proposals_by_service(&state.db, service_id).await?;
    Ok(Json(views(rows)))
}

pub async fn list_mine(
    State(state): State<ServerState>,
    caller: AuthUser,
) -> Result<Json<Vec<ProposalView>>, JsonApiError> {
    let rows = proposal_lifecycle::list_proposals_by_contractor(&state.db, caller.user_id).await?;
    Ok(Json(views(rows)))
}

pub async fn list_by_status(
    State(state): State<ServerState>,
    Path(status_id): Path<i32>,
) -> Result<Json<Vec<ProposalView>>, JsonApiError> {
    let status = ProposalStatus::from_id(status_id).ok_or_else(|| {
        JsonApiError::from(ServiceError::Validation("unknown proposal status".into()))
    })?;
    let rows = proposal_lifecycle::list_proposals_by_status(&state.db, status).await?;
    Ok(Json(views(rows)))
}
