//! Service listing endpoints. Reads are public; every write resolves the
//! caller through `AuthUser` and the business layer enforces ownership.
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::pagination::Pagination;
use models::service as service_model;
use models::service::ServiceFields;
use models::service_material::{self, ServiceMaterialFields};
use models::status::ServiceStatus;
use service::errors::ServiceError;
use service::service_listing;

use crate::auth::{AuthUser, ServerState};
use crate::errors::JsonApiError;

/// Optional pagination knobs on the plain listing endpoint.
#[derive(Deserialize, Default)]
pub struct PageParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Deserialize)]
pub struct ServiceBody {
    #[serde(flatten)]
    pub fields: ServiceFields,
    #[serde(default)]
    pub materials: Vec<ServiceMaterialFields>,
}

#[derive(Serialize)]
pub struct MaterialView {
    pub id: i32,
    pub name: String,
    pub brand: Option<String>,
    pub quantity: i32,
    pub unit: String,
    pub estimated_price: Option<Decimal>,
    pub notes: Option<String>,
}

fn service_not_found() -> JsonApiError {
    JsonApiError::from(ServiceError::not_found("service"))
}

impl From<service_material::Model> for MaterialView {
    fn from(m: service_material::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            brand: m.brand,
            quantity: m.quantity,
            unit: m.unit,
            estimated_price: m.estimated_price,
            notes: m.notes,
        }
    }
}

#[derive(Serialize)]
pub struct ServiceView {
    pub id: i32,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub service_type: String,
    pub location: String,
    pub location_type: String,
    pub preferred_start_date: chrono::DateTime<chrono::FixedOffset>,
    pub preferred_end_date: chrono::DateTime<chrono::FixedOffset>,
    pub preferred_time: String,
    pub requires_materials: bool,
    pub materials_description: Option<String>,
    pub budget_range: Option<Decimal>,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub materials: Vec<MaterialView>,
}

impl ServiceView {
    fn build(svc: service_model::Model, materials: Vec<service_material::Model>) -> Self {
        let status = ServiceStatus::from_id(svc.status_id)
            .map(|s| s.label().to_string())
            .unwrap_or_else(|| svc.status_id.to_string());
        Self {
            id: svc.id,
            owner_id: svc.user_id,
            title: svc.title,
            description: svc.description,
            service_type: svc.service_type,
            location: svc.location,
            location_type: svc.location_type,
            preferred_start_date: svc.preferred_start_date,
            preferred_end_date: svc.preferred_end_date,
            preferred_time: svc.preferred_time,
            requires_materials: svc.requires_materials,
            materials_description: svc.materials_description,
            budget_range: svc.budget_range,
            status,
            created_at: svc.created_at,
            materials: materials.into_iter().map(Into::into).collect(),
        }
    }
}

fn views(rows: Vec<service_listing::ServiceWithMaterials>) -> Vec<ServiceView> {
    rows.into_iter().map(|(svc, mats)| ServiceView::build(svc, mats)).collect()
}

pub async fn create(
    State(state): State<ServerState>,
    caller: AuthUser,
    Json(body): Json<ServiceBody>,
) -> Result<(StatusCode, Json<ServiceView>), JsonApiError> {
    let (svc, mats) =
        service_listing::create_service(&state.db, caller.user_id, &body.fields, &body.materials)
            .await?;
    Ok((StatusCode::CREATED, Json(ServiceView::build(svc, mats))))
}

pub async fn update(
    State(state): State<ServerState>,
    caller: AuthUser,
    Path(id): Path<i32>,
    Json(body): Json<ServiceBody>,
) -> Result<Json<ServiceView>, JsonApiError> {
    service_listing::update_service(&state.db, id, caller.user_id, &body.fields).await?;
    let (svc, mats) =
        service_listing::get_service(&state.db, id).await?.ok_or_else(service_not_found)?;
    Ok(Json(ServiceView::build(svc, mats)))
}

pub async fn delete(
    State(state): State<ServerState>,
    caller: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, JsonApiError> {
    service_listing::delete_service(&state.db, id, caller.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn cancel(
    State(state): State<ServerState>,
    caller: AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<ServiceView>, JsonApiError> {
    let svc = service_listing::cancel_service(&state.db, id, caller.user_id).await?;
    Ok(Json(ServiceView::build(svc, Vec::new())))
}

pub async fn get_one(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<ServiceView>, JsonApiError> {
    let (svc, mats) =
        service_listing::get_service(&state.db, id).await?.ok_or_else(service_not_found)?;
    Ok(Json(ServiceView::build(svc, mats)))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<ServiceView>>, JsonApiError> {
    if params.page.is_some() || params.per_page.is_some() {
        let defaults = Pagination::default();
        let page = Pagination {
            page: params.page.unwrap_or(defaults.page),
            per_page: params.per_page.unwrap_or(defaults.per_page),
        };
        let rows = service_listing::list_services_paginated(&state.db, page).await?;
        return Ok(Json(rows.into_iter().map(|svc| ServiceView::build(svc, Vec::new())).collect()));
    }
    let rows = service_listing::list_services(&state.db).await?;
    Ok(Json(views(rows)))
}

pub async fn list_active(
    State(state): State<ServerState>,
) -> Result<Json<Vec<ServiceView>>, JsonApiError> {
    let rows = service_listing::list_active_services(&state.db).await?;
    Ok(Json(views(rows)))
}

pub async fn list_mine(
    State(state): State<ServerState>,
    caller: AuthUser,
) -> Result<Json<Vec<ServiceView>>, JsonApiError> {
    let rows = service_listing::list_services_by_owner(&state.db, caller.user_id).await?;
    Ok(Json(views(rows)))
}

pub async fn list_by_type(
    State(state): State<ServerState>,
    Path(service_type): Path<String>,
) -> Result<Json<Vec<ServiceView>>, JsonApiError> {
    let rows = service_listing::list_services_by_type(&state.db, &service_type).await?;
    Ok(Json(views(rows)))
}

pub async fn list_by_location(
    State(state): State<ServerState>,
    Path(location): Path<String>,
) -> Result<Json<Vec<ServiceView>>, JsonApiError> {
    let rows = service_listing::list_services_by_location(&state.db, &location).await?;
    Ok(Json(views(rows)))
}

pub async fn add_material(
    State(state): State<ServerState>,
    caller: AuthUser,
    Path(id): Path<i32>,
    Json(fields): Json<ServiceMaterialFields>,
) -> Result<(StatusCode, Json<MaterialView>), JsonApiError> {
    let created =
        service_listing::add_service_material(&state.db, id, caller.user_id, &fields).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn remove_material(
    State(state): State<ServerState>,
    caller: AuthUser,
    Path(material_id): Path<i32>,
) -> Result<StatusCode, JsonApiError> {
    service_listing::remove_service_material(&state.db, material_id, caller.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
