//! Service entity: a posted job request.
//!
//! Passive state holder: helpers here stamp timestamps and write whatever
//! status they are told to; transition legality lives in the service layer.
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{entity::prelude::*, NotSet, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::status::ServiceStatus;
use crate::{service_material, service_proposal, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub service_type: String,
    pub location: String,
    pub location_type: String,
    pub preferred_start_date: DateTimeWithTimeZone,
    pub preferred_end_date: DateTimeWithTimeZone,
    pub preferred_time: String,
    pub requires_materials: bool,
    pub materials_description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub budget_range: Option<Decimal>,
    pub status_id: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Owner,
    Materials,
    Proposals,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Owner => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
            Relation::Materials => Entity::has_many(service_material::Entity).into(),
            Relation::Proposals => Entity::has_many(service_proposal::Entity).into(),
        }
    }
}

impl Related<service_material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Materials.def()
    }
}

impl Related<service_proposal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Proposals.def()
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Caller-supplied fields of a service, shared by create and update.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceFields {
    pub title: String,
    pub description: String,
    pub service_type: String,
    pub location: String,
    pub location_type: String,
    pub preferred_start_date: DateTimeWithTimeZone,
    pub preferred_end_date: DateTimeWithTimeZone,
    pub preferred_time: String,
    pub requires_materials: bool,
    #[serde(default)]
    pub materials_description: Option<String>,
    #[serde(default)]
    pub budget_range: Option<Decimal>,
}

pub fn validate_fields(fields: &ServiceFields) -> Result<(), ModelError> {
    if fields.title.trim().is_empty() {
        return Err(ModelError::Validation("title required".into()));
    }
    if fields.description.trim().is_empty() {
        return Err(ModelError::Validation("description required".into()));
    }
    if fields.preferred_end_date < fields.preferred_start_date {
        return Err(ModelError::Validation(
            "preferred_end_date must not precede preferred_start_date".into(),
        ));
    }
    Ok(())
}

/// Insert a new service at `Active`.
pub async fn create<C: ConnectionTrait>(
    conn: &C,
    owner: Uuid,
    fields: &ServiceFields,
) -> Result<Model, ModelError> {
    validate_fields(fields)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: NotSet,
        user_id: Set(owner),
        title: Set(fields.title.clone()),
        description: Set(fields.description.clone()),
        service_type: Set(fields.service_type.clone()),
        location: Set(fields.location.clone()),
        location_type: Set(fields.location_type.clone()),
        preferred_start_date: Set(fields.preferred_start_date),
        preferred_end_date: Set(fields.preferred_end_date),
        preferred_time: Set(fields.preferred_time.clone()),
        requires_materials: Set(fields.requires_materials),
        materials_description: Set(fields.materials_description.clone()),
        budget_range: Set(fields.budget_range),
        status_id: Set(ServiceStatus::Active.id()),
        created_at: Set(now),
        updated_at: Set(now),
        is_active: Set(true),
    };
    am.insert(conn).await.map_err(|e| ModelError::Db(e.to_string()))
}

/// Replace the caller-editable fields. Status is left untouched.
pub fn apply_update(model: Model, fields: &ServiceFields) -> Result<ActiveModel, ModelError> {
    validate_fields(fields)?;
    let mut am: ActiveModel = model.into();
    am.title = Set(fields.title.clone());
    am.description = Set(fields.description.clone());
    am.service_type = Set(fields.service_type.clone());
    am.location = Set(fields.location.clone());
    am.location_type = Set(fields.location_type.clone());
    am.preferred_start_date = Set(fields.preferred_start_date);
    am.preferred_end_date = Set(fields.preferred_end_date);
    am.preferred_time = Set(fields.preferred_time.clone());
    am.requires_materials = Set(fields.requires_materials);
    am.materials_description = Set(fields.materials_description.clone());
    am.budget_range = Set(fields.budget_range);
    am.updated_at = Set(Utc::now().into());
    Ok(am)
}

/// Write the given status without checking whether the transition is legal.
pub fn transition(model: Model, status: ServiceStatus) -> ActiveModel {
    let mut am: ActiveModel = model.into();
    am.status_id = Set(status.id());
    am.updated_at = Set(Utc::now().into());
    am
}

/// Soft delete: the row stays, readers filter it out.
pub fn deactivate(model: Model) -> ActiveModel {
    let mut am: ActiveModel = model.into();
    am.is_active = Set(false);
    am.updated_at = Set(Utc::now().into());
    am
}
