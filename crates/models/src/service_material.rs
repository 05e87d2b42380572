//! Estimated material line owned by a service. Never hard-deleted on its
//! own; only deactivated or removed with the parent.
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{entity::prelude::*, NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::service;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_material")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub service_id: i32,
    pub name: String,
    pub brand: Option<String>,
    pub quantity: i32,
    pub unit: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub estimated_price: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Service,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Service => Entity::belongs_to(service::Entity)
                .from(Column::ServiceId)
                .to(service::Column::Id)
                .into(),
        }
    }
}

impl Related<service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceMaterialFields {
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    pub quantity: i32,
    pub unit: String,
    #[serde(default)]
    pub estimated_price: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
}

pub fn validate_fields(fields: &ServiceMaterialFields) -> Result<(), ModelError> {
    if fields.name.trim().is_empty() {
        return Err(ModelError::Validation("material name required".into()));
    }
    if fields.quantity <= 0 {
        return Err(ModelError::Validation("material quantity must be > 0".into()));
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(
    conn: &C,
    service_id: i32,
    fields: &ServiceMaterialFields,
) -> Result<Model, ModelError> {
    validate_fields(fields)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: NotSet,
        service_id: Set(service_id),
        name: Set(fields.name.clone()),
        brand: Set(fields.brand.clone()),
        quantity: Set(fields.quantity),
        unit: Set(fields.unit.clone()),
        estimated_price: Set(fields.estimated_price),
        notes: Set(fields.notes.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        is_active: Set(true),
    };
    am.insert(conn).await.map_err(|e| ModelError::Db(e.to_string()))
}

pub fn deactivate(model: Model) -> ActiveModel {
    let mut am: ActiveModel = model.into();
    am.is_active = Set(false);
    am.updated_at = Set(Utc::now().into());
    am
}
