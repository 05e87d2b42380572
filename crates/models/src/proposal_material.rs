//! Priced material line owned by a proposal. `total_price` is derived from
//! quantity * unit_price on every write.
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{entity::prelude::*, NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::service_proposal;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "proposal_material")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub proposal_id: i32,
    pub name: String,
    pub brand: Option<String>,
    pub quantity: i32,
    pub unit: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub unit_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_price: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Proposal,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Proposal => Entity::belongs_to(service_proposal::Entity)
                .from(Column::ProposalId)
                .to(service_proposal::Column::Id)
                .into(),
        }
    }
}

impl Related<service_proposal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Proposal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProposalMaterialFields {
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    pub quantity: i32,
    pub unit: String,
    pub unit_price: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
}

/// `quantity * unit_price`, the only way total price is ever produced.
pub fn compute_total_price(quantity: i32, unit_price: Decimal) -> Decimal {
    Decimal::from(quantity) * unit_price
}

pub fn validate_fields(fields: &ProposalMaterialFields) -> Result<(), ModelError> {
    if fields.name.trim().is_empty() {
        return Err(ModelError::Validation("material name required".into()));
    }
    if fields.quantity <= 0 {
        return Err(ModelError::Validation("material quantity must be > 0".into()));
    }
    if fields.unit_price < Decimal::ZERO {
        return Err(ModelError::Validation("unit_price must be >= 0".into()));
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(
    conn: &C,
    proposal_id: i32,
    fields: &ProposalMaterialFields,
) -> Result<Model, ModelError> {
    validate_fields(fields)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: NotSet,
        proposal_id: Set(proposal_id),
        name: Set(fields.name.clone()),
        brand: Set(fields.brand.clone()),
        quantity: Set(fields.quantity),
        unit: Set(fields.unit.clone()),
        unit_price: Set(fields.unit_price),
        total_price: Set(compute_total_price(fields.quantity, fields.unit_price)),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_price_is_quantity_times_unit_price() {
        let total = compute_total_price(3, Decimal::new(1250, 2));
        assert_eq!(total, Decimal::new(3750, 2));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let fields = ProposalMaterialFields {
            name: "cement".into(),
            brand: None,
            quantity: 0,
            unit: "bag".into(),
            unit_price: Decimal::new(3000, 2),
            notes: None,
        };
        assert!(validate_fields(&fields).is_err());
    }
}
