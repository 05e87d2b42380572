//! Proposal entity: a contractor's bid on a service.
//!
//! `total_cost` is derived: every create and update recomputes it from
//! labor + material, never trusting a stored value. Status transitions are
//! written here but guarded in the service layer.
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{entity::prelude::*, NotSet, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::status::ProposalStatus;
use crate::{proposal_material, service, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_proposal")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub service_id: i32,
    pub contractor_id: Uuid,
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub labor_cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub material_cost: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_cost: Decimal,
    pub estimated_start_date: DateTimeWithTimeZone,
    pub estimated_end_date: DateTimeWithTimeZone,
    pub status_id: i32,
    pub notes: Option<String>,
    pub rating: Option<i32>,
    pub evaluation_comment: Option<String>,
    pub completed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Service,
    Contractor,
    Materials,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Service => Entity::belongs_to(service::Entity)
                .from(Column::ServiceId)
                .to(service::Column::Id)
                .into(),
            Relation::Contractor => Entity::belongs_to(user::Entity)
                .from(Column::ContractorId)
                .to(user::Column::Id)
                .into(),
            Relation::Materials => Entity::has_many(proposal_material::Entity).into(),
        }
    }
}

impl Related<service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contractor.def()
    }
}

impl Related<proposal_material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Materials.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Caller-supplied fields of a proposal, shared by create and update.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProposalFields {
    pub description: String,
    pub labor_cost: Decimal,
    #[serde(default)]
    pub material_cost: Option<Decimal>,
    pub estimated_start_date: DateTimeWithTimeZone,
    pub estimated_end_date: DateTimeWithTimeZone,
    #[serde(default)]
    pub notes: Option<String>,
}

/// `labor + (material ?? 0)`, the only way total cost is ever produced.
pub fn compute_total_cost(labor: Decimal, material: Option<Decimal>) -> Decimal {
    labor + material.unwrap_or_default()
}

pub fn validate_fields(fields: &ProposalFields) -> Result<(), ModelError> {
    if fields.description.trim().is_empty() {
        return Err(ModelError::Validation("description required".into()));
    }
    if fields.labor_cost < Decimal::ZERO {
        return Err(ModelError::Validation("labor_cost must be >= 0".into()));
    }
    if let Some(mc) = fields.material_cost {
        if mc < Decimal::ZERO {
            return Err(ModelError::Validation("material_cost must be >= 0".into()));
        }
    }
    if fields.estimated_end_date < fields.estimated_start_date {
        return Err(ModelError::Validation(
            "estimated_end_date must not precede estimated_start_date".into(),
        ));
    }
    Ok(())
}

pub fn validate_rating(rating: i32) -> Result<(), ModelError> {
    if !(0..=5).contains(&rating) {
        return Err(ModelError::Validation("rating must be between 0 and 5".into()));
    }
    Ok(())
}

/// Insert a new proposal at `Pending` with the total cost recomputed.
pub async fn create<C: ConnectionTrait>(
    conn: &C,
    service_id: i32,
    contractor_id: Uuid,
    fields: &ProposalFields,
) -> Result<Model, ModelError> {
    validate_fields(fields)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: NotSet,
        service_id: Set(service_id),
        contractor_id: Set(contractor_id),
        description: Set(fields.description.clone()),
        labor_cost: Set(fields.labor_cost),
        material_cost: Set(fields.material_cost),
        total_cost: Set(compute_total_cost(fields.labor_cost, fields.material_cost)),
        estimated_start_date: Set(fields.estimated_start_date),
        estimated_end_date: Set(fields.estimated_end_date),
        status_id: Set(ProposalStatus::Pending.id()),
        notes: Set(fields.notes.clone()),
        rating: Set(None),
        evaluation_comment: Set(None),
        completed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        is_active: Set(true),
    };
    am.insert(conn).await.map_err(|e| ModelError::Db(e.to_string()))
}

/// Replace the caller-editable fields and recompute the total cost.
/// Status is left untouched.
pub fn apply_update(model: Model, fields: &ProposalFields) -> Result<ActiveModel, ModelError> {
    validate_fields(fields)?;
    let mut am: ActiveModel = model.into();
    am.description = Set(fields.description.clone());
    am.labor_cost = Set(fields.labor_cost);
    am.material_cost = Set(fields.material_cost);
    am.total_cost = Set(compute_total_cost(fields.labor_cost, fields.material_cost));
    am.estimated_start_date = Set(fields.estimated_start_date);
    am.estimated_end_date = Set(fields.estimated_end_date);
    am.notes = Set(fields.notes.clone());
    am.updated_at = Set(Utc::now().into());
    Ok(am)
}

/// Write the given status without checking whether the transition is legal.
/// Completion also stamps `completed_at`.
pub fn transition(model: Model, status: ProposalStatus) -> ActiveModel {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let mut am: ActiveModel = model.into();
    am.status_id = Set(status.id());
    if status == ProposalStatus::Completed {
        am.completed_at = Set(Some(now));
    }
    am.updated_at = Set(now);
    am
}

/// Record an evaluation on an already-completed proposal; the status stays.
pub fn apply_evaluation(
    model: Model,
    rating: i32,
    comment: Option<String>,
) -> Result<ActiveModel, ModelError> {
    validate_rating(rating)?;
    let mut am: ActiveModel = model.into();
    am.rating = Set(Some(rating));
    am.evaluation_comment = Set(comment);
    am.updated_at = Set(Utc::now().into());
    Ok(am)
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
    fn total_cost_sums_labor_and_material() {
        let total = compute_total_cost(Decimal::new(10000, 2), Some(Decimal::new(5000, 2)));
        assert_eq!(total, Decimal::new(15000, 2));
    }

    #[test]
    fn total_cost_treats_missing_material_as_zero() {
        let labor = Decimal::new(9950, 2);
        assert_eq!(compute_total_cost(labor, None), labor);
    }

    #[test]
    fn rating_bounds_are_inclusive() {
        assert!(validate_rating(0).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(-1).is_err());
        assert!(validate_rating(6).is_err());
    }

    fn sample_model(status: ProposalStatus) -> Model {
        let now: DateTimeWithTimeZone = Utc::now().into();
        Model {
            id: 1,
            service_id: 1,
            contractor_id: Uuid::new_v4(),
            description: "paint the fence".into(),
            labor_cost: Decimal::new(10000, 2),
            material_cost: None,
            total_cost: Decimal::new(10000, 2),
            estimated_start_date: now,
            estimated_end_date: now,
            status_id: status.id(),
            notes: None,
            rating: None,
            evaluation_comment: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
            is_active: true,
        }
    }

    #[test]
    fn transition_to_completed_stamps_completed_at() {
        use sea_orm::ActiveValue;

        let am = transition(sample_model(ProposalStatus::Accepted), ProposalStatus::Completed);
        assert_eq!(am.status_id, Set(ProposalStatus::Completed.id()));
        assert!(matches!(am.completed_at, ActiveValue::Set(Some(_))));

        let am = transition(sample_model(ProposalStatus::Pending), ProposalStatus::Rejected);
        assert_eq!(am.status_id, Set(ProposalStatus::Rejected.id()));
        assert!(matches!(am.completed_at, ActiveValue::Unchanged(None)));
    }

    #[test]
    fn negative_labor_cost_is_rejected() {
        let fields = ProposalFields {
            description: "paint the fence".into(),
            labor_cost: Decimal::new(-100, 2),
            material_cost: None,
            estimated_start_date: chrono::Utc::now().into(),
            estimated_end_date: chrono::Utc::now().into(),
            notes: None,
        };
        assert!(validate_fields(&fields).is_err());
    }
}
