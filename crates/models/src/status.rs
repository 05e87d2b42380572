//! Status catalog entity plus the two typed views over its id space.
//!
//! Services and proposals share one catalog table but form two unrelated
//! enumerations that happen to overlap numerically (both `Completed` states
//! use id 3). Code never compares a `ServiceStatus` to a `ProposalStatus`;
//! each side only ever goes through its own enum.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "status")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub name: String,
    pub description: String,
    pub color: String,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match *self {}
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Lifecycle states of a posted service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Active,
    InProgress,
    Completed,
    Cancelled,
}

impl ServiceStatus {
    pub fn id(self) -> i32 {
        match self {
            ServiceStatus::Active => 1,
            ServiceStatus::InProgress => 2,
            ServiceStatus::Completed => 3,
            ServiceStatus::Cancelled => 4,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(ServiceStatus::Active),
            2 => Some(ServiceStatus::InProgress),
            3 => Some(ServiceStatus::Completed),
            4 => Some(ServiceStatus::Cancelled),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ServiceStatus::Active => "Active",
            ServiceStatus::InProgress => "InProgress",
            ServiceStatus::Completed => "Completed",
            ServiceStatus::Cancelled => "Cancelled",
        }
    }
}

/// Lifecycle states of a proposal. `Completed` reuses the service catalog
/// row (id 3); the other ids live in the 5-7 range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
}

impl ProposalStatus {
    pub fn id(self) -> i32 {
        match self {
            ProposalStatus::Pending => 5,
            ProposalStatus::Accepted => 6,
            ProposalStatus::Rejected => 7,
            ProposalStatus::Completed => 3,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            5 => Some(ProposalStatus::Pending),
            6 => Some(ProposalStatus::Accepted),
            7 => Some(ProposalStatus::Rejected),
            3 => Some(ProposalStatus::Completed),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProposalStatus::Pending => "Pending",
            ProposalStatus::Accepted => "Accepted",
            ProposalStatus::Rejected => "Rejected",
            ProposalStatus::Completed => "Completed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_status_round_trips() {
        for s in [
            ServiceStatus::Active,
            ServiceStatus::InProgress,
            ServiceStatus::Completed,
            ServiceStatus::Cancelled,
        ] {
            assert_eq!(ServiceStatus::from_id(s.id()), Some(s));
        }
        assert_eq!(ServiceStatus::from_id(5), None);
    }

    #[test]
    fn proposal_status_round_trips() {
        for s in [
            ProposalStatus::Pending,
            ProposalStatus::Accepted,
            ProposalStatus::Rejected,
            ProposalStatus::Completed,
        ] {
            assert_eq!(ProposalStatus::from_id(s.id()), Some(s));
        }
        assert_eq!(ProposalStatus::from_id(1), None);
        assert_eq!(ProposalStatus::from_id(4), None);
    }

    #[test]
    fn completed_ids_overlap_across_enums() {
        // Shared catalog row, distinct meanings.
        assert_eq!(ServiceStatus::Completed.id(), ProposalStatus::Completed.id());
    }
}
