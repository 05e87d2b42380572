//! Business layer on top of the entity models.
//! - `proposal_lifecycle` owns every transition-legality rule; entities
//!   never guard themselves.
//! - `service_listing` covers the posted-job CRUD and query surface.
//! - `user_directory` is the thin lookup interface the engine validates
//!   callers against.

pub mod auth;
pub mod errors;
pub mod proposal_lifecycle;
pub mod service_listing;
pub mod user_directory;

#[cfg(test)]
pub mod test_support;
