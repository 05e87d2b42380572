pub mod db;
pub mod errors;
pub mod proposal_material;
pub mod service;
pub mod service_material;
pub mod service_proposal;
pub mod status;
pub mod user;
pub mod user_credentials;

#[cfg(test)]
mod tests;
