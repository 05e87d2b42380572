pub mod logging;
pub mod pagination;
pub mod types;
