pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod parser;
pub mod pipeline;
pub mod site;
pub mod types;

// Layered boundaries for application and infrastructure
pub mod app;
pub mod infra;

pub use config::Config;
pub use error::{DirectoryError, Result};
pub use pipeline::processing::catalog::ClinicCatalog;
pub use types::{ClinicRecord, CommunityGroup, Rating, RatingSource};
