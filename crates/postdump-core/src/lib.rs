//! Shared types and configuration for postdump.
//!
//! Holds the flat [`PostRecord`] every extraction produces, the CSV cell
//! encoding for its list fields, and the environment-driven [`AppConfig`].

mod app_config;
mod config;
pub mod record;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use record::PostRecord;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
