//! # trainhub-core
//!
//! Ambient plumbing shared by the trainhub crates: environment-driven
//! application configuration and structured logging on top of `tracing`.

pub mod config;
pub mod logging;

pub use config::{AppConfig, AppConfigTrait, ConfigError, Environment, QueryConfig};
pub use logging::{init_logging, LoggingConfig};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get crate version
pub fn version() -> &'static str {
    VERSION
}
