//! # Structured Logging
//!
//! Installs a `tracing` subscriber configured from [`LoggingConfig`], with
//! plain text output for development and JSON output for production.

use crate::config::{AppConfig, Environment};
use serde_json::json;
use std::io;
use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "warn")
    pub level: String,
    /// Enable JSON structured logging (vs plain text)
    pub json_format: bool,
    /// Environment filter (supports directives like "trainhub=debug,sqlx=warn")
    pub env_filter: Option<String>,
    /// Service name to include in the startup entry
    pub service_name: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            env_filter: None,
            service_name: None,
        }
    }
}

impl LoggingConfig {
    /// Create production logging configuration
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            json_format: true,
            env_filter: Some("trainhub=info,sqlx=warn".to_string()),
            service_name: None,
        }
    }

    /// Create development logging configuration
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
            env_filter: Some("trainhub=debug,sqlx=info".to_string()),
            service_name: None,
        }
    }

    /// Create test logging configuration (minimal output)
    pub fn test() -> Self {
        Self {
            level: "error".to_string(),
            json_format: false,
            env_filter: Some("trainhub=error".to_string()),
            service_name: None,
        }
    }

    /// Derive logging settings from the application configuration
    pub fn from_app_config(config: &AppConfig) -> Self {
        let base = match config.environment {
            Environment::Development => Self::development(),
            Environment::Testing => Self::test(),
            Environment::Production => Self::production(),
        };

        Self {
            level: config.log_level.clone(),
            json_format: config.log_json,
            env_filter: None,
            ..base
        }
    }

    /// Set service name
    pub fn with_service(mut self, name: &str) -> Self {
        self.service_name = Some(name.to_string());
        self
    }

    /// Set environment filter
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    fn filter_directives(&self) -> &str {
        self.env_filter.as_deref().unwrap_or(&self.level)
    }
}

/// Initialize structured logging for the application
///
/// `RUST_LOG` takes precedence over the configured filter. A subscriber that
/// is already installed is left in place.
pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.filter_directives()))?;

    let installed = if config.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(Layer::new().with_writer(io::stdout).json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(Layer::new().with_writer(io::stdout))
            .try_init()
    };

    if installed.is_err() {
        tracing::debug!(target: "trainhub::logging", "Global subscriber already set, keeping it");
        return Ok(());
    }

    let init_msg = json!({
        "message": "Structured logging initialized",
        "level": config.level,
        "json_format": config.json_format,
        "service_name": config.service_name,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    tracing::info!(target: "trainhub::logging", "{}", init_msg);

    Ok(())
}
