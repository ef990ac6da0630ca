use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Limits applied to list queries built from request parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Upper bound for a requested `limit`; larger values are clamped
    pub max_limit: u64,
    /// Limit applied when the request carries none
    pub default_limit: Option<u64>,
    /// Emit every rendered statement at debug level
    pub log_sql: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_limit: 1000,
            default_limit: None,
            log_sql: false,
        }
    }
}

impl QueryConfig {
    /// Resolve the effective limit for a request
    pub fn effective_limit(&self, requested: Option<u64>) -> Option<u64> {
        requested
            .or(self.default_limit)
            .map(|limit| limit.min(self.max_limit))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_limit == 0 {
            return Err(ConfigError::invalid_value(
                "query.max_limit",
                "0",
                "a positive integer",
            ));
        }

        if let Some(default_limit) = self.default_limit {
            if default_limit > self.max_limit {
                return Err(ConfigError::validation_failed(format!(
                    "query.default_limit ({}) exceeds query.max_limit ({})",
                    default_limit, self.max_limit
                )));
            }
        }

        Ok(())
    }
}
