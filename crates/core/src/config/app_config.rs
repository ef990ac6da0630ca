use crate::config::{ConfigError, QueryConfig};
use std::env;
use std::str::FromStr;

/// Configuration trait for application configuration
pub trait AppConfigTrait: Sized {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self, ConfigError>;

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Environment enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testing,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::invalid_value(
                "environment",
                s,
                "development, testing, or production",
            )),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let env_str = match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Production => "production",
        };
        write!(f, "{}", env_str)
    }
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    pub fn is_testing(&self) -> bool {
        matches!(self, Environment::Testing)
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub database_url: Option<String>,
    pub log_level: String,
    pub log_json: bool,
    pub query: QueryConfig,
}

const VALID_LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

impl AppConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self {
            environment: Environment::Development,
            database_url: None,
            log_level: "info".to_string(),
            log_json: false,
            query: QueryConfig::default(),
        }
    }

    /// Create configuration for development
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database_url: Some("postgres://localhost/trainhub_dev".to_string()),
            log_level: "debug".to_string(),
            log_json: false,
            query: QueryConfig {
                log_sql: true,
                ..QueryConfig::default()
            },
        }
    }

    /// Create configuration for testing
    pub fn testing() -> Self {
        Self {
            environment: Environment::Testing,
            database_url: Some("postgres://localhost/trainhub_test".to_string()),
            log_level: "warn".to_string(),
            log_json: false,
            query: QueryConfig::default(),
        }
    }

    /// Create configuration for production
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            database_url: None, // Must be provided via env
            log_level: "info".to_string(),
            log_json: true,
            query: QueryConfig {
                default_limit: Some(100),
                ..QueryConfig::default()
            },
        }
    }

    /// Check if database is configured
    pub fn has_database(&self) -> bool {
        self.database_url.is_some()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_env<T: FromStr>(var: &str, expected: &str) -> Result<Option<T>, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::invalid_value(var, raw, expected)),
        Err(_) => Ok(None),
    }
}

impl AppConfigTrait for AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV") {
            Ok(env_str) => env_str.parse()?,
            Err(_) => Environment::Development,
        };

        let mut config = match environment {
            Environment::Development => Self::development(),
            Environment::Testing => Self::testing(),
            Environment::Production => Self::production(),
        };

        if let Ok(url) = env::var("DATABASE_URL") {
            config.database_url = Some(url);
        }

        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.log_level = log_level.to_lowercase();
        }

        if let Ok(format) = env::var("LOG_FORMAT") {
            config.log_json = match format.to_lowercase().as_str() {
                "json" => true,
                "text" | "pretty" => false,
                _ => {
                    return Err(ConfigError::invalid_value(
                        "LOG_FORMAT",
                        format,
                        "json or text",
                    ))
                }
            };
        }

        if let Some(max_limit) = parse_env("QUERY_MAX_LIMIT", "a positive integer")? {
            config.query.max_limit = max_limit;
        }

        if let Some(default_limit) = parse_env("QUERY_DEFAULT_LIMIT", "a positive integer")? {
            config.query.default_limit = Some(default_limit);
        }

        if let Some(log_sql) = parse_env("QUERY_LOG_SQL", "true or false")? {
            config.query.log_sql = log_sql;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::invalid_value(
                "log_level",
                self.log_level.clone(),
                format!("one of: {}", VALID_LOG_LEVELS.join(", ")),
            ));
        }

        if self.environment.is_production() && self.database_url.is_none() {
            return Err(ConfigError::missing_required(
                "database_url",
                "DATABASE_URL environment variable is required in production",
            ));
        }

        self.query.validate()
    }
}
