//! Error types for the ORM layer
//!
//! `ModelError` is what a store reports back; `ParseError` rejects a request
//! before any SQL exists; `QueryExecutionError` wraps a store failure together
//! with the statement that caused it.

use std::fmt;
use thiserror::Error;

/// Result type alias for store operations
pub type ModelResult<T> = Result<T, ModelError>;

/// ORM error type alias
pub type OrmError = ModelError;

/// ORM result type alias
pub type OrmResult<T> = ModelResult<T>;

/// Errors reported by the database layer
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Database rejected the statement
    Database(String),
    /// Connection pool error
    Connection(String),
    /// Query building or binding error
    Query(String),
    /// Serialization/deserialization error
    Serialization(String),
    /// Identifier or parameter rejected before reaching SQL
    Validation(String),
    /// Column missing from a result row
    ColumnNotFound(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Database(msg) => write!(f, "Database error: {}", msg),
            ModelError::Connection(msg) => write!(f, "Connection error: {}", msg),
            ModelError::Query(msg) => write!(f, "Query error: {}", msg),
            ModelError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            ModelError::Validation(msg) => write!(f, "Validation error: {}", msg),
            ModelError::ColumnNotFound(msg) => write!(f, "Column not found: {}", msg),
        }
    }
}

impl std::error::Error for ModelError {}

impl From<sqlx::Error> for ModelError {
    fn from(err: sqlx::Error) -> Self {
        ModelError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

/// Rejections raised while turning request parameters into criteria
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unknown field '{field}' on model '{model}'")]
    UnknownField { model: String, field: String },

    #[error("Unknown operator '{operator}' for field '{field}'")]
    UnknownOperator { field: String, operator: String },

    #[error("Malformed filter key '{key}'")]
    MalformedKey { key: String },

    #[error("Invalid value '{value}' for '{field}': expected {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Unsupported filter on '{field}': {reason}")]
    UnsupportedFilter { field: String, reason: String },

    #[error("Invalid query string: {0}")]
    QueryString(String),
}

impl ParseError {
    pub fn unknown_field<M: Into<String>, F: Into<String>>(model: M, field: F) -> Self {
        ParseError::UnknownField {
            model: model.into(),
            field: field.into(),
        }
    }

    pub fn unknown_operator<F: Into<String>, O: Into<String>>(field: F, operator: O) -> Self {
        ParseError::UnknownOperator {
            field: field.into(),
            operator: operator.into(),
        }
    }

    pub fn malformed_key<K: Into<String>>(key: K) -> Self {
        ParseError::MalformedKey { key: key.into() }
    }

    pub fn invalid_value<F, V, E>(field: F, value: V, expected: E) -> Self
    where
        F: Into<String>,
        V: Into<String>,
        E: Into<String>,
    {
        ParseError::InvalidValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    pub fn unsupported<F: Into<String>, R: Into<String>>(field: F, reason: R) -> Self {
        ParseError::UnsupportedFilter {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// A rendered statement the store refused to run
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Query execution failed for `{statement}`: {source}")]
pub struct QueryExecutionError {
    pub statement: String,
    #[source]
    pub source: ModelError,
}

impl QueryExecutionError {
    pub fn new<S: Into<String>>(statement: S, source: ModelError) -> Self {
        Self {
            statement: statement.into(),
            source,
        }
    }
}

/// Everything a list query can fail with
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FindError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Unknown model '{0}'")]
    UnknownModel(String),

    #[error(transparent)]
    Execution(#[from] QueryExecutionError),
}

impl FindError {
    /// Whether the request itself was at fault (as opposed to the store)
    pub fn is_client_error(&self) -> bool {
        matches!(self, FindError::Parse(_) | FindError::UnknownModel(_))
    }
}

/// Result type alias for `Find` operations
pub type FindResult<T> = Result<T, FindError>;
