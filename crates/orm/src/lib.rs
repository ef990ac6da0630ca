//! # trainhub-orm: list queries for trainhub
//!
//! Translates REST-style filter, sort and pagination parameters into
//! parameterized SQL against a model's association metadata, and runs the
//! resulting data and count statements through an injected pool.
//!
//! - [`criteria`]: request parameters to joins, a WHERE template and bound values
//! - [`find`]: the extensible query builder rendering and executing both statements
//! - [`metadata`]: model field and association definitions
//! - [`backends`]: the row-execution abstraction and its PostgreSQL implementation

pub mod backends;
pub mod criteria;
pub mod error;
pub mod find;
pub mod metadata;
pub mod security;

// Re-export core traits and types
pub use backends::{
    DatabasePool, DatabasePoolConfig, DatabaseRow, DatabaseRowExt, DatabaseValue,
    PostgresBackend, PostgresPool,
};
pub use criteria::{
    CriteriaParser, FilterOperator, JoinDirective, ParamValue, ParsedCriteria, QueryOptions,
    QueryParams, SortDirection, SortField,
};
pub use error::*;
pub use find::{Find, FindOutput, QueryStructure, RenderedQuery};
pub use metadata::{FieldDefinition, FieldType, ModelDefinition, ModelMetadataProvider, ModelRegistry};
