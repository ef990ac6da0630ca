//! Database Backend Abstractions
//!
//! The row-execution capability used by `Find`: a pool that accepts SQL text
//! with `$n` placeholders plus the ordered values to bind, and hands back
//! rows. `Find` never sees the concrete store.

pub mod core;
pub mod postgres;

// Re-export core traits and types
pub use self::core::*;
pub use postgres::{PostgresBackend, PostgresPool};
