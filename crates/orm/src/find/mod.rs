//! Find - list queries built from request criteria
//!
//! A [`Find`] is created per request, optionally extended with raw SQL
//! fragments, rendered into a data statement and a count statement, and
//! executed once.

pub mod builder;
pub mod execution;
pub mod sql_generation;
pub mod types;

use once_cell::sync::Lazy;
use regex::Regex;

pub use builder::Find;
pub use types::{FindOutput, QueryStructure, RenderedQuery};

/// Positional placeholder such as `$3`
pub(crate) static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(\d+)").expect("placeholder pattern is valid"));
