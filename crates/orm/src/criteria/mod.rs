//! Criteria - request parameters to parameterized WHERE clauses
//!
//! [`CriteriaParser`] turns a flat bag of request parameters into
//! [`ParsedCriteria`]: join directives for the associations it touches, a
//! WHERE template with `$n` placeholders, and the values bound to them.

pub mod params;
pub mod parser;
pub mod types;
pub mod values;

pub use params::{ParamValue, QueryParams};
pub use parser::CriteriaParser;
pub use types::{
    FilterOperator, JoinDirective, ParsedCriteria, QueryOptions, SortDirection, SortField,
};
