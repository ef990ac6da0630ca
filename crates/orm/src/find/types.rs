//! Types used by the Find builder

use regex::Captures;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::PLACEHOLDER;
use crate::backends::DatabaseValue;

/// Accumulated SQL fragments for one query
///
/// Base fragments can be replaced outright; the `additional_*` lists only
/// grow and are appended to their base, comma separated, at render time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryStructure {
    pub columns: String,
    pub joins: String,
    pub where_clause: String,
    pub additional_columns: Vec<String>,
    pub additional_joins: Vec<String>,
    pub additional_where: Vec<String>,
}

impl QueryStructure {
    pub fn new<C, J, W>(columns: C, joins: J, where_clause: W) -> Self
    where
        C: Into<String>,
        J: Into<String>,
        W: Into<String>,
    {
        Self {
            columns: columns.into(),
            joins: joins.into(),
            where_clause: where_clause.into(),
            ..Default::default()
        }
    }

    pub fn combined_columns(&self) -> String {
        combine(&self.columns, &self.additional_columns)
    }

    pub fn combined_joins(&self) -> String {
        combine(&self.joins, &self.additional_joins)
    }

    pub fn combined_where(&self) -> String {
        combine(&self.where_clause, &self.additional_where)
    }
}

/// Join `base` and `additional` with ", ", skipping blank fragments
fn combine(base: &str, additional: &[String]) -> String {
    std::iter::once(base)
        .chain(additional.iter().map(String::as_str))
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Data and count statements rendered from the same state
///
/// Both statements keep their `$n` placeholders; `params[n - 1]` is bound to `$n`.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedQuery {
    pub query: String,
    pub count: String,
    pub params: Vec<DatabaseValue>,
}

impl RenderedQuery {
    /// Data statement with values spliced in, for log output only
    ///
    /// Never execute the result; bind `params` instead.
    pub fn interpolated(&self) -> String {
        interpolate(&self.query, &self.params)
    }

    /// Count statement with values spliced in, for log output only
    pub fn interpolated_count(&self) -> String {
        interpolate(&self.count, &self.params)
    }
}

// Single pass over the template, so text inside spliced values is never rescanned
fn interpolate(sql: &str, params: &[DatabaseValue]) -> String {
    PLACEHOLDER
        .replace_all(sql, |captures: &Captures<'_>| {
            captures[1]
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|index| params.get(index))
                .map(|value| value.to_string())
                .unwrap_or_else(|| captures[0].to_string())
        })
        .into_owned()
}

/// Result of executing a [`Find`](super::Find)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FindOutput {
    Page { data: Vec<JsonValue>, count: i64 },
    Total { count: i64 },
}

impl FindOutput {
    pub fn count(&self) -> i64 {
        match self {
            FindOutput::Page { count, .. } | FindOutput::Total { count } => *count,
        }
    }

    /// Rows of a page; empty for a total-only result
    pub fn data(&self) -> &[JsonValue] {
        match self {
            FindOutput::Page { data, .. } => data,
            FindOutput::Total { .. } => &[],
        }
    }
}
