//! Criteria types shared by the parser and the query builder

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::backends::DatabaseValue;

/// Comparison operators accepted as `field__<op>` suffixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Like,
}

impl FilterOperator {
    /// Parse an operator suffix, case-insensitively
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix.to_ascii_lowercase().as_str() {
            "eq" => Some(FilterOperator::Eq),
            "ne" => Some(FilterOperator::Ne),
            "gt" => Some(FilterOperator::Gt),
            "gte" => Some(FilterOperator::Gte),
            "lt" => Some(FilterOperator::Lt),
            "lte" => Some(FilterOperator::Lte),
            "in" => Some(FilterOperator::In),
            "like" => Some(FilterOperator::Like),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Ne => "ne",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::In => "in",
            FilterOperator::Like => "like",
        }
    }

    /// SQL operator text
    pub fn sql(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::Ne => "<>",
            FilterOperator::Gt => ">",
            FilterOperator::Gte => ">=",
            FilterOperator::Lt => "<",
            FilterOperator::Lte => "<=",
            FilterOperator::In => "IN",
            FilterOperator::Like => "LIKE",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directive to left-join the table of an associated model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinDirective {
    /// Target model of the association
    pub model: String,
    /// Alias the joined table is referenced by
    pub alias: String,
    /// Association field on the base table holding the foreign key
    pub field: String,
}

impl JoinDirective {
    pub fn new<M, A, F>(model: M, alias: A, field: F) -> Self
    where
        M: Into<String>,
        A: Into<String>,
        F: Into<String>,
    {
        Self {
            model: model.into(),
            alias: alias.into(),
            field: field.into(),
        }
    }

    /// Render as `LEFT JOIN <model> <alias> ON <table>.<field> = <alias>.id`
    pub fn to_sql(&self, table: &str) -> String {
        format!(
            "LEFT JOIN {} {} ON {}.{} = {}.id",
            self.model.to_lowercase(),
            self.alias,
            table,
            self.field,
            self.alias
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// One `ORDER BY` item, with its column already qualified by the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    pub column: String,
    pub direction: SortDirection,
}

impl SortField {
    pub fn to_sql(&self) -> String {
        format!("{} {}", self.column, self.direction.sql())
    }
}

/// Reserved (non-filter) request options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    pub sort: Vec<SortField>,
    pub limit: Option<u64>,
    pub skip: Option<u64>,
    /// Associations to populate, passed through untouched
    pub populate: Vec<String>,
}

impl QueryOptions {
    /// Render the `ORDER BY ... LIMIT ... OFFSET ...` tail, empty when unset
    pub fn to_sql(&self) -> String {
        let mut parts = Vec::new();

        if !self.sort.is_empty() {
            let items: Vec<String> = self.sort.iter().map(SortField::to_sql).collect();
            parts.push(format!("ORDER BY {}", items.join(", ")));
        }
        if let Some(limit) = self.limit {
            parts.push(format!("LIMIT {}", limit));
        }
        if let Some(skip) = self.skip {
            parts.push(format!("OFFSET {}", skip));
        }

        parts.join(" ")
    }
}

/// Output of [`CriteriaParser::parse`](super::CriteriaParser::parse)
///
/// `values[i]` is bound to placeholder `$<i + 1>` in `query`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedCriteria {
    pub joins: Vec<JoinDirective>,
    pub query: String,
    pub values: Vec<DatabaseValue>,
    pub options: QueryOptions,
}

impl ParsedCriteria {
    /// Add a join, replacing the target model of an existing join with the same alias
    pub fn push_join(&mut self, join: JoinDirective) {
        match self.joins.iter_mut().find(|existing| existing.alias == join.alias) {
            Some(existing) => *existing = join,
            None => self.joins.push(join),
        }
    }

    /// Render all join directives against `table`, space separated
    pub fn joins_sql(&self, table: &str) -> String {
        self.joins
            .iter()
            .map(|join| join.to_sql(table))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
