//! CriteriaParser - filter keys to a WHERE template
//!
//! Keys follow `field[.subfield][__operator]`:
//!
//! - `title=Safety` filters `training.title = $1`
//! - `startDate__gte=2024-01-01` filters `training.startDate >= $1`
//! - `company=5` joins `company` and filters `training.company = $1`
//! - `company.name__like=%25Acme%25` joins `company` and filters `company.name LIKE $1`
//! - `id__in=1,2,3` filters `training.id IN ($1, $2, $3)`
//!
//! `sort`, `limit`, `skip` and `populate` are reserved and end up in
//! [`QueryOptions`] instead of the WHERE clause.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use super::params::{ParamValue, QueryParams};
use super::types::{FilterOperator, JoinDirective, ParsedCriteria, SortDirection, SortField};
use super::values;
use crate::backends::DatabaseValue;
use crate::error::ParseError;
use crate::metadata::{FieldType, ModelDefinition};
use crate::security::validate_identifier;

static FILTER_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<field>[A-Za-z_][A-Za-z0-9_]*?)(?:\.(?P<sub>[A-Za-z_][A-Za-z0-9_]*?))?(?:__(?P<op>[A-Za-z]+))?$",
    )
    .expect("filter key pattern is valid")
});

const RESERVED_KEYS: [&str; 4] = ["sort", "limit", "skip", "populate"];

/// Parses request parameters against one model's metadata
#[derive(Debug, Clone)]
pub struct CriteriaParser<'a> {
    model_name: String,
    definition: &'a ModelDefinition,
    aliases: HashMap<String, String>,
}

/// A filter key split into its parts
struct FilterKey<'k> {
    field: &'k str,
    sub_field: Option<&'k str>,
    operator: FilterOperator,
}

impl<'a> CriteriaParser<'a> {
    pub fn new<S: Into<String>>(model_name: S, definition: &'a ModelDefinition) -> Self {
        Self {
            model_name: model_name.into(),
            definition,
            aliases: HashMap::new(),
        }
    }

    /// Join the association `field` under `alias` instead of its own name
    pub fn alias<F: Into<String>, A: Into<String>>(mut self, field: F, alias: A) -> Self {
        self.aliases.insert(field.into(), alias.into());
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Table the WHERE template qualifies base columns with
    pub fn table(&self) -> &str {
        &self.definition.table
    }

    /// Parse `params` into joins, a WHERE template and its bound values
    pub fn parse(&self, params: &QueryParams) -> Result<ParsedCriteria, ParseError> {
        let criteria = self.parse_params(params).map_err(|e| {
            tracing::warn!(model = %self.model_name, error = %e, "Rejected query criteria");
            e
        })?;

        tracing::debug!(
            model = %self.model_name,
            joins = criteria.joins.len(),
            values = criteria.values.len(),
            "Parsed query criteria"
        );

        Ok(criteria)
    }

    fn parse_params(&self, params: &QueryParams) -> Result<ParsedCriteria, ParseError> {
        let mut criteria = ParsedCriteria::default();
        let mut predicates = Vec::new();

        for (key, value) in params.iter() {
            match key {
                "sort" => criteria.options.sort = self.parse_sort(value)?,
                "limit" => criteria.options.limit = Some(parse_count(key, value)?),
                "skip" => criteria.options.skip = Some(parse_count(key, value)?),
                "populate" => criteria.options.populate = split_list(value),
                _ => predicates.push(self.parse_filter(key, value, &mut criteria)?),
            }
        }

        criteria.query = predicates.join(" AND ");
        Ok(criteria)
    }

    fn parse_filter(
        &self,
        key: &str,
        value: &ParamValue,
        criteria: &mut ParsedCriteria,
    ) -> Result<String, ParseError> {
        let filter = split_key(key)?;
        validate_identifier(filter.field)
            .map_err(|e| ParseError::unsupported(filter.field, e.to_string()))?;

        let (field_type, target_model) = match self.definition.get(filter.field) {
            Some(definition) => (definition.field_type, definition.target_model()),
            None if filter.field == self.definition.primary_key => (FieldType::Integer, None),
            None => return Err(ParseError::unknown_field(&self.model_name, filter.field)),
        };

        let table = self.table();
        let (column, known_type) = match (target_model, filter.sub_field) {
            (None, Some(_)) => {
                return Err(ParseError::unsupported(
                    filter.field,
                    "only association fields have sub-fields",
                ));
            }
            (None, None) => (format!("{}.{}", table, filter.field), Some(field_type)),
            (Some(model), sub_field) => {
                let alias = self.alias_for(filter.field)?;
                criteria.push_join(JoinDirective::new(model, alias.as_str(), filter.field));

                match sub_field {
                    Some(sub) => {
                        validate_identifier(sub)
                            .map_err(|e| ParseError::unsupported(key, e.to_string()))?;
                        (format!("{}.{}", alias, sub), None)
                    }
                    None => (format!("{}.{}", table, filter.field), Some(field_type)),
                }
            }
        };

        let convert = |raw: &str| -> Result<DatabaseValue, ParseError> {
            match (filter.operator, known_type) {
                (FilterOperator::Like, _) => values::pattern(key, raw),
                (_, Some(field_type)) => values::coerce(key, raw, field_type),
                (_, None) => values::infer(key, raw),
            }
        };

        if filter.operator == FilterOperator::In {
            let items: Vec<&str> = value
                .values()
                .into_iter()
                .flat_map(|v| v.split(','))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .collect();

            if items.is_empty() {
                return Err(ParseError::invalid_value(key, "", "at least one value"));
            }

            let mut placeholders = Vec::with_capacity(items.len());
            for item in items {
                criteria.values.push(convert(item)?);
                placeholders.push(format!("${}", criteria.values.len()));
            }

            return Ok(format!("{} IN ({})", column, placeholders.join(", ")));
        }

        let raw = value.as_single().ok_or_else(|| {
            ParseError::invalid_value(key, value.values().join(","), "a single value")
        })?;

        criteria.values.push(convert(raw)?);
        Ok(format!(
            "{} {} ${}",
            column,
            filter.operator.sql(),
            criteria.values.len()
        ))
    }

    fn alias_for(&self, field: &str) -> Result<String, ParseError> {
        let alias = self
            .aliases
            .get(field)
            .cloned()
            .unwrap_or_else(|| field.to_string());

        validate_identifier(&alias).map_err(|e| ParseError::unsupported(field, e.to_string()))?;
        Ok(alias)
    }

    /// `sort=startDate DESC,title` or `sort=-startDate`
    fn parse_sort(&self, value: &ParamValue) -> Result<Vec<SortField>, ParseError> {
        let mut sort = Vec::new();

        for item in split_list(value) {
            let (name, direction) = match item.strip_prefix('-') {
                Some(name) => (name.trim(), SortDirection::Desc),
                None => {
                    let mut tokens = item.split_whitespace();
                    let name = tokens.next().unwrap_or_default();
                    let direction = match tokens.next().map(str::to_ascii_uppercase).as_deref() {
                        None | Some("ASC") => SortDirection::Asc,
                        Some("DESC") => SortDirection::Desc,
                        Some(_) => {
                            return Err(ParseError::invalid_value("sort", item.as_str(), "ASC or DESC"))
                        }
                    };
                    if tokens.next().is_some() {
                        return Err(ParseError::invalid_value(
                            "sort",
                            item.as_str(),
                            "`field [ASC|DESC]`",
                        ));
                    }
                    (name, direction)
                }
            };

            validate_identifier(name).map_err(|e| ParseError::unsupported("sort", e.to_string()))?;
            if !self.definition.has_field(name) {
                return Err(ParseError::unknown_field(&self.model_name, name));
            }

            sort.push(SortField {
                column: format!("{}.{}", self.table(), name),
                direction,
            });
        }

        Ok(sort)
    }
}

/// Whether `key` is one of the reserved option keys
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

fn split_key(key: &str) -> Result<FilterKey<'_>, ParseError> {
    let captures = FILTER_KEY
        .captures(key)
        .ok_or_else(|| ParseError::malformed_key(key))?;

    let field = captures
        .name("field")
        .map(|m| m.as_str())
        .ok_or_else(|| ParseError::malformed_key(key))?;
    let sub_field = captures.name("sub").map(|m| m.as_str());
    let operator = match captures.name("op") {
        Some(op) => FilterOperator::from_suffix(op.as_str())
            .ok_or_else(|| ParseError::unknown_operator(field, op.as_str()))?,
        None => FilterOperator::Eq,
    };

    Ok(FilterKey {
        field,
        sub_field,
        operator,
    })
}

fn split_list(value: &ParamValue) -> Vec<String> {
    value
        .values()
        .into_iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_count(key: &str, value: &ParamValue) -> Result<u64, ParseError> {
    let raw = value.as_single().ok_or_else(|| {
        ParseError::invalid_value(key, value.values().join(","), "a single value")
    })?;

    raw.trim()
        .parse::<u64>()
        .map_err(|_| ParseError::invalid_value(key, raw, "a non-negative integer"))
}
