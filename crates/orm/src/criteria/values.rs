//! Conversion of raw request text into bound values

use chrono::{DateTime, NaiveDate, Utc};

use crate::backends::DatabaseValue;
use crate::error::ParseError;
use crate::metadata::FieldType;
use crate::security::validate_parameter;

/// Convert `raw` according to the declared type of `field`
pub fn coerce(field: &str, raw: &str, field_type: FieldType) -> Result<DatabaseValue, ParseError> {
    check_size(field, raw)?;

    let invalid = || ParseError::invalid_value(field, raw, field_type.expected());

    match field_type {
        FieldType::String | FieldType::Text => Ok(DatabaseValue::String(raw.to_string())),
        FieldType::Integer => raw
            .trim()
            .parse::<i64>()
            .map(DatabaseValue::Int64)
            .map_err(|_| invalid()),
        FieldType::Float => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(DatabaseValue::Float64)
            .ok_or_else(invalid),
        FieldType::Boolean => parse_bool(raw).map(DatabaseValue::Bool).ok_or_else(invalid),
        FieldType::Date => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(DatabaseValue::Date)
            .map_err(|_| invalid()),
        FieldType::DateTime => DateTime::parse_from_rfc3339(raw.trim())
            .map(|dt| DatabaseValue::DateTime(dt.with_timezone(&Utc)))
            .map_err(|_| invalid()),
        FieldType::Json => serde_json::from_str(raw)
            .map(DatabaseValue::Json)
            .map_err(|_| invalid()),
    }
}

/// Best-effort conversion for values whose column type is not known
///
/// Integers, then floats, then booleans; anything else stays text.
pub fn infer(field: &str, raw: &str) -> Result<DatabaseValue, ParseError> {
    check_size(field, raw)?;

    let trimmed = raw.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Ok(DatabaseValue::Int64(i));
    }
    if let Some(f) = trimmed.parse::<f64>().ok().filter(|f| f.is_finite()) {
        return Ok(DatabaseValue::Float64(f));
    }
    match trimmed {
        "true" => Ok(DatabaseValue::Bool(true)),
        "false" => Ok(DatabaseValue::Bool(false)),
        _ => Ok(DatabaseValue::String(raw.to_string())),
    }
}

/// Patterns for `like` are always bound as text
pub fn pattern(field: &str, raw: &str) -> Result<DatabaseValue, ParseError> {
    check_size(field, raw)?;
    Ok(DatabaseValue::String(raw.to_string()))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn check_size(field: &str, raw: &str) -> Result<(), ParseError> {
    validate_parameter(raw).map_err(|e| ParseError::unsupported(field, e.to_string()))
}
