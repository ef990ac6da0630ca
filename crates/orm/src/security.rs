//! Guards for request-supplied text that ends up near SQL
//!
//! Filter keys are checked against model metadata, but sub-fields, sort keys
//! and join aliases are spliced into statements as identifiers. Everything
//! of that kind goes through [`validate_identifier`]; bound values go through
//! [`validate_parameter`].

use crate::error::ModelError;

/// Characters allowed in SQL identifiers (alphanumeric, underscore)
const ALLOWED_IDENTIFIER_CHARS: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_";

/// PostgreSQL truncates identifiers beyond this length
const MAX_IDENTIFIER_LEN: usize = 63;

/// Upper bound for a single bound parameter
const MAX_PARAMETER_LEN: usize = 65536;

/// Validate that an identifier is safe to splice into SQL unquoted
///
/// # Examples
/// ```
/// use trainhub_orm::security::validate_identifier;
///
/// assert!(validate_identifier("company_name").is_ok());
/// assert!(validate_identifier("name; DROP TABLE users").is_err());
/// ```
pub fn validate_identifier(identifier: &str) -> Result<(), ModelError> {
    let first = identifier
        .chars()
        .next()
        .ok_or_else(|| ModelError::Validation("Identifier cannot be empty".to_string()))?;

    if identifier.len() > MAX_IDENTIFIER_LEN {
        return Err(ModelError::Validation(format!(
            "Identifier '{}' is too long (max {} characters)",
            identifier, MAX_IDENTIFIER_LEN
        )));
    }

    if let Some(c) = identifier
        .chars()
        .find(|c| !ALLOWED_IDENTIFIER_CHARS.contains(*c))
    {
        return Err(ModelError::Validation(format!(
            "Identifier '{}' contains invalid character '{}'",
            identifier, c
        )));
    }

    if first.is_ascii_digit() {
        return Err(ModelError::Validation(format!(
            "Identifier '{}' cannot start with a number",
            identifier
        )));
    }

    Ok(())
}

/// Validate a parameter value before it is bound
///
/// Content is never inspected for SQL since values are always bound by the
/// driver; only the size is limited.
pub fn validate_parameter(value: &str) -> Result<(), ModelError> {
    if value.len() > MAX_PARAMETER_LEN {
        return Err(ModelError::Validation(
            "Parameter value too large (max 64KB)".to_string(),
        ));
    }

    Ok(())
}
