//! Query-string helpers

use crate::types::LedgerError;

const TRUE_VALUES: [&str; 4] = ["true", "1", "on", "yes"];
const FALSE_VALUES: [&str; 4] = ["false", "0", "off", "no"];

/// Read an optional boolean query parameter
///
/// Matching is case-insensitive. An absent parameter is `false`.
///
/// # Errors
///
/// `InvalidBoolean` for any other value.
pub fn parse_boolean_query_param(value: Option<&str>) -> Result<bool, LedgerError> {
    let Some(value) = value else {
        return Ok(false);
    };
    let lower = value.to_lowercase();
    if TRUE_VALUES.contains(&lower.as_str()) {
        Ok(true)
    } else if FALSE_VALUES.contains(&lower.as_str()) {
        Ok(false)
    } else {
        Err(LedgerError::invalid_boolean(value))
    }
}
