//! JSON subset matching.

use serde_json::Value;

use crate::error::AssertionError;

/// Checks that every key/value in `expected` is present in `actual`.
///
/// Objects are compared key by key, recursively; extra keys in `actual`
/// are ignored. Anything else, arrays included, must be strictly equal.
///
/// # Errors
///
/// Returns [`AssertionError::ActualNotJson`] or
/// [`AssertionError::ExpectedNotJson`] when a side does not parse, and
/// [`AssertionError::Mismatch`] naming the first differing path otherwise.
pub fn assert_subset(actual: &str, expected: &str) -> Result<(), AssertionError> {
    let actual_value: Value = serde_json::from_str(actual).map_err(|e| {
        AssertionError::ActualNotJson { reason: e.to_string(), actual: actual.to_string() }
    })?;
    let expected_value: Value = serde_json::from_str(expected).map_err(|e| {
        AssertionError::ExpectedNotJson { reason: e.to_string(), expected: expected.to_string() }
    })?;

    match first_mismatch(&expected_value, &actual_value, "$") {
        None => Ok(()),
        Some(path) => Err(AssertionError::Mismatch {
            what: format!("JSON output does not contain the expected values (first difference at {path})"),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }),
    }
}

/// Returns `true` if `expected` is a subset of `actual`.
#[must_use]
pub fn is_subset(expected: &Value, actual: &Value) -> bool {
    first_mismatch(expected, actual, "$").is_none()
}

fn first_mismatch(expected: &Value, actual: &Value, path: &str) -> Option<String> {
    match (expected, actual) {
        (Value::Object(want), Value::Object(have)) => want.iter().find_map(|(key, value)| {
            let child = format!("{path}.{key}");
            match have.get(key) {
                Some(found) => first_mismatch(value, found, &child),
                None => Some(child),
            }
        }),
        _ if expected == actual => None,
        _ => Some(path.to_string()),
    }
}
