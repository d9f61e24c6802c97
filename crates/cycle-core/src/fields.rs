//! Typed access to loosely-structured JSON payloads.
//!
//! Every accessor reports the dotted path of the offending key so a failed
//! batch names exactly what was missing or malformed.

use serde_json::{Map, Value};

use crate::error::{CycleError, Result};

/// JSON type name used in [`CycleError::TypeMismatch`] messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Join a parent path and a key into a dotted field name.
pub fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn mismatch(field: impl Into<String>, expected: &'static str, found: &Value) -> CycleError {
    CycleError::TypeMismatch {
        field: field.into(),
        expected,
        found: type_name(found),
    }
}

/// Borrow `value` as a JSON object.
pub fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| mismatch(path, "object", value))
}

/// Look up `key` in the object `value`, failing when it is absent.
pub fn require<'a>(value: &'a Value, key: &str, path: &str) -> Result<&'a Value> {
    as_object(value, path)?
        .get(key)
        .ok_or_else(|| CycleError::missing(join(path, key)))
}

/// Look up `key`, treating an explicit `null` the same as absence.
pub fn optional<'a>(value: &'a Value, key: &str, path: &str) -> Result<Option<&'a Value>> {
    Ok(as_object(value, path)?.get(key).filter(|v| !v.is_null()))
}

/// Required numeric field.
pub fn require_f64(value: &Value, key: &str, path: &str) -> Result<f64> {
    let field = require(value, key, path)?;
    field.as_f64().ok_or_else(|| mismatch(join(path, key), "number", field))
}

/// Numeric field that falls back to `default` when the key is absent.
///
/// A present key holding a non-number (including `null`) is still an error.
pub fn f64_or(value: &Value, key: &str, path: &str, default: f64) -> Result<f64> {
    match as_object(value, path)?.get(key) {
        None => Ok(default),
        Some(field) => field
            .as_f64()
            .ok_or_else(|| mismatch(join(path, key), "number", field)),
    }
}

/// Required numeric field that may be `null`.
pub fn nullable_f64(value: &Value, key: &str, path: &str) -> Result<Option<f64>> {
    let field = require(value, key, path)?;
    if field.is_null() {
        return Ok(None);
    }
    field
        .as_f64()
        .map(Some)
        .ok_or_else(|| mismatch(join(path, key), "number", field))
}

/// Required string field.
pub fn require_str<'a>(value: &'a Value, key: &str, path: &str) -> Result<&'a str> {
    let field = require(value, key, path)?;
    field
        .as_str()
        .ok_or_else(|| mismatch(join(path, key), "string", field))
}

/// Required field that may be `null`, a string, or a number rendered as text.
pub fn nullable_text(value: &Value, key: &str, path: &str) -> Result<Option<String>> {
    match require(value, key, path)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(mismatch(join(path, key), "string", other)),
    }
}

/// Required array field.
pub fn require_array<'a>(value: &'a Value, key: &str, path: &str) -> Result<&'a Vec<Value>> {
    let field = require(value, key, path)?;
    field
        .as_array()
        .ok_or_else(|| mismatch(join(path, key), "array", field))
}
