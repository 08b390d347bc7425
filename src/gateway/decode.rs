//! Tolerant shaping of procedure responses.
//!
//! Malformed scalars become zero and malformed rows are skipped; neither is
//! ever reported as an error.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Numbers and numeric strings convert; anything else is zero
pub fn to_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// `deserialize_with` helper for numeric fields
pub fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_number(&value))
}

/// `deserialize_with` helper for text fields; numbers are stringified, null is absent
pub fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Rows of a list response. Null is empty, a bare record is one row.
pub fn decode_rows<T: DeserializeOwned>(endpoint: &str, value: Value) -> Vec<T> {
    let items = match value {
        Value::Null => return Vec::new(),
        Value::Array(items) => items,
        record @ Value::Object(_) => vec![record],
        other => {
            tracing::warn!(endpoint, kind = kind_of(&other), "unexpected response shape");
            return Vec::new();
        }
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(row) => Some(row),
            Err(err) => {
                tracing::warn!(endpoint, index, error = %err, "skipping malformed row");
                None
            }
        })
        .collect()
}

/// First row of a single-record response, or the all-zero default
pub fn decode_first<T: DeserializeOwned + Default>(endpoint: &str, value: Value) -> T {
    decode_rows(endpoint, value)
        .into_iter()
        .next()
        .unwrap_or_default()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
