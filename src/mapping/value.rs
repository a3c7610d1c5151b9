//! Lenient accessors over `serde_json::Value`.
//!
//! Every accessor returns `None` (or an empty list) when the key is missing,
//! null, or holds the wrong JSON type.

use serde_json::{Map, Value};

use crate::models::IdValue;

pub(crate) fn object(value: &Value) -> Option<&Map<String, Value>> {
    value.as_object()
}

pub(crate) fn field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

pub(crate) fn string(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match field(obj, key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A decimal quantity. The service sends strings, but numbers are tolerated
/// and rendered without going through floating point formatting twice.
pub(crate) fn decimal(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match field(obj, key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn decimal_or_zero(obj: &Map<String, Value>, key: &str) -> String {
    decimal(obj, key).unwrap_or_else(|| "0".to_string())
}

pub(crate) fn integer(obj: &Map<String, Value>, key: &str) -> Option<i64> {
    match field(obj, key)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn boolean(obj: &Map<String, Value>, key: &str) -> Option<bool> {
    match field(obj, key)? {
        Value::Bool(b) => Some(*b),
        _ => None,
    }
}

pub(crate) fn flag(obj: &Map<String, Value>, key: &str) -> bool {
    boolean(obj, key).unwrap_or(false)
}

pub(crate) fn string_list(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    match field(obj, key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Map every object element of an array field, skipping anything that is not
/// an object or that the element mapper rejects.
pub(crate) fn list_of<T>(
    obj: &Map<String, Value>,
    key: &str,
    f: impl Fn(&Map<String, Value>) -> Option<T>,
) -> Vec<T> {
    match field(obj, key) {
        Some(value) => array_of(value, f),
        None => Vec::new(),
    }
}

pub(crate) fn array_of<T>(value: &Value, f: impl Fn(&Map<String, Value>) -> Option<T>) -> Vec<T> {
    match value {
        Value::Array(items) => items.iter().filter_map(|v| v.as_object()).filter_map(f).collect(),
        _ => Vec::new(),
    }
}

/// Free-form metadata. Anything but an object collapses to `{}`.
pub(crate) fn metadata(obj: &Map<String, Value>, key: &str) -> Value {
    match field(obj, key) {
        Some(v @ Value::Object(_)) => v.clone(),
        _ => Value::Object(Map::new()),
    }
}

/// Normalize an id that may arrive as a number or numeric string. Integral
/// floats and strings such as `"42.0"` or `"1e3"` count as numbers.
pub(crate) fn id_value(value: &Value) -> IdValue {
    let number = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    };
    match number {
        Some(id) => IdValue::Number(id),
        None => IdValue::Raw(value.clone()),
    }
}

fn integral(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then(|| f as i64)
}
