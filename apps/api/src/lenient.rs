//! Forgiving field decoders for model-produced JSON.
//!
//! Models return `null` for unknown fields, numbers as strings ("7/10"),
//! and single strings where lists were asked for. None of that should sink a
//! whole record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(value_to_string(Value::deserialize(deserializer)?).unwrap_or_default())
}

pub fn string_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(value_to_string).collect(),
        other => value_to_string(other).into_iter().collect(),
    })
}

pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(value_to_number(&Value::deserialize(deserializer)?))
}

/// A nested object; `null` or a value of the wrong shape reads as the default.
pub fn section<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        other => Some(other.to_string()),
    }
}

pub fn value_to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        // "7", "7.5", "7/10", "8 out of 10"
        Value::String(s) => s
            .trim()
            .split(|c: char| c == '/' || c.is_whitespace())
            .next()
            .and_then(|head| head.parse::<f64>().ok()),
        _ => None,
    }
}
