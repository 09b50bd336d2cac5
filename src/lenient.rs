//! Lenient serde helpers for web service payloads
//!
//! AMap sends numbers as strings, and empty text fields as `[]`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize a number that may arrive as a JSON number or numeric string
///
/// Anything unparseable counts as zero.
pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value))
}

/// Deserialize a count that may arrive as a JSON number or numeric string
pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let n = number_from_value(&value);
    Ok(if n > 0.0 { n.round() as u32 } else { 0 })
}

/// Deserialize a text field, mapping non-string values to an empty string
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        _ => String::new(),
    })
}

fn number_from_value(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}
