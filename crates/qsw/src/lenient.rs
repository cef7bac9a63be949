//! Switch firmwares report the same field as a number on one model and as a
//! string on another. These decoders accept any reasonable representation
//! and turn an unexpected one into `None`.
//!
//! They are meant to be used together with `#[serde(default)]`:
//!
//! ```
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Board {
//!     #[serde(rename = "PortNum", default, deserialize_with = "qsw::lenient::integer")]
//!     port_num: Option<i64>,
//! }
//!
//! let board: Board = serde_json::from_str(r#"{"PortNum": "12"}"#).unwrap();
//! assert_eq!(board.port_num, Some(12));
//! ```

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Converts a JSON value into a string.
#[must_use]
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(value) => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        Value::Bool(value) => Some(value.to_string()),
        _ => None,
    }
}

/// Converts a JSON value into an integer.
///
/// Floating point values are truncated.
#[must_use]
pub fn value_to_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_u64().and_then(|n| i64::try_from(n).ok()))
            .or_else(|| number.as_f64().map(|n| n as i64)),
        Value::String(value) => {
            let value = value.trim();
            value
                .parse::<i64>()
                .ok()
                .or_else(|| value.parse::<f64>().ok().map(|n| n as i64))
        }
        Value::Bool(value) => Some(i64::from(*value)),
        _ => None,
    }
}

/// Converts a JSON value into a boolean.
///
/// Numbers are `true` when they are not zero.
#[must_use]
pub fn value_to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(value) => Some(*value),
        Value::Number(number) => number.as_f64().map(|n| n != 0.),
        Value::String(value) => match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Decodes an optional string field.
///
/// # Errors
///
/// Fails only when the input is not valid JSON.
pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(value_to_string))
}

/// Decodes an optional integer field.
///
/// # Errors
///
/// Fails only when the input is not valid JSON.
pub fn integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(value_to_integer))
}

/// Decodes an optional boolean field.
///
/// # Errors
///
/// Fails only when the input is not valid JSON.
pub fn boolean<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(value_to_bool))
}

/// Decodes an optional list of strings.
///
/// Items that cannot be represented as a string are dropped.
///
/// # Errors
///
/// Fails only when the input is not valid JSON.
pub fn strings<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(values)) => Some(values.iter().filter_map(value_to_string).collect()),
        Some(value) => value_to_string(&value).map(|value| vec![value]),
        None => None,
    })
}
