use serde::Deserialize;
use serde_json::Value;

use crate::lenient;

/// The `result` value of a command accepted by the switch.
pub const ACCEPTED_RESULT: &str = "None";

/// The reply envelope shared by every endpoint of a switch.
///
/// ```json
/// {"error_code": 200, "error_message": "OK", "result": { ... }}
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiResponse<T> {
    /// Error code reported by the switch.
    #[serde(default, deserialize_with = "lenient::integer")]
    pub error_code: Option<i64>,
    /// Error message reported by the switch.
    #[serde(default, deserialize_with = "lenient::string")]
    pub error_message: Option<String>,
    /// Endpoint payload.
    #[serde(default = "Option::default")]
    pub result: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Returns the `result` payload of the reply.
    ///
    /// # Errors
    ///
    /// A [`ResponseError`] is returned when the reply has no `result`.
    pub fn into_result(self) -> Result<T, ResponseError> {
        self.result.ok_or(ResponseError {
            error_code: self.error_code,
            error_message: self.error_message,
        })
    }
}

impl ApiResponse<Value> {
    /// Whether a command reply reports the command as accepted.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(&self.result, Some(Value::String(result)) if result == ACCEPTED_RESULT)
    }
}

/// A reply without a `result` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseError {
    /// Error code reported by the switch.
    pub error_code: Option<i64>,
    /// Error message reported by the switch.
    pub error_message: Option<String>,
}

impl std::fmt::Display for ResponseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Missing result in response")?;
        if let Some(error_code) = self.error_code {
            write!(f, " (error_code={error_code})")?;
        }
        if let Some(error_message) = &self.error_message {
            write!(f, ": {error_message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ResponseError {}

/// A single entry of a per-port reply.
///
/// Port replies are lists of `{"key": "<port id>", "val": { ... }}` entries.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PortEntry<T> {
    /// Port identifier.
    #[serde(default, deserialize_with = "lenient::integer")]
    pub key: Option<i64>,
    /// Port values.
    #[serde(default = "Option::default")]
    pub val: Option<T>,
}

impl<T> PortEntry<T> {
    /// Returns the port identifier, when it is a valid one.
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.key.and_then(|key| u32::try_from(key).ok())
    }
}
