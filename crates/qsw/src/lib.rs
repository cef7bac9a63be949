//! The data model of the REST API exposed by QNAP QSW switches.
//!
//! This crate provides APIs to:
//!
//! - Decode the JSON envelope shared by every reply of a switch and the
//!   `result` payload of each endpoint.
//!   Switch firmwares are not consistent about value types, so numbers may
//!   arrive as strings and vice versa. Decoding is lenient and a field with
//!   an unexpected type is simply treated as absent.
//! - Keep a model for each endpoint that is refreshed in place with new
//!   replies, together with the values derived from consecutive replies,
//!   such as port speeds or the switch boot time.
//! - Produce serializable snapshots of every model, using kebab-case keys and
//!   omitting absent values.
//!
//! Network communication lives in the `qsw-controller` crate.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Firmware check, condition and information.
pub mod firmware;
/// Link aggregation information.
pub mod lacp;
/// Lenient field decoders.
pub mod lenient;
/// Ports status and statistics.
pub mod ports;
/// Reply envelope shared by all endpoints.
pub mod response;
/// System board, sensors and time.
pub mod system;

/// Formats a firmware version from its parts.
///
/// Returns `None` when the `version` is missing.
pub(crate) fn firmware_string(
    version: Option<&str>,
    number: Option<&str>,
    build_number: Option<&str>,
) -> Option<String> {
    let version = version?;
    Some(match (number, build_number) {
        (Some(number), Some(build_number)) => format!("{version}.{number} ({build_number})"),
        (Some(number), None) => format!("{version}.{number}"),
        (None, _) => version.to_owned(),
    })
}

/// Returns the string only when it is not empty.
pub(crate) fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|value| !value.is_empty())
}

#[cfg(test)]
pub(crate) fn decode<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> T {
    serde_json::from_value(value).unwrap()
}

#[cfg(test)]
mod tests {
    use super::firmware_string;

    #[test]
    fn firmware_string_parts() {
        assert_eq!(firmware_string(None, Some("2"), Some("3")), None);
        assert_eq!(
            firmware_string(Some("1.2"), None, Some("3")).as_deref(),
            Some("1.2")
        );
        assert_eq!(
            firmware_string(Some("1.2"), Some("4"), None).as_deref(),
            Some("1.2.4")
        );
        assert_eq!(
            firmware_string(Some("1.2"), Some("4"), Some("20230101")).as_deref(),
            Some("1.2.4 (20230101)")
        );
    }
}
