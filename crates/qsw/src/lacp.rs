use serde::{Deserialize, Serialize};

use crate::lenient;

/// `result` payload of the `lacp/info` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LacpInfoResult {
    /// Maximum number of port channels.
    #[serde(rename = "maxPortChannels", default, deserialize_with = "lenient::integer")]
    pub max_port_channels: Option<i64>,
    /// Maximum number of ports in a port channel.
    #[serde(
        rename = "maxPortsPerPortChannel",
        default,
        deserialize_with = "lenient::integer"
    )]
    pub max_ports_per_port_channel: Option<i64>,
    /// Index of the first port channel.
    #[serde(rename = "startIndex", default, deserialize_with = "lenient::integer")]
    pub start_index: Option<i64>,
}

/// Link aggregation capabilities of a switch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LacpInfo {
    max_channels: Option<i64>,
    max_channel_ports: Option<i64>,
    start_index: Option<i64>,
}

impl LacpInfo {
    /// Creates a [`LacpInfo`] from an endpoint result.
    #[must_use]
    pub fn new(result: LacpInfoResult) -> Self {
        let mut lacp_info = Self::default();
        lacp_info.update(result);
        lacp_info
    }

    /// Refreshes the values present in the endpoint result.
    pub fn update(&mut self, result: LacpInfoResult) {
        if result.max_port_channels.is_some() {
            self.max_channels = result.max_port_channels;
        }
        if result.max_ports_per_port_channel.is_some() {
            self.max_channel_ports = result.max_ports_per_port_channel;
        }
        if result.start_index.is_some() {
            self.start_index = result.start_index;
        }
    }

    /// Returns the maximum number of port channels.
    #[must_use]
    pub const fn max_channels(&self) -> Option<i64> {
        self.max_channels
    }

    /// Returns the maximum number of ports in a port channel.
    #[must_use]
    pub const fn max_channel_ports(&self) -> Option<i64> {
        self.max_channel_ports
    }

    /// Returns the index of the first port channel.
    #[must_use]
    pub const fn start_index(&self) -> Option<i64> {
        self.start_index
    }

    /// Returns the port identifier of the first port channel.
    ///
    /// Port identifiers start from 1, so this is the start index plus one.
    #[must_use]
    pub fn start_id(&self) -> Option<u32> {
        self.start_index
            .and_then(|start_index| start_index.checked_add(1))
            .and_then(|start_id| u32::try_from(start_id).ok())
    }

    /// Returns a serializable snapshot.
    #[must_use]
    pub fn data(&self) -> LacpInfoData {
        LacpInfoData {
            max_channels: self.max_channels,
            max_channel_ports: self.max_channel_ports,
            start_id: self.start_id(),
            start_index: self.start_index,
        }
    }
}

/// A serializable snapshot of a [`LacpInfo`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LacpInfoData {
    /// Maximum number of port channels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_channels: Option<i64>,
    /// Maximum number of ports in a port channel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_channel_ports: Option<i64>,
    /// Port identifier of the first port channel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_id: Option<u32>,
    /// Index of the first port channel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_index: Option<i64>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::decode;

    use super::{LacpInfo, LacpInfoData};

    #[test]
    fn lacp_info() {
        let lacp_info = LacpInfo::new(decode(json!({
            "maxPortChannels": 8,
            "maxPortsPerPortChannel": "8",
            "startIndex": 28,
        })));

        assert_eq!(lacp_info.start_id(), Some(29));
        assert_eq!(
            lacp_info.data(),
            LacpInfoData {
                max_channels: Some(8),
                max_channel_ports: Some(8),
                start_id: Some(29),
                start_index: Some(28),
            }
        );
    }

    #[test]
    fn lacp_info_without_start() {
        let lacp_info = LacpInfo::new(decode(json!({"maxPortChannels": 4})));

        assert_eq!(lacp_info.start_id(), None);
        assert_eq!(
            serde_json::to_value(lacp_info.data()).unwrap(),
            json!({"max-channels": 4})
        );
    }

    #[test]
    fn lacp_info_start_out_of_range() {
        let lacp_info = LacpInfo::new(decode(json!({"startIndex": "1e30"})));

        assert_eq!(lacp_info.start_index(), Some(i64::MAX));
        assert_eq!(lacp_info.start_id(), None);
    }
}
