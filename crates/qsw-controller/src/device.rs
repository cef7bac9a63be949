use chrono::{DateTime, Utc};

use indexmap::IndexMap;

use qsw::firmware::{
    FirmwareCheck, FirmwareCheckData, FirmwareCondition, FirmwareConditionData, FirmwareInfo,
    FirmwareInfoData,
};
use qsw::lacp::LacpInfo;
use qsw::ports::{PortsStatistics, PortsStatisticsData, PortsStatus, PortsStatusData};
use qsw::response::ApiResponse;
use qsw::system::{
    SystemBoard, SystemBoardData, SystemSensor, SystemSensorData, SystemTime, SystemTimeData,
};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::Result;

/// Key of the firmware check reply in the raw data.
pub const FIRMWARE_CHECK: &str = "firmware-check";
/// Key of the firmware condition reply in the raw data.
pub const FIRMWARE_CONDITION: &str = "firmware-condition";
/// Key of the firmware information reply in the raw data.
pub const FIRMWARE_INFO: &str = "firmware-info";
/// Key of the link aggregation reply in the raw data.
pub const LACP_INFO: &str = "lacp-info";
/// Key of the ports statistics reply in the raw data.
pub const PORTS_STATISTICS: &str = "ports-statistics";
/// Key of the ports status reply in the raw data.
pub const PORTS_STATUS: &str = "ports-status";
/// Key of the board reply in the raw data.
pub const SYSTEM_BOARD: &str = "system-board";
/// Key of the sensors reply in the raw data.
pub const SYSTEM_SENSOR: &str = "system-sensor";
/// Key of the uptime reply in the raw data.
pub const SYSTEM_TIME: &str = "system-time";

const RAW_KEYS: [&str; 9] = [
    FIRMWARE_CHECK,
    FIRMWARE_CONDITION,
    FIRMWARE_INFO,
    LACP_INFO,
    PORTS_STATISTICS,
    PORTS_STATUS,
    SYSTEM_BOARD,
    SYSTEM_SENSOR,
    SYSTEM_TIME,
];

/// The last raw reply of each endpoint, keyed by endpoint.
pub type RawData = IndexMap<&'static str, Value>;

// Decodes the `result` payload of a reply.
pub(crate) fn decode_result<T: DeserializeOwned>(raw: &Value) -> Result<T> {
    let response = ApiResponse::<T>::deserialize(raw)?;
    Ok(response.into_result()?)
}

/// A serializable snapshot of all the data read from a switch.
///
/// Sections without values are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DeviceData {
    /// Latest firmware available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware_check: Option<FirmwareCheckData>,
    /// Firmware condition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware_condition: Option<FirmwareConditionData>,
    /// Installed firmware.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware_info: Option<FirmwareInfoData>,
    /// Traffic counters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports_statistics: Option<PortsStatisticsData>,
    /// Link status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports_status: Option<PortsStatusData>,
    /// Hardware description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_board: Option<SystemBoardData>,
    /// Fans and temperatures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_sensor: Option<SystemSensorData>,
    /// Uptime.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_time: Option<SystemTimeData>,
}

// Everything known about a switch.
//
// Every reply is stored in the raw data, even when it cannot be decoded.
#[derive(Debug, Clone)]
pub(crate) struct DeviceState {
    pub(crate) first_update: bool,
    pub(crate) firmware_progress: f64,
    pub(crate) raw: RawData,
    pub(crate) firmware_check: Option<FirmwareCheck>,
    pub(crate) firmware_condition: Option<FirmwareCondition>,
    pub(crate) firmware_info: Option<FirmwareInfo>,
    pub(crate) lacp_info: Option<LacpInfo>,
    pub(crate) ports_statistics: Option<PortsStatistics>,
    pub(crate) ports_status: Option<PortsStatus>,
    pub(crate) system_board: Option<SystemBoard>,
    pub(crate) system_sensor: Option<SystemSensor>,
    pub(crate) system_time: Option<SystemTime>,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            first_update: true,
            firmware_progress: 0.,
            raw: RAW_KEYS.iter().map(|key| (*key, json!({}))).collect(),
            firmware_check: None,
            firmware_condition: None,
            firmware_info: None,
            lacp_info: None,
            ports_statistics: None,
            ports_status: None,
            system_board: None,
            system_sensor: None,
            system_time: None,
        }
    }
}

impl DeviceState {
    fn store<T: DeserializeOwned>(&mut self, key: &'static str, raw: Value) -> Result<T> {
        let result = decode_result(&raw);
        let _ = self.raw.insert(key, raw);
        result
    }

    // Models bound to the current session, read again after a login.
    pub(crate) fn clear_session_data(&mut self) {
        self.firmware_info = None;
        self.lacp_info = None;
        self.system_board = None;
        self.system_time = None;
    }

    // Identifier of the first port channel.
    pub(crate) fn lacp_start(&self) -> Option<u32> {
        self.lacp_info.as_ref().and_then(LacpInfo::start_id).or_else(|| {
            self.system_board
                .as_ref()
                .and_then(SystemBoard::port_num)
                .and_then(|port_num| port_num.checked_add(1))
                .and_then(|start_id| u32::try_from(start_id).ok())
        })
    }

    pub(crate) fn apply_firmware_check(&mut self, raw: Value) -> Result<&FirmwareCheck> {
        let result = self.store(FIRMWARE_CHECK, raw)?;
        Ok(match &mut self.firmware_check {
            Some(model) => {
                model.update(result);
                model
            }
            slot @ None => slot.insert(FirmwareCheck::new(result)),
        })
    }

    pub(crate) fn apply_firmware_condition(&mut self, raw: Value) -> Result<()> {
        let result = self.store(FIRMWARE_CONDITION, raw)?;
        match &mut self.firmware_condition {
            Some(model) => model.update(result),
            slot @ None => *slot = Some(FirmwareCondition::new(result)),
        }
        Ok(())
    }

    pub(crate) fn apply_firmware_info(&mut self, raw: Value) -> Result<()> {
        let result = self.store(FIRMWARE_INFO, raw)?;
        match &mut self.firmware_info {
            Some(model) => model.update(result),
            slot @ None => *slot = Some(FirmwareInfo::new(result)),
        }
        Ok(())
    }

    pub(crate) fn apply_lacp_info(&mut self, raw: Value) -> Result<()> {
        let result = self.store(LACP_INFO, raw)?;
        match &mut self.lacp_info {
            Some(model) => model.update(result),
            slot @ None => *slot = Some(LacpInfo::new(result)),
        }
        Ok(())
    }

    pub(crate) fn apply_ports_statistics(&mut self, raw: Value, now: DateTime<Utc>) -> Result<()> {
        let entries = self.store(PORTS_STATISTICS, raw)?;
        let lacp_start = self.lacp_start();
        match &mut self.ports_statistics {
            Some(model) => model.update(entries, lacp_start, now),
            slot @ None => *slot = Some(PortsStatistics::new(entries, lacp_start, now)),
        }
        Ok(())
    }

    pub(crate) fn apply_ports_status(&mut self, raw: Value) -> Result<()> {
        let entries = self.store(PORTS_STATUS, raw)?;
        let lacp_start = self.lacp_start();
        match &mut self.ports_status {
            Some(model) => model.update(entries, lacp_start),
            slot @ None => *slot = Some(PortsStatus::new(entries, lacp_start)),
        }
        Ok(())
    }

    pub(crate) fn apply_system_board(&mut self, raw: Value) -> Result<()> {
        let result = self.store(SYSTEM_BOARD, raw)?;
        match &mut self.system_board {
            Some(model) => model.update(result),
            slot @ None => *slot = Some(SystemBoard::new(result)),
        }
        Ok(())
    }

    pub(crate) fn apply_system_sensor(&mut self, raw: Value) -> Result<()> {
        let result = self.store(SYSTEM_SENSOR, raw)?;
        match &mut self.system_sensor {
            Some(model) => model.update(result),
            slot @ None => *slot = Some(SystemSensor::new(result)),
        }
        Ok(())
    }

    pub(crate) fn apply_system_time(&mut self, raw: Value, now: DateTime<Utc>) -> Result<()> {
        let result = self.store(SYSTEM_TIME, raw)?;
        match &mut self.system_time {
            Some(model) => model.update(result, now),
            slot @ None => *slot = Some(SystemTime::new(result, now)),
        }
        Ok(())
    }

    pub(crate) fn data(&self) -> DeviceData {
        DeviceData {
            firmware_check: self
                .firmware_check
                .as_ref()
                .map(FirmwareCheck::data)
                .filter(|data| !data.is_empty()),
            firmware_condition: self
                .firmware_condition
                .as_ref()
                .map(FirmwareCondition::data)
                .filter(|data| !data.is_empty()),
            firmware_info: self
                .firmware_info
                .as_ref()
                .map(FirmwareInfo::data)
                .filter(|data| !data.is_empty()),
            ports_statistics: self.ports_statistics.as_ref().map(PortsStatistics::data),
            ports_status: self.ports_status.as_ref().map(PortsStatus::data),
            system_board: self
                .system_board
                .as_ref()
                .map(SystemBoard::data)
                .filter(|data| !data.is_empty()),
            system_sensor: self
                .system_sensor
                .as_ref()
                .map(SystemSensor::data)
                .filter(|data| !data.is_empty()),
            system_time: self
                .system_time
                .as_ref()
                .map(SystemTime::data)
                .filter(|data| !data.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{DeviceState, SYSTEM_BOARD};

    #[test]
    fn lacp_start_from_board() {
        let mut state = DeviceState::default();
        assert_eq!(state.lacp_start(), None);

        state
            .apply_system_board(json!({"error_code": 200, "result": {"PortNum": 4}}))
            .unwrap();
        assert_eq!(state.lacp_start(), Some(5));

        state
            .apply_lacp_info(json!({"error_code": 200, "result": {"startIndex": 28}}))
            .unwrap();
        assert_eq!(state.lacp_start(), Some(29));
    }

    #[test]
    fn lacp_start_out_of_range() {
        let mut state = DeviceState::default();

        state
            .apply_system_board(json!({"error_code": 200, "result": {"PortNum": "4294967295"}}))
            .unwrap();
        assert_eq!(state.lacp_start(), None);

        state
            .apply_system_board(json!({"error_code": 200, "result": {"PortNum": "1e30"}}))
            .unwrap();
        assert_eq!(state.lacp_start(), None);
    }

    #[test]
    fn undecodable_reply_is_stored() {
        let mut state = DeviceState::default();
        let raw = json!({"error_code": 200, "result": "unexpected"});

        assert!(state.apply_system_board(raw.clone()).is_err());
        assert!(state.system_board.is_none());
        assert_eq!(state.raw[SYSTEM_BOARD], raw);
    }
}
