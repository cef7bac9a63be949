use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};

use serde::{Deserialize, Serialize};

use crate::lenient;

/// `result` payload of the `system/board` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SystemBoardResult {
    /// Switch chip identifier.
    #[serde(rename = "ChipId", default, deserialize_with = "lenient::string")]
    pub chip_id: Option<String>,
    /// MAC address.
    #[serde(rename = "MacAddr", default, deserialize_with = "lenient::string")]
    pub mac: Option<String>,
    /// Model name.
    #[serde(rename = "Model", default, deserialize_with = "lenient::string")]
    pub model: Option<String>,
    /// Number of physical ports.
    #[serde(rename = "PortNum", default, deserialize_with = "lenient::integer")]
    pub port_num: Option<i64>,
    /// Product name.
    #[serde(rename = "Product", default, deserialize_with = "lenient::string")]
    pub product: Option<String>,
    /// Serial number.
    #[serde(rename = "SerialNumber", default, deserialize_with = "lenient::string")]
    pub serial: Option<String>,
    /// Number of trunks.
    #[serde(rename = "TrunkNum", default, deserialize_with = "lenient::integer")]
    pub trunk_num: Option<i64>,
}

/// Hardware description of a switch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemBoard {
    chip_id: Option<String>,
    mac: Option<String>,
    model: Option<String>,
    port_num: Option<i64>,
    product: Option<String>,
    serial: Option<String>,
    trunk_num: Option<i64>,
}

impl SystemBoard {
    /// Creates a [`SystemBoard`] from an endpoint result.
    #[must_use]
    pub fn new(result: SystemBoardResult) -> Self {
        let mut system_board = Self::default();
        system_board.update(result);
        system_board
    }

    /// Refreshes the values present in the endpoint result.
    pub fn update(&mut self, result: SystemBoardResult) {
        if result.chip_id.is_some() {
            self.chip_id = result.chip_id;
        }
        if result.mac.is_some() {
            self.mac = result.mac;
        }
        if result.model.is_some() {
            self.model = result.model;
        }
        if result.port_num.is_some() {
            self.port_num = result.port_num;
        }
        if result.product.is_some() {
            self.product = result.product;
        }
        if result.serial.is_some() {
            self.serial = result.serial;
        }
        if result.trunk_num.is_some() {
            self.trunk_num = result.trunk_num;
        }
    }

    /// Returns the switch chip identifier.
    #[must_use]
    pub fn chip_id(&self) -> Option<&str> {
        self.chip_id.as_deref()
    }

    /// Returns the MAC address.
    #[must_use]
    pub fn mac(&self) -> Option<&str> {
        self.mac.as_deref()
    }

    /// Returns the model name.
    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Returns the number of physical ports.
    #[must_use]
    pub const fn port_num(&self) -> Option<i64> {
        self.port_num
    }

    /// Returns the product name.
    #[must_use]
    pub fn product(&self) -> Option<&str> {
        self.product.as_deref()
    }

    /// Returns the serial number without separators.
    ///
    /// Switches pad the serial number with spaces and punctuation, so only
    /// alphanumeric characters are kept.
    #[must_use]
    pub fn serial(&self) -> Option<String> {
        self.serial
            .as_ref()
            .map(|serial| serial.chars().filter(|c| c.is_alphanumeric()).collect())
    }

    /// Returns the number of trunks.
    #[must_use]
    pub const fn trunk_num(&self) -> Option<i64> {
        self.trunk_num
    }

    /// Returns a serializable snapshot.
    #[must_use]
    pub fn data(&self) -> SystemBoardData {
        SystemBoardData {
            chip_id: self.chip_id.clone(),
            mac: self.mac.clone(),
            model: self.model.clone(),
            port_num: self.port_num,
            product: self.product.clone(),
            serial: self.serial(),
            trunk_num: self.trunk_num,
        }
    }
}

/// A serializable snapshot of a [`SystemBoard`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SystemBoardData {
    /// Switch chip identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chip_id: Option<String>,
    /// MAC address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    /// Model name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Number of physical ports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_num: Option<i64>,
    /// Product name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    /// Serial number without separators.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    /// Number of trunks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trunk_num: Option<i64>,
}

impl SystemBoardData {
    /// Whether the snapshot has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// `result` payload of the `system/sensor` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SystemSensorResult {
    /// Speed of the first fan in RPM.
    #[serde(rename = "Fan1Speed", default, deserialize_with = "lenient::integer")]
    pub fan1_speed: Option<i64>,
    /// Speed of the second fan in RPM.
    #[serde(rename = "Fan2Speed", default, deserialize_with = "lenient::integer")]
    pub fan2_speed: Option<i64>,
    /// Maximum switch temperature in °C.
    #[serde(rename = "MaxSwitchTemp", default, deserialize_with = "lenient::integer")]
    pub max_switch_temp: Option<i64>,
    /// Switch temperature in °C.
    #[serde(rename = "SwitchTemp", default, deserialize_with = "lenient::integer")]
    pub switch_temp: Option<i64>,
}

/// Fans and temperature of a switch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemSensor {
    fan1_speed: Option<i64>,
    fan2_speed: Option<i64>,
    temp: Option<i64>,
    temp_max: Option<i64>,
}

impl SystemSensor {
    /// Creates a [`SystemSensor`] from an endpoint result.
    #[must_use]
    pub fn new(result: SystemSensorResult) -> Self {
        let mut system_sensor = Self::default();
        system_sensor.update(result);
        system_sensor
    }

    /// Refreshes the values present in the endpoint result.
    pub fn update(&mut self, result: SystemSensorResult) {
        if result.fan1_speed.is_some() {
            self.fan1_speed = result.fan1_speed;
        }
        if result.fan2_speed.is_some() {
            self.fan2_speed = result.fan2_speed;
        }
        if result.max_switch_temp.is_some() {
            self.temp_max = result.max_switch_temp;
        }
        if result.switch_temp.is_some() {
            self.temp = result.switch_temp;
        }
    }

    /// Returns the speed of the first fan in RPM.
    ///
    /// Models without the fan report a negative speed.
    #[must_use]
    pub fn fan1_speed(&self) -> Option<i64> {
        self.fan1_speed.filter(|speed| *speed >= 0)
    }

    /// Returns the speed of the second fan in RPM.
    ///
    /// Models without the fan report a negative speed.
    #[must_use]
    pub fn fan2_speed(&self) -> Option<i64> {
        self.fan2_speed.filter(|speed| *speed >= 0)
    }

    /// Returns the switch temperature in °C.
    #[must_use]
    pub const fn temp(&self) -> Option<i64> {
        self.temp
    }

    /// Returns the maximum switch temperature in °C.
    #[must_use]
    pub const fn temp_max(&self) -> Option<i64> {
        self.temp_max
    }

    /// Returns a serializable snapshot.
    #[must_use]
    pub fn data(&self) -> SystemSensorData {
        SystemSensorData {
            fan1_speed: self.fan1_speed(),
            fan2_speed: self.fan2_speed(),
            temperature: self.temp,
            max_temperature: self.temp_max,
        }
    }
}

/// A serializable snapshot of a [`SystemSensor`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SystemSensorData {
    /// Speed of the first fan in RPM.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan1_speed: Option<i64>,
    /// Speed of the second fan in RPM.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan2_speed: Option<i64>,
    /// Switch temperature in °C.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<i64>,
    /// Maximum switch temperature in °C.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_temperature: Option<i64>,
}

impl SystemSensorData {
    /// Whether the snapshot has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// `result` payload of the `system/time` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SystemTimeResult {
    /// Seconds since boot.
    #[serde(rename = "UpTime", default, deserialize_with = "lenient::integer")]
    pub uptime: Option<i64>,
}

/// Uptime of a switch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemTime {
    uptime_seconds: Option<i64>,
    uptime_timestamp: Option<DateTime<Utc>>,
}

impl SystemTime {
    /// Creates a [`SystemTime`] from the endpoint result read at `now`.
    #[must_use]
    pub fn new(result: SystemTimeResult, now: DateTime<Utc>) -> Self {
        let mut system_time = Self::default();
        system_time.update(result, now);
        system_time
    }

    /// Refreshes the uptime with the endpoint result read at `now`.
    ///
    /// The boot time is computed from the first valid uptime and then kept,
    /// so it does not drift with the request latency.
    pub fn update(&mut self, result: SystemTimeResult, now: DateTime<Utc>) {
        let Some(uptime) = result.uptime else {
            return;
        };

        if uptime < 0 {
            self.uptime_seconds = None;
            return;
        }

        self.uptime_seconds = Some(uptime);
        if self.uptime_timestamp.is_none() {
            self.uptime_timestamp = TimeDelta::try_seconds(uptime)
                .and_then(|uptime| now.checked_sub_signed(uptime));
        }
    }

    /// Returns the seconds since boot.
    #[must_use]
    pub const fn uptime_seconds(&self) -> Option<i64> {
        self.uptime_seconds
    }

    /// Returns the boot time.
    #[must_use]
    pub const fn uptime_timestamp(&self) -> Option<DateTime<Utc>> {
        self.uptime_timestamp
    }

    /// Returns a serializable snapshot.
    #[must_use]
    pub fn data(&self) -> SystemTimeData {
        SystemTimeData {
            uptime_seconds: self.uptime_seconds,
            uptime_timestamp: self
                .uptime_timestamp
                .map(|timestamp| timestamp.to_rfc3339_opts(SecondsFormat::Secs, false)),
        }
    }
}

/// A serializable snapshot of a [`SystemTime`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SystemTimeData {
    /// Seconds since boot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime_seconds: Option<i64>,
    /// Boot time in RFC 3339 format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime_timestamp: Option<String>,
}

impl SystemTimeData {
    /// Whether the snapshot has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
