use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use serde::{Deserialize, Serialize};

use crate::lenient;
use crate::response::PortEntry;

const DATETIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// A switch port refreshed by per-port endpoint entries.
pub trait Port {
    /// Values carried by the `val` field of an entry.
    type Values;

    /// Creates a port without values.
    fn with_id(id: u32) -> Self;

    /// Returns the port identifier assigned by the switch.
    fn id(&self) -> u32;

    /// Returns the port identifier inside the port channels range.
    fn lacp_id(&self) -> Option<u32>;

    /// Sets the port identifier inside the port channels range.
    fn set_lacp_id(&mut self, lacp_id: Option<u32>);

    /// Refreshes the port with the values of an entry.
    fn update(&mut self, values: Option<Self::Values>);

    /// Returns the identifier a port is reported with.
    fn reported_id(&self) -> u32 {
        self.lacp_id().unwrap_or_else(|| self.id())
    }
}

/// Ports of a switch, split into physical ports and port channels.
///
/// Switches report port channels (LACP) after the physical ports, so every
/// port with an identifier greater than or equal to the first port channel
/// identifier is a port channel. Port channels are numbered again starting
/// from 1.
#[derive(Debug, Clone, PartialEq)]
pub struct PortMap<P> {
    ports: BTreeMap<u32, P>,
    lacp_start: Option<u32>,
}

impl<P> Default for PortMap<P> {
    fn default() -> Self {
        Self {
            ports: BTreeMap::new(),
            lacp_start: None,
        }
    }
}

impl<P: Port> PortMap<P> {
    /// Refreshes the ports with the given entries and splits them again
    /// according to the first port channel identifier.
    ///
    /// Entries without a valid port identifier are ignored.
    pub fn update(&mut self, entries: Vec<PortEntry<P::Values>>, lacp_start: Option<u32>) {
        for entry in entries {
            let Some(id) = entry.id() else {
                continue;
            };
            self.ports
                .entry(id)
                .or_insert_with(|| P::with_id(id))
                .update(entry.val);
        }

        self.lacp_start = lacp_start;
        self.assign_lacp_ids();
    }

    fn assign_lacp_ids(&mut self) {
        let lacp_id_offset = self.lacp_start.and_then(|lacp_start| {
            self.ports
                .range(lacp_start..)
                .next()
                .map(|(id, _)| id.saturating_sub(1))
        });

        for (id, port) in &mut self.ports {
            let lacp_id = match (self.lacp_start, lacp_id_offset) {
                (Some(lacp_start), Some(offset)) if *id >= lacp_start => Some(id - offset),
                _ => None,
            };
            port.set_lacp_id(lacp_id);
        }
    }

    /// Returns the first port channel identifier used to split the ports.
    #[must_use]
    pub const fn lacp_start(&self) -> Option<u32> {
        self.lacp_start
    }

    /// Returns the port with the given switch identifier.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&P> {
        self.ports.get(&id)
    }

    /// Returns all ports, ordered by identifier.
    pub fn iter(&self) -> impl Iterator<Item = &P> {
        self.ports.values()
    }

    /// Returns the physical ports, ordered by identifier.
    pub fn physical(&self) -> impl Iterator<Item = &P> {
        self.iter().filter(|port| port.lacp_id().is_none())
    }

    /// Returns the port channels, ordered by identifier.
    pub fn lacp(&self) -> impl Iterator<Item = &P> {
        self.iter().filter(|port| port.lacp_id().is_some())
    }

    /// Returns the number of physical ports.
    #[must_use]
    pub fn physical_count(&self) -> usize {
        self.physical().count()
    }

    /// Returns the number of port channels.
    #[must_use]
    pub fn lacp_count(&self) -> usize {
        self.lacp().count()
    }

    /// Returns the number of ports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// Whether there are no ports.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

// Collects per-port snapshots keyed by the reported identifier.
fn collect_data<'a, P, D>(
    ports: impl Iterator<Item = &'a P>,
    data: impl Fn(&P) -> D,
) -> Option<BTreeMap<u32, D>>
where
    P: Port + 'a,
{
    let map: BTreeMap<u32, D> = ports.map(|port| (port.reported_id(), data(port))).collect();
    (!map.is_empty()).then_some(map)
}

// Bytes per second between two counter readings.
//
// A counter that went backwards has been reset, so no speed is computed.
fn calc_speed(current: Option<i64>, previous: Option<i64>, seconds: f64) -> u64 {
    match (current, previous) {
        (Some(current), Some(previous)) if seconds > 0. && current >= previous => current
            .checked_sub(previous)
            .map_or(0, |delta| (delta as f64 / seconds) as u64),
        _ => 0,
    }
}

/// `val` payload of a `ports/statistics` entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PortStatisticsValues {
    /// Frame check sequence errors.
    #[serde(rename = "FCSErrors", default, deserialize_with = "lenient::integer")]
    pub fcs_errors: Option<i64>,
    /// Receive errors.
    #[serde(rename = "RxErrors", default, deserialize_with = "lenient::integer")]
    pub rx_errors: Option<i64>,
    /// Received octets.
    #[serde(rename = "RxOctets", default, deserialize_with = "lenient::integer")]
    pub rx_octets: Option<i64>,
    /// Transmitted octets.
    #[serde(rename = "TxOctets", default, deserialize_with = "lenient::integer")]
    pub tx_octets: Option<i64>,
}

/// Traffic counters of a single port.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortStatistics {
    id: u32,
    lacp_id: Option<u32>,
    fcs_errors: Option<i64>,
    rx_errors: Option<i64>,
    cur_rx_octets: Option<i64>,
    cur_tx_octets: Option<i64>,
    prev_rx_octets: Option<i64>,
    prev_tx_octets: Option<i64>,
    rx_speed: u64,
    tx_speed: u64,
}

impl Port for PortStatistics {
    type Values = PortStatisticsValues;

    fn with_id(id: u32) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    fn id(&self) -> u32 {
        self.id
    }

    fn lacp_id(&self) -> Option<u32> {
        self.lacp_id
    }

    fn set_lacp_id(&mut self, lacp_id: Option<u32>) {
        self.lacp_id = lacp_id;
    }

    fn update(&mut self, values: Option<PortStatisticsValues>) {
        self.prev_rx_octets = self.cur_rx_octets;
        self.prev_tx_octets = self.cur_tx_octets;

        let Some(values) = values else {
            return;
        };

        if values.fcs_errors.is_some() {
            self.fcs_errors = values.fcs_errors;
        }
        if values.rx_errors.is_some() {
            self.rx_errors = values.rx_errors;
        }
        if values.rx_octets.is_some() {
            self.cur_rx_octets = values.rx_octets;
        }
        if values.tx_octets.is_some() {
            self.cur_tx_octets = values.tx_octets;
        }
    }
}

impl PortStatistics {
    fn calc(&mut self, seconds: f64) {
        self.rx_speed = calc_speed(self.cur_rx_octets, self.prev_rx_octets, seconds);
        self.tx_speed = calc_speed(self.cur_tx_octets, self.prev_tx_octets, seconds);
    }

    /// Returns the frame check sequence errors.
    #[must_use]
    pub const fn fcs_errors(&self) -> Option<i64> {
        self.fcs_errors
    }

    /// Returns the receive errors.
    #[must_use]
    pub const fn rx_errors(&self) -> Option<i64> {
        self.rx_errors
    }

    /// Returns the last received octets reading.
    #[must_use]
    pub const fn rx_octets(&self) -> Option<i64> {
        self.cur_rx_octets
    }

    /// Returns the previous received octets reading.
    #[must_use]
    pub const fn prev_rx_octets(&self) -> Option<i64> {
        self.prev_rx_octets
    }

    /// Returns the last transmitted octets reading.
    #[must_use]
    pub const fn tx_octets(&self) -> Option<i64> {
        self.cur_tx_octets
    }

    /// Returns the previous transmitted octets reading.
    #[must_use]
    pub const fn prev_tx_octets(&self) -> Option<i64> {
        self.prev_tx_octets
    }

    /// Returns the receive speed in bytes per second.
    #[must_use]
    pub const fn rx_speed(&self) -> u64 {
        self.rx_speed
    }

    /// Returns the transmit speed in bytes per second.
    #[must_use]
    pub const fn tx_speed(&self) -> u64 {
        self.tx_speed
    }

    /// Returns a serializable snapshot.
    #[must_use]
    pub fn data(&self) -> PortStatisticsData {
        PortStatisticsData {
            fcs_errors: self.fcs_errors,
            id: self.reported_id(),
            rx_errors: self.rx_errors,
            rx_octets: self.cur_rx_octets,
            rx_speed: self.rx_speed,
            tx_octets: self.cur_tx_octets,
            tx_speed: self.tx_speed,
        }
    }
}

/// A serializable snapshot of a [`PortStatistics`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PortStatisticsData {
    /// Frame check sequence errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fcs_errors: Option<i64>,
    /// Reported port identifier.
    pub id: u32,
    /// Receive errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_errors: Option<i64>,
    /// Received octets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_octets: Option<i64>,
    /// Receive speed in bytes per second.
    pub rx_speed: u64,
    /// Transmitted octets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_octets: Option<i64>,
    /// Transmit speed in bytes per second.
    pub tx_speed: u64,
}

/// Traffic counters of all ports of a switch.
///
/// Speeds are computed from two consecutive readings, so they are zero
/// until the second update.
#[derive(Debug, Clone, PartialEq)]
pub struct PortsStatistics {
    first_update: bool,
    cur_datetime: DateTime<Utc>,
    prev_datetime: DateTime<Utc>,
    ports: PortMap<PortStatistics>,
    fcs_errors: i64,
    rx_errors: i64,
    rx_octets: i64,
    tx_octets: i64,
    rx_speed: u64,
    tx_speed: u64,
}

impl PortsStatistics {
    /// Creates [`PortsStatistics`] from the endpoint result read at `now`.
    #[must_use]
    pub fn new(
        entries: Vec<PortEntry<PortStatisticsValues>>,
        lacp_start: Option<u32>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut ports_statistics = Self {
            first_update: true,
            cur_datetime: now,
            prev_datetime: now,
            ports: PortMap::default(),
            fcs_errors: 0,
            rx_errors: 0,
            rx_octets: 0,
            tx_octets: 0,
            rx_speed: 0,
            tx_speed: 0,
        };
        ports_statistics.update(entries, lacp_start, now);
        ports_statistics
    }

    /// Refreshes the counters with the endpoint result read at `now` and
    /// computes the speeds since the previous reading.
    pub fn update(
        &mut self,
        entries: Vec<PortEntry<PortStatisticsValues>>,
        lacp_start: Option<u32>,
        now: DateTime<Utc>,
    ) {
        self.prev_datetime = self.cur_datetime;
        self.cur_datetime = now;

        self.ports.update(entries, lacp_start);
        self.calc();

        self.first_update = false;
    }

    fn calc(&mut self) {
        let seconds = if self.first_update {
            0.
        } else {
            (self.cur_datetime - self.prev_datetime).num_milliseconds() as f64 / 1000.
        };
        let calc_speeds = !self.first_update && seconds > 0.;

        let mut fcs_errors: i64 = 0;
        let mut rx_errors: i64 = 0;
        let mut rx_octets: i64 = 0;
        let mut tx_octets: i64 = 0;

        for port in self.ports.ports.values_mut() {
            fcs_errors = fcs_errors.saturating_add(port.fcs_errors.unwrap_or_default());
            rx_errors = rx_errors.saturating_add(port.rx_errors.unwrap_or_default());
            rx_octets = rx_octets.saturating_add(port.cur_rx_octets.unwrap_or_default());
            tx_octets = tx_octets.saturating_add(port.cur_tx_octets.unwrap_or_default());

            if calc_speeds {
                port.calc(seconds);
            }
        }

        if calc_speeds {
            self.rx_speed = calc_speed(Some(rx_octets), Some(self.rx_octets), seconds);
            self.tx_speed = calc_speed(Some(tx_octets), Some(self.tx_octets), seconds);
        }

        self.fcs_errors = fcs_errors;
        self.rx_errors = rx_errors;
        self.rx_octets = rx_octets;
        self.tx_octets = tx_octets;
    }

    /// Returns the ports.
    #[must_use]
    pub const fn ports(&self) -> &PortMap<PortStatistics> {
        &self.ports
    }

    /// Returns the time of the last reading.
    #[must_use]
    pub const fn datetime(&self) -> DateTime<Utc> {
        self.cur_datetime
    }

    /// Returns the time of the previous reading.
    #[must_use]
    pub const fn prev_datetime(&self) -> DateTime<Utc> {
        self.prev_datetime
    }

    /// Returns the frame check sequence errors of all ports.
    #[must_use]
    pub const fn fcs_errors(&self) -> i64 {
        self.fcs_errors
    }

    /// Returns the receive errors of all ports.
    #[must_use]
    pub const fn rx_errors(&self) -> i64 {
        self.rx_errors
    }

    /// Returns the received octets of all ports.
    #[must_use]
    pub const fn rx_octets(&self) -> i64 {
        self.rx_octets
    }

    /// Returns the transmitted octets of all ports.
    #[must_use]
    pub const fn tx_octets(&self) -> i64 {
        self.tx_octets
    }

    /// Returns the receive speed of all ports in bytes per second.
    #[must_use]
    pub const fn rx_speed(&self) -> u64 {
        self.rx_speed
    }

    /// Returns the transmit speed of all ports in bytes per second.
    #[must_use]
    pub const fn tx_speed(&self) -> u64 {
        self.tx_speed
    }

    /// Returns a serializable snapshot.
    #[must_use]
    pub fn data(&self) -> PortsStatisticsData {
        PortsStatisticsData {
            datetime: self.cur_datetime.format(DATETIME_FORMAT).to_string(),
            fcs_errors: self.fcs_errors,
            lacp_port_num: self.ports.lacp_count(),
            lacp_ports: collect_data(self.ports.lacp(), PortStatistics::data),
            port_num: self.ports.physical_count(),
            ports: collect_data(self.ports.physical(), PortStatistics::data),
            rx_errors: self.rx_errors,
            rx_octets: self.rx_octets,
            rx_speed: self.rx_speed,
            tx_octets: self.tx_octets,
            tx_speed: self.tx_speed,
        }
    }
}

/// A serializable snapshot of [`PortsStatistics`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PortsStatisticsData {
    /// Time of the last reading, in UTC.
    pub datetime: String,
    /// Frame check sequence errors of all ports.
    pub fcs_errors: i64,
    /// Number of port channels.
    pub lacp_port_num: usize,
    /// Port channels, keyed by their port channel identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lacp_ports: Option<BTreeMap<u32, PortStatisticsData>>,
    /// Number of physical ports.
    pub port_num: usize,
    /// Physical ports, keyed by their identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<BTreeMap<u32, PortStatisticsData>>,
    /// Receive errors of all ports.
    pub rx_errors: i64,
    /// Received octets of all ports.
    pub rx_octets: i64,
    /// Receive speed of all ports in bytes per second.
    pub rx_speed: u64,
    /// Transmitted octets of all ports.
    pub tx_octets: i64,
    /// Transmit speed of all ports in bytes per second.
    pub tx_speed: u64,
}

/// `val` payload of a `ports/status` entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PortStatusValues {
    /// Whether the link is full duplex.
    #[serde(rename = "FullDuplexStatus", default, deserialize_with = "lenient::boolean")]
    pub full_duplex: Option<bool>,
    /// Whether the link is up.
    #[serde(rename = "Link", default, deserialize_with = "lenient::boolean")]
    pub link: Option<bool>,
    /// Link speed in Mbit/s.
    #[serde(rename = "Speed", default, deserialize_with = "lenient::integer")]
    pub speed: Option<i64>,
}

/// Link status of a single port.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortStatus {
    id: u32,
    lacp_id: Option<u32>,
    full_duplex: Option<bool>,
    link: Option<bool>,
    speed: Option<i64>,
}

impl Port for PortStatus {
    type Values = PortStatusValues;

    fn with_id(id: u32) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    fn id(&self) -> u32 {
        self.id
    }

    fn lacp_id(&self) -> Option<u32> {
        self.lacp_id
    }

    fn set_lacp_id(&mut self, lacp_id: Option<u32>) {
        self.lacp_id = lacp_id;
    }

    fn update(&mut self, values: Option<PortStatusValues>) {
        let Some(values) = values else {
            return;
        };

        if values.full_duplex.is_some() {
            self.full_duplex = values.full_duplex;
        }
        if values.link.is_some() {
            self.link = values.link;
        }
        if values.speed.is_some() {
            self.speed = values.speed;
        }
    }
}

impl PortStatus {
    /// Whether the link is full duplex.
    #[must_use]
    pub const fn full_duplex(&self) -> Option<bool> {
        self.full_duplex
    }

    /// Whether the link is up.
    #[must_use]
    pub const fn link(&self) -> Option<bool> {
        self.link
    }

    /// Returns the link speed in Mbit/s.
    #[must_use]
    pub const fn speed(&self) -> Option<i64> {
        self.speed
    }

    /// Returns a serializable snapshot.
    #[must_use]
    pub fn data(&self) -> PortStatusData {
        PortStatusData {
            full_duplex: self.full_duplex,
            id: self.reported_id(),
            link: self.link,
            speed: self.speed,
        }
    }
}

/// A serializable snapshot of a [`PortStatus`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PortStatusData {
    /// Whether the link is full duplex.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_duplex: Option<bool>,
    /// Reported port identifier.
    pub id: u32,
    /// Whether the link is up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<bool>,
    /// Link speed in Mbit/s.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<i64>,
}

/// Link status of all ports of a switch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortsStatus {
    ports: PortMap<PortStatus>,
    link: Option<usize>,
}

impl PortsStatus {
    /// Creates [`PortsStatus`] from the endpoint result.
    #[must_use]
    pub fn new(entries: Vec<PortEntry<PortStatusValues>>, lacp_start: Option<u32>) -> Self {
        let mut ports_status = Self::default();
        ports_status.update(entries, lacp_start);
        ports_status
    }

    /// Refreshes the ports with the endpoint result.
    pub fn update(&mut self, entries: Vec<PortEntry<PortStatusValues>>, lacp_start: Option<u32>) {
        self.ports.update(entries, lacp_start);

        if !self.ports.is_empty() {
            self.link = Some(
                self.ports
                    .iter()
                    .filter(|port| port.link == Some(true))
                    .count(),
            );
        }
    }

    /// Returns the ports.
    #[must_use]
    pub const fn ports(&self) -> &PortMap<PortStatus> {
        &self.ports
    }

    /// Returns the number of ports with the link up.
    #[must_use]
    pub const fn link(&self) -> Option<usize> {
        self.link
    }

    /// Returns a serializable snapshot.
    #[must_use]
    pub fn data(&self) -> PortsStatusData {
        PortsStatusData {
            lacp_port_num: self.ports.lacp_count(),
            lacp_ports: collect_data(self.ports.lacp(), PortStatus::data),
            link: self.link,
            port_num: self.ports.physical_count(),
            ports: collect_data(self.ports.physical(), PortStatus::data),
        }
    }
}

/// A serializable snapshot of [`PortsStatus`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PortsStatusData {
    /// Number of port channels.
    pub lacp_port_num: usize,
    /// Port channels, keyed by their port channel identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lacp_ports: Option<BTreeMap<u32, PortStatusData>>,
    /// Number of ports with the link up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<usize>,
    /// Number of physical ports.
    pub port_num: usize,
    /// Physical ports, keyed by their identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<BTreeMap<u32, PortStatusData>>,
}
