use std::future::Future;

use bytes::Bytes;

use chrono::{DateTime, Utc};

use qsw::firmware::{
    FirmwareCheck, FirmwareCondition, FirmwareInfo, FirmwareStatusResult, FirmwareUpdateResult,
};
use qsw::lacp::LacpInfo;
use qsw::lenient;
use qsw::ports::{PortsStatistics, PortsStatus};
use qsw::response::ApiResponse;
use qsw::system::{SystemBoard, SystemSensor, SystemTime};

use reqwest::Client;

use serde::Deserialize;
use serde_json::Value;

use tracing::{debug, info, warn};

use crate::device::{DeviceData, DeviceState, RawData, decode_result};
use crate::endpoints::Endpoints;
use crate::error::{Error, ErrorKind, Result};
use crate::options::ConnectionOptions;
use crate::session::{Session, login_params};
use crate::transport::Transport;

const REBOOT: &str = "reboot";

// Sends the request only when `required`.
async fn fetch_if(
    required: bool,
    request: impl Future<Output = Result<Value>>,
) -> Result<Option<Value>> {
    if required {
        request.await.map(Some)
    } else {
        Ok(None)
    }
}

// Pairs a reply with the time it was received.
async fn timed(request: impl Future<Output = Result<Value>>) -> Result<(Value, DateTime<Utc>)> {
    let raw = request.await?;
    Ok((raw, Utc::now()))
}

// Fails unless the switch accepted a command.
fn check_accepted(raw: &Value, action: &str) -> Result<()> {
    let response = ApiResponse::<Value>::deserialize(raw)?;
    if response.is_accepted() {
        Ok(())
    } else {
        Err(Error::new(ErrorKind::Api, format!("Error when {action}: {raw}")))
    }
}

// Turns switch API errors into errors of another kind.
fn api_error_as(kind: ErrorKind) -> impl FnOnce(Error) -> Error {
    move |e| {
        if e.kind().is_api() {
            e.with_kind(kind)
        } else {
            e
        }
    }
}

/// A client for the REST API of a `QNAP QSW` switch.
///
/// The client keeps a session open on the switch and caches the last data
/// read from it.
#[derive(Debug)]
pub struct QswApi {
    options: ConnectionOptions,
    transport: Transport,
    session: Session,
    state: DeviceState,
}

impl QswApi {
    /// Creates a [`QswApi`] with its own HTTP client.
    ///
    /// No request is sent until an operation is called.
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be initialized.
    pub fn new(options: ConnectionOptions) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::new(ErrorKind::InvalidHost, format!("HTTP client error: {e}")))?;
        Ok(Self::with_client(client, options))
    }

    /// Creates a [`QswApi`] sharing an existing HTTP client.
    #[must_use]
    pub fn with_client(client: Client, options: ConnectionOptions) -> Self {
        Self {
            transport: Transport::new(client, &options),
            options,
            session: Session::default(),
            state: DeviceState::default(),
        }
    }

    /// Returns the connection options.
    #[must_use]
    pub const fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    /// Returns raw access to the switch endpoints, using the current
    /// session.
    #[must_use]
    pub const fn endpoints(&self) -> Endpoints<'_> {
        Endpoints::new(&self.transport, &self.session)
    }

    /// Whether a session is open.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.session.is_active()
    }

    async fn new_login(&mut self) -> Result<()> {
        self.session.clear();
        self.state.clear_session_data();

        let params = login_params(&self.options.user, &self.options.password);
        let raw = self
            .endpoints()
            .post_users_login(&params)
            .await
            .map_err(api_error_as(ErrorKind::Login))?;

        let api_key = ApiResponse::<Value>::deserialize(&raw)?
            .result
            .as_ref()
            .and_then(lenient::value_to_string)
            .filter(|api_key| !api_key.is_empty())
            .ok_or_else(|| Error::new(ErrorKind::Login, format!("Invalid login reply: {raw}")))?;

        self.session.start(api_key);
        info!(
            "Logged in to {} as {}",
            self.options.url, self.options.user
        );

        Ok(())
    }

    /// Opens a session on the switch, or checks that the current one is
    /// still valid and opens a new one if it expired.
    ///
    /// # Errors
    ///
    /// Fails when the switch cannot be reached, does not reply in time or
    /// refuses the credentials.
    pub async fn login(&mut self) -> Result<()> {
        if !self.session.is_active() {
            return self.new_login().await;
        }

        let verification = self.endpoints().get_users_verification().await;
        match verification {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::Login => {
                debug!("Session expired, logging in again: {e}");
                self.new_login().await
            }
            Err(e) => Err(e),
        }
    }

    /// Closes the current session, if any.
    ///
    /// Errors reported by the switch API are ignored.
    ///
    /// # Errors
    ///
    /// Fails when the switch cannot be reached, does not reply in time or
    /// refuses the session. The session is kept in that case.
    pub async fn logout(&mut self) -> Result<()> {
        if !self.session.is_active() {
            return Ok(());
        }

        let exit = self.endpoints().post_users_exit().await;
        match exit {
            Ok(_) => {}
            Err(e) if e.kind().is_api() => warn!("Ignoring logout error: {e}"),
            Err(e) => return Err(e),
        }

        self.session.clear();
        info!("Logged out from {}", self.options.url);

        Ok(())
    }

    /// Checks that the switch is reachable and that the credentials are
    /// valid, then returns its hardware description.
    ///
    /// The next [`QswApi::update`] is handled as the first one.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::InvalidHost`] when the switch web service is
    /// not answering and with [`ErrorKind::Login`] when the credentials are
    /// refused.
    pub async fn validate(&mut self) -> Result<SystemBoard> {
        self.state.first_update = true;
        self.state.ports_statistics = None;

        let _ = self
            .endpoints()
            .get_live()
            .await
            .map_err(api_error_as(ErrorKind::InvalidHost))?;

        self.new_login()
            .await
            .map_err(api_error_as(ErrorKind::Login))?;

        let raw = self.endpoints().get_system_board().await?;
        Ok(SystemBoard::new(decode_result(&raw)?))
    }

    /// Reads every endpoint and refreshes the cached data.
    ///
    /// Static data, such as the hardware description, is read once per
    /// session. The sensors are read concurrently with everything else and
    /// their internal server errors are only reported on the first update.
    ///
    /// # Errors
    ///
    /// Fails when the switch cannot be reached, does not reply in time,
    /// refuses the credentials or replies with an error or an invalid body.
    pub async fn update(&mut self) -> Result<()> {
        self.login().await?;

        let Self {
            options,
            transport,
            session,
            state,
        } = self;
        let endpoints = Endpoints::new(transport, session);
        let first_update = state.first_update;

        let sensor = async {
            match endpoints.get_system_sensor().await {
                Ok(raw) => Ok(Some(raw)),
                Err(e) if e.kind() == ErrorKind::InternalServer && !first_update => {
                    warn!("Ignoring sensors error: {e}");
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        };

        let refresh = async {
            let (lacp_info, system_board) = tokio::try_join!(
                fetch_if(state.lacp_info.is_none(), endpoints.get_lacp_info()),
                fetch_if(state.system_board.is_none(), endpoints.get_system_board()),
            )?;
            if let Some(raw) = lacp_info {
                state.apply_lacp_info(raw)?;
            }
            if let Some(raw) = system_board {
                state.apply_system_board(raw)?;
            }

            let (firmware_condition, firmware_info, ports_statistics, ports_status, system_time) =
                tokio::try_join!(
                    endpoints.get_firmware_condition(),
                    fetch_if(state.firmware_info.is_none(), endpoints.get_firmware_info()),
                    timed(endpoints.get_ports_statistics()),
                    endpoints.get_ports_status(),
                    timed(endpoints.get_system_time()),
                )?;
            state.apply_firmware_condition(firmware_condition)?;
            if let Some(raw) = firmware_info {
                state.apply_firmware_info(raw)?;
            }
            let (raw, now) = ports_statistics;
            state.apply_ports_statistics(raw, now)?;
            state.apply_ports_status(ports_status)?;
            let (raw, now) = system_time;
            state.apply_system_time(raw, now)?;

            Ok::<_, Error>(())
        };

        // A failed refresh drops the sensor read, a failed sensor read
        // waits for the refresh.
        let system_sensor = {
            tokio::pin!(sensor, refresh);
            let mut sensor_result = None;
            loop {
                tokio::select! {
                    result = &mut refresh => {
                        result?;
                        break;
                    }
                    result = &mut sensor, if sensor_result.is_none() => {
                        sensor_result = Some(result);
                    }
                }
            }
            match sensor_result {
                Some(result) => result,
                None => sensor.await,
            }
        }?;
        if let Some(raw) = system_sensor {
            state.apply_system_sensor(raw)?;
        }

        state.first_update = false;
        debug!("Updated {}", options.url);

        Ok(())
    }

    /// Asks the switch for the latest firmware available.
    ///
    /// # Errors
    ///
    /// Fails when the switch cannot be reached, does not reply in time,
    /// refuses the credentials or replies with an error or an invalid body.
    pub async fn check_firmware(&mut self) -> Result<&FirmwareCheck> {
        self.login().await?;
        let raw = self.endpoints().get_firmware_update_check().await?;
        self.state.apply_firmware_check(raw)
    }

    /// Downloads the switch configuration.
    ///
    /// # Errors
    ///
    /// Fails when the switch cannot be reached, does not reply in time,
    /// refuses the credentials or replies with an error status.
    pub async fn config_backup(&mut self) -> Result<Bytes> {
        self.login().await?;
        self.endpoints().get_system_config().await
    }

    /// Starts a firmware update from the vendor servers.
    ///
    /// The progress is reset and can be followed with
    /// [`QswApi::update_progress`] and [`QswApi::update_status`].
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::Api`] when the switch refuses the update, and
    /// when the switch cannot be reached, does not reply in time or refuses
    /// the credentials.
    pub async fn live_update(&mut self) -> Result<()> {
        self.login().await?;
        self.state.firmware_progress = 0.;
        let raw = self.endpoints().post_firmware_update_live().await?;
        check_accepted(&raw, "updating")?;
        info!("Firmware update started on {}", self.options.url);
        Ok(())
    }

    /// Reboots the switch.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::Api`] when the switch refuses the command, and
    /// when the switch cannot be reached, does not reply in time or refuses
    /// the credentials.
    pub async fn reboot(&mut self) -> Result<()> {
        self.login().await?;
        let raw = self.endpoints().post_system_command(REBOOT).await?;
        check_accepted(&raw, "rebooting")?;
        info!("Rebooting {}", self.options.url);
        Ok(())
    }

    /// Reads the download progress of a running firmware update, as a
    /// percentage.
    ///
    /// The last known progress is returned when the switch does not report
    /// one.
    ///
    /// # Errors
    ///
    /// Fails when the switch cannot be reached, does not reply in time or
    /// replies with an error status.
    pub async fn update_progress(&mut self) -> Result<f64> {
        let raw = self.endpoints().get_firmware_update().await?;
        if let Ok(response) = ApiResponse::<FirmwareUpdateResult>::deserialize(&raw)
            && let Some(progress) = response
                .result
                .as_ref()
                .and_then(FirmwareUpdateResult::progress)
        {
            self.state.firmware_progress = progress;
        }
        Ok(self.state.firmware_progress)
    }

    /// Whether a firmware update is still running.
    ///
    /// # Errors
    ///
    /// Fails when the switch cannot be reached, does not reply in time,
    /// replies with an error status or an invalid body.
    pub async fn update_status(&self) -> Result<bool> {
        let raw = self.endpoints().get_firmware_status().await?;
        let response = ApiResponse::<Value>::deserialize(&raw)?;
        if response.is_accepted() {
            return Ok(false);
        }
        if let Some(result @ Value::Object(_)) = &response.result
            && FirmwareStatusResult::deserialize(result).is_ok_and(|status| status.is_done())
        {
            return Ok(false);
        }
        Ok(true)
    }

    /// Returns a serializable snapshot of the cached data.
    #[must_use]
    pub fn data(&self) -> DeviceData {
        self.state.data()
    }

    /// Returns the last raw reply of each endpoint.
    #[must_use]
    pub const fn raw_data(&self) -> &RawData {
        &self.state.raw
    }

    /// Returns the last firmware check.
    #[must_use]
    pub const fn firmware_check(&self) -> Option<&FirmwareCheck> {
        self.state.firmware_check.as_ref()
    }

    /// Returns the firmware condition.
    #[must_use]
    pub const fn firmware_condition(&self) -> Option<&FirmwareCondition> {
        self.state.firmware_condition.as_ref()
    }

    /// Returns the installed firmware.
    #[must_use]
    pub const fn firmware_info(&self) -> Option<&FirmwareInfo> {
        self.state.firmware_info.as_ref()
    }

    /// Returns the last known firmware update progress, as a percentage.
    #[must_use]
    pub const fn firmware_progress(&self) -> f64 {
        self.state.firmware_progress
    }

    /// Returns the link aggregation limits.
    #[must_use]
    pub const fn lacp_info(&self) -> Option<&LacpInfo> {
        self.state.lacp_info.as_ref()
    }

    /// Returns the identifier of the first port channel.
    #[must_use]
    pub fn lacp_start(&self) -> Option<u32> {
        self.state.lacp_start()
    }

    /// Returns the traffic counters.
    #[must_use]
    pub const fn ports_statistics(&self) -> Option<&PortsStatistics> {
        self.state.ports_statistics.as_ref()
    }

    /// Returns the link status of the ports.
    #[must_use]
    pub const fn ports_status(&self) -> Option<&PortsStatus> {
        self.state.ports_status.as_ref()
    }

    /// Returns the hardware description.
    #[must_use]
    pub const fn system_board(&self) -> Option<&SystemBoard> {
        self.state.system_board.as_ref()
    }

    /// Returns the fan and temperature sensors.
    #[must_use]
    pub const fn system_sensor(&self) -> Option<&SystemSensor> {
        self.state.system_sensor.as_ref()
    }

    /// Returns the uptime.
    #[must_use]
    pub const fn system_time(&self) -> Option<&SystemTime> {
        self.state.system_time.as_ref()
    }
}
