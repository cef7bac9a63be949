//! Every switch endpoint is exposed as a method returning the raw reply,
//! without any caching or session handling.
//!
//! Requests are sent with the current session tokens, so most endpoints
//! reply with an [`ErrorKind::Login`](crate::error::ErrorKind::Login) error
//! until [`QswApi::login`](crate::api::QswApi::login) succeeds.

use bytes::Bytes;

use reqwest::Method;

use serde_json::{Value, json};

use crate::error::Result;
use crate::session::Session;
use crate::transport::Transport;

const API: &str = "api";
const API_V1: &str = "api/v1";

/// Raw access to the endpoints of a switch.
#[derive(Debug, Clone, Copy)]
pub struct Endpoints<'a> {
    transport: &'a Transport,
    session: &'a Session,
}

macro_rules! get_endpoint {
    ($(#[$doc:meta])* $name:ident, $root:expr, $path:literal) => {
        $(#[$doc])*
        ///
        /// # Errors
        ///
        /// Fails when the switch cannot be reached, does not reply in time,
        /// refuses the session or replies with an error status or an invalid
        /// body.
        pub async fn $name(&self) -> Result<Value> {
            self.get(&format!("{}/{}", $root, $path)).await
        }
    };
}

impl<'a> Endpoints<'a> {
    pub(crate) const fn new(transport: &'a Transport, session: &'a Session) -> Self {
        Self { transport, session }
    }

    async fn get(&self, path: &str) -> Result<Value> {
        self.transport
            .request_json(self.session, Method::GET, path, None)
            .await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.transport
            .request_json(self.session, Method::POST, &format!("{API_V1}/{path}"), Some(body))
            .await
    }

    get_endpoint!(
        /// Returns the switch description, available without a session.
        get_about, API, "about"
    );
    get_endpoint!(
        /// Checks whether the switch web service is up.
        get_live, API, "live"
    );
    get_endpoint!(
        /// Returns the firmware condition.
        get_firmware_condition, API_V1, "firmware/condition"
    );
    get_endpoint!(
        /// Returns the installed firmware.
        get_firmware_info, API_V1, "firmware/info"
    );
    get_endpoint!(
        /// Returns the status of a running firmware update.
        get_firmware_status, API_V1, "firmware/status"
    );
    get_endpoint!(
        /// Returns the download progress of a running firmware update.
        get_firmware_update, API_V1, "firmware/update"
    );
    get_endpoint!(
        /// Asks the switch for the latest firmware available.
        get_firmware_update_check, API_V1, "firmware/update/check"
    );
    get_endpoint!(
        /// Returns the link aggregation limits.
        get_lacp_info, API_V1, "lacp/info"
    );
    get_endpoint!(
        /// Returns the traffic counters of every port.
        get_ports_statistics, API_V1, "ports/statistics"
    );
    get_endpoint!(
        /// Returns the link status of every port.
        get_ports_status, API_V1, "ports/status"
    );
    get_endpoint!(
        /// Returns the switch hardware description.
        get_system_board, API_V1, "system/board"
    );
    get_endpoint!(
        /// Returns the fan and temperature sensors.
        get_system_sensor, API_V1, "system/sensor"
    );
    get_endpoint!(
        /// Returns the switch uptime.
        get_system_time, API_V1, "system/time"
    );
    get_endpoint!(
        /// Checks whether the current session is still valid.
        get_users_verification, API_V1, "users/verification"
    );

    /// Downloads the switch configuration.
    ///
    /// # Errors
    ///
    /// Fails when the switch cannot be reached, does not reply in time,
    /// refuses the session or replies with an error status.
    pub async fn get_system_config(&self) -> Result<Bytes> {
        self.transport
            .request_bytes(
                self.session,
                Method::GET,
                &format!("{API_V1}/system/config"),
                None,
            )
            .await
    }

    /// Sends a command such as `reboot` to the switch.
    ///
    /// # Errors
    ///
    /// Fails when the switch cannot be reached, does not reply in time,
    /// refuses the session or replies with an error status or an invalid
    /// body.
    pub async fn post_system_command(&self, command: &str) -> Result<Value> {
        self.post("system/command", &json!({ "command": command }))
            .await
    }

    /// Starts a firmware update from the vendor servers.
    ///
    /// # Errors
    ///
    /// Fails when the switch cannot be reached, does not reply in time,
    /// refuses the session or replies with an error status or an invalid
    /// body.
    pub async fn post_firmware_update_live(&self) -> Result<Value> {
        self.post("firmware/update/live", &json!({})).await
    }

    /// Ends the current session.
    ///
    /// # Errors
    ///
    /// Fails when the switch cannot be reached, does not reply in time,
    /// refuses the session or replies with an error status or an invalid
    /// body.
    pub async fn post_users_exit(&self) -> Result<Value> {
        self.post("users/exit", &json!({})).await
    }

    /// Opens a session with the given credentials body.
    ///
    /// # Errors
    ///
    /// Fails when the switch cannot be reached, does not reply in time,
    /// refuses the credentials or replies with an error status or an
    /// invalid body.
    pub async fn post_users_login(&self, params: &Value) -> Result<Value> {
        self.post("users/login", params).await
    }
}
