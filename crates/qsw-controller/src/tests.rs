use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::Router;
use axum::extract::{Json, State};
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};

use qsw::ports::Port;

use serde_json::{Value, json};

use tokio::net::TcpListener;

use tracing::info;

use crate::api::QswApi;
use crate::device::{PORTS_STATISTICS, SYSTEM_BOARD, SYSTEM_SENSOR};
use crate::error::ErrorKind;
use crate::options::ConnectionOptions;

const USER: &str = "admin";
const PASSWORD: &str = "secret";
// Base64 of `PASSWORD`.
const ENCODED_PASSWORD: &str = "c2VjcmV0";

const CONFIG: &[u8] = b"hostname QSW-M408-4C\ninterface gi0/1\n";

#[derive(Default)]
struct MockSwitch {
    api_key: Mutex<Option<String>>,
    logins: AtomicUsize,
    logouts: AtomicUsize,
    board_reads: AtomicUsize,
    reboots: AtomicUsize,
    live_updates: AtomicUsize,
    rx_octets: AtomicI64,
    expire_session: AtomicBool,
    plain_unauthorized: AtomicBool,
    exit_failure: AtomicBool,
    sensor_failure: AtomicBool,
    slow_sensor: AtomicBool,
    status_failure: AtomicBool,
    reject_commands: AtomicBool,
    updating: AtomicBool,
    update_done: AtomicBool,
}

type SharedSwitch = Arc<MockSwitch>;

impl MockSwitch {
    fn api_key(&self) -> Option<String> {
        self.api_key
            .lock()
            .map(|api_key| api_key.clone())
            .unwrap_or_default()
    }

    fn set_api_key(&self, value: Option<String>) {
        if let Ok(mut api_key) = self.api_key.lock() {
            *api_key = value;
        }
    }

    fn is_authorized(&self, headers: &HeaderMap) -> bool {
        let Some(api_key) = self.api_key() else {
            return false;
        };

        let bearer = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value == format!("Bearer {api_key}"));
        let cookie = headers
            .get(COOKIE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| {
                value.contains("QSW_LANG=ENG") && value.contains(&format!("QSW_ID={api_key}"))
            });

        bearer && cookie
    }
}

fn reply(status: StatusCode, error_message: &str, result: Option<Value>) -> Response {
    let mut body = json!({
        "error_code": status.as_u16(),
        "error_message": error_message,
    });
    if let Some(result) = result {
        body["result"] = result;
    }
    (status, Json(body)).into_response()
}

fn ok(result: Value) -> Response {
    reply(StatusCode::OK, "OK", Some(result))
}

fn unauthorized() -> Response {
    reply(StatusCode::UNAUTHORIZED, "Unauthorized", None)
}

fn guarded(switch: &MockSwitch, headers: &HeaderMap, result: Value) -> Response {
    if switch.is_authorized(headers) {
        ok(result)
    } else {
        unauthorized()
    }
}

async fn about() -> Response {
    (StatusCode::OK, "<html>QSW</html>").into_response()
}

async fn live() -> Response {
    ok(json!("None"))
}

async fn login(State(switch): State<SharedSwitch>, Json(params): Json<Value>) -> Response {
    if params["username"] != USER || params["password"] != ENCODED_PASSWORD {
        return unauthorized();
    }

    let logins = switch.logins.fetch_add(1, Ordering::SeqCst) + 1;
    let api_key = format!("session-{logins}");
    switch.set_api_key(Some(api_key.clone()));

    ok(json!(api_key))
}

async fn exit(State(switch): State<SharedSwitch>, headers: HeaderMap) -> Response {
    if !switch.is_authorized(&headers) {
        return unauthorized();
    }
    if switch.exit_failure.load(Ordering::SeqCst) {
        return reply(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", None);
    }
    switch.set_api_key(None);
    let _ = switch.logouts.fetch_add(1, Ordering::SeqCst);
    ok(json!("None"))
}

async fn verification(State(switch): State<SharedSwitch>, headers: HeaderMap) -> Response {
    if switch.expire_session.swap(false, Ordering::SeqCst) {
        switch.set_api_key(None);
    }
    guarded(&switch, &headers, json!("None"))
}

async fn board(State(switch): State<SharedSwitch>, headers: HeaderMap) -> Response {
    let _ = switch.board_reads.fetch_add(1, Ordering::SeqCst);
    guarded(
        &switch,
        &headers,
        json!({
            "ChipId": "0x8d8c",
            "MacAddr": "24:5E:BE:00:00:01",
            "Model": "QSW-M408-4C",
            "PortNum": "4",
            "Product": "QSW-M408-4C",
            "SerialNumber": "Q21-4C/0001",
            "TrunkNum": 0,
        }),
    )
}

async fn lacp_info(State(switch): State<SharedSwitch>, headers: HeaderMap) -> Response {
    guarded(
        &switch,
        &headers,
        json!({
            "maxPortChannels": 8,
            "maxPortsPerPortChannel": 8,
            "startIndex": 28,
        }),
    )
}

async fn firmware_condition(State(switch): State<SharedSwitch>, headers: HeaderMap) -> Response {
    guarded(&switch, &headers, json!({"anomaly": false, "message": ""}))
}

async fn firmware_info(State(switch): State<SharedSwitch>, headers: HeaderMap) -> Response {
    guarded(
        &switch,
        &headers,
        json!({
            "buildNumber": "20220128",
            "date": "20220128",
            "number": "29649",
            "pubDate": "Fri, 28 Jan 2022",
            "version": "1.1.0",
        }),
    )
}

async fn ports_statistics(State(switch): State<SharedSwitch>, headers: HeaderMap) -> Response {
    let rx_octets = switch.rx_octets.fetch_add(1000, Ordering::SeqCst) + 1000;
    let entries: Vec<Value> = [1, 2, 3, 4, 29, 30]
        .into_iter()
        .map(|key| {
            let rx_errors = if key == 2 { 3 } else { 0 };
            json!({
                "key": key.to_string(),
                "val": {
                    "FCSErrors": 0,
                    "RxErrors": rx_errors,
                    "RxOctets": rx_octets,
                    "TxOctets": 500,
                },
            })
        })
        .collect();
    guarded(&switch, &headers, Value::Array(entries))
}

async fn ports_status(State(switch): State<SharedSwitch>, headers: HeaderMap) -> Response {
    if switch.status_failure.load(Ordering::SeqCst) {
        return reply(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", None);
    }
    let entries: Vec<Value> = [1, 2, 3, 4, 29, 30]
        .into_iter()
        .map(|key| {
            let link = key <= 2;
            json!({
                "key": key.to_string(),
                "val": {
                    "FullDuplexStatus": true,
                    "Link": link,
                    "Speed": "1000",
                },
            })
        })
        .collect();
    guarded(&switch, &headers, Value::Array(entries))
}

async fn system_sensor(State(switch): State<SharedSwitch>, headers: HeaderMap) -> Response {
    if switch.slow_sensor.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_secs(10)).await;
    }
    if switch.sensor_failure.load(Ordering::SeqCst) {
        return reply(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", None);
    }
    guarded(
        &switch,
        &headers,
        json!({
            "Fan1Speed": 1200,
            "Fan2Speed": -2,
            "MaxSwitchTemp": 85,
            "SwitchTemp": 45,
        }),
    )
}

async fn system_time(State(switch): State<SharedSwitch>, headers: HeaderMap) -> Response {
    if switch.plain_unauthorized.load(Ordering::SeqCst) {
        return (StatusCode::UNAUTHORIZED, "<html>Unauthorized</html>").into_response();
    }
    guarded(&switch, &headers, json!({"UpTime": 3600}))
}

async fn firmware_check(State(switch): State<SharedSwitch>, headers: HeaderMap) -> Response {
    guarded(
        &switch,
        &headers,
        json!({
            "buildNumber": "20230310",
            "date": "20230310",
            "description": "Bug fixes",
            "downloadURL": ["http://download.qnap.com/QSW-M408-4C.img"],
            "newer": true,
            "number": "30011",
            "version": "1.2.0",
        }),
    )
}

async fn firmware_update(State(switch): State<SharedSwitch>, headers: HeaderMap) -> Response {
    guarded(
        &switch,
        &headers,
        json!({"downloadSize": 256, "firmwareSize": 1024}),
    )
}

async fn firmware_status(State(switch): State<SharedSwitch>, headers: HeaderMap) -> Response {
    let result = if switch.update_done.load(Ordering::SeqCst) {
        json!({"progress": "done"})
    } else if switch.updating.load(Ordering::SeqCst) {
        json!({"progress": "downloading"})
    } else {
        json!("None")
    };
    guarded(&switch, &headers, result)
}

async fn firmware_update_live(
    State(switch): State<SharedSwitch>,
    headers: HeaderMap,
) -> Response {
    if !switch.is_authorized(&headers) {
        return unauthorized();
    }
    if switch.reject_commands.load(Ordering::SeqCst) {
        return ok(json!("Busy"));
    }
    let _ = switch.live_updates.fetch_add(1, Ordering::SeqCst);
    switch.updating.store(true, Ordering::SeqCst);
    ok(json!("None"))
}

async fn system_command(
    State(switch): State<SharedSwitch>,
    headers: HeaderMap,
    Json(params): Json<Value>,
) -> Response {
    if !switch.is_authorized(&headers) {
        return unauthorized();
    }
    if switch.reject_commands.load(Ordering::SeqCst) || params["command"] != "reboot" {
        return ok(json!("Busy"));
    }
    let _ = switch.reboots.fetch_add(1, Ordering::SeqCst);
    ok(json!("None"))
}

async fn system_config(State(switch): State<SharedSwitch>, headers: HeaderMap) -> Response {
    if !switch.is_authorized(&headers) {
        return unauthorized();
    }
    (StatusCode::OK, CONFIG).into_response()
}

fn router(switch: SharedSwitch) -> Router {
    Router::new()
        .route("/api/about", get(about))
        .route("/api/live", get(live))
        .route("/api/v1/firmware/condition", get(firmware_condition))
        .route("/api/v1/firmware/info", get(firmware_info))
        .route("/api/v1/firmware/status", get(firmware_status))
        .route("/api/v1/firmware/update", get(firmware_update))
        .route("/api/v1/firmware/update/check", get(firmware_check))
        .route("/api/v1/firmware/update/live", post(firmware_update_live))
        .route("/api/v1/lacp/info", get(lacp_info))
        .route("/api/v1/ports/statistics", get(ports_statistics))
        .route("/api/v1/ports/status", get(ports_status))
        .route("/api/v1/system/board", get(board))
        .route("/api/v1/system/command", post(system_command))
        .route("/api/v1/system/config", get(system_config))
        .route("/api/v1/system/sensor", get(system_sensor))
        .route("/api/v1/system/time", get(system_time))
        .route("/api/v1/users/exit", post(exit))
        .route("/api/v1/users/login", post(login))
        .route("/api/v1/users/verification", get(verification))
        .with_state(switch)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

async fn start_switch() -> (SharedSwitch, SocketAddr) {
    init_tracing();

    let switch = SharedSwitch::default();
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind the mock switch");
    let address = listener
        .local_addr()
        .expect("Failed to read the mock switch address");

    let app = router(Arc::clone(&switch));
    drop(tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("Mock switch stopped");
    }));

    info!("Mock switch listening on {address}");

    (switch, address)
}

fn connect(address: SocketAddr, password: &str) -> QswApi {
    let options = ConnectionOptions::new(format!("http://{address}/"), USER, password)
        .timeout(Duration::from_secs(2));
    QswApi::new(options).expect("Failed to create the client")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn validate_and_update() {
    let (switch, address) = start_switch().await;
    let mut api = connect(address, PASSWORD);

    let board = api.validate().await.expect("Validation failed");
    assert_eq!(board.model(), Some("QSW-M408-4C"));
    assert_eq!(board.serial().as_deref(), Some("Q214C0001"));
    assert!(api.is_logged_in());

    api.update().await.expect("Update failed");

    assert_eq!(switch.logins.load(Ordering::SeqCst), 1);
    assert_eq!(api.lacp_start(), Some(29));
    assert_eq!(
        api.firmware_info().and_then(|info| info.firmware()).as_deref(),
        Some("1.1.0.29649 (20220128)")
    );

    let statistics = api.ports_statistics().expect("Missing ports statistics");
    assert_eq!(statistics.ports().physical_count(), 4);
    assert_eq!(statistics.ports().lacp_count(), 2);
    assert_eq!(statistics.rx_errors(), 3);
    assert_eq!(statistics.rx_speed(), 0);

    let status = api.ports_status().expect("Missing ports status");
    assert_eq!(status.link(), Some(2));
    assert_eq!(status.ports().get(30).and_then(|port| port.lacp_id()), Some(2));

    let sensor = api.system_sensor().expect("Missing sensors");
    assert_eq!(sensor.fan1_speed(), Some(1200));
    assert_eq!(sensor.fan2_speed(), None);
    assert_eq!(api.system_time().and_then(|time| time.uptime_seconds()), Some(3600));

    let data = serde_json::to_value(api.data()).expect("Snapshot is not serializable");
    assert_eq!(data["system-board"]["serial"], "Q214C0001");
    assert_eq!(data["system-sensor"]["temperature"], 45);
    assert_eq!(data["ports-status"]["port-num"], 4);
    assert_eq!(data["ports-status"]["lacp-port-num"], 2);
    assert_eq!(data["ports-statistics"]["rx-errors"], 3);
    assert_eq!(data["firmware-condition"]["anomaly"], false);
    assert!(data.get("firmware-check").is_none());

    let raw = api.raw_data();
    assert_eq!(raw[SYSTEM_BOARD]["result"]["Model"], "QSW-M408-4C");
    assert!(raw[PORTS_STATISTICS]["result"].is_array());
    assert_eq!(raw["firmware-check"], json!({}));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn updates_reuse_session_and_static_data() {
    let (switch, address) = start_switch().await;
    let mut api = connect(address, PASSWORD);

    api.update().await.expect("First update failed");
    api.update().await.expect("Second update failed");

    assert_eq!(switch.logins.load(Ordering::SeqCst), 1);
    assert_eq!(switch.board_reads.load(Ordering::SeqCst), 1);

    let statistics = api.ports_statistics().expect("Missing ports statistics");
    assert_eq!(statistics.rx_octets(), 6 * 2000);
    assert!(statistics.datetime() >= statistics.prev_datetime());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn expired_session_logs_in_again() {
    let (switch, address) = start_switch().await;
    let mut api = connect(address, PASSWORD);

    api.update().await.expect("First update failed");
    switch.expire_session.store(true, Ordering::SeqCst);
    api.update().await.expect("Update after expiration failed");

    assert_eq!(switch.logins.load(Ordering::SeqCst), 2);
    // Static data is read again for the new session.
    assert_eq!(switch.board_reads.load(Ordering::SeqCst), 2);
    assert!(api.system_board().is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn wrong_credentials() {
    let (switch, address) = start_switch().await;
    let mut api = connect(address, "wrong");

    let error = api.validate().await.expect_err("Validation must fail");
    assert_eq!(error.kind(), ErrorKind::Login);

    let error = api.update().await.expect_err("Update must fail");
    assert_eq!(error.kind(), ErrorKind::Login);

    assert!(!api.is_logged_in());
    assert_eq!(switch.logins.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unreachable_switch() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let address = listener.local_addr().expect("Failed to read the address");
    drop(listener);

    let mut api = connect(address, PASSWORD);
    let error = api.validate().await.expect_err("Validation must fail");
    assert_eq!(error.kind(), ErrorKind::InvalidHost);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn invalid_body() {
    let (_switch, address) = start_switch().await;
    let api = connect(address, PASSWORD);

    let error = api
        .endpoints()
        .get_about()
        .await
        .expect_err("An HTML body is not a valid reply");
    assert_eq!(error.kind(), ErrorKind::InvalidResponse);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sensor_errors_after_first_update() {
    let (switch, address) = start_switch().await;
    let mut api = connect(address, PASSWORD);

    switch.sensor_failure.store(true, Ordering::SeqCst);
    let error = api.update().await.expect_err("First update must fail");
    assert_eq!(error.kind(), ErrorKind::InternalServer);

    // The other models are refreshed even though the sensors failed.
    assert!(api.system_sensor().is_none());
    assert!(api.firmware_condition().is_some());
    assert!(api.ports_status().is_some());
    assert!(api.system_time().is_some());
    assert_eq!(api.ports_statistics().map(|statistics| statistics.rx_octets()), Some(6 * 1000));

    switch.sensor_failure.store(false, Ordering::SeqCst);
    api.update().await.expect("Update failed");
    assert_eq!(api.raw_data()[SYSTEM_SENSOR]["result"]["SwitchTemp"], 45);

    switch.sensor_failure.store(true, Ordering::SeqCst);
    api.update().await.expect("Sensor errors must be ignored");
    assert_eq!(api.system_sensor().and_then(|sensor| sensor.temp()), Some(45));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_update_cancels_sensor_read() {
    let (switch, address) = start_switch().await;
    let mut api = connect(address, PASSWORD);

    api.update().await.expect("First update failed");

    switch.slow_sensor.store(true, Ordering::SeqCst);
    switch.status_failure.store(true, Ordering::SeqCst);

    let start = Instant::now();
    let error = api.update().await.expect_err("Update must fail");

    assert_eq!(error.kind(), ErrorKind::InternalServer);
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sensor_timeout_keeps_other_models() {
    let (switch, address) = start_switch().await;
    let mut api = connect(address, PASSWORD);

    api.update().await.expect("First update failed");

    switch.slow_sensor.store(true, Ordering::SeqCst);
    let error = api
        .endpoints()
        .get_system_sensor()
        .await
        .expect_err("The sensors must time out");
    assert_eq!(error.kind(), ErrorKind::Timeout);

    let error = api.update().await.expect_err("Update must time out");
    assert_eq!(error.kind(), ErrorKind::Timeout);

    // Counters read by the failed update are kept.
    let statistics = api.ports_statistics().expect("Missing ports statistics");
    assert_eq!(statistics.rx_octets(), 6 * 2000);
    assert_eq!(api.system_sensor().and_then(|sensor| sensor.temp()), Some(45));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unauthorized_without_json_body() {
    let (switch, address) = start_switch().await;
    let mut api = connect(address, PASSWORD);

    api.login().await.expect("Login failed");
    switch.plain_unauthorized.store(true, Ordering::SeqCst);

    let error = api
        .endpoints()
        .get_system_time()
        .await
        .expect_err("The switch refused the request");
    assert_eq!(error.kind(), ErrorKind::Login);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn maintenance() {
    let (switch, address) = start_switch().await;
    let mut api = connect(address, PASSWORD);

    let check = api.check_firmware().await.expect("Firmware check failed");
    assert_eq!(check.newer(), Some(true));
    assert_eq!(check.firmware().as_deref(), Some("1.2.0.30011 (20230310)"));
    assert_eq!(
        check.download_urls(),
        Some(&["http://download.qnap.com/QSW-M408-4C.img".to_owned()][..])
    );
    let data = serde_json::to_value(api.data()).expect("Snapshot is not serializable");
    assert_eq!(data["firmware-check"]["version"], "1.2.0");

    let config = api.config_backup().await.expect("Backup failed");
    assert_eq!(&config[..], CONFIG);

    assert!(!api.update_status().await.expect("Status failed"));
    api.live_update().await.expect("Live update failed");
    assert_eq!(switch.live_updates.load(Ordering::SeqCst), 1);
    assert!(api.update_status().await.expect("Status failed"));
    assert!((api.update_progress().await.expect("Progress failed") - 25.).abs() < f64::EPSILON);
    assert!((api.firmware_progress() - 25.).abs() < f64::EPSILON);

    switch.update_done.store(true, Ordering::SeqCst);
    assert!(!api.update_status().await.expect("Status failed"));

    api.reboot().await.expect("Reboot failed");
    assert_eq!(switch.reboots.load(Ordering::SeqCst), 1);

    assert_eq!(switch.logins.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rejected_commands() {
    let (switch, address) = start_switch().await;
    let mut api = connect(address, PASSWORD);

    switch.reject_commands.store(true, Ordering::SeqCst);

    let error = api.reboot().await.expect_err("Reboot must be rejected");
    assert_eq!(error.kind(), ErrorKind::Api);
    assert!(error.description().starts_with("Error when rebooting"));

    let error = api.live_update().await.expect_err("Update must be rejected");
    assert_eq!(error.kind(), ErrorKind::Api);
    assert!(error.description().starts_with("Error when updating"));

    assert_eq!(switch.reboots.load(Ordering::SeqCst), 0);
    assert_eq!(switch.live_updates.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn logout() {
    let (switch, address) = start_switch().await;
    let mut api = connect(address, PASSWORD);

    api.logout().await.expect("Logout without session failed");
    assert_eq!(switch.logouts.load(Ordering::SeqCst), 0);

    api.login().await.expect("Login failed");
    api.logout().await.expect("Logout failed");
    assert!(!api.is_logged_in());
    assert_eq!(switch.logouts.load(Ordering::SeqCst), 1);

    api.login().await.expect("Login failed");
    switch.exit_failure.store(true, Ordering::SeqCst);
    api.logout().await.expect("Logout errors must be ignored");
    assert!(!api.is_logged_in());
    assert_eq!(switch.logouts.load(Ordering::SeqCst), 1);

    let error = api
        .endpoints()
        .get_system_board()
        .await
        .expect_err("Endpoints require a session");
    assert_eq!(error.kind(), ErrorKind::Login);
}
