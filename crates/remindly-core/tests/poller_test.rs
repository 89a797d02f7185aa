#![allow(clippy::unwrap_used)]
// Poller bootstrap, persistence and scheduling tests against wiremock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio_stream::StreamExt;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use remindly_api::AUTH_HEADER;
use remindly_core::{
    CoreError, Identity, IdentityPatch, IdentityStore, PollerConfig, SensorReadings, Snapshot,
    SnapshotSink, start,
};

const WAIT: Duration = Duration::from_secs(5);

// ── Helpers ─────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingSink {
    readings: Mutex<Vec<SensorReadings>>,
    identities: Mutex<Vec<Identity>>,
}

impl SnapshotSink for RecordingSink {
    fn on_snapshot(&self, _snapshot: &Snapshot, readings: &SensorReadings) {
        self.readings.lock().unwrap().push(*readings);
    }

    fn on_identity_changed(&self, identity: &Identity) {
        self.identities.lock().unwrap().push(identity.clone());
    }
}

fn api_path(suffix: &str) -> String {
    format!("/api/remindapp/v2/{suffix}")
}

fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_owned())
}

fn config(server: &MockServer, dir: &tempfile::TempDir) -> PollerConfig {
    let mut config = PollerConfig::new(dir.path());
    config.api_base = Some(Url::parse(&format!("{}/api/remindapp/v2", server.uri())).unwrap());
    config.poll_interval = Duration::from_secs(3600);
    config
}

fn device_body(status: &str) -> Value {
    json!({
        "name": "Basement",
        "model": "EC5",
        "systemStatusName": status,
        "saltLbs": 40,
        "maxSalt": 250,
        "capacityRemaining": 65,
        "serialNumber": "SN-42",
        "lastRegenDate": "2025-01-01",
        "regenTime": "2025-01-05T02:00:00Z",
        "asOf": "2025-01-02T10:00:00Z",
        "firmwareVersion": "2.1",
        "dealer": { "name": "Acme Water", "phone": "555-0100" }
    })
}

async fn mount_device(server: &MockServer, token: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(api_path("device/42")))
        .and(header(AUTH_HEADER, token))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn device_calls(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == api_path("device/42"))
        .count()
}

// ── Bootstrap ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_no_identity_is_terminal() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let result = start(config(&server, &dir), Arc::new(RecordingSink::default())).await;

    assert!(matches!(result, Err(CoreError::NoIdentity)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_credentials_discover_and_persist_identity() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path(api_path("login")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "authentication_token": "tok" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("customer")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 9001 })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("locations/9001")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "locationListData": [{ "id": 1, "devices": [{ "id": 42, "model": "EC5" }] }]
        })))
        .mount(&server)
        .await;
    mount_device(&server, "tok", device_body("Normal")).await;

    let mut cfg = config(&server, &dir);
    cfg.email = Some("owner@example.com".into());
    cfg.password = Some(secret("hunter2"));

    let handle = start(cfg, Arc::new(RecordingSink::default()))
        .await
        .unwrap();
    let first = tokio::time::timeout(WAIT, handle.subscribe().next())
        .await
        .unwrap()
        .unwrap();
    handle.stop().await;

    assert_eq!(first.serial_number, "SN-42");
    let identity = IdentityStore::new(dir.path()).load_identity();
    assert_eq!(identity.device_id.as_deref(), Some("42"));
    assert_eq!(identity.auth_token.as_deref(), Some("tok"));
    assert_eq!(identity.serial.as_deref(), Some("SN-42"));
}

#[tokio::test]
async fn test_failed_discovery_does_not_poll() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("POST"))
        .and(path(api_path("login")))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut cfg = config(&server, &dir);
    cfg.email = Some("owner@example.com".into());
    cfg.password = Some(secret("wrong"));

    let result = start(cfg, Arc::new(RecordingSink::default())).await;
    assert!(matches!(result, Err(CoreError::DiscoveryIncomplete { .. })));
    assert_eq!(device_calls(&server).await, 0);
}

// ── Ticks ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_alert_then_normal_updates_readings_and_store() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    // First reply raises an alert, every later one is normal.
    Mock::given(method("GET"))
        .and(path(api_path("device/42")))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_body("Service Required")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_device(&server, "tok", device_body("Normal")).await;

    let mut cfg = config(&server, &dir);
    cfg.auth_token = Some(secret("tok"));
    cfg.device_id = Some("42".into());

    let sink = Arc::new(RecordingSink::default());
    let handle = start(cfg, sink.clone()).await.unwrap();
    let mut snapshots = handle.subscribe();

    let first = tokio::time::timeout(WAIT, snapshots.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.system_status_name, "Service Required");
    assert!(first.readings().alert);
    assert!(first.readings().low_salt);

    assert!(handle.refresh(false));
    let second = tokio::time::timeout(WAIT, snapshots.next())
        .await
        .unwrap()
        .unwrap();
    assert!(!second.readings().alert);
    assert_eq!(
        handle.latest().unwrap().system_status_name,
        second.system_status_name
    );
    handle.stop().await;

    let readings = sink.readings.lock().unwrap().clone();
    assert_eq!(readings.len(), 2);
    assert!(readings[0].alert);
    assert!(!readings[1].alert);
    assert!((readings[1].salt_level - 16.0).abs() < 1e-9);

    // Identity metadata changed once, on the first fresh snapshot.
    assert_eq!(sink.identities.lock().unwrap().len(), 1);

    let store = IdentityStore::new(dir.path());
    let identity = store.load_identity();
    assert_eq!(identity.auth_token.as_deref(), Some("tok"));
    assert_eq!(identity.firmware.as_deref(), Some("2.1"));
    assert_eq!(identity.dealer_phone.as_deref(), Some("555-0100"));
    let status = store.load_status();
    assert_eq!(
        status.next_regen_time.as_deref(),
        Some("2025-01-05T02:00:00Z")
    );
    assert_eq!(status.last_regen_date.as_deref(), Some("2025-01-01"));
}

#[tokio::test]
async fn test_stored_identity_resumes_without_rediscovery() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    IdentityStore::new(dir.path()).merge_identity(&IdentityPatch {
        device_id: Some(Some("42".into())),
        auth_token: Some(Some("tok".into())),
        dealer_email: Some(Some("help@acme.example".into())),
        ..IdentityPatch::default()
    });
    mount_device(&server, "tok", device_body("Normal")).await;

    let handle = start(config(&server, &dir), Arc::new(RecordingSink::default()))
        .await
        .unwrap();
    let snapshot = tokio::time::timeout(WAIT, handle.subscribe().next())
        .await
        .unwrap()
        .unwrap();
    handle.stop().await;

    assert_eq!(snapshot.display_name, "Basement");
    let identity = IdentityStore::new(dir.path()).load_identity();
    // Fields the reply does not carry survive the merge.
    assert_eq!(identity.dealer_email.as_deref(), Some("help@acme.example"));
    assert_eq!(identity.dealer_name.as_deref(), Some("Acme Water"));
}

#[tokio::test]
async fn test_rejected_token_mid_poll_is_replaced_and_persisted() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    // Discovery gets "first"; the reauth after a 401 gets "second".
    Mock::given(method("POST"))
        .and(path(api_path("login")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "authentication_token": "first" })),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path("login")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "authentication_token": "second" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("customer")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 9001 })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("locations/9001")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "locationListData": [{ "id": 1, "devices": [{ "id": 42 }] }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("device/42")))
        .and(header(AUTH_HEADER, "first"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    mount_device(&server, "second", device_body("Normal")).await;

    let mut cfg = config(&server, &dir);
    cfg.email = Some("owner@example.com".into());
    cfg.password = Some(secret("hunter2"));

    let handle = start(cfg, Arc::new(RecordingSink::default()))
        .await
        .unwrap();
    tokio::time::timeout(WAIT, handle.subscribe().next())
        .await
        .unwrap()
        .unwrap();
    handle.stop().await;

    let identity = IdentityStore::new(dir.path()).load_identity();
    assert_eq!(identity.auth_token.as_deref(), Some("second"));
}

#[tokio::test]
async fn test_display_overrides_apply_to_delivered_snapshot_only() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_device(&server, "tok", device_body("Normal")).await;

    let mut cfg = config(&server, &dir);
    cfg.auth_token = Some(secret("tok"));
    cfg.device_id = Some("42".into());
    cfg.name = Some("Softener".into());

    let handle = start(cfg, Arc::new(RecordingSink::default()))
        .await
        .unwrap();
    let snapshot = tokio::time::timeout(WAIT, handle.subscribe().next())
        .await
        .unwrap()
        .unwrap();
    handle.stop().await;

    assert_eq!(snapshot.display_name, "Softener");
    let identity = IdentityStore::new(dir.path()).load_identity();
    assert_eq!(identity.name.as_deref(), Some("Basement"));
}

#[tokio::test]
async fn test_reply_without_name_keeps_stored_name() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    IdentityStore::new(dir.path()).merge_identity(&IdentityPatch {
        device_id: Some(Some("42".into())),
        auth_token: Some(Some("tok".into())),
        name: Some(Some("Basement".into())),
        ..IdentityPatch::default()
    });
    mount_device(
        &server,
        "tok",
        json!({ "model": "EC5", "systemStatusName": "Normal", "saltLbs": 100 }),
    )
    .await;

    let handle = start(config(&server, &dir), Arc::new(RecordingSink::default()))
        .await
        .unwrap();
    let snapshot = tokio::time::timeout(WAIT, handle.subscribe().next())
        .await
        .unwrap()
        .unwrap();
    handle.stop().await;

    // The display label falls back to the model; the stored name does not.
    assert_eq!(snapshot.display_name, "EC5");
    let identity = IdentityStore::new(dir.path()).load_identity();
    assert_eq!(identity.name.as_deref(), Some("Basement"));
    assert_eq!(identity.model.as_deref(), Some("EC5"));
}

// ── Scheduling ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_ticks_never_overlap() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(api_path("device/42")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(device_body("Normal"))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let mut cfg = config(&server, &dir);
    cfg.auth_token = Some(secret("tok"));
    cfg.device_id = Some("42".into());
    cfg.poll_interval = Duration::from_millis(20);

    let handle = start(cfg, Arc::new(RecordingSink::default()))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(1000)).await;
    handle.stop().await;

    // Each tick takes ~300ms plus the 20ms gap; overlapping ticks would
    // have issued dozens of requests.
    let calls = device_calls(&server).await;
    assert!((1..=4).contains(&calls), "device called {calls} times");
}

#[tokio::test]
async fn test_stale_ticks_keep_polling() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(api_path("device/42")))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut cfg = config(&server, &dir);
    cfg.auth_token = Some(secret("tok"));
    cfg.device_id = Some("42".into());
    cfg.poll_interval = Duration::from_millis(50);

    let handle = start(cfg, Arc::new(RecordingSink::default()))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(handle.is_running());
    assert!(handle.latest().is_none());
    handle.stop().await;

    assert!(device_calls(&server).await >= 2);
}

#[tokio::test]
async fn test_stop_cancels_an_in_flight_tick() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(api_path("device/42")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(device_body("Normal"))
                .set_delay(Duration::from_secs(20)),
        )
        .mount(&server)
        .await;

    let mut cfg = config(&server, &dir);
    cfg.auth_token = Some(secret("tok"));
    cfg.device_id = Some("42".into());

    let handle = start(cfg, Arc::new(RecordingSink::default()))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    tokio::time::timeout(WAIT, handle.stop()).await.unwrap();
}
