#![allow(clippy::unwrap_used)]
// Integration tests for `RemindClient` using wiremock.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use remindly_api::{AUTH_HEADER, Error, RemindClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, RemindClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/api/remindapp/v2", server.uri())).unwrap();
    let client = RemindClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn api_path(suffix: &str) -> String {
    format!("/api/remindapp/v2/{suffix}")
}

fn token(value: &str) -> SecretString {
    SecretString::from(value.to_owned())
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(api_path("login")))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("email=owner%40example.com"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "authentication_token": "tok-1" })),
        )
        .mount(&server)
        .await;

    let token = client
        .login("owner@example.com", &token("hunter2"))
        .await
        .unwrap();
    assert_eq!(token.expose_secret(), "tok-1");
}

#[tokio::test]
async fn test_login_missing_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(api_path("login")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;

    let result = client.login("owner@example.com", &token("hunter2")).await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_login_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(api_path("login")))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let result = client.login("owner@example.com", &token("wrong")).await;
    match result {
        Err(Error::Authentication { ref message }) => {
            assert!(message.contains("403"), "unexpected message: {message}");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

// ── Discovery endpoints ─────────────────────────────────────────────

#[tokio::test]
async fn test_customer_and_locations() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("customer")))
        .and(header(AUTH_HEADER, "tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 9001 })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(api_path("locations/9001")))
        .and(header(AUTH_HEADER, "tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "locationListData": [{
                "id": 1,
                "name": "Home",
                "devices": [{
                    "id": 42,
                    "model": "EC5",
                    "unitSizeName": "75",
                    "resinTypeName": "TYPE CV",
                    "serialNumber": "SN-42",
                    "name": "Basement"
                }]
            }]
        })))
        .mount(&server)
        .await;

    let customer = client.customer(&token("tok-1")).await.unwrap();
    assert_eq!(customer.id.as_deref(), Some("9001"));

    let locations = client.locations(&token("tok-1"), "9001").await.unwrap();
    let device = locations.first().and_then(|l| l.first_device()).unwrap();
    assert_eq!(device.id.as_deref(), Some("42"));
    assert_eq!(device.resin_type_name.as_deref(), Some("TYPE CV"));
}

#[tokio::test]
async fn test_customer_rejected_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("customer")))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.customer(&token("stale")).await;
    assert!(
        matches!(result, Err(Error::RejectedToken { status: 401 })),
        "expected RejectedToken, got: {result:?}"
    );
}

#[tokio::test]
async fn test_upstream_error_keeps_body_preview() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("customer")))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance window"))
        .mount(&server)
        .await;

    match client.customer(&token("tok-1")).await {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "maintenance window");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

// ── Force update ────────────────────────────────────────────────────

#[tokio::test]
async fn test_force_update() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("forceupdate")))
        .and(header(AUTH_HEADER, "tok-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.force_update(&token("tok-1")).await.unwrap();
}

// ── Device status ───────────────────────────────────────────────────

#[tokio::test]
async fn test_device_status_ok() {
    let (server, _) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("device/42")))
        .and(header(AUTH_HEADER, "tok-1"))
        .and(header("origin", "ionic://localhost"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "EC5",
            "systemStatusName": "Normal",
            "saltLbs": 224,
            "maxSalt": 250,
            "capacityRemaining": 80,
            "dealer": { "name": "Acme Water", "phone": "555-0100" }
        })))
        .mount(&server)
        .await;

    let base_url = Url::parse(&format!("{}/api/remindapp/v2", server.uri())).unwrap();
    let transport = remindly_api::TransportConfig::default();
    let client = RemindClient::new(base_url, &transport).unwrap();
    let reply = client.device_status(&token("tok-1"), "42").await;

    assert!(reply.is_ok());
    let data = reply.data.unwrap();
    assert_eq!(data.system_status_name.as_deref(), Some("Normal"));
    assert_eq!(data.salt_lbs, Some(224.0));
    assert_eq!(
        data.dealer.and_then(|d| d.name).as_deref(),
        Some("Acme Water")
    );
}

#[tokio::test]
async fn test_device_status_reports_http_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("device/42")))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad token"))
        .mount(&server)
        .await;

    let reply = client.device_status(&token("stale"), "42").await;
    assert_eq!(reply.status, 400);
    assert!(reply.is_rejected());
    assert!(reply.data.is_none());
}

#[tokio::test]
async fn test_device_status_transport_failure_is_status_zero() {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    drop(server);

    let client = RemindClient::with_client(reqwest::Client::new(), base_url);
    let reply = client.device_status(&token("tok-1"), "42").await;

    assert_eq!(reply.status, 0);
    assert!(reply.data.is_none());
}

#[tokio::test]
async fn test_device_status_unreadable_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("device/42")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let reply = client.device_status(&token("tok-1"), "42").await;
    assert_eq!(reply.status, 200);
    assert!(!reply.is_ok());
}
