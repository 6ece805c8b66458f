#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use netpulse_api::{ApiClient, Error, LimitPayload, ServiceAction};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

// ── Read tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_devices() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "mac": "aa:bb:cc:dd:ee:01",
                "ip": "192.168.1.10",
                "hostname": "desktop",
                "download": 5000,
                "upload": 1200,
                "downloadSpeed": 1000,
                "uploadSpeed": 200
            },
            {
                "mac": "aa:bb:cc:dd:ee:02",
                "ip": "192.168.1.11",
                "downloadSpeed": 500,
                "uploadSpeed": 900,
                "speedLimit": { "enabled": true, "downloadLimit": 2048, "uploadLimit": 512 }
            }
        ])))
        .mount(&server)
        .await;

    let devices = client.list_devices().await.unwrap();

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].hostname.as_deref(), Some("desktop"));
    assert_eq!(devices[0].download, 5000);
    assert_eq!(devices[1].hostname, None);
    assert_eq!(devices[1].upload_speed, 900);
    assert_eq!(
        devices[1].speed_limit.as_ref().and_then(|l| l.download_limit),
        Some(2048)
    );
}

#[tokio::test]
async fn test_get_history() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "timestamp": 1000, "download": 10, "upload": 5 },
            { "timestamp": 2000, "download": 20, "upload": 7 }
        ])))
        .mount(&server)
        .await;

    let history = client.get_history().await.unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[1].timestamp, 2000);
    assert_eq!(history[1].download, 20);
}

#[tokio::test]
async fn test_get_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "running": true,
            "interface": "eth0",
            "uptime": 3600,
            "version": "1.4.2"
        })))
        .mount(&server)
        .await;

    let status = client.get_status().await.unwrap();

    assert!(status.running);
    assert_eq!(status.interface.as_deref(), Some("eth0"));
    assert_eq!(status.uptime, 3600);
    assert_eq!(status.version.as_deref(), Some("1.4.2"));
}

#[tokio::test]
async fn test_get_totals() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/totals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "downloaded": 300,
            "uploaded": 75,
            "total": 375
        })))
        .mount(&server)
        .await;

    let totals = client.get_totals().await.unwrap();

    assert_eq!(totals.downloaded, 300);
    assert_eq!(totals.uploaded, 75);
    assert_eq!(totals.total, 375);
}

// ── Error mapping ───────────────────────────────────────────────────

#[tokio::test]
async fn test_server_error_maps_to_http() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .respond_with(ResponseTemplate::new(500).set_body_string("collector crashed"))
        .mount(&server)
        .await;

    let result = client.list_devices().await;

    match result {
        Err(Error::Http {
            endpoint,
            status,
            message,
        }) => {
            assert_eq!(endpoint, "devices");
            assert_eq!(status, 500);
            assert_eq!(message, "collector crashed");
        }
        other => panic!("expected Http error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_payload_maps_to_deserialization() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.get_status().await;

    assert!(
        matches!(result, Err(Error::Deserialization { ref body, .. }) if body.contains("oops")),
        "expected Deserialization error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_connection_refused_is_transient() {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    drop(server);

    let client = ApiClient::with_client(reqwest::Client::new(), base_url);
    let err = client.get_totals().await.unwrap_err();

    assert!(matches!(err, Error::Transport(_)), "got: {err:?}");
    assert!(err.is_transient());
}

// ── Write tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_set_limit_sends_payload() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/limit"))
        .and(body_json(json!({
            "mac": "aa:bb:cc:dd:ee:01",
            "limit": { "enabled": true, "downloadLimit": 1024, "uploadLimit": 256 }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client
        .set_limit(
            "aa:bb:cc:dd:ee:01",
            Some(LimitPayload {
                enabled: true,
                download_limit: Some(1024),
                upload_limit: Some(256),
            }),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_clear_limit_sends_null() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/limit"))
        .and(body_json(json!({ "mac": "aa:bb:cc:dd:ee:01", "limit": null })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.set_limit("aa:bb:cc:dd:ee:01", None).await.unwrap();
}

#[tokio::test]
async fn test_set_interface() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/interface"))
        .and(body_json(json!({ "interface": "wlan0" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.set_interface("wlan0").await.unwrap();
}

#[tokio::test]
async fn test_service_control_paths() {
    let (server, client) = setup().await;

    for action in ["start", "stop", "restart"] {
        Mock::given(method("POST"))
            .and(path(format!("/api/service/{action}")))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
    }

    client.control_service(ServiceAction::Start).await.unwrap();
    client.control_service(ServiceAction::Stop).await.unwrap();
    client.control_service(ServiceAction::Restart).await.unwrap();
}

#[tokio::test]
async fn test_rejected_write_surfaces_status() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/interface"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let err = client.set_interface("bogus0").await.unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert!(!err.is_transient());
}
