//! Integration tests for the `netpulse` CLI binary.
//!
//! Argument parsing, help output, completions, and error handling run
//! without a service; the remaining tests point the binary at a wiremock
//! server.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `netpulse` binary with env isolation.
///
/// Clears all `NETPULSE_*` env vars and points config directories at
/// `home` so tests never touch the user's real configuration.
fn netpulse_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("netpulse");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("NETPULSE_SERVER")
        .env_remove("NETPULSE_OUTPUT")
        .env_remove("NETPULSE_INSECURE")
        .env_remove("NETPULSE_TIMEOUT")
        .env_remove("NETPULSE_POLL_INTERVAL_MS")
        .env_remove("NETPULSE_HISTORY_CAPACITY");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn mount_devices(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "mac": "aa:bb:cc:dd:ee:01", "hostname": "alpha",
              "download": 200, "upload": 25, "downloadSpeed": 1000, "uploadSpeed": 100 },
            { "mac": "aa:bb:cc:dd:ee:02", "hostname": "bravo",
              "download": 100, "upload": 50, "downloadSpeed": 500, "uploadSpeed": 1000 }
        ])))
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = netpulse_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = tempfile::tempdir().unwrap();
    netpulse_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("measurement service")
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("limit"))
            .and(predicate::str::contains("chart")),
    );
}

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    netpulse_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("netpulse"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let home = tempfile::tempdir().unwrap();
    netpulse_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    netpulse_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let home = tempfile::tempdir().unwrap();
    let output = netpulse_cmd(home.path()).arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_unreachable_service_exits_with_connection_code() {
    let home = tempfile::tempdir().unwrap();
    let output = netpulse_cmd(home.path())
        .args(["devices", "--server", "http://127.0.0.1:9", "--timeout", "2"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
}

#[test]
fn test_bad_server_url_is_usage_error() {
    let home = tempfile::tempdir().unwrap();
    netpulse_cmd(home.path())
        .args(["status", "--server", "not a url"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("server"));
}

#[test]
fn test_limit_set_requires_both_directions() {
    let home = tempfile::tempdir().unwrap();
    netpulse_cmd(home.path())
        .args(["limit", "set", "aa:bb:cc:dd:ee:01", "--down", "1024"])
        .assert()
        .code(2);
}

// ── Config commands ─────────────────────────────────────────────────

#[test]
fn test_config_init_refuses_to_overwrite() {
    let home = tempfile::tempdir().unwrap();

    netpulse_cmd(home.path())
        .args(["config", "init", "--server", "http://10.0.0.2:9000"])
        .assert()
        .success();

    netpulse_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://10.0.0.2:9000"));

    netpulse_cmd(home.path())
        .args(["config", "init"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--force"));
}

// ── Against a mock service ──────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_devices_sorted_by_upload_rate() {
    let server = MockServer::start().await;
    mount_devices(&server).await;
    let home = tempfile::tempdir().unwrap();

    let output = netpulse_cmd(home.path())
        .args(["devices", "--sort", "upload-rate", "-o", "json", "--server"])
        .arg(server.uri())
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let devices: Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<_> = devices
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(names, ["bravo", "alpha"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_totals_are_derived_from_devices() {
    let server = MockServer::start().await;
    mount_devices(&server).await;
    let home = tempfile::tempdir().unwrap();

    let output = netpulse_cmd(home.path())
        .args(["totals", "-o", "json", "--server"])
        .arg(server.uri())
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let totals: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(totals["downloaded"], 300);
    assert_eq!(totals["uploaded"], 75);
    assert_eq!(totals["combined"], 375);
    assert_eq!(totals["download_rate"], 1500);
    assert_eq!(totals["upload_rate"], 1100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_limit_set_posts_kbps() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/limit"))
        .and(body_json(json!({
            "mac": "aa:bb:cc:dd:ee:01",
            "limit": { "enabled": true, "downloadLimit": 2048, "uploadLimit": 512 }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let home = tempfile::tempdir().unwrap();

    netpulse_cmd(home.path())
        .args(["limit", "set", "AA-BB-CC-DD-EE-01", "--down", "2048", "--up", "512"])
        .args(["--server", &server.uri()])
        .assert()
        .success()
        .stdout(predicate::str::contains("aa:bb:cc:dd:ee:01"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_limit_on_unknown_device_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/limit"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let home = tempfile::tempdir().unwrap();

    netpulse_cmd(home.path())
        .args(["limit", "clear", "aa:bb:cc:dd:ee:99", "--server", &server.uri()])
        .assert()
        .code(4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_service_stop_requires_confirmation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let home = tempfile::tempdir().unwrap();

    netpulse_cmd(home.path())
        .args(["service", "stop", "--server", &server.uri()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_service_restart_with_yes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/service/restart"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let home = tempfile::tempdir().unwrap();

    netpulse_cmd(home.path())
        .args(["service", "restart", "--yes", "--server", &server.uri()])
        .assert()
        .success();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_chart_writes_png() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "timestamp": 1000, "download": 100, "upload": 40 },
            { "timestamp": 2000, "download": 300, "upload": 80 },
            { "timestamp": 3000, "download": 200, "upload": 120 }
        ])))
        .mount(&server)
        .await;
    let home = tempfile::tempdir().unwrap();
    let file = home.path().join("chart.png");

    netpulse_cmd(home.path())
        .args(["chart", "--width", "120", "--height", "40", "--file"])
        .arg(&file)
        .args(["--server", &server.uri()])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 samples"));

    let bytes = std::fs::read(&file).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}
