//! Integration tests for the `keenetic` CLI binary.
//!
//! Argument parsing, help output, completions and error handling run
//! without a router; the remaining tests drive the binary against a
//! mocked one.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `keenetic` binary with env isolation.
///
/// Clears all `KEENETIC_*` env vars and points the config file into
/// `dir` so tests never touch the user's real configuration.
fn keenetic_cmd(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("keenetic");
    cmd.env("KEENETIC_CONFIG", dir.path().join("config.toml"))
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .env("NO_COLOR", "1")
        .env_remove("KEENETIC_PROFILE")
        .env_remove("KEENETIC_HOST")
        .env_remove("KEENETIC_PORT")
        .env_remove("KEENETIC_USERNAME")
        .env_remove("KEENETIC_OUTPUT")
        .env_remove("KEENETIC_INSECURE")
        .env_remove("KEENETIC_TIMEOUT")
        .env_remove("KEENETIC_PASSWORD");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn mount_get(server: &MockServer, endpoint: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// An access point answering the identity queries and one batch.
async fn mock_router() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    mount_get(
        &server,
        "/rci/show/identification",
        json!({"mac": "50:ff:20:00:00:01", "serial": "S1234"}),
    )
    .await;
    mount_get(
        &server,
        "/rci/show/version",
        json!({"model": "Keenetic Air", "device": "Air", "release": "4.1.7", "sandbox": "stable"}),
    )
    .await;
    mount_get(&server, "/rci/show/system/mode", json!({"active": "ap"})).await;
    Mock::given(method("POST"))
        .and(path("/rci/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"show": {"system": {"cpuload": 12, "memory": "51200/262144", "uptime": 3600}}},
            {"show": {"interface": {
                "Bridge0": {"type": "Bridge", "state": "up", "address": "192.168.1.2"}
            }}},
            {"show": {"associations": {"station": []}}}
        ])))
        .mount(&server)
        .await;
    server
}

fn port_of(server: &MockServer) -> String {
    server.address().port().to_string()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let dir = TempDir::new().unwrap();
    let output = keenetic_cmd(&dir).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let dir = TempDir::new().unwrap();
    keenetic_cmd(&dir).arg("--help").assert().success().stdout(
        predicate::str::contains("Keenetic")
            .and(predicate::str::contains("status"))
            .and(predicate::str::contains("interfaces"))
            .and(predicate::str::contains("backup")),
    );
}

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    keenetic_cmd(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("keenetic"));
}

#[test]
fn test_completions_bash() {
    let dir = TempDir::new().unwrap();
    keenetic_cmd(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_invalid_output_format() {
    let dir = TempDir::new().unwrap();
    keenetic_cmd(&dir)
        .args(["--output", "xml", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_status_without_config_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let output = keenetic_cmd(&dir).arg("status").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("No router configured"), "{text}");
}

#[test]
fn test_unknown_profile_is_reported() {
    let dir = TempDir::new().unwrap();
    let output = keenetic_cmd(&dir)
        .args(["--profile", "office", "system"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Profile 'office' not found"));
}

#[test]
fn test_config_set_creates_profile() {
    let dir = TempDir::new().unwrap();
    keenetic_cmd(&dir)
        .args(["config", "set", "host", "10.0.0.1"])
        .assert()
        .success();
    keenetic_cmd(&dir)
        .args(["config", "set", "scan_interval", "60"])
        .assert()
        .success();

    let written = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(written.contains("10.0.0.1"), "{written}");

    keenetic_cmd(&dir)
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default *"));
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let dir = TempDir::new().unwrap();
    keenetic_cmd(&dir)
        .args(["config", "set", "site", "default"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown config key"));
}

// ── Against a mocked router ─────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_system_reports_router_identity() {
    let server = mock_router().await;
    let dir = TempDir::new().unwrap();

    let output = keenetic_cmd(&dir)
        .env("KEENETIC_PASSWORD", "secret")
        .args(["--host", "127.0.0.1", "--port", &port_of(&server)])
        .args(["-o", "json", "system"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let view: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(view["router"]["device"], "Air");
    assert_eq!(view["system"]["hostname"], Value::Null);
    assert_eq!(view["firmware"]["installed"], "4.1.7");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_field_filter() {
    let server = mock_router().await;
    let dir = TempDir::new().unwrap();

    let output = keenetic_cmd(&dir)
        .env("KEENETIC_PASSWORD", "secret")
        .args(["--host", "127.0.0.1", "--port", &port_of(&server)])
        .args(["-o", "json", "status", "--fields", "cpuload"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let entries: Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["key"], "cpuload");
    assert_eq!(entries[0]["value"], 12);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_interface_exits_not_found() {
    let server = mock_router().await;
    let dir = TempDir::new().unwrap();

    let output = keenetic_cmd(&dir)
        .env("KEENETIC_PASSWORD", "secret")
        .args(["--host", "127.0.0.1", "--port", &port_of(&server)])
        .args(["interfaces", "get", "Wireguard9"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_password_exits_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth"))
        .respond_with(
            ResponseTemplate::new(401)
                .insert_header("X-NDM-Realm", "Keenetic Air")
                .insert_header("X-NDM-Challenge", "ABCDEF"),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let output = keenetic_cmd(&dir)
        .env("KEENETIC_PASSWORD", "wrong")
        .args(["--host", "127.0.0.1", "--port", &port_of(&server), "system"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
}
