#![allow(clippy::unwrap_used)]
// Controller lifecycle tests against a mocked router.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use keenetic_core::{
    Command, CommandResult, ConnectionState, Controller, CoreError, HwMode, PolicyChoice,
    RouterConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn config(server: &MockServer) -> RouterConfig {
    let mut config = RouterConfig::new(
        Url::parse(&server.uri()).unwrap(),
        "admin",
        "secret".to_string().into(),
    );
    config.scan_interval = Duration::ZERO;
    config.firmware_interval = Duration::ZERO;
    config.wifi_interval = Duration::ZERO;
    config.timeout = Duration::from_secs(5);
    config
}

async fn mount_get(server: &MockServer, endpoint: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// An access point: only the base sections are batched.
async fn mount_access_point(server: &MockServer) {
    mount_identity(server, "ap").await;
}

/// A router: the full batch plus a second batch for interface counters.
async fn mount_router(server: &MockServer) {
    mount_identity(server, "router").await;
}

async fn mount_identity(server: &MockServer, mode: &str) {
    Mock::given(method("GET"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
    mount_get(
        server,
        "/rci/show/identification",
        json!({"mac": "50:ff:20:00:00:01", "serial": "S1234"}),
    )
    .await;
    mount_get(
        server,
        "/rci/show/version",
        json!({"model": "Keenetic Air", "device": "Air", "release": "4.1.7", "sandbox": "stable"}),
    )
    .await;
    mount_get(server, "/rci/show/system/mode", json!({"active": mode})).await;
}

fn base_batch() -> Value {
    json!([
        {"show": {"system": {"cpuload": 12, "memory": "51200/262144", "uptime": 3600}}},
        {"show": {"interface": {
            "WifiMaster0/AccessPoint0": {"type": "AccessPoint", "state": "up", "link": "up"},
            "Bridge0": {"type": "Bridge", "state": "up", "address": "192.168.1.2"}
        }}},
        {"show": {"associations": {"station": [
            {"mac": "aa:bb:cc:dd:ee:ff", "ap": "WifiMaster0/AccessPoint0", "rssi": -51}
        ]}}}
    ])
}

fn router_batch() -> Value {
    json!([
        {"show": {"system": {"cpuload": 20, "memory": "999/1000", "uptime": 7200}}},
        {"show": {"interface": {
            "GigabitEthernet1": {
                "type": "GigabitEthernet", "state": "up", "link": "up",
                "connected": "yes", "address": "203.0.113.9", "uptime": 60
            },
            "PPPoE0": {"type": "PPPoE", "state": "down", "connected": "no"},
            "Bridge0": {"type": "Bridge", "state": "up", "address": "192.168.1.1"}
        }}},
        {"show": {"associations": {"station": []}}},
        {"show": {"ip": {"hotspot": {"host": [
            {"mac": "aa:bb:cc:dd:ee:ff", "name": "laptop", "ip": "192.168.1.33",
             "active": true, "interface": {"id": "Bridge0"}},
            {"mac": "11:22:33:44:55:66", "hostname": "tv", "active": false}
        ]}}}},
        {"show": {"rc": {"ip": {"static": {"static": [
            {"index": "1", "comment": "nas", "protocol": "tcp", "port": 8080,
             "to-host": "192.168.1.10", "interface": "GigabitEthernet1"}
        ]}}}}},
        {"show": {"rc": {"ip": {"hotspot": {"host": [
            {"mac": "11:22:33:44:55:66", "access": "deny"}
        ]}}}}},
        {"show": {"rc": {"interface": {"ip": {"global": {
            "PPPoE0": {"order": 1},
            "GigabitEthernet1": {"order": 0}
        }}}}}},
        {"show": {"rc": {"system": {"usb": {"port": [{"port": 1}]}}}}},
        {"show": {"rc": {"ip": {"http": {"security-level": {"public": true}}}}}},
        {"show": {"media": {}}}
    ])
}

fn stats_batch() -> Value {
    json!([
        {"show": {"interface": {"stat": {
            "rxbytes": 3_145_728, "txbytes": 524_288, "rxspeed": 0, "txspeed": 0,
            "timestamp": "2024-05-01T12:00:00"
        }}}},
        {"show": {"interface": {"stat": {"rxbytes": 0, "txbytes": 0}}}}
    ])
}

/// Counter batches carry `"stat"` in their body; they must win over the
/// catch-all batch mock.
async fn mount_stats(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/rci/"))
        .and(body_string_contains("\"stat\""))
        .respond_with(response)
        .with_priority(1)
        .mount(server)
        .await;
}

fn batch_requests(requests: &[wiremock::Request]) -> Vec<&wiremock::Request> {
    requests
        .iter()
        .filter(|r| r.url.path() == "/rci/")
        .filter(|r| !String::from_utf8_lossy(&r.body).contains("\"stat\""))
        .collect()
}

async fn mount_batch(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path("/rci/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ── Connect ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_connect_publishes_first_snapshot() {
    let server = MockServer::start().await;
    mount_access_point(&server).await;
    mount_batch(&server, base_batch()).await;

    let controller = Controller::new(config(&server));
    controller.connect().await.unwrap();

    assert_eq!(*controller.connection_state().borrow(), ConnectionState::Connected);

    let info = controller.router_info().unwrap();
    assert_eq!(info.hw_mode, HwMode::Other("ap".into()));
    assert_eq!(info.display_name(), "Air");

    let snapshot = controller.snapshot().unwrap();
    assert_eq!(snapshot.interfaces.len(), 2);
    assert_eq!(snapshot.clients_wifi(), Some(1));
    assert_eq!(snapshot.system.as_ref().unwrap().cpuload, Some(12.0));
    assert!(!snapshot.is_partial());
    assert_eq!(controller.last_update_success(), Some(true));

    // Component list is not mounted: firmware falls back to the installed release.
    let firmware = controller.firmware().unwrap();
    assert_eq!(firmware.installed.as_deref(), Some("4.1.7"));
    assert!(!firmware.update_available);

    controller.disconnect().await;
    assert_eq!(*controller.connection_state().borrow(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_connect_fails_when_first_refresh_fails() {
    let server = MockServer::start().await;
    mount_access_point(&server).await;
    Mock::given(method("POST"))
        .and(path("/rci/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let controller = Controller::new(config(&server));
    let err = controller.connect().await.unwrap_err();

    assert!(matches!(err, CoreError::Api { status: Some(500), .. }));
    assert_eq!(*controller.connection_state().borrow(), ConnectionState::Failed);
    assert!(controller.snapshot().is_none());
}

// ── Poll cycles ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_failed_cycle_keeps_previous_snapshot() {
    let server = MockServer::start().await;
    mount_access_point(&server).await;
    mount_batch(&server, base_batch()).await;

    let controller = Controller::new(config(&server));
    controller.connect().await.unwrap();
    let before = controller.snapshot().unwrap();

    // Router starts failing the batch endpoint.
    server.reset().await;
    mount_access_point(&server).await;
    Mock::given(method("POST"))
        .and(path("/rci/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    assert!(controller.full_refresh().await.is_err());

    let after = controller.snapshot().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(controller.last_update_success(), Some(false));
    assert!(controller.cycle_status().last_error.is_some());

    controller.disconnect().await;
}

#[tokio::test]
async fn test_short_batch_publishes_partial_snapshot() {
    let server = MockServer::start().await;
    mount_access_point(&server).await;
    let mut batch = base_batch();
    batch.as_array_mut().unwrap().truncate(2);
    mount_batch(&server, batch).await;

    let controller = Controller::new(config(&server));
    controller.connect().await.unwrap();

    let snapshot = controller.snapshot().unwrap();
    assert_eq!(snapshot.missing_sections, vec!["associations".to_string()]);
    assert_eq!(snapshot.clients_wifi(), None);
    assert_eq!(snapshot.interfaces.len(), 2);
    assert_eq!(controller.last_update_success(), Some(true));

    controller.disconnect().await;
}

// ── Router mode ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_router_mode_fetches_counters_in_second_batch() {
    let server = MockServer::start().await;
    mount_router(&server).await;
    mount_stats(&server, ResponseTemplate::new(200).set_body_json(stats_batch())).await;
    mount_batch(&server, router_batch()).await;

    let controller = Controller::new(config(&server));
    controller.connect().await.unwrap();

    assert_eq!(controller.router_info().unwrap().hw_mode, HwMode::Router);

    let snapshot = controller.snapshot().unwrap();
    assert!(snapshot.missing_sections.is_empty(), "{:?}", snapshot.missing_sections);
    assert_eq!(snapshot.wan_ip(), Some("203.0.113.9"));
    assert_eq!(snapshot.devices.len(), 2);
    assert_eq!(
        snapshot.device("aa:bb:cc:dd:ee:ff").unwrap().interface_id.as_deref(),
        Some("Bridge0")
    );
    assert!(snapshot.port_forward("1").is_some());
    assert_eq!(snapshot.web_public, Some(true));

    // Counters follow priority order: GigabitEthernet1 first, then PPPoE0.
    let ids: Vec<&str> = snapshot.interface_stats.keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["GigabitEthernet1", "PPPoE0"]);
    assert_eq!(
        snapshot.interface_stats["GigabitEthernet1"].rxbytes,
        Some(3_145_728)
    );

    let requests = server.received_requests().await.unwrap();
    let stats: Vec<_> = requests
        .iter()
        .filter(|r| r.url.path() == "/rci/")
        .filter(|r| String::from_utf8_lossy(&r.body).contains("\"stat\""))
        .collect();
    assert_eq!(stats.len(), 1);
    let body: Value = serde_json::from_slice(&stats[0].body).unwrap();
    assert_eq!(
        body,
        json!([
            {"show": {"interface": {"stat": {"name": "GigabitEthernet1"}}}},
            {"show": {"interface": {"stat": {"name": "PPPoE0"}}}}
        ])
    );

    controller.disconnect().await;
}

#[tokio::test]
async fn test_router_mode_failed_counters_keep_snapshot() {
    let server = MockServer::start().await;
    mount_router(&server).await;
    mount_stats(&server, ResponseTemplate::new(500)).await;
    mount_batch(&server, router_batch()).await;

    let controller = Controller::new(config(&server));
    controller.connect().await.unwrap();

    let snapshot = controller.snapshot().unwrap();
    assert_eq!(snapshot.missing_sections, vec!["interface_stat".to_string()]);
    assert!(snapshot.interface_stats.is_empty());
    assert_eq!(snapshot.wan_ip(), Some("203.0.113.9"));
    assert_eq!(snapshot.devices.len(), 2);
    assert_eq!(controller.last_update_success(), Some(true));

    controller.disconnect().await;
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_write_forces_refresh_before_reply() {
    let server = MockServer::start().await;
    mount_access_point(&server).await;
    // First batch (connect) sees Bridge0 up; every later one sees it down.
    Mock::given(method("POST"))
        .and(path("/rci/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(base_batch()))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    let mut after = base_batch();
    after[1]["show"]["interface"]["Bridge0"]["state"] = json!("down");
    mount_batch(&server, after).await;
    Mock::given(method("POST"))
        .and(path("/rci/interface/Bridge0"))
        .and(body_json(json!({"down": "true"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let controller = Controller::new(config(&server));
    controller.connect().await.unwrap();
    let before = controller.snapshot().unwrap();
    assert_eq!(before.interface("Bridge0").unwrap().state.as_deref(), Some("up"));

    let result = controller
        .execute(Command::SetInterface {
            id: "Bridge0".into(),
            up: false,
        })
        .await
        .unwrap();
    assert_eq!(result, CommandResult::Ok);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(batch_requests(&requests).len(), 2);

    let refreshed = controller.snapshot().unwrap();
    assert!(!Arc::ptr_eq(&before, &refreshed));
    assert_eq!(refreshed.interface("Bridge0").unwrap().state.as_deref(), Some("down"));

    controller.disconnect().await;
}

#[tokio::test]
async fn test_unknown_interface_is_rejected_before_sending() {
    let server = MockServer::start().await;
    mount_access_point(&server).await;
    mount_batch(&server, base_batch()).await;
    Mock::given(method("POST"))
        .and(path("/rci/interface/Nope0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let err = Controller::oneshot(config(&server), |ctrl| async move {
        ctrl.execute(Command::SetInterface {
            id: "Nope0".into(),
            up: false,
        })
        .await
    })
    .await
    .unwrap_err();

    assert!(matches!(err, CoreError::NotFound { .. }));
}

#[tokio::test]
async fn test_host_policy_command_sends_access_pair() {
    let server = MockServer::start().await;
    mount_access_point(&server).await;
    mount_batch(&server, base_batch()).await;
    Mock::given(method("POST"))
        .and(path("/rci/ip/hotspot/host"))
        .and(body_json(json!({
            "mac": "aa:bb:cc:dd:ee:ff",
            "access": "deny",
            "policy": false,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let result = Controller::oneshot(config(&server), |ctrl| async move {
        ctrl.execute(Command::SetHostPolicy {
            mac: "aa:bb:cc:dd:ee:ff".into(),
            policy: PolicyChoice::NotInternet,
        })
        .await
    })
    .await
    .unwrap();

    assert_eq!(result, CommandResult::Ok);
}

#[tokio::test]
async fn test_invalid_mac_is_rejected() {
    let server = MockServer::start().await;
    mount_access_point(&server).await;
    mount_batch(&server, base_batch()).await;

    let err = Controller::oneshot(config(&server), |ctrl| async move {
        ctrl.execute(Command::SetHostPolicy {
            mac: "not-a-mac".into(),
            policy: PolicyChoice::Default,
        })
        .await
    })
    .await
    .unwrap_err();

    assert!(matches!(err, CoreError::ValidationFailed { .. }));
}
