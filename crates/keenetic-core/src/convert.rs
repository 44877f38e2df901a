// ── Router JSON → domain conversions ──
//
// The router's JSON is loosely typed: numbers arrive as strings, flags as
// `"yes"`, lists sometimes wrapped in an object. These helpers accept all
// of those shapes and return `None` for anything else.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::model::{
    Association, Device, FirmwareStatus, HostPolicy, HwMode, Interface, InterfaceStats,
    PortForwardRule, RouterInfo, SystemStatus, UsbPort, WifiCredentials, friendly_name,
};

// ── Field helpers ────────────────────────────────────────────────────

pub(crate) fn str_field(v: &Value, key: &str) -> Option<String> {
    match v.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn u64_field(v: &Value, key: &str) -> Option<u64> {
    match v.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn i64_field(v: &Value, key: &str) -> Option<i64> {
    match v.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn f64_field(v: &Value, key: &str) -> Option<f64> {
    match v.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn bool_field(v: &Value, key: &str) -> Option<bool> {
    match v.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.as_str() {
            "yes" | "true" | "up" => Some(true),
            "no" | "false" | "down" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn u32_field(v: &Value, key: &str) -> Option<u32> {
    u64_field(v, key).and_then(|n| u32::try_from(n).ok())
}

/// A list that the router may send bare or wrapped as `{key: [...]}`.
fn list<'a>(v: &'a Value, key: &str) -> &'a [Value] {
    match v {
        Value::Array(items) => items,
        Value::Object(_) => match v.get(key) {
            Some(Value::Array(items)) => items,
            _ => &[],
        },
        _ => &[],
    }
}

// ── Router identity ──────────────────────────────────────────────────

pub(crate) fn router_info(identification: &Value, version: &Value, mode: &Value) -> RouterInfo {
    RouterInfo {
        mac: str_field(identification, "mac"),
        serial: str_field(identification, "serial"),
        model: str_field(version, "model"),
        hw_id: str_field(version, "hw_id"),
        device: str_field(version, "device"),
        hw_mode: str_field(mode, "active").map_or(HwMode::Router, HwMode::from),
        release: str_field(version, "release"),
        title: str_field(version, "title"),
        sandbox: str_field(version, "sandbox"),
    }
}

// ── Full-data sections ───────────────────────────────────────────────

pub(crate) fn system_status(v: &Value) -> SystemStatus {
    SystemStatus {
        cpuload: f64_field(v, "cpuload"),
        memory: str_field(v, "memory"),
        uptime: u64_field(v, "uptime"),
        hostname: str_field(v, "hostname"),
        domainname: str_field(v, "domainname"),
    }
}

pub(crate) fn interfaces(v: &Value) -> IndexMap<String, Interface> {
    let Some(map) = v.as_object() else {
        return IndexMap::new();
    };

    map.iter()
        .filter(|(_, raw)| raw.is_object())
        .map(|(id, raw)| {
            let interface_name = str_field(raw, "interface-name");
            let usedby = match raw.get("usedby") {
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(|i| i.as_str().map(String::from))
                    .collect(),
                Some(Value::String(s)) => vec![s.clone()],
                _ => Vec::new(),
            };
            let wireguard_remote = raw
                .get("wireguard")
                .and_then(|wg| wg.get("peer"))
                .and_then(|peers| peers.get(0))
                .and_then(|peer| str_field(peer, "remote"));

            let interface = Interface {
                id: id.clone(),
                name: friendly_name(id, interface_name.as_deref()),
                kind: str_field(raw, "type"),
                description: str_field(raw, "description"),
                state: str_field(raw, "state"),
                link: str_field(raw, "link"),
                connected: str_field(raw, "connected"),
                address: str_field(raw, "address"),
                mask: str_field(raw, "mask"),
                uptime: u64_field(raw, "uptime"),
                temperature: f64_field(raw, "temperature"),
                wireguard_remote,
                interface_name,
                usedby,
            };
            (id.clone(), interface)
        })
        .collect()
}

pub(crate) fn associations(v: &Value) -> Vec<Association> {
    list(v, "station")
        .iter()
        .filter_map(|station| {
            Some(Association {
                mac: str_field(station, "mac")?,
                ap: str_field(station, "ap"),
                authenticated: bool_field(station, "authenticated"),
                rssi: i64_field(station, "rssi"),
                txrate: u64_field(station, "txrate"),
                uptime: u64_field(station, "uptime"),
            })
        })
        .collect()
}

pub(crate) fn devices(v: &Value) -> IndexMap<String, Device> {
    list(v, "host")
        .iter()
        .filter_map(|host| {
            let Some(mac) = str_field(host, "mac") else {
                debug!("skipping hotspot host without mac");
                return None;
            };
            let interface_id = match host.get("interface") {
                Some(iface @ Value::Object(_)) => str_field(iface, "id"),
                Some(Value::String(id)) => Some(id.clone()),
                _ => None,
            };
            let device = Device {
                mac: mac.clone(),
                name: str_field(host, "name"),
                hostname: str_field(host, "hostname"),
                ip: str_field(host, "ip"),
                active: bool_field(host, "active").unwrap_or(false),
                interface_id,
                uptime: u64_field(host, "uptime"),
                rssi: i64_field(host, "rssi"),
                rxbytes: u64_field(host, "rxbytes"),
                txbytes: u64_field(host, "txbytes"),
            };
            Some((mac, device))
        })
        .collect()
}

pub(crate) fn port_forwards(v: &Value) -> IndexMap<String, PortForwardRule> {
    list(v, "static")
        .iter()
        .filter_map(|rule| {
            let index = str_field(rule, "index")?;
            let comment = str_field(rule, "comment");
            let port = u32_field(rule, "port");
            let parsed = PortForwardRule {
                name: comment.clone().unwrap_or_else(|| index.clone()),
                index: index.clone(),
                interface: str_field(rule, "interface"),
                protocol: str_field(rule, "protocol"),
                port,
                end_port: u32_field(rule, "end-port").or(port),
                to_host: str_field(rule, "to-host"),
                comment,
                disabled: bool_field(rule, "disable").unwrap_or(false),
            };
            Some((index, parsed))
        })
        .collect()
}

pub(crate) fn host_policies(v: &Value) -> IndexMap<String, HostPolicy> {
    list(v, "host")
        .iter()
        .filter_map(|host| {
            let mac = str_field(host, "mac")?;
            let policy = HostPolicy {
                mac: mac.clone(),
                access: str_field(host, "access"),
                policy: str_field(host, "policy"),
            };
            Some((mac, policy))
        })
        .collect()
}

/// Interface priorities: `{id: {"order": n}}` or `{id: n}`.
pub(crate) fn priority(v: &Value) -> IndexMap<String, i64> {
    let Some(map) = v.as_object() else {
        return IndexMap::new();
    };
    map.iter()
        .filter_map(|(id, entry)| {
            let order = match entry {
                Value::Number(n) => n.as_i64(),
                other => i64_field(other, "order"),
            }?;
            Some((id.clone(), order))
        })
        .collect()
}

/// USB ports. A port is powered unless `power.shutdown` is set.
pub(crate) fn usb_ports(v: &Value) -> Vec<UsbPort> {
    list(v, "port")
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let fallback = u32::try_from(i + 1).unwrap_or(u32::MAX);
            let powered = match entry.get("power") {
                None | Some(Value::Null) => true,
                Some(power) => !bool_field(power, "shutdown").unwrap_or(false),
            };
            UsbPort {
                port: u32_field(entry, "port").unwrap_or(fallback),
                powered,
            }
        })
        .collect()
}

/// `security-level.public` present and truthy.
pub(crate) fn web_public(v: &Value) -> Option<bool> {
    let level = v.get("security-level")?;
    Some(match level.get("public") {
        Some(Value::Bool(b)) => *b,
        Some(Value::Null) | None => false,
        Some(_) => true,
    })
}

pub(crate) fn media(v: &Value) -> IndexMap<String, Value> {
    v.as_object()
        .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default()
}

pub(crate) fn interface_stats(v: &Value) -> InterfaceStats {
    InterfaceStats {
        rxbytes: u64_field(v, "rxbytes"),
        txbytes: u64_field(v, "txbytes"),
        rxspeed: u64_field(v, "rxspeed"),
        txspeed: u64_field(v, "txspeed"),
        timestamp: str_field(v, "timestamp"),
    }
}

// ── Slow-poll sections ───────────────────────────────────────────────

/// Access-point credentials from `show rc interface`. Entries without an
/// SSID are not Wi-Fi interfaces and are skipped.
pub(crate) fn wifi_credentials(v: &Value) -> IndexMap<String, WifiCredentials> {
    let Some(map) = v.as_object() else {
        return IndexMap::new();
    };
    map.iter()
        .filter(|(_, raw)| raw.get("ssid").is_some())
        .map(|(id, raw)| {
            let base = id.split('/').next().unwrap_or(id).to_owned();
            let password = raw
                .get("authentication")
                .and_then(|auth| auth.get("wpa-psk"))
                .and_then(|psk| str_field(psk, "psk"));
            let creds = WifiCredentials {
                id: id.clone(),
                name: friendly_name(&base, None),
                base_interface: base,
                ssid: str_field(raw, "ssid"),
                password,
                active: bool_field(raw, "up").unwrap_or(false),
                rename: str_field(raw, "rename"),
                description: str_field(raw, "description"),
            };
            (id.clone(), creds)
        })
        .collect()
}

/// Combine `show version` with the component list.
pub(crate) fn firmware_status(version: &Value, components: Option<&Value>) -> FirmwareStatus {
    let installed = str_field(version, "release").or_else(|| str_field(version, "title"));
    let offered = components.and_then(|c| c.get("firmware"));
    let available = offered
        .and_then(|fw| str_field(fw, "version").or_else(|| str_field(fw, "title")))
        .or_else(|| installed.clone());
    let update_available = match (&installed, &available) {
        (Some(i), Some(a)) => i != a,
        _ => false,
    };

    FirmwareStatus {
        installed,
        available,
        sandbox: offered
            .and_then(|fw| str_field(fw, "sandbox"))
            .or_else(|| str_field(version, "sandbox")),
        title: str_field(version, "title"),
        update_available,
    }
}

/// Named policies from `ip policy`: an object keyed by policy name.
pub(crate) fn policy_names(v: &Value) -> Vec<String> {
    v.as_object()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default()
}
