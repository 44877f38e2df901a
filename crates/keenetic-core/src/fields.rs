// ── Field registry ──
//
// Named, pure read functions over a snapshot. Consumers (status tables,
// watch output, home-automation bridges) look fields up by key instead of
// carrying their own extraction logic. Every reader returns `None` when the
// data it needs is absent.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::Snapshot;
use crate::normalize::{data_size_mb, memory_percent, uptime_since};

/// A field value ready for display or serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Timestamp(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M UTC")),
        }
    }
}

/// Reads a router-level field.
pub type RouterReader = fn(&Snapshot, DateTime<Utc>) -> Option<FieldValue>;
/// Reads a field of one interface, by interface id.
pub type InterfaceReader = fn(&Snapshot, &str, DateTime<Utc>) -> Option<FieldValue>;

/// Registry entry.
#[derive(Debug, Clone, Copy)]
pub struct Field<R> {
    pub key: &'static str,
    pub label: &'static str,
    pub unit: Option<&'static str>,
    pub read: R,
}

// ── Router fields ────────────────────────────────────────────────────

pub static ROUTER_FIELDS: &[Field<RouterReader>] = &[
    Field {
        key: "cpuload",
        label: "CPU load",
        unit: Some("%"),
        read: cpuload,
    },
    Field {
        key: "memory",
        label: "Memory",
        unit: Some("%"),
        read: memory,
    },
    Field {
        key: "uptime",
        label: "Up since",
        unit: None,
        read: uptime,
    },
    Field {
        key: "wan_ip_adress",
        label: "WAN IP",
        unit: None,
        read: wan_ip,
    },
    Field {
        key: "temperature_2_4g",
        label: "Temperature 2.4 GHz",
        unit: Some("°C"),
        read: temperature_2_4g,
    },
    Field {
        key: "temperature_5g",
        label: "Temperature 5 GHz",
        unit: Some("°C"),
        read: temperature_5g,
    },
    Field {
        key: "clients_wifi",
        label: "Wi-Fi clients",
        unit: None,
        read: clients_wifi,
    },
];

fn cpuload(snapshot: &Snapshot, _now: DateTime<Utc>) -> Option<FieldValue> {
    let load = snapshot.system.as_ref()?.cpuload?;
    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    Some(FieldValue::Int(load.round() as i64))
}

fn memory(snapshot: &Snapshot, _now: DateTime<Utc>) -> Option<FieldValue> {
    let raw = snapshot.system.as_ref()?.memory.as_deref()?;
    memory_percent(raw).map(|p| FieldValue::Int(i64::from(p)))
}

fn uptime(snapshot: &Snapshot, now: DateTime<Utc>) -> Option<FieldValue> {
    let secs = snapshot.system.as_ref()?.uptime?;
    uptime_since(secs, now).map(FieldValue::Timestamp)
}

fn wan_ip(snapshot: &Snapshot, _now: DateTime<Utc>) -> Option<FieldValue> {
    snapshot.wan_ip().map(|ip| FieldValue::Text(ip.to_owned()))
}

fn radio_temperature(snapshot: &Snapshot, radio: &str) -> Option<FieldValue> {
    snapshot
        .interface(radio)?
        .temperature
        .map(FieldValue::Float)
}

fn temperature_2_4g(snapshot: &Snapshot, _now: DateTime<Utc>) -> Option<FieldValue> {
    radio_temperature(snapshot, "WifiMaster0")
}

fn temperature_5g(snapshot: &Snapshot, _now: DateTime<Utc>) -> Option<FieldValue> {
    radio_temperature(snapshot, "WifiMaster1")
}

fn clients_wifi(snapshot: &Snapshot, _now: DateTime<Utc>) -> Option<FieldValue> {
    let count = snapshot.clients_wifi()?;
    i64::try_from(count).ok().map(FieldValue::Int)
}

// ── Interface fields ─────────────────────────────────────────────────

pub static INTERFACE_FIELDS: &[Field<InterfaceReader>] = &[
    Field {
        key: "rxbytes",
        label: "Received",
        unit: Some("MB"),
        read: rxbytes,
    },
    Field {
        key: "txbytes",
        label: "Sent",
        unit: Some("MB"),
        read: txbytes,
    },
    Field {
        key: "timestamp",
        label: "Up since",
        unit: None,
        read: timestamp,
    },
    Field {
        key: "rxspeed",
        label: "Download rate",
        unit: Some("MB/s"),
        read: rxspeed,
    },
    Field {
        key: "txspeed",
        label: "Upload rate",
        unit: Some("MB/s"),
        read: txspeed,
    },
    Field {
        key: "connected",
        label: "Connected",
        unit: None,
        read: connected,
    },
    Field {
        key: "state",
        label: "State",
        unit: None,
        read: state,
    },
];

fn megabytes(value: Option<u64>) -> Option<FieldValue> {
    value.map(|b| FieldValue::Float(data_size_mb(b)))
}

fn rxbytes(snapshot: &Snapshot, id: &str, _now: DateTime<Utc>) -> Option<FieldValue> {
    megabytes(snapshot.interface_stats.get(id)?.rxbytes)
}

fn txbytes(snapshot: &Snapshot, id: &str, _now: DateTime<Utc>) -> Option<FieldValue> {
    megabytes(snapshot.interface_stats.get(id)?.txbytes)
}

fn rxspeed(snapshot: &Snapshot, id: &str, _now: DateTime<Utc>) -> Option<FieldValue> {
    megabytes(snapshot.interface_stats.get(id)?.rxspeed)
}

fn txspeed(snapshot: &Snapshot, id: &str, _now: DateTime<Utc>) -> Option<FieldValue> {
    megabytes(snapshot.interface_stats.get(id)?.txspeed)
}

/// When the interface last came up, from its own uptime.
fn timestamp(snapshot: &Snapshot, id: &str, now: DateTime<Utc>) -> Option<FieldValue> {
    let secs = snapshot.interface(id)?.uptime?;
    uptime_since(secs, now).map(FieldValue::Timestamp)
}

fn connected(snapshot: &Snapshot, id: &str, _now: DateTime<Utc>) -> Option<FieldValue> {
    let iface = snapshot.interface(id)?;
    iface.connected.as_ref()?;
    Some(FieldValue::Bool(iface.is_connected()))
}

fn state(snapshot: &Snapshot, id: &str, _now: DateTime<Utc>) -> Option<FieldValue> {
    snapshot
        .interface(id)?
        .state
        .clone()
        .map(FieldValue::Text)
}

// ── Lookup ───────────────────────────────────────────────────────────

pub fn router_field(key: &str) -> Option<&'static Field<RouterReader>> {
    ROUTER_FIELDS.iter().find(|f| f.key == key)
}

pub fn interface_field(key: &str) -> Option<&'static Field<InterfaceReader>> {
    INTERFACE_FIELDS.iter().find(|f| f.key == key)
}

/// Evaluate every router field.
pub fn router_values(
    snapshot: &Snapshot,
    now: DateTime<Utc>,
) -> Vec<(&'static Field<RouterReader>, Option<FieldValue>)> {
    ROUTER_FIELDS
        .iter()
        .map(|field| (field, (field.read)(snapshot, now)))
        .collect()
}

/// Evaluate every interface field for one interface.
pub fn interface_values(
    snapshot: &Snapshot,
    id: &str,
    now: DateTime<Utc>,
) -> Vec<(&'static Field<InterfaceReader>, Option<FieldValue>)> {
    INTERFACE_FIELDS
        .iter()
        .map(|field| (field, (field.read)(snapshot, id, now)))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{HwMode, Interface, InterfaceStats, SystemStatus};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 30)
            .single()
            .expect("valid timestamp")
    }

    fn interface(id: &str) -> Interface {
        Interface {
            id: id.into(),
            name: id.into(),
            kind: None,
            description: None,
            state: Some("up".into()),
            link: None,
            connected: Some("yes".into()),
            address: Some("203.0.113.9".into()),
            mask: None,
            uptime: None,
            temperature: Some(48.0),
            wireguard_remote: None,
            interface_name: None,
            usedby: Vec::new(),
        }
    }

    fn snapshot() -> Snapshot {
        let mut snap = Snapshot::empty(HwMode::Router, now());
        snap.system = Some(SystemStatus {
            cpuload: Some(7.0),
            memory: Some("512/1024".into()),
            uptime: Some(90),
            hostname: None,
            domainname: None,
        });
        snap.interfaces
            .insert("WifiMaster0".into(), interface("WifiMaster0"));
        snap.interfaces
            .insert("GigabitEthernet1".into(), interface("GigabitEthernet1"));
        snap.priority.insert("GigabitEthernet1".into(), 0);
        snap.interface_stats.insert(
            "GigabitEthernet1".into(),
            InterfaceStats {
                rxbytes: Some(3 * 1024 * 1024),
                txbytes: Some(512 * 1024),
                rxspeed: Some(0),
                txspeed: None,
                timestamp: Some("2024-05-01T12:00:00".into()),
            },
        );
        snap
    }

    #[test]
    fn memory_field_is_percentage() {
        let field = router_field("memory").expect("registered");
        assert_eq!((field.read)(&snapshot(), now()), Some(FieldValue::Int(50)));
    }

    #[test]
    fn uptime_field_is_boot_time() {
        let field = router_field("uptime").expect("registered");
        let expected = Utc
            .with_ymd_and_hms(2024, 5, 1, 11, 59, 0)
            .single()
            .expect("valid timestamp");
        assert_eq!(
            (field.read)(&snapshot(), now()),
            Some(FieldValue::Timestamp(expected))
        );
    }

    #[test]
    fn temperature_reads_radio_interfaces() {
        let snap = snapshot();
        assert_eq!(
            (router_field("temperature_2_4g").expect("registered").read)(&snap, now()),
            Some(FieldValue::Float(48.0))
        );
        assert_eq!(
            (router_field("temperature_5g").expect("registered").read)(&snap, now()),
            None
        );
    }

    #[test]
    fn wan_ip_field_uses_priority() {
        let field = router_field("wan_ip_adress").expect("registered");
        assert_eq!(
            (field.read)(&snapshot(), now()),
            Some(FieldValue::Text("203.0.113.9".into()))
        );
    }

    #[test]
    fn clients_wifi_unknown_without_associations() {
        let field = router_field("clients_wifi").expect("registered");
        assert_eq!((field.read)(&snapshot(), now()), None);
    }

    #[test]
    fn interface_counters_in_megabytes() {
        let snap = snapshot();
        let rx = interface_field("rxbytes").expect("registered");
        let tx = interface_field("txbytes").expect("registered");
        assert_eq!((rx.read)(&snap, "GigabitEthernet1", now()), Some(FieldValue::Float(3.0)));
        assert_eq!((tx.read)(&snap, "GigabitEthernet1", now()), Some(FieldValue::Float(0.5)));
        assert_eq!((rx.read)(&snap, "Missing0", now()), None);
    }

    #[test]
    fn interface_timestamp_is_link_up_time() {
        let mut snap = snapshot();
        if let Some(iface) = snap.interfaces.get_mut("GigabitEthernet1") {
            iface.uptime = Some(3600);
        }
        let field = interface_field("timestamp").expect("registered");
        let expected = Utc
            .with_ymd_and_hms(2024, 5, 1, 11, 0, 0)
            .single()
            .expect("valid timestamp");
        assert_eq!(
            (field.read)(&snap, "GigabitEthernet1", now()),
            Some(FieldValue::Timestamp(expected))
        );
        // Stats timestamp alone is not enough.
        assert_eq!((field.read)(&snapshot(), "GigabitEthernet1", now()), None);
    }

    #[test]
    fn interface_values_cover_registry() {
        let values = interface_values(&snapshot(), "GigabitEthernet1", now());
        assert_eq!(values.len(), INTERFACE_FIELDS.len());
        let connected = values
            .iter()
            .find(|(f, _)| f.key == "connected")
            .and_then(|(_, v)| v.clone());
        assert_eq!(connected, Some(FieldValue::Bool(true)));
    }

    #[test]
    fn unknown_keys_are_not_registered() {
        assert!(router_field("nope").is_none());
        assert!(interface_field("nope").is_none());
    }
}
