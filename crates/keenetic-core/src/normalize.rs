// ── Snapshot normalizer ──
//
// Pure transform from the sections of one batch answer to a `Snapshot`,
// plus the derived values consumers read from it (WAN IP, memory usage,
// uptime timestamps, megabyte counters). A missing section never fails
// the cycle: it is logged, recorded in `missing_sections`, and left empty.

use chrono::{DateTime, Duration, DurationRound, Utc};
use keenetic_api::RciQuery;
use serde_json::Value;
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};
use tracing::warn;

use crate::convert;
use crate::model::{HwMode, Snapshot};

// ── Sections ─────────────────────────────────────────────────────────

/// One logical query of the full-data batch, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Section {
    System,
    Interface,
    Associations,
    Hotspot,
    PortForwards,
    HostPolicies,
    Priority,
    Usb,
    WebAccess,
    Media,
}

impl Section {
    /// Sections queried in every hardware mode.
    const BASE: [Self; 3] = [Self::System, Self::Interface, Self::Associations];

    pub fn query(self) -> RciQuery {
        match self {
            Self::System => RciQuery::show(&["system"]),
            Self::Interface => RciQuery::show(&["interface"]),
            Self::Associations => RciQuery::show(&["associations"]),
            Self::Hotspot => RciQuery::show(&["ip", "hotspot"]),
            Self::PortForwards => RciQuery::show(&["rc", "ip", "static"]),
            Self::HostPolicies => RciQuery::show(&["rc", "ip", "hotspot"]),
            Self::Priority => RciQuery::show(&["rc", "interface", "ip", "global"]),
            Self::Usb => RciQuery::show(&["rc", "system", "usb"]),
            Self::WebAccess => RciQuery::show(&["rc", "ip", "http"]),
            Self::Media => RciQuery::show(&["media"]),
        }
    }

    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Sections to request for a hardware mode, in wire order.
    pub fn for_mode(mode: &HwMode) -> Vec<Self> {
        if mode.is_router() {
            Self::iter().collect()
        } else {
            Self::BASE.to_vec()
        }
    }
}

/// Batch answers paired with the sections that produced them.
#[derive(Debug, Clone, Default)]
pub struct Sections {
    entries: Vec<(Section, Option<Value>)>,
}

impl Sections {
    /// Pair the positional batch output with the section list it was built from.
    pub fn from_batch(sections: &[Section], values: Vec<Option<Value>>) -> Self {
        let mut values = values.into_iter();
        Self {
            entries: sections
                .iter()
                .map(|section| (*section, values.next().flatten()))
                .collect(),
        }
    }

    pub fn get(&self, section: Section) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(s, _)| *s == section)
            .and_then(|(_, v)| v.as_ref())
    }

    fn requested(&self) -> impl Iterator<Item = Section> + '_ {
        self.entries.iter().map(|(s, _)| *s)
    }
}

// ── Normalization ────────────────────────────────────────────────────

/// Build a snapshot from one batch answer.
pub fn normalize(sections: &Sections, hw_mode: &HwMode, now: DateTime<Utc>) -> Snapshot {
    let mut snapshot = Snapshot::empty(hw_mode.clone(), now);

    for section in sections.requested() {
        let Some(value) = sections.get(section) else {
            warn!(section = section.name(), "section missing, publishing without it");
            snapshot.missing_sections.push(section.name().to_owned());
            continue;
        };

        match section {
            Section::System => snapshot.system = Some(convert::system_status(value)),
            Section::Interface => snapshot.interfaces = convert::interfaces(value),
            Section::Associations => snapshot.associations = Some(convert::associations(value)),
            Section::Hotspot => snapshot.devices = convert::devices(value),
            Section::PortForwards => snapshot.port_forwards = convert::port_forwards(value),
            Section::HostPolicies => snapshot.host_policies = convert::host_policies(value),
            Section::Priority => snapshot.priority = convert::priority(value),
            Section::Usb => snapshot.usb_ports = convert::usb_ports(value),
            Section::WebAccess => snapshot.web_public = convert::web_public(value),
            Section::Media => snapshot.media = convert::media(value),
        }
    }

    snapshot
}

// ── Interface counters ───────────────────────────────────────────────

/// `show interface stat` queries for every interface in the priority map
/// that also exists in the interface map.
pub fn stat_queries(snapshot: &Snapshot) -> Vec<(String, RciQuery)> {
    snapshot
        .priority_order()
        .into_iter()
        .filter(|id| snapshot.interface(id).is_some())
        .map(|id| {
            let query = RciQuery::show(&["interface", "stat"]).with_arg("name", id);
            (id.to_owned(), query)
        })
        .collect()
}

/// Attach the answers of a [`stat_queries`] batch to the snapshot.
pub fn attach_stats(snapshot: &mut Snapshot, ids: &[String], values: Vec<Option<Value>>) {
    for (id, value) in ids.iter().zip(values) {
        match value {
            Some(value) => {
                snapshot
                    .interface_stats
                    .insert(id.clone(), convert::interface_stats(&value));
            }
            None => {
                warn!(interface = %id, "interface counters missing");
                snapshot.missing_sections.push(format!("interface_stat:{id}"));
            }
        }
    }
}

// ── Derived values ───────────────────────────────────────────────────

/// Address of the first connected interface by ascending priority.
///
/// WireGuard interfaces report their first peer's remote endpoint instead
/// of a local address. `None` when nothing is connected or keys are missing.
pub fn wan_ip(snapshot: &Snapshot) -> Option<&str> {
    let id = snapshot
        .priority_order()
        .into_iter()
        .find(|id| snapshot.interface(id).is_some_and(|i| i.is_connected()))?;
    let interface = snapshot.interface(id)?;

    if interface.is_wireguard() {
        interface.wireguard_remote.as_deref()
    } else {
        interface.address.as_deref()
    }
}

/// `"used/total"` → integer percentage. Malformed input gives `None`.
pub fn memory_percent(memory: &str) -> Option<u8> {
    let (used, total) = memory.split_once('/')?;
    let used: f64 = used.trim().parse().ok()?;
    let total: f64 = total.trim().parse().ok()?;
    if total <= 0.0 || used < 0.0 {
        return None;
    }
    let percent = (used / total * 100.0).trunc().clamp(0.0, 100.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
    Some(percent as u8)
}

/// `now - seconds`, truncated to the minute.
pub fn uptime_since(seconds: u64, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let elapsed = Duration::try_seconds(i64::try_from(seconds).ok()?)?;
    let since = now.checked_sub_signed(elapsed)?;
    since.duration_trunc(Duration::minutes(1)).ok()
}

/// Bytes → megabytes (MiB), rounded to three decimals.
pub fn data_size_mb(bytes: u64) -> f64 {
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    let mb = bytes as f64 / 1024.0 / 1024.0;
    (mb * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45)
            .single()
            .expect("valid timestamp")
    }

    fn router_batch(values: Vec<Option<Value>>) -> Sections {
        Sections::from_batch(&Section::for_mode(&HwMode::Router), values)
    }

    #[test]
    fn router_mode_queries_every_section_in_order() {
        let sections = Section::for_mode(&HwMode::Router);
        assert_eq!(sections.len(), 10);
        assert_eq!(sections[0], Section::System);
        assert_eq!(sections[3], Section::Hotspot);
        assert_eq!(sections[6], Section::Priority);
        assert_eq!(
            Section::Priority.query().to_body(),
            json!({"show": {"rc": {"interface": {"ip": {"global": {}}}}}})
        );
    }

    #[test]
    fn other_modes_query_three_sections() {
        let sections = Section::for_mode(&HwMode::Other("ap".into()));
        assert_eq!(
            sections,
            vec![Section::System, Section::Interface, Section::Associations]
        );
    }

    #[test]
    fn memory_percent_of_half() {
        assert_eq!(memory_percent("512/1024"), Some(50));
        assert_eq!(memory_percent("205304/524288"), Some(39));
        assert_eq!(memory_percent("999/1000"), Some(99));
    }

    #[test]
    fn memory_percent_rejects_malformed_input() {
        assert_eq!(memory_percent("512"), None);
        assert_eq!(memory_percent("a/b"), None);
        assert_eq!(memory_percent("1/0"), None);
    }

    #[test]
    fn uptime_is_truncated_to_the_minute() {
        let since = uptime_since(3600, now()).expect("in range");
        assert_eq!(
            since,
            Utc.with_ymd_and_hms(2024, 5, 1, 11, 30, 0)
                .single()
                .expect("valid timestamp")
        );
    }

    #[test]
    fn data_size_rounds_to_three_decimals() {
        assert!((data_size_mb(1_048_576) - 1.0).abs() < f64::EPSILON);
        assert!((data_size_mb(1_500_000) - 1.431).abs() < f64::EPSILON);
        assert!(data_size_mb(0).abs() < f64::EPSILON);
    }

    fn interfaces_and_priority(
        interfaces: Value,
        priority: Value,
    ) -> Snapshot {
        let mut values = vec![None; 10];
        values[1] = Some(interfaces);
        values[6] = Some(priority);
        normalize(&router_batch(values), &HwMode::Router, now())
    }

    #[test]
    fn wan_ip_picks_first_connected_by_priority() {
        let snapshot = interfaces_and_priority(
            json!({
                "GigabitEthernet1": {"connected": "yes", "address": "203.0.113.7"},
                "UsbLte0": {"connected": "yes", "address": "10.64.0.2"},
                "PPPoE0": {"connected": "no", "address": "198.51.100.1"},
            }),
            json!({
                "GigabitEthernet1": {"order": 2},
                "UsbLte0": {"order": 1},
                "PPPoE0": {"order": 0},
            }),
        );

        assert_eq!(snapshot.wan_ip(), Some("10.64.0.2"));
    }

    #[test]
    fn wan_ip_uses_wireguard_peer_endpoint() {
        let snapshot = interfaces_and_priority(
            json!({
                "Wireguard0": {
                    "connected": "yes",
                    "address": "10.8.0.2",
                    "wireguard": {"peer": [{"remote": "198.51.100.20"}]}
                },
                "GigabitEthernet1": {"connected": "yes", "address": "203.0.113.7"},
            }),
            json!({"Wireguard0": {"order": 0}, "GigabitEthernet1": {"order": 1}}),
        );

        assert_eq!(snapshot.wan_ip(), Some("198.51.100.20"));
    }

    #[test]
    fn wan_ip_none_when_nothing_connected() {
        let snapshot = interfaces_and_priority(
            json!({"GigabitEthernet1": {"connected": "no", "address": "203.0.113.7"}}),
            json!({"GigabitEthernet1": {"order": 0}, "Missing0": {"order": 1}}),
        );

        assert_eq!(snapshot.wan_ip(), None);
    }

    #[test]
    fn missing_sections_are_recorded_not_fatal() {
        let values = vec![
            Some(json!({"cpuload": 5, "memory": "512/1024", "uptime": "7200"})),
            Some(json!({"GigabitEthernet1": {"connected": "yes"}})),
            Some(json!({"station": [{"mac": "aa:bb:cc:dd:ee:ff"}]})),
        ];
        let snapshot = normalize(&router_batch(values), &HwMode::Router, now());

        assert_eq!(snapshot.system.as_ref().and_then(|s| s.cpuload), Some(5.0));
        assert_eq!(snapshot.clients_wifi(), Some(1));
        assert_eq!(
            snapshot.missing_sections,
            vec![
                "hotspot",
                "port_forwards",
                "host_policies",
                "priority",
                "usb",
                "web_access",
                "media",
            ]
        );
        assert!(snapshot.devices.is_empty());
        assert_eq!(snapshot.wan_ip(), None);
    }

    #[test]
    fn interfaces_get_friendly_names() {
        let values = vec![
            None,
            Some(json!({
                "WifiMaster0/AccessPoint0": {"interface-name": "AccessPoint0", "state": "up"},
                "GigabitEthernet1": {"state": "up"},
            })),
            None,
        ];
        let sections = Sections::from_batch(
            &Section::for_mode(&HwMode::Other("ap".into())),
            values,
        );
        let snapshot = normalize(&sections, &HwMode::Other("ap".into()), now());

        assert_eq!(snapshot.interfaces["GigabitEthernet1"].name, "WAN");
        assert_eq!(
            snapshot.interfaces["WifiMaster0/AccessPoint0"].name,
            "WiFi 2.4g AccessPoint0"
        );
    }
}
