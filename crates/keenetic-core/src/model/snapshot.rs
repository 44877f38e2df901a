// ── Snapshot ──
//
// One normalized result of a full poll cycle. Published as `Arc<Snapshot>`
// and never mutated afterwards. Cross-references (priority map → interface
// map, device → interface) are NOT guaranteed consistent by the router, so
// every lookup returns an `Option`.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Device, HostPolicy, HwMode, Interface, InterfaceStats, PortForwardRule, UsbPort};

/// `show system`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    /// CPU load, percent.
    pub cpuload: Option<f64>,
    /// `"used/total"` in kilobytes.
    pub memory: Option<String>,
    /// Seconds since boot.
    pub uptime: Option<u64>,
    pub hostname: Option<String>,
    pub domainname: Option<String>,
}

/// One station from `show associations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    pub mac: String,
    /// Access point interface id.
    pub ap: Option<String>,
    pub authenticated: Option<bool>,
    pub rssi: Option<i64>,
    pub txrate: Option<u64>,
    pub uptime: Option<u64>,
}

/// Everything one full poll cycle learned about the router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub fetched_at: DateTime<Utc>,
    pub hw_mode: HwMode,
    pub system: Option<SystemStatus>,
    /// Keyed by interface id, in router order.
    pub interfaces: IndexMap<String, Interface>,
    /// Keyed by MAC.
    pub devices: IndexMap<String, Device>,
    /// Keyed by rule index.
    pub port_forwards: IndexMap<String, PortForwardRule>,
    pub associations: Option<Vec<Association>>,
    /// Keyed by MAC.
    pub host_policies: IndexMap<String, HostPolicy>,
    /// Interface id → priority `order` (lower wins).
    pub priority: IndexMap<String, i64>,
    pub usb_ports: Vec<UsbPort>,
    /// Web configurator reachable from the public side.
    pub web_public: Option<bool>,
    /// Attached storage, keyed by media name.
    pub media: IndexMap<String, Value>,
    /// Traffic counters for the priority interfaces.
    pub interface_stats: IndexMap<String, InterfaceStats>,
    /// Sections the router did not answer this cycle.
    pub missing_sections: Vec<String>,
}

impl Snapshot {
    /// A snapshot with no data, as if every section were missing.
    pub fn empty(hw_mode: HwMode, fetched_at: DateTime<Utc>) -> Self {
        Self {
            fetched_at,
            hw_mode,
            system: None,
            interfaces: IndexMap::new(),
            devices: IndexMap::new(),
            port_forwards: IndexMap::new(),
            associations: None,
            host_policies: IndexMap::new(),
            priority: IndexMap::new(),
            usb_ports: Vec::new(),
            web_public: None,
            media: IndexMap::new(),
            interface_stats: IndexMap::new(),
            missing_sections: Vec::new(),
        }
    }

    pub fn interface(&self, id: &str) -> Option<&Interface> {
        self.interfaces.get(id)
    }

    /// Case-insensitive MAC lookup.
    pub fn device(&self, mac: &str) -> Option<&Device> {
        self.devices
            .get(mac)
            .or_else(|| self.devices.values().find(|d| d.mac.eq_ignore_ascii_case(mac)))
    }

    pub fn port_forward(&self, index: &str) -> Option<&PortForwardRule> {
        self.port_forwards.get(index)
    }

    pub fn usb_port(&self, port: u32) -> Option<&UsbPort> {
        self.usb_ports.iter().find(|p| p.port == port)
    }

    pub fn host_policy(&self, mac: &str) -> Option<&HostPolicy> {
        self.host_policies
            .values()
            .find(|p| p.mac.eq_ignore_ascii_case(mac))
    }

    /// Number of associated Wi-Fi stations.
    pub fn clients_wifi(&self) -> Option<usize> {
        self.associations.as_ref().map(Vec::len)
    }

    /// Interface ids sorted by ascending priority `order`.
    pub fn priority_order(&self) -> Vec<&str> {
        let mut ordered: Vec<(&str, i64)> = self
            .priority
            .iter()
            .map(|(id, order)| (id.as_str(), *order))
            .collect();
        ordered.sort_by_key(|(_, order)| *order);
        ordered.into_iter().map(|(id, _)| id).collect()
    }

    /// External address of the highest-priority connected interface.
    pub fn wan_ip(&self) -> Option<&str> {
        crate::normalize::wan_ip(self)
    }

    /// `true` when at least one section was missing this cycle.
    pub fn is_partial(&self) -> bool {
        !self.missing_sections.is_empty()
    }
}
