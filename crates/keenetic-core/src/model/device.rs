// ── Hotspot host (client device) ──

use serde::{Deserialize, Serialize};

/// A host from the router's hotspot table. Identity is the MAC address.
///
/// Refreshed wholesale on every poll; there is no incremental diff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub mac: String,
    pub name: Option<String>,
    pub hostname: Option<String>,
    pub ip: Option<String>,
    pub active: bool,
    /// Interface the host is attached to (e.g. `Bridge0`).
    pub interface_id: Option<String>,
    /// Seconds since the host connected.
    pub uptime: Option<u64>,
    pub rssi: Option<i64>,
    pub rxbytes: Option<u64>,
    pub txbytes: Option<u64>,
}

impl Device {
    /// Name shown to users: configured name, then hostname, then MAC.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.hostname.as_deref().filter(|h| !h.is_empty()))
            .unwrap_or(&self.mac)
    }
}
