// ── Router interfaces ──

use serde::{Deserialize, Serialize};

/// Friendly labels keyed on the interface id segment before `/`.
const FRIENDLY_NAMES: &[(&str, &str)] = &[
    ("GigabitEthernet1", "WAN"),
    ("Wireguard0", "Wireguard"),
    ("WifiMaster0", "WiFi 2.4g"),
    ("WifiMaster1", "WiFi 5g"),
];

/// Label shown for an interface id.
///
/// Known base interfaces get a fixed label; everything else keeps its id.
/// Wi-Fi master sub-interfaces append their `interface-name`.
pub fn friendly_name(id: &str, interface_name: Option<&str>) -> String {
    let base = id.split('/').next().unwrap_or(id);
    let label = FRIENDLY_NAMES
        .iter()
        .find(|(known, _)| *known == base)
        .map_or(id, |(_, label)| label);

    match interface_name {
        Some(sub) if id.starts_with("WifiMaster0") || id.starts_with("WifiMaster1") => {
            format!("{label} {sub}")
        }
        _ => label.to_owned(),
    }
}

/// One entry of `show interface`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    /// Router interface id, e.g. `GigabitEthernet1` or `WifiMaster0/AccessPoint0`.
    pub id: String,
    /// Friendly label, see [`friendly_name`].
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
    /// Administrative state (`up` / `down`).
    pub state: Option<String>,
    pub link: Option<String>,
    /// `"yes"` when the interface has an established connection.
    pub connected: Option<String>,
    pub address: Option<String>,
    pub mask: Option<String>,
    pub uptime: Option<u64>,
    /// Radio temperature (Wi-Fi masters only).
    pub temperature: Option<f64>,
    /// First WireGuard peer endpoint (WireGuard interfaces only).
    pub wireguard_remote: Option<String>,
    pub interface_name: Option<String>,
    pub usedby: Vec<String>,
}

impl Interface {
    pub fn is_connected(&self) -> bool {
        self.connected.as_deref() == Some("yes")
    }

    pub fn is_up(&self) -> bool {
        self.state.as_deref() == Some("up")
    }

    pub fn is_wireguard(&self) -> bool {
        self.id.starts_with("Wireguard")
    }
}

/// Traffic counters from `show interface stat`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceStats {
    pub rxbytes: Option<u64>,
    pub txbytes: Option<u64>,
    /// Bytes per second.
    pub rxspeed: Option<u64>,
    pub txspeed: Option<u64>,
    pub timestamp: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::friendly_name;

    #[test]
    fn known_interfaces_get_labels() {
        assert_eq!(friendly_name("GigabitEthernet1", None), "WAN");
        assert_eq!(friendly_name("Wireguard0", None), "Wireguard");
        assert_eq!(friendly_name("Bridge0", None), "Bridge0");
    }

    #[test]
    fn wifi_sub_interfaces_append_interface_name() {
        assert_eq!(
            friendly_name("WifiMaster0/AccessPoint1", Some("Guest")),
            "WiFi 2.4g Guest"
        );
        assert_eq!(friendly_name("WifiMaster1", Some("WifiMaster1")), "WiFi 5g WifiMaster1");
    }

    #[test]
    fn interface_name_only_applies_to_wifi_masters() {
        assert_eq!(friendly_name("GigabitEthernet1/0", Some("ISP")), "WAN");
    }
}
