// ── Router identity ──

use serde::{Deserialize, Serialize};

/// Hardware operating mode reported by `show system mode`.
///
/// Only `router` exposes the hotspot, port-forwarding and priority sections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HwMode {
    Router,
    Other(String),
}

impl HwMode {
    pub fn is_router(&self) -> bool {
        matches!(self, Self::Router)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Router => "router",
            Self::Other(mode) => mode,
        }
    }
}

impl From<String> for HwMode {
    fn from(mode: String) -> Self {
        if mode == "router" {
            Self::Router
        } else {
            Self::Other(mode)
        }
    }
}

impl From<HwMode> for String {
    fn from(mode: HwMode) -> Self {
        match mode {
            HwMode::Router => "router".into(),
            HwMode::Other(mode) => mode,
        }
    }
}

impl std::fmt::Display for HwMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static router identity, loaded once on connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterInfo {
    pub mac: Option<String>,
    pub serial: Option<String>,
    pub model: Option<String>,
    pub hw_id: Option<String>,
    /// Marketing device name, e.g. "Giga".
    pub device: Option<String>,
    pub hw_mode: HwMode,
    pub release: Option<String>,
    pub title: Option<String>,
    pub sandbox: Option<String>,
}

impl RouterInfo {
    /// Best human-readable name: device, then model, then MAC.
    pub fn display_name(&self) -> &str {
        self.device
            .as_deref()
            .or(self.model.as_deref())
            .or(self.mac.as_deref())
            .unwrap_or("Keenetic")
    }
}

#[cfg(test)]
mod tests {
    use super::HwMode;

    #[test]
    fn hw_mode_round_trips_through_string() {
        assert_eq!(HwMode::from("router".to_string()), HwMode::Router);
        let ap = HwMode::from("ap".to_string());
        assert!(!ap.is_router());
        assert_eq!(String::from(ap), "ap");
    }
}
