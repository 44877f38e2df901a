// ── Static NAT (port forwarding) ──

use serde::{Deserialize, Serialize};

/// One `ip static` rule. Identity is the router-assigned index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortForwardRule {
    pub index: String,
    /// Comment when set, else the index.
    pub name: String,
    pub interface: Option<String>,
    pub protocol: Option<String>,
    pub port: Option<u32>,
    /// Defaults to `port` for single-port rules.
    pub end_port: Option<u32>,
    pub to_host: Option<String>,
    pub comment: Option<String>,
    pub disabled: bool,
}

impl PortForwardRule {
    pub fn enabled(&self) -> bool {
        !self.disabled
    }

    /// `80` or `8000-8080`.
    pub fn port_range(&self) -> Option<String> {
        let port = self.port?;
        match self.end_port {
            Some(end) if end != port => Some(format!("{port}-{end}")),
            _ => Some(port.to_string()),
        }
    }
}
