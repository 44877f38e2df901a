// ── Command API ──
//
// All write operations flow through a unified `Command` enum. The
// controller's command processor routes each variant to the router client
// and then refreshes whatever the write invalidated.

use std::path::PathBuf;

use keenetic_api::BackupKind;
use serde_json::Value;

use crate::error::CoreError;
use crate::model::PolicyChoice;

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All write operations against a router.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Interfaces ───────────────────────────────────────────────────
    SetInterface { id: String, up: bool },

    // ── Firewall / NAT ───────────────────────────────────────────────
    SetPortForwarding { index: String, enabled: bool },

    // ── System ───────────────────────────────────────────────────────
    SetUsbPower { port: u32, on: bool },
    SetWebConfiguratorAccess { public: bool },
    Reboot,
    UpdateFirmware,
    /// Empty `kinds` means the configured default.
    Backup { kinds: Vec<BackupKind>, folder: PathBuf },

    // ── Hosts ────────────────────────────────────────────────────────
    SetHostPolicy { mac: String, policy: PolicyChoice },

    // ── Escape hatch ─────────────────────────────────────────────────
    RawRequest {
        method: reqwest::Method,
        endpoint: String,
        body: Option<Value>,
    },
}

/// What a command leaves stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Invalidates {
    Nothing,
    Snapshot,
    Firmware,
}

impl Command {
    pub(crate) fn invalidates(&self) -> Invalidates {
        match self {
            Self::SetInterface { .. }
            | Self::SetPortForwarding { .. }
            | Self::SetUsbPower { .. }
            | Self::SetWebConfiguratorAccess { .. }
            | Self::SetHostPolicy { .. } => Invalidates::Snapshot,
            Self::RawRequest { method, .. } if method != reqwest::Method::GET => {
                Invalidates::Snapshot
            }
            Self::UpdateFirmware => Invalidates::Firmware,
            Self::Reboot | Self::Backup { .. } | Self::RawRequest { .. } => Invalidates::Nothing,
        }
    }
}

/// Result of a command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    Ok,
    /// Files written by a backup.
    Files(Vec<PathBuf>),
    /// Router answer to a raw request.
    Response(Value),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_invalidate_the_snapshot() {
        let cmd = Command::SetUsbPower { port: 1, on: false };
        assert_eq!(cmd.invalidates(), Invalidates::Snapshot);
    }

    #[test]
    fn raw_get_invalidates_nothing() {
        let cmd = Command::RawRequest {
            method: reqwest::Method::GET,
            endpoint: "/rci/show/version".into(),
            body: None,
        };
        assert_eq!(cmd.invalidates(), Invalidates::Nothing);

        let cmd = Command::RawRequest {
            method: reqwest::Method::POST,
            endpoint: "/rci/".into(),
            body: Some(Value::Array(Vec::new())),
        };
        assert_eq!(cmd.invalidates(), Invalidates::Snapshot);
    }

    #[test]
    fn firmware_update_refreshes_firmware_only() {
        assert_eq!(Command::UpdateFirmware.invalidates(), Invalidates::Firmware);
        assert_eq!(Command::Reboot.invalidates(), Invalidates::Nothing);
    }
}
