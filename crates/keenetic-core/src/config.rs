// ── Runtime connection configuration ──
//
// These types describe *how* to talk to one Keenetic router and how often
// to poll it. They carry credential data and tuning, but never touch disk.
// The CLI constructs a `RouterConfig` and hands it in.

use std::time::Duration;

use keenetic_api::BackupKind;
use secrecy::SecretString;
use url::Url;

/// Default full-data poll period.
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(30);
/// Lower bound for the full-data poll period.
pub const MIN_SCAN_INTERVAL: Duration = Duration::from_secs(1);
/// Default firmware and Wi-Fi credentials poll period.
pub const DEFAULT_SLOW_INTERVAL: Duration = Duration::from_secs(1800);
/// Default per-request and per-cycle timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification. Routers ship self-signed certificates.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for connecting to a single router.
///
/// Built by the CLI, passed to `Controller`: core never reads config files.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Web management URL (e.g. `http://192.168.1.1:80`).
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    pub tls: TlsVerification,
    /// Per-request timeout; also bounds one poll cycle.
    pub timeout: Duration,
    /// Full-data poll period. `Duration::ZERO` disables the task.
    pub scan_interval: Duration,
    /// Firmware status poll period. `Duration::ZERO` disables the task.
    pub firmware_interval: Duration,
    /// Wi-Fi credentials poll period. `Duration::ZERO` disables the task.
    pub wifi_interval: Duration,
    /// Fetch Wi-Fi credentials (needed for QR payloads). Router mode only.
    pub wifi_credentials: bool,
    /// Backup kinds used when a backup command names none.
    pub backup_kinds: Vec<BackupKind>,
}

impl RouterConfig {
    pub fn new(url: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            url,
            username: username.into(),
            password,
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
            scan_interval: DEFAULT_SCAN_INTERVAL,
            firmware_interval: DEFAULT_SLOW_INTERVAL,
            wifi_interval: DEFAULT_SLOW_INTERVAL,
            wifi_credentials: false,
            backup_kinds: vec![BackupKind::Config],
        }
    }

    /// Full-data period clamped to [`MIN_SCAN_INTERVAL`], or `None` if polling is off.
    pub fn effective_scan_interval(&self) -> Option<Duration> {
        (!self.scan_interval.is_zero()).then(|| self.scan_interval.max(MIN_SCAN_INTERVAL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RouterConfig {
        RouterConfig::new(
            "http://192.168.1.1".parse().expect("valid url"),
            "admin",
            SecretString::from("pw".to_string()),
        )
    }

    #[test]
    fn defaults_follow_router_conventions() {
        let cfg = config();
        assert_eq!(cfg.scan_interval, Duration::from_secs(30));
        assert_eq!(cfg.firmware_interval, Duration::from_secs(1800));
        assert_eq!(cfg.backup_kinds, vec![BackupKind::Config]);
        assert!(!cfg.wifi_credentials);
    }

    #[test]
    fn scan_interval_is_clamped_to_minimum() {
        let mut cfg = config();
        cfg.scan_interval = Duration::from_millis(200);
        assert_eq!(cfg.effective_scan_interval(), Some(MIN_SCAN_INTERVAL));

        cfg.scan_interval = Duration::ZERO;
        assert_eq!(cfg.effective_scan_interval(), None);
    }
}
