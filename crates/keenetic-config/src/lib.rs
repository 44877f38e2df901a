//! Shared configuration for Keenetic tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `keenetic_core::RouterConfig`. The CLI layers its
//! global flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use keenetic_core::{BackupKind, RouterConfig, TlsVerification};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Keyring service name; entries are keyed `<profile>/password`.
const KEYRING_SERVICE: &str = "keenetic";

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "KEENETIC_CONFIG";
/// Router password, checked before the keyring.
pub const PASSWORD_ENV: &str = "KEENETIC_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found in {}", path.display())]
    UnknownProfile { name: String, path: PathBuf },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named router profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                name: name.into(),
                path: config_path(),
            })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named router profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Router address, bare (`192.168.1.1`) or with a scheme.
    pub host: String,

    /// Web management port. Defaults to 443 with `ssl`, 80 otherwise.
    pub port: Option<u16>,

    #[serde(default)]
    pub ssl: bool,

    /// Verify the router certificate (only meaningful with `ssl`).
    #[serde(default)]
    pub verify_ssl: bool,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    #[serde(default = "default_username")]
    pub username: String,

    /// Password (plaintext, prefer keyring or env var).
    pub password: Option<String>,

    /// Full-data poll period in seconds (minimum 1).
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,

    /// Firmware and Wi-Fi credentials poll period in seconds.
    #[serde(default = "default_firmware_interval")]
    pub firmware_interval: u64,

    /// Fetch Wi-Fi credentials so QR payloads can be built.
    #[serde(default)]
    pub create_image_qr: bool,

    /// Backup kinds used when `backup` names none: `config`, `firmware`.
    #[serde(default = "default_backup_types")]
    pub backup_types: Vec<String>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

impl Profile {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            ssl: false,
            verify_ssl: false,
            ca_cert: None,
            username: default_username(),
            password: None,
            scan_interval: default_scan_interval(),
            firmware_interval: default_firmware_interval(),
            create_image_qr: false,
            backup_types: default_backup_types(),
            timeout: None,
        }
    }

    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(if self.ssl { 443 } else { 80 })
    }
}

fn default_username() -> String {
    "admin".into()
}
fn default_scan_interval() -> u64 {
    30
}
fn default_firmware_interval() -> u64 {
    1800
}
fn default_backup_types() -> Vec<String> {
    vec!["config".into()]
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `KEENETIC_CONFIG`, then platform conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("net", "keenetic", "keenetic").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("keenetic");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. `KEENETIC_`-prefixed env vars are merged
/// on top, nesting with `__` (e.g. `KEENETIC_DEFAULTS__TIMEOUT=10`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("KEENETIC_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/password"),
    )?)
}

/// Resolve the router password: env var, then keyring, then plaintext.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Env var
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(pw));
    }

    // 2. Keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

// ── RouterConfig translation ────────────────────────────────────────

/// Parse `backup_types` into backup kinds.
pub fn backup_kinds(types: &[String]) -> Result<Vec<BackupKind>, ConfigError> {
    types
        .iter()
        .map(|t| {
            t.parse::<BackupKind>().map_err(|reason| ConfigError::Validation {
                field: "backup_types".into(),
                reason,
            })
        })
        .collect()
}

/// Build a `RouterConfig` from a profile and an already resolved password.
pub fn router_config(profile: &Profile, password: SecretString) -> Result<RouterConfig, ConfigError> {
    let url = keenetic_api::router_url(&profile.host, profile.effective_port(), profile.ssl)
        .map_err(|e| ConfigError::Validation {
            field: "host".into(),
            reason: format!("{}: {e}", profile.host),
        })?;

    let tls = if !profile.verify_ssl {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut config = RouterConfig::new(url, profile.username.clone(), password);
    config.tls = tls;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or_else(default_timeout));
    config.scan_interval = Duration::from_secs(profile.scan_interval.max(1));
    config.firmware_interval = Duration::from_secs(profile.firmware_interval);
    config.wifi_interval = Duration::from_secs(profile.firmware_interval);
    config.wifi_credentials = profile.create_image_qr;
    config.backup_kinds = backup_kinds(&profile.backup_types)?;
    Ok(config)
}

/// Build a `RouterConfig` from a profile, resolving its password.
pub fn profile_to_router_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<RouterConfig, ConfigError> {
    let password = resolve_password(profile, profile_name)?;
    router_config(profile, password)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, body).expect("write config");
        path
    }

    #[test]
    fn profile_defaults_fill_missing_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(
            &dir,
            r#"
default_profile = "home"

[profiles.home]
host = "192.168.1.1"
"#,
        );

        let config = load_config_from(&path).expect("load");
        let home = config.profile("home").expect("profile");
        assert_eq!(config.default_profile.as_deref(), Some("home"));
        assert_eq!(home.username, "admin");
        assert_eq!(home.effective_port(), 80);
        assert_eq!(home.scan_interval, 30);
        assert_eq!(home.firmware_interval, 1800);
        assert_eq!(home.backup_types, vec!["config".to_string()]);
        assert!(!home.create_image_qr);
        assert_eq!(config.defaults.output, "table");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config_from(&dir.path().join("absent.toml")).expect("load");
        assert!(config.profiles.is_empty());
        assert!(matches!(
            config.profile("home"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn save_then_load_keeps_profile() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        let mut profile = Profile::new("router.lan");
        profile.ssl = true;
        profile.backup_types = vec!["config".into(), "firmware".into()];
        config.profiles.insert("default".into(), profile);
        save_config_to(&config, &path).expect("save");

        let loaded = load_config_from(&path).expect("load");
        let profile = loaded.profile("default").expect("profile");
        assert_eq!(profile.host, "router.lan");
        assert_eq!(profile.effective_port(), 443);
        assert_eq!(profile.backup_types.len(), 2);
    }

    #[test]
    fn router_config_from_profile() {
        let mut profile = Profile::new("192.168.1.1");
        profile.scan_interval = 0;
        profile.create_image_qr = true;
        profile.backup_types = vec!["firmware".into(), "config".into()];

        let config = router_config(&profile, SecretString::from("pw".to_string())).expect("config");
        assert_eq!(config.url.as_str(), "http://192.168.1.1/");
        assert_eq!(config.scan_interval, Duration::from_secs(1));
        assert_eq!(config.firmware_interval, Duration::from_secs(1800));
        assert!(config.wifi_credentials);
        assert_eq!(config.backup_kinds, vec![BackupKind::Firmware, BackupKind::Config]);
        assert_eq!(config.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn verify_ssl_uses_custom_ca() {
        let mut profile = Profile::new("router.lan");
        profile.ssl = true;
        profile.verify_ssl = true;
        profile.ca_cert = Some(PathBuf::from("/etc/ssl/router.pem"));

        let config = router_config(&profile, SecretString::from("pw".to_string())).expect("config");
        assert_eq!(config.url.as_str(), "https://router.lan/");
        assert_eq!(
            config.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/ssl/router.pem"))
        );
    }

    #[test]
    fn unknown_backup_type_is_rejected() {
        let err = backup_kinds(&["snapshot".into()]).expect_err("invalid");
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "backup_types"));
    }
}
