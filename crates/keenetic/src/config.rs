//! CLI configuration: thin wrapper around `keenetic_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--host, --port, --username, etc.).

use std::time::Duration;

use keenetic_core::RouterConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use keenetic_config::{
    Config, Profile, backup_kinds, config_path, load_config_or_default, save_config,
    store_password,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Comma-separated profile names for diagnostics.
pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Apply CLI flag overrides on top of a profile.
fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if let Some(port) = global.port {
        profile.port = Some(port);
    }
    if global.ssl {
        profile.ssl = true;
    }
    if let Some(ref username) = global.username {
        profile.username.clone_from(username);
    }
    if global.insecure {
        profile.verify_ssl = false;
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
}

/// Build a `RouterConfig` from the config file, profile, and CLI overrides.
///
/// Without a matching profile, `--host` alone is enough as long as a
/// password can be resolved (env var or keyring).
pub fn resolve_router_config(global: &GlobalOpts) -> Result<RouterConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        None => {
            let host = global.host.as_deref().ok_or_else(|| CliError::NoConfig {
                path: config_path().display().to_string(),
            })?;
            let mut profile = Profile::new(host);
            profile.timeout = Some(cfg.defaults.timeout);
            profile
        }
    };

    apply_overrides(&mut profile, global);
    Ok(keenetic_config::profile_to_router_config(
        &profile,
        &profile_name,
    )?)
}

/// Strip the poll loops from a config for a single request-response session.
pub fn oneshot(mut config: RouterConfig) -> RouterConfig {
    config.scan_interval = Duration::ZERO;
    config.firmware_interval = Duration::ZERO;
    config.wifi_interval = Duration::ZERO;
    config
}
