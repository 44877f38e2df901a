//! Shared helpers for command handlers.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use keenetic_core::{Controller, Snapshot};

use crate::error::CliError;

/// The snapshot published on connect.
pub fn snapshot(controller: &Controller) -> Result<Arc<Snapshot>, CliError> {
    controller.snapshot().ok_or_else(|| CliError::Decode {
        message: "router returned no data".into(),
    })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal there is nobody to ask, so `--yes` becomes mandatory.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<serde_json::Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    parse_json(&contents, "from-file")
}

pub fn parse_json(raw: &str, field: &str) -> Result<serde_json::Value, CliError> {
    serde_json::from_str(raw).map_err(|e| CliError::Validation {
        field: field.into(),
        reason: format!("invalid JSON: {e}"),
    })
}

// ── Formatting ──────────────────────────────────────────────────────

pub fn or_dash(value: Option<&str>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or("-").to_owned()
}

pub fn bytes(value: Option<u64>) -> String {
    value.map_or_else(|| "-".into(), |b| bytesize::ByteSize::b(b).to_string())
}

/// Bits per second as a human-readable rate.
pub fn rate(value: Option<u64>) -> String {
    value.map_or_else(
        || "-".into(),
        |bps| format!("{}/s", bytesize::ByteSize::b(bps / 8)),
    )
}

pub fn uptime(seconds: Option<u64>) -> String {
    seconds.map_or_else(
        || "-".into(),
        |s| humantime::format_duration(Duration::from_secs(s)).to_string(),
    )
}

pub fn yes_no(value: bool) -> String {
    String::from(if value { "yes" } else { "no" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_is_human_readable() {
        assert_eq!(uptime(Some(3660)), "1h 1m");
        assert_eq!(uptime(None), "-");
    }

    #[test]
    fn empty_strings_render_as_dash() {
        assert_eq!(or_dash(Some("")), "-");
        assert_eq!(or_dash(Some("Giga")), "Giga");
    }

    #[test]
    fn json_errors_name_the_field() {
        let err = parse_json("{not json", "data").expect_err("invalid");
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "data"));
    }
}
