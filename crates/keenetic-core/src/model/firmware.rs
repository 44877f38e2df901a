// ── Firmware status ──

use serde::{Deserialize, Serialize};

/// Map a firmware sandbox to its release-notes channel.
///
/// `stable → main`, `preview → preview`, `draft → dev`.
pub fn release_notes_channel(sandbox: &str) -> Option<&'static str> {
    match sandbox {
        "stable" => Some("main"),
        "preview" => Some("preview"),
        "draft" => Some("dev"),
        _ => None,
    }
}

/// Installed vs. available firmware, refreshed on the slow poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareStatus {
    pub installed: Option<String>,
    pub available: Option<String>,
    /// Update channel: `stable`, `preview` or `draft`.
    pub sandbox: Option<String>,
    pub title: Option<String>,
    pub update_available: bool,
}

impl FirmwareStatus {
    pub fn release_notes_channel(&self) -> Option<&'static str> {
        self.sandbox.as_deref().and_then(release_notes_channel)
    }

    /// Version whose release notes are worth showing: the available one if newer.
    pub fn notes_version(&self) -> Option<&str> {
        if self.update_available {
            self.available.as_deref()
        } else {
            self.installed.as_deref()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sandbox_maps_to_channel() {
        assert_eq!(release_notes_channel("stable"), Some("main"));
        assert_eq!(release_notes_channel("preview"), Some("preview"));
        assert_eq!(release_notes_channel("draft"), Some("dev"));
        assert_eq!(release_notes_channel("nightly"), None);
    }
}
