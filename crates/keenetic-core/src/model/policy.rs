// ── Hotspot access policies ──

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Keyword for "no named policy, internet allowed".
pub const POLICY_DEFAULT: &str = "default";
/// Keyword for "internet access denied".
pub const POLICY_NOT_INTERNET: &str = "not_internet";

/// A host's entry in `show rc ip hotspot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostPolicy {
    pub mac: String,
    pub access: Option<String>,
    pub policy: Option<String>,
}

impl HostPolicy {
    /// The choice this entry corresponds to.
    pub fn choice(&self) -> PolicyChoice {
        match (self.access.as_deref(), self.policy.as_deref()) {
            (Some("deny"), _) => PolicyChoice::NotInternet,
            (_, Some(name)) => PolicyChoice::Named(name.to_owned()),
            _ => PolicyChoice::Default,
        }
    }
}

/// What a user can pick for a host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyChoice {
    /// Permit, no named policy.
    Default,
    /// Deny internet access.
    NotInternet,
    /// Permit through a named IP policy (e.g. `Policy0`).
    Named(String),
}

impl PolicyChoice {
    /// Wire `access` value and optional policy name.
    pub fn access(&self) -> (&'static str, Option<&str>) {
        match self {
            Self::Default => ("permit", None),
            Self::NotInternet => ("deny", None),
            Self::Named(name) => ("permit", Some(name)),
        }
    }
}

impl FromStr for PolicyChoice {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            POLICY_DEFAULT => Self::Default,
            POLICY_NOT_INTERNET => Self::NotInternet,
            name => Self::Named(name.to_owned()),
        })
    }
}

impl fmt::Display for PolicyChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str(POLICY_DEFAULT),
            Self::NotInternet => f.write_str(POLICY_NOT_INTERNET),
            Self::Named(name) => f.write_str(name),
        }
    }
}
