//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use keenetic_config::ConfigError;
use keenetic_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const UNSUPPORTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to router at {url}")]
    #[diagnostic(
        code(keenetic::connection_failed),
        help(
            "Check that the router is reachable and the web management port is open.\n\
             URL: {url}\n\
             Try: keenetic system --host 192.168.1.1"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(keenetic::auth_failed),
        help(
            "Verify the login and password for this router.\n\
             Run: keenetic config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(keenetic::no_credentials),
        help(
            "Store one with: keenetic config set-password --profile {profile}\n\
             Or set the KEENETIC_PASSWORD environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(keenetic::not_found),
        help("Run: keenetic {list_command} to see what the router reports")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("Router API error{}: {message}", status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    #[diagnostic(code(keenetic::api_error))]
    ApiError { status: Option<u16>, message: String },

    #[error("Unexpected router response: {message}")]
    #[diagnostic(
        code(keenetic::decode),
        help("Run with -vv to log the raw response.")
    )]
    Decode { message: String },

    // ── Unsupported ──────────────────────────────────────────────────

    #[error("Operation '{operation}' is not supported by this router")]
    #[diagnostic(code(keenetic::unsupported), help("This command requires {required}."))]
    Unsupported { operation: String, required: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(keenetic::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(keenetic::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: keenetic config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No router configured")]
    #[diagnostic(
        code(keenetic::no_config),
        help(
            "Create a profile with: keenetic config init\n\
             Or pass --host. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(keenetic::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(keenetic::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(keenetic::timeout),
        help("Increase timeout with --timeout or check router responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(keenetic::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML rendering failed: {0}")]
    #[diagnostic(code(keenetic::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. } => exit_code::USAGE,
            Self::Unsupported { .. } => exit_code::UNSUPPORTED,
            Self::Config(inner) => match inner.as_ref() {
                ConfigError::NoCredentials { .. } => exit_code::AUTH,
                ConfigError::Validation { .. } | ConfigError::UnknownProfile { .. } => {
                    exit_code::USAGE
                }
                _ => exit_code::GENERAL,
            },
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

/// `list` subcommand that shows entities of a core entity type.
fn list_command(entity_type: &str) -> String {
    match entity_type {
        "Interface" => "interfaces list",
        "Port forwarding rule" => "port-forwarding list",
        "USB port" => "usb list",
        "Host" => "clients list",
        "Access point" => "wifi list",
        _ => "status",
    }
    .into()
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::RouterDisconnected => CliError::ConnectionFailed {
                url: "(disconnected)".into(),
                source: "Router connection was lost".into(),
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: list_command(&entity_type),
                resource_type: entity_type,
                identifier,
            },

            CoreError::Unsupported {
                operation,
                required,
            } => CliError::Unsupported {
                operation,
                required,
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Decode { message } => CliError::Decode { message },

            CoreError::Api { message, status } => CliError::ApiError { status, message },

            CoreError::Io { message } => CliError::Io(std::io::Error::other(message)),

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_class() {
        let auth: CliError = CoreError::AuthenticationFailed {
            message: "rejected".into(),
        }
        .into();
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let missing: CliError = CoreError::not_found("Interface", "Wireguard9").into();
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);

        let timeout: CliError = CoreError::Timeout { timeout_secs: 30 }.into();
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);

        let conn: CliError = CoreError::RouterDisconnected.into();
        assert_eq!(conn.exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn not_found_points_at_list_command() {
        let err: CliError = CoreError::not_found("Port forwarding rule", "7").into();
        match err {
            CliError::NotFound { list_command, .. } => {
                assert_eq!(list_command, "port-forwarding list");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn api_error_message_includes_status() {
        let err = CliError::ApiError {
            status: Some(403),
            message: "forbidden".into(),
        };
        assert_eq!(err.to_string(), "Router API error (HTTP 403): forbidden");
    }
}
