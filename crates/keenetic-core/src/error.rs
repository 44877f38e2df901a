// ── Core error types ──
//
// User-facing errors from keenetic-core. Consumers never see HTTP status
// codes or JSON parse failures directly: the `From<keenetic_api::Error>`
// impl translates transport-layer errors into domain variants.
//
// Partial data is not an error. A section missing from a batch answer
// becomes `None` in the snapshot and is listed in `missing_sections`.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to router at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Router disconnected")]
    RouterDisconnected,

    #[error("Router request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Unexpected router response: {message}")]
    Decode { message: String },

    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Operation not supported: {operation} (requires {required})")]
    Unsupported { operation: String, required: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("Router API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    #[error("I/O error: {message}")]
    Io { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub fn not_found(entity_type: &str, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            identifier: identifier.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<keenetic_api::Error> for CoreError {
    fn from(err: keenetic_api::Error) -> Self {
        if err.is_not_found() {
            return CoreError::NotFound {
                entity_type: "Resource".into(),
                identifier: err.to_string(),
            };
        }
        match err {
            keenetic_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            keenetic_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            keenetic_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            keenetic_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            keenetic_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            keenetic_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            keenetic_api::Error::Decode { message, body: _ } => CoreError::Decode { message },
            keenetic_api::Error::Io(e) => CoreError::Io {
                message: e.to_string(),
            },
        }
    }
}
