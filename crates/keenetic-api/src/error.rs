use thiserror::Error;

/// Top-level error type for the `keenetic-api` crate.
///
/// Covers every failure mode of the router management API:
/// authentication, transport, undecodable responses, and backup I/O.
/// `keenetic-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, or the router keeps answering 401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Router API ──────────────────────────────────────────────────
    /// The router answered with a status or content type we cannot use.
    #[error("Router API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// Response body could not be decoded, with the raw body for debugging.
    #[error("Decode error: {message}")]
    Decode { message: String, body: String },

    // ── Backup ──────────────────────────────────────────────────────
    /// Writing a downloaded backup to disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` if this error means the session or credentials were rejected.
    pub fn is_auth_error(&self) -> bool {
        match self {
            Self::Authentication { .. } => true,
            Self::Api { status, .. } => *status == 401,
            _ => false,
        }
    }

    /// Returns `true` if this is a transient error that the next poll cycle may not hit.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if the router answered 404 for the requested path.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn unauthorized_api_status_counts_as_auth_error() {
        let err = Error::Api {
            status: 401,
            message: "unauthorized".into(),
        };
        assert!(err.is_auth_error());
        assert!(!err.is_not_found());
    }

    #[test]
    fn missing_path_is_not_found() {
        let err = Error::Api {
            status: 404,
            message: "/rci/show/nothing".into(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_auth_error());
    }

    #[test]
    fn decode_errors_are_not_transient() {
        let err = Error::Decode {
            message: "not an array".into(),
            body: String::new(),
        };
        assert!(!err.is_transient());
        assert!(!err.is_auth_error());
    }
}
