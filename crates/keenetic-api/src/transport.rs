// Shared transport configuration for building reqwest::Client instances.
//
// TLS, timeout, and cookie settings for the router session live here so
// the client module stays focused on request/response mechanics.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use url::Url;

use crate::error::Error;

const USER_AGENT: &str = concat!("keenetic-api/", env!("CARGO_PKG_VERSION"));

/// TLS verification mode (api-level mirror of core's TlsVerification).
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (routers ship self-signed certificates).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub cookie_jar: Option<Arc<Jar>>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::DangerAcceptInvalid,
            timeout: Duration::from_secs(30),
            cookie_jar: None,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        if let Some(ref jar) = self.cookie_jar {
            builder = builder.cookie_provider(Arc::clone(jar));
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Create a config with a fresh cookie jar (for session auth).
    pub fn with_cookie_jar(mut self) -> Self {
        self.cookie_jar = Some(Arc::new(Jar::default()));
        self
    }
}

/// Build the router's web management base URL.
///
/// `host` may be a bare address (`192.168.1.1`) or already carry a scheme
/// (`http://my.keenetic.net`); an explicit scheme wins over `ssl`.
pub fn router_url(host: &str, port: u16, ssl: bool) -> Result<Url, Error> {
    let host = host.trim().trim_end_matches('/');
    let mut url = if host.contains("://") {
        Url::parse(host)?
    } else {
        let scheme = if ssl { "https" } else { "http" };
        Url::parse(&format!("{scheme}://{host}"))?
    };
    url.set_port(Some(port))
        .map_err(|()| Error::InvalidUrl(url::ParseError::InvalidPort))?;
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::router_url;

    #[test]
    fn bare_host_gets_scheme_from_ssl_flag() {
        let url = router_url("192.168.1.1", 80, false).expect("valid url");
        assert_eq!(url.as_str(), "http://192.168.1.1/");

        let url = router_url("192.168.1.1", 8443, true).expect("valid url");
        assert_eq!(url.as_str(), "https://192.168.1.1:8443/");
    }

    #[test]
    fn explicit_scheme_is_kept() {
        let url = router_url("http://my.keenetic.net/", 8080, true).expect("valid url");
        assert_eq!(url.as_str(), "http://my.keenetic.net:8080/");
    }
}
