// Router HTTP client
//
// Wraps `reqwest::Client` with the router base URL, the login credentials
// and the session cookie jar. Endpoint groups (batch queries, writes,
// backups) are implemented as inherent methods in separate files to keep
// this module focused on transport mechanics.

use reqwest::Method;
use secrecy::SecretString;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::decode::DecodedBody;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Session-scoped HTTP client for one Keenetic router.
///
/// Owns the credentials and the cookie-carrying `reqwest::Client`. Every
/// API call first runs [`RouterClient::authenticate`], which is a single
/// cheap `GET /auth` while the session cookie is still valid.
#[derive(Clone)]
pub struct RouterClient {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: SecretString,
}

impl std::fmt::Debug for RouterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterClient")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl RouterClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// automatically (the router session lives in a cookie).
    pub fn new(
        base_url: Url,
        username: String,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url,
            username,
            password,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        username: String,
        password: SecretString,
    ) -> Self {
        Self {
            http,
            base_url,
            username,
            password,
        }
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The router base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Login name used for the challenge-response handshake.
    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &SecretString {
        &self.password
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Resolve an absolute router path such as `/rci/show/system`.
    pub fn url(&self, endpoint: &str) -> Result<Url, Error> {
        self.base_url.join(endpoint).map_err(Error::InvalidUrl)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a request without session handling and return the raw response.
    pub(crate) async fn send(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, Error> {
        let url = self.url(endpoint)?;
        match body {
            Some(body) => debug!("{method} {url} {body}"),
            None => debug!("{method} {url}"),
        }

        let mut builder = self.http.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let resp = builder.send().await.map_err(Error::Transport)?;
        debug!(status = resp.status().as_u16(), "router answered");
        Ok(resp)
    }

    /// Send a request without session handling and decode the response.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<DecodedBody, Error> {
        let resp = self.send(method, endpoint, body).await?;
        DecodedBody::from_response(resp).await
    }

    /// Ensure a session, then send the request and decode the response.
    ///
    /// The decoded body may be a failure object; use the `*_json` helpers
    /// when only a successful JSON answer is acceptable.
    pub async fn api(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<DecodedBody, Error> {
        self.authenticate().await?;
        self.request(method, endpoint, body).await
    }

    /// Authenticated GET returning JSON.
    pub async fn get_json(&self, endpoint: &str) -> Result<Value, Error> {
        self.api(Method::GET, endpoint, None).await?.into_json()
    }

    /// Authenticated POST with a JSON body, returning JSON.
    pub async fn post_json(&self, endpoint: &str, body: &Value) -> Result<Value, Error> {
        self.api(Method::POST, endpoint, Some(body))
            .await?
            .into_json()
    }
}
