// Challenge-response authentication
//
// The router answers an unauthenticated `GET /auth` with 401 plus a realm
// and a one-time challenge. The login hash is
// `sha256_hex(challenge + md5_hex("user:realm:password"))`, posted back to
// `/auth`. On success the session cookie lands in the client's jar.

use md5::Md5;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::client::RouterClient;
use crate::error::Error;

const AUTH_PATH: &str = "/auth";
const REALM_HEADER: &str = "X-NDM-Realm";
const CHALLENGE_HEADER: &str = "X-NDM-Challenge";

/// Compute the login hash for one challenge.
pub fn challenge_response(username: &str, realm: &str, password: &str, challenge: &str) -> String {
    let digest = hex::encode(Md5::digest(format!("{username}:{realm}:{password}").as_bytes()));
    hex::encode(Sha256::digest(format!("{challenge}{digest}").as_bytes()))
}

/// Realm and challenge advertised by a 401 answer to `GET /auth`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Challenge {
    realm: String,
    token: String,
}

impl Challenge {
    fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let realm = headers.get(REALM_HEADER)?.to_str().ok()?;
        let token = headers.get(CHALLENGE_HEADER)?.to_str().ok()?;
        Some(Self {
            realm: realm.to_owned(),
            token: token.to_owned(),
        })
    }
}

impl RouterClient {
    /// Make sure the client holds a valid session.
    ///
    /// Probes `/auth`; when the router asks for a challenge, answers it
    /// exactly once. Returns `Ok(true)` when the final status is 200 and
    /// `Ok(false)` for any other non-401 status.
    pub async fn authenticate(&self) -> Result<bool, Error> {
        let first = self.send(Method::GET, AUTH_PATH, None).await?;
        if first.status() != StatusCode::UNAUTHORIZED {
            return Ok(first.status() == StatusCode::OK);
        }

        let challenge =
            Challenge::from_headers(first.headers()).ok_or_else(|| Error::Authentication {
                message: "router refused the session without a login challenge".into(),
            })?;

        debug!(realm = %challenge.realm, "answering login challenge");
        let hash = challenge_response(
            self.username(),
            &challenge.realm,
            self.password().expose_secret(),
            &challenge.token,
        );
        let body = json!({
            "login": self.username(),
            "password": hash,
        });

        let resp = self.send(Method::POST, AUTH_PATH, Some(&body)).await?;
        match resp.status() {
            StatusCode::UNAUTHORIZED => Err(Error::Authentication {
                message: "invalid username or password".into(),
            }),
            status => {
                debug!(status = status.as_u16(), "login answered");
                Ok(status == StatusCode::OK)
            }
        }
    }
}
