// Response decoding
//
// The router answers in one of two encodings: plain JSON, or a legacy
// script body made of `key = "value";` assignments. Everything else is
// handed back as an opaque failure object so callers decide what to do.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::error::Error;

const JSON_TYPE: &str = "application/json";
const SCRIPT_TYPES: &[&str] = &["application/javascript", "text/javascript"];

/// A router response after content-type detection.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedBody {
    /// `application/json` body.
    Json(Value),
    /// Legacy script body, decoded into ordered key/value pairs.
    Assignments(IndexMap<String, String>),
    /// Unexpected status or content type.
    Failure(FailureResponse),
}

/// Opaque failure object for responses we cannot decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl DecodedBody {
    /// Decode a response given its status, `Content-Type` header and body text.
    pub fn from_parts(status: u16, content_type: Option<&str>, body: String) -> Result<Self, Error> {
        let essence = content_type.map(mime_essence);

        if status != 200 {
            return Ok(Self::Failure(FailureResponse {
                status,
                content_type: content_type.map(String::from),
                body,
            }));
        }

        match essence.as_deref() {
            Some(JSON_TYPE) => serde_json::from_str(&body).map(Self::Json).map_err(|e| {
                Error::Decode {
                    message: format!("{e} (body preview: {:?})", preview(&body)),
                    body: body.clone(),
                }
            }),
            Some(ct) if SCRIPT_TYPES.contains(&ct) => Ok(Self::Assignments(parse_assignments(&body))),
            _ => Ok(Self::Failure(FailureResponse {
                status,
                content_type: content_type.map(String::from),
                body,
            })),
        }
    }

    /// Read a `reqwest::Response` to completion and decode it.
    pub async fn from_response(resp: reqwest::Response) -> Result<Self, Error> {
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = resp.text().await.map_err(Error::Transport)?;
        debug!(status, content_type = ?content_type, "response received");
        Self::from_parts(status, content_type.as_deref(), body)
    }

    /// Collapse into a JSON value.
    ///
    /// Assignment lists become a flat object of strings. Failure objects
    /// become `Error::Authentication` (401) or `Error::Api`.
    pub fn into_json(self) -> Result<Value, Error> {
        match self {
            Self::Json(value) => Ok(value),
            Self::Assignments(pairs) => Ok(Value::Object(
                pairs.into_iter().map(|(k, v)| (k, Value::String(v))).collect(),
            )),
            Self::Failure(failure) if failure.status == 401 => Err(Error::Authentication {
                message: "session rejected by router (HTTP 401)".into(),
            }),
            Self::Failure(failure) => Err(Error::Api {
                status: failure.status,
                message: failure.describe(),
            }),
        }
    }
}

impl FailureResponse {
    /// Short human-readable summary.
    pub fn describe(&self) -> String {
        let preview = preview(&self.body);
        match &self.content_type {
            Some(ct) => format!("unexpected response ({ct}): {preview}"),
            None => format!("unexpected response: {preview}"),
        }
    }
}

pub(crate) fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}

fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Decode the legacy `key = "value";` assignment list.
///
/// Rows are split on `;`, then each row on its first `=`. Keys are
/// right-trimmed, values left-trimmed, and double quotes are removed from
/// values unless the value is an object literal (starts with `{`).
pub fn parse_assignments(body: &str) -> IndexMap<String, String> {
    let cleaned = body.replace("\n\t", "").replace('\n', "");
    let mut pairs = IndexMap::new();

    for row in cleaned.split(';').filter(|row| !row.is_empty()) {
        let Some((key, value)) = row.split_once('=') else {
            debug!(row, "skipping assignment row without '='");
            continue;
        };
        let key = key.trim_end();
        let value = value.trim_start();
        let value = if value.starts_with('{') {
            value.to_owned()
        } else {
            value.replace('"', "")
        };
        pairs.insert(key.to_owned(), value);
    }

    pairs
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn assignments_strip_quotes_and_whitespace() {
        let pairs = parse_assignments("var firmware = \"4.1.7\";\n\tvar sandbox = \"stable\";\n");
        assert_eq!(pairs.get("var firmware").map(String::as_str), Some("4.1.7"));
        assert_eq!(pairs.get("var sandbox").map(String::as_str), Some("stable"));
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn assignments_keep_object_literals_verbatim() {
        let pairs = parse_assignments(r#"components = {"name": "base"};"#);
        assert_eq!(
            pairs.get("components").map(String::as_str),
            Some(r#"{"name": "base"}"#)
        );
    }

    #[test]
    fn assignments_split_on_first_equals_only() {
        let pairs = parse_assignments("url = \"a=b\";");
        assert_eq!(pairs.get("url").map(String::as_str), Some("a=b"));
    }

    #[test]
    fn assignments_skip_rows_without_equals() {
        let pairs = parse_assignments("garbage;;key = value;");
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs.get("key").map(String::as_str), Some("value"));
    }

    #[test]
    fn json_content_type_with_charset_is_parsed() {
        let decoded = DecodedBody::from_parts(
            200,
            Some("application/json; charset=utf-8"),
            r#"{"cpuload": 7}"#.into(),
        )
        .expect("valid json");
        assert_eq!(decoded, DecodedBody::Json(json!({"cpuload": 7})));
    }

    #[test]
    fn script_content_type_uses_assignment_decoder() {
        let decoded = DecodedBody::from_parts(200, Some("application/javascript"), "a = \"1\";".into())
            .expect("decodes");
        let pairs = match decoded {
            DecodedBody::Assignments(pairs) => pairs,
            other => panic!("expected assignments, got {other:?}"),
        };
        assert_eq!(pairs.get("a").map(String::as_str), Some("1"));
    }

    #[test]
    fn unknown_content_type_is_a_failure_object() {
        let decoded =
            DecodedBody::from_parts(200, Some("text/html"), "<html/>".into()).expect("no error");
        assert!(matches!(decoded, DecodedBody::Failure(ref f) if f.status == 200));
    }

    #[test]
    fn non_200_status_is_a_failure_object() {
        let decoded = DecodedBody::from_parts(500, Some("application/json"), "{}".into())
            .expect("no error");
        let err = decoded.into_json().expect_err("failure collapses to error");
        assert!(matches!(err, Error::Api { status: 500, .. }));
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let err = DecodedBody::from_parts(200, Some("application/json"), "{nope".into())
            .expect_err("malformed json");
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn assignments_collapse_into_string_object() {
        let json = DecodedBody::Assignments(parse_assignments("k = \"v\";"))
            .into_json()
            .expect("object");
        assert_eq!(json, json!({"k": "v"}));
    }
}
