//! Collaborator seam: request specs, normalized responses, transport trait
//!
//! The core never talks HTTP. It hands a `RequestSpec` to a `Transport` and
//! gets back a `ResponseContract` — status and body are always data, a
//! non-2xx status is never an error.

use std::collections::{BTreeMap, HashMap};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A request to be issued by the transport collaborator.
///
/// `path` is a template with `{name}` placeholders resolved from
/// `path_params`. Query parameters are kept sorted for deterministic URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RequestSpec {
    pub method: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub path_params: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub query: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
}

impl RequestSpec {
    /// Operation label for reports: `"GET /orgs/{org}"`.
    #[must_use]
    pub fn operation(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    /// Path with every `{name}` placeholder substituted.
    #[must_use]
    pub fn resolved_path(&self) -> String {
        let mut path = self.path.clone();
        for (name, value) in &self.path_params {
            path = path.replace(&format!("{{{name}}}"), value);
        }
        path
    }

    /// Snapshot of the resolved request, for reports and reproduction files.
    #[must_use]
    pub fn snapshot(&self) -> RequestSnapshot {
        let mut url = self.resolved_path();
        if !self.query.is_empty() {
            let qs: Vec<String> = self
                .query
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            url.push('?');
            url.push_str(&qs.join("&"));
        }
        RequestSnapshot {
            method: self.method.clone(),
            url,
            headers: self.headers.clone(),
        }
    }
}

/// Resolved request as issued, kept for reproduction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RequestSnapshot {
    pub method: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
}

/// Normalized response. Immutable once received; discarded after extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseContract {
    pub status: u16,
    /// Canonical reason phrase, e.g. "Unsupported Media Type".
    pub status_text: String,
    /// Content-Type header as received, parameters included.
    pub content_type: Option<String>,
    /// Parsed body. Empty bodies are `Null`; a body that is not valid JSON
    /// is preserved verbatim as a JSON string.
    pub body: serde_json::Value,
    /// Wall-clock seconds spent on the request.
    pub elapsed: f64,
}

impl ResponseContract {
    /// Media type with parameters stripped: `"application/json; charset=utf-8"`
    /// compares as `"application/json"`.
    #[must_use]
    pub fn media_type(&self) -> Option<&str> {
        self.content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .map(str::trim)
    }
}

/// The transport collaborator. Implementations must deliver status and body
/// for any completed exchange; `Err` is reserved for failures to exchange at
/// all (connection refused, timeout, invalid request).
pub trait Transport {
    /// Issue one request and normalize its response.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` when no response could be obtained.
    fn send(&self, request: &RequestSpec) -> Result<ResponseContract, TransportError>;
}

/// Opaque transport diagnostic, propagated verbatim into the verdict stream.
#[derive(Debug, Clone, thiserror::Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> RequestSpec {
        RequestSpec {
            method: "GET".to_string(),
            path: "/orgs/{org}/repos".to_string(),
            path_params: HashMap::from([("org".to_string(), "cucumber".to_string())]),
            query: BTreeMap::from([
                ("per_page".to_string(), "100".to_string()),
                ("sort".to_string(), "full_name".to_string()),
            ]),
            headers: HashMap::new(),
        }
    }

    #[test]
    fn operation_label_keeps_template() {
        assert_eq!(spec().operation(), "GET /orgs/{org}/repos");
    }

    #[test]
    fn resolved_path_substitutes_placeholders() {
        assert_eq!(spec().resolved_path(), "/orgs/cucumber/repos");
    }

    #[test]
    fn snapshot_includes_sorted_query() {
        let snap = spec().snapshot();
        assert_eq!(snap.url, "/orgs/cucumber/repos?per_page=100&sort=full_name");
        assert_eq!(snap.method, "GET");
    }

    #[test]
    fn media_type_strips_parameters() {
        let response = ResponseContract {
            status: 200,
            status_text: "OK".to_string(),
            content_type: Some("application/json; charset=utf-8".to_string()),
            body: serde_json::Value::Null,
            elapsed: 0.05,
        };
        assert_eq!(response.media_type(), Some("application/json"));
    }
}
