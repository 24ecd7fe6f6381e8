//! Blocking HTTP transport over reqwest
//!
//! Non-2xx statuses are delivered as data in the `ResponseContract`; `Err` is
//! reserved for exchanges that produced no response at all. Timeouts are
//! enforced here, never in the core.

use std::collections::HashMap;
use std::time::Instant;

use apicheck_core::transport::{RequestSpec, ResponseContract, Transport, TransportError};
use apicheck_core::Config;

/// reqwest-backed transport with a base URL and default headers.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
    default_headers: HashMap<String, String>,
}

impl HttpTransport {
    /// Build a transport with a 10 second request timeout.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the underlying client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        default_headers: HashMap<String, String>,
    ) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            default_headers,
        })
    }

    /// Transport configured from a project config.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the underlying client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        Self::new(config.base_url.clone(), config.headers.clone())
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &RequestSpec) -> Result<ResponseContract, TransportError> {
        let url = build_url(&self.base_url, request);
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|_| TransportError(format!("invalid HTTP method {:?}", request.method)))?;

        let mut req = self.client.request(method, &url);
        for (key, value) in self.default_headers.iter().chain(request.headers.iter()) {
            // Skip header values that are invalid in HTTP; they never reach
            // the server anyway.
            if reqwest::header::HeaderValue::from_str(value).is_ok() {
                req = req.header(key, value);
            }
        }
        for (key, value) in &request.query {
            req = req.query(&[(key, value)]);
        }

        let start = Instant::now();
        let resp = req.send().map_err(|e| TransportError(e.to_string()))?;
        let elapsed = start.elapsed().as_secs_f64();

        let status = resp.status().as_u16();
        let status_text = resp.status().canonical_reason().unwrap_or("").to_string();
        let content_type = resp
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);

        let body_text = resp.text().unwrap_or_default();

        Ok(ResponseContract {
            status,
            status_text,
            content_type,
            body: parse_body(&body_text),
            elapsed,
        })
    }
}

fn build_url(base_url: &str, request: &RequestSpec) -> String {
    format!("{base_url}{}", request.resolved_path())
}

/// Empty bodies are `Null`; bodies that are not valid JSON are preserved
/// verbatim as a JSON string so extraction can still see them.
fn parse_body(text: &str) -> serde_json::Value {
    if text.is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| serde_json::Value::String(text.to_string()))
}
