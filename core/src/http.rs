//! HTTP transport types and the pluggable sender boundary.
//!
//! # Design
//! Requests and responses are plain data. `Client` builds an `HttpRequest`
//! (URL, credentials, content type, body) and hands it to an `HttpSender`,
//! which performs the round-trip and returns the raw `HttpResponse`. The
//! sender is the only place that touches the network, so tests substitute a
//! recording fake and production code uses `UreqSender`.
//!
//! Bodies are bytes rather than `String` because multipart uploads carry
//! arbitrary file content.

use std::time::Duration;

use crate::error::SdkError;

/// HTTP method for a request. The service only exposes GET and POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by `Client::build_get` / `Client::build_post`; credentials are
/// already present in `headers`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// `status` is recorded for diagnostics only; the envelope inside `body`
/// decides whether a call succeeded.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// The minimal "send this request, return a response" capability.
///
/// Implementations must return `SdkError::Transport` for connection and read
/// failures and must not treat HTTP error status codes as failures.
pub trait HttpSender: Send + Sync {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, SdkError>;
}

/// Blocking sender backed by a `ureq` agent.
///
/// The agent pools connections internally and is cheap to share across
/// threads.
#[derive(Clone)]
pub struct UreqSender {
    agent: ureq::Agent,
}

impl UreqSender {
    pub fn new() -> Self {
        Self::from_config(None)
    }

    /// Sender whose every request fails once `timeout` has elapsed.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::from_config(Some(timeout))
    }

    fn from_config(timeout: Option<Duration>) -> Self {
        // Status codes are returned as data so the envelope can be read even
        // from 4xx/5xx responses.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqSender {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpSender for UreqSender {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, SdkError> {
        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(request.url.as_str());
                for (key, value) in &request.headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(request.url.as_str());
                for (key, value) in &request.headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                match request.body.as_deref() {
                    Some(body) => builder.send(body),
                    None => builder.send_empty(),
                }
            }
        };
        let mut response = result.map_err(|e| SdkError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| SdkError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let req = HttpRequest {
            method: HttpMethod::Post,
            url: "http://localhost/api/add-group".to_string(),
            headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
            body: None,
        };
        assert_eq!(req.header("content-type"), Some("text/plain"));
        assert_eq!(req.header("authorization"), None);
    }

    #[test]
    fn method_names_match_the_wire() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Post.as_str(), "POST");
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        let sender = UreqSender::with_timeout(Duration::from_secs(2));
        let req = HttpRequest {
            method: HttpMethod::Get,
            url: "http://127.0.0.1:1/api/get-groups".to_string(),
            headers: Vec::new(),
            body: None,
        };
        let err = sender.send(req).unwrap_err();
        assert!(matches!(err, SdkError::Transport(_)));
    }
}
