//! Authenticated transport for the Casdoor API.
//!
//! # Design
//! `Client` holds immutable configuration plus a shared `HttpSender`. Every
//! call is split the same way: a `build_*` method produces an `HttpRequest`
//! carrying Basic credentials, the sender performs the round-trip, and the
//! envelope codec interprets the body. No call mutates the client, so one
//! instance can be cloned or shared across threads freely.
//!
//! HTTP status codes are never inspected here. Only the envelope `status`
//! decides success.

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

use crate::body::{self, BodyMode, CONTENT_TYPE_TEXT};
use crate::config::ClientConfig;
use crate::envelope::{self, Response};
use crate::error::SdkError;
use crate::http::{HttpMethod, HttpRequest, HttpSender, UreqSender};

/// Blocking client for one Casdoor organization and application.
#[derive(Clone)]
pub struct Client {
    endpoint: String,
    client_id: String,
    certificate: String,
    organization_name: String,
    application_name: String,
    authorization: String,
    sender: Arc<dyn HttpSender>,
}

impl Client {
    /// Client that talks to the network through a default `UreqSender`.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_sender(config, UreqSender::new())
    }

    /// Client that routes every request through `sender`.
    pub fn with_sender<S: HttpSender + 'static>(config: ClientConfig, sender: S) -> Self {
        Self::with_shared_sender(config, Arc::new(sender))
    }

    pub fn with_shared_sender(config: ClientConfig, sender: Arc<dyn HttpSender>) -> Self {
        let credentials = format!("{}:{}", config.client_id, config.client_secret);
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            client_id: config.client_id,
            certificate: config.certificate,
            organization_name: config.organization_name,
            application_name: config.application_name,
            authorization: format!("Basic {}", STANDARD.encode(credentials)),
            sender,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// PEM public key for verifying tokens issued by the service.
    pub fn certificate(&self) -> &str {
        &self.certificate
    }

    pub fn organization_name(&self) -> &str {
        &self.organization_name
    }

    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    /// `<endpoint>/<action>?<query>`, parameters URL-encoded in the given
    /// order.
    pub fn get_url(&self, action: &str, query: &[(&str, String)]) -> String {
        let mut url = format!("{}/{action}", self.endpoint);
        if !query.is_empty() {
            // Infallible for string pairs.
            let encoded = serde_urlencoded::to_string(query).unwrap_or_default();
            url.push('?');
            url.push_str(&encoded);
        }
        url
    }

    pub fn build_get(&self, url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: vec![("authorization".to_string(), self.authorization.clone())],
            body: None,
        }
    }

    /// An empty `content_type` falls back to `text/plain;charset=UTF-8`.
    pub fn build_post(&self, url: &str, content_type: &str, body: Vec<u8>) -> HttpRequest {
        let content_type = if content_type.is_empty() {
            CONTENT_TYPE_TEXT
        } else {
            content_type
        };
        HttpRequest {
            method: HttpMethod::Post,
            url: url.to_string(),
            headers: vec![
                ("authorization".to_string(), self.authorization.clone()),
                ("content-type".to_string(), content_type.to_string()),
            ],
            body: Some(body),
        }
    }

    /// GET `url` and return the body verbatim.
    pub fn send_get(&self, url: &str) -> Result<Vec<u8>, SdkError> {
        debug!(method = "GET", url, "sending request");
        let response = self.sender.send(self.build_get(url))?;
        debug!(status = response.status, bytes = response.body.len(), "response received");
        Ok(response.body)
    }

    /// POST `body` to `url` and return the response body verbatim.
    pub fn send_post(
        &self,
        url: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<Vec<u8>, SdkError> {
        debug!(method = "POST", url, content_type, "sending request");
        let response = self.sender.send(self.build_post(url, content_type, body))?;
        debug!(status = response.status, bytes = response.body.len(), "response received");
        Ok(response.body)
    }

    /// GET `url` and decode an ok envelope.
    pub fn do_get_response(&self, url: &str) -> Result<Response, SdkError> {
        let raw = self.send_get(url)?;
        envelope::decode_checked(&raw)
    }

    /// GET `url` and return only the envelope's `data`, re-serialized.
    pub fn do_get_bytes(&self, url: &str) -> Result<Vec<u8>, SdkError> {
        let response = self.do_get_response(url)?;
        envelope::unwrap_data(&response)
    }

    /// GET `url` and return the untouched body unless it is an error
    /// envelope.
    pub fn do_get_bytes_raw(&self, url: &str) -> Result<Vec<u8>, SdkError> {
        let raw = self.send_get(url)?;
        envelope::decode_unchecked(raw)
    }

    /// Encode `payload` in `mode`, POST it to `action`, and decode an ok
    /// envelope.
    pub fn do_post(
        &self,
        action: &str,
        query: &[(&str, String)],
        payload: &[u8],
        mode: BodyMode,
    ) -> Result<Response, SdkError> {
        let url = self.get_url(action, query);
        let encoded = body::encode(mode, payload)?;
        let raw = self.send_post(&url, &encoded.content_type, encoded.bytes)?;
        envelope::decode_checked(&raw)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.endpoint)
            .field("client_id", &self.client_id)
            .field("organization_name", &self.organization_name)
            .field("application_name", &self.application_name)
            .finish_non_exhaustive()
    }
}
