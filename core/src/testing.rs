//! Recording `HttpSender` for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::config::ClientConfig;
use crate::error::SdkError;
use crate::http::{HttpRequest, HttpResponse, HttpSender};
use crate::Client;

/// Replays canned bodies in order and records every request it receives.
#[derive(Clone, Default)]
pub struct RecordingSender {
    bodies: Arc<Mutex<VecDeque<Vec<u8>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl RecordingSender {
    pub fn replying(bodies: &[&str]) -> Self {
        let sender = Self::default();
        for body in bodies {
            sender.push(body);
        }
        sender
    }

    pub fn push(&self, body: &str) {
        self.bodies.lock().unwrap().push_back(body.as_bytes().to_vec());
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> HttpRequest {
        self.requests.lock().unwrap().last().cloned().expect("no request sent")
    }
}

impl HttpSender for RecordingSender {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, SdkError> {
        self.requests.lock().unwrap().push(request);
        let body = self
            .bodies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| SdkError::Transport("connection refused".to_string()))?;
        Ok(HttpResponse {
            status: 200,
            headers: Vec::new(),
            body,
        })
    }
}

pub fn config() -> ClientConfig {
    ClientConfig {
        endpoint: "http://localhost:8000/api".to_string(),
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        certificate: String::new(),
        organization_name: "casbin-forum".to_string(),
        application_name: "app-casbin-forum".to_string(),
    }
}

pub fn client(sender: &RecordingSender) -> Client {
    Client::with_sender(config(), sender.clone())
}

pub const AFFECTED_BODY: &str = r#"{"status":"ok","msg":"","data":"Affected","data2":null}"#;
pub const UNAFFECTED_BODY: &str = r#"{"status":"ok","msg":"","data":"Unaffected","data2":null}"#;
