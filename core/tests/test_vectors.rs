//! Verify dispatch and envelope handling against JSON test vectors stored in
//! `test-vectors/`.
//!
//! Each dispatch vector describes a resource, the request the client must
//! build for it, a simulated response body, and the expected outcome.
//! Bodies are compared field by field so unrelated default fields do not
//! cause false negatives.

use std::sync::{Arc, Mutex};

use casdoor_sdk::envelope::{decode_checked, decode_unchecked};
use casdoor_sdk::{
    Application, Client, ClientConfig, Group, HttpMethod, HttpRequest, HttpResponse, HttpSender,
    Resource, SdkError, WriteOutcome,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:8000/api";

/// Answers every request with one canned body and keeps the last request.
#[derive(Clone)]
struct CannedSender {
    body: Vec<u8>,
    last: Arc<Mutex<Option<HttpRequest>>>,
}

impl HttpSender for CannedSender {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, SdkError> {
        *self.last.lock().unwrap() = Some(request);
        Ok(HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: self.body.clone(),
        })
    }
}

fn client(sender: &CannedSender) -> Client {
    let config = ClientConfig {
        endpoint: BASE_URL.to_string(),
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        certificate: String::new(),
        organization_name: "casbin-forum".to_string(),
        application_name: "app-casbin-forum".to_string(),
    };
    Client::with_sender(config, sender.clone())
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn check_error(name: &str, err: SdkError, expected: &Value) {
    match expected["kind"].as_str().or(expected["error"].as_str()).unwrap() {
        "Remote" => {
            let message = expected["message"].as_str().unwrap();
            assert_eq!(err.remote_message(), Some(message), "{name}: remote message");
        }
        "Decode" => assert!(matches!(err, SdkError::Decode(_)), "{name}: expected Decode, got {err:?}"),
        other => panic!("{name}: unknown expected error: {other}"),
    }
}

fn run_dispatch_case<R: Resource>(case: &Value) {
    let name = case["name"].as_str().unwrap();
    let sender = CannedSender {
        body: case["simulated_response"].as_str().unwrap().as_bytes().to_vec(),
        last: Arc::default(),
    };
    let mut resource: R = serde_json::from_value(case["input"].clone()).unwrap();
    let columns: Vec<&str> = case["columns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_str().unwrap())
        .collect();

    let result = client(&sender).modify(case["action"].as_str().unwrap(), &mut resource, &columns);

    // Verify the request
    let req = sender.last.lock().unwrap().clone().expect("request was sent");
    let expected_req = &case["expected_request"];
    assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: url");
    assert_eq!(
        req.header("content-type"),
        expected_req["content_type"].as_str(),
        "{name}: content type"
    );
    assert_eq!(
        req.header("authorization"),
        Some("Basic Y2xpZW50LWlkOmNsaWVudC1zZWNyZXQ="),
        "{name}: credentials"
    );
    let body: Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
    for (field, expected) in expected_req["body_fields"].as_object().unwrap() {
        assert_eq!(&body[field], expected, "{name}: body field {field}");
    }

    // Verify the outcome
    if let Some(expected_error) = case.get("expected_error") {
        check_error(name, result.unwrap_err(), expected_error);
    } else {
        let expected = match case["expected_outcome"].as_str().unwrap() {
            "Affected" => WriteOutcome::Affected,
            "NotAffected" => WriteOutcome::NotAffected,
            other => panic!("{name}: unknown outcome: {other}"),
        };
        assert_eq!(result.unwrap(), expected, "{name}: outcome");
    }
}

#[test]
fn dispatch_test_vectors() {
    let raw = include_str!("../../test-vectors/dispatch.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        match case["kind"].as_str().unwrap() {
            "group" => run_dispatch_case::<Group>(case),
            "application" => run_dispatch_case::<Application>(case),
            other => panic!("unknown kind: {other}"),
        }
    }
}

#[test]
fn envelope_test_vectors() {
    let raw = include_str!("../../test-vectors/envelope.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let body = case["body"].as_str().unwrap().as_bytes();

        let checked = &case["checked"];
        match decode_checked(body) {
            Ok(response) => {
                assert!(checked.get("error").is_none(), "{name}: expected failure");
                assert_eq!(response.data, checked["data"], "{name}: data");
                assert_eq!(response.data2, checked["data2"], "{name}: data2");
            }
            Err(err) => check_error(name, err, checked),
        }

        let unchecked = &case["unchecked"];
        match decode_unchecked(body.to_vec()) {
            Ok(raw) => {
                assert_eq!(unchecked, "passthrough", "{name}: expected failure");
                assert_eq!(raw, body, "{name}: bytes must be untouched");
            }
            Err(err) => check_error(name, err, unchecked),
        }
    }
}
