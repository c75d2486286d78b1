//! POST body encodings: raw JSON text, URL-encoded form, multipart file.
//!
//! The caller picks the mode per request; nothing here sniffs the payload.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::error::SdkError;

pub const CONTENT_TYPE_TEXT: &str = "text/plain;charset=UTF-8";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// Name of the single part in a multipart-file body.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    /// Payload bytes as-is, sent as UTF-8 text.
    Raw,
    /// Payload is a flat JSON object of strings, re-encoded as a form.
    Form,
    /// Payload bytes wrapped as the `file` part of a multipart body.
    MultipartFile,
}

impl BodyMode {
    /// Map the `(is_form, is_file)` flag pair onto a mode. `is_file` only
    /// matters when `is_form` is set.
    pub fn from_flags(is_form: bool, is_file: bool) -> Self {
        match (is_form, is_file) {
            (false, _) => BodyMode::Raw,
            (true, false) => BodyMode::Form,
            (true, true) => BodyMode::MultipartFile,
        }
    }
}

/// A POST-able body together with its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub fn encode(mode: BodyMode, payload: &[u8]) -> Result<EncodedBody, SdkError> {
    match mode {
        BodyMode::Raw => Ok(EncodedBody {
            content_type: CONTENT_TYPE_TEXT.to_string(),
            bytes: payload.to_vec(),
        }),
        BodyMode::Form => encode_form(payload),
        BodyMode::MultipartFile => Ok(encode_multipart_file(
            payload,
            &Uuid::new_v4().simple().to_string(),
        )),
    }
}

fn encode_form(payload: &[u8]) -> Result<EncodedBody, SdkError> {
    let fields: BTreeMap<String, Option<String>> =
        serde_json::from_slice(payload).map_err(|e| {
            SdkError::Encoding(format!("form payload must be a flat object of strings: {e}"))
        })?;
    // A null field is sent as an empty value.
    let fields: BTreeMap<String, String> = fields
        .into_iter()
        .map(|(key, value)| (key, value.unwrap_or_default()))
        .collect();
    let encoded =
        serde_urlencoded::to_string(&fields).map_err(|e| SdkError::Encoding(e.to_string()))?;
    Ok(EncodedBody {
        content_type: CONTENT_TYPE_FORM.to_string(),
        bytes: encoded.into_bytes(),
    })
}

fn encode_multipart_file(payload: &[u8], boundary: &str) -> EncodedBody {
    let mut bytes = Vec::with_capacity(payload.len() + 256);
    bytes.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    bytes.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{FILE_FIELD}\"; filename=\"{FILE_FIELD}\"\r\n"
        )
        .as_bytes(),
    );
    bytes.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    bytes.extend_from_slice(payload);
    bytes.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    EncodedBody {
        content_type: format!("multipart/form-data; boundary={boundary}"),
        bytes,
    }
}
