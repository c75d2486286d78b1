//! Error types for the Casdoor client.
//!
//! # Design
//! The remote service folds every business failure (not found, duplicate,
//! permission denied) into one `"error"` envelope, so `Remote` carries only
//! the server message. The other variants name the local stage that failed:
//! talking to the network, reading the envelope, or building a request body.

use thiserror::Error;

/// Errors returned by every fallible `Client` operation.
#[derive(Debug, Error)]
pub enum SdkError {
    /// The request could not be built or the network round-trip failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body is not a valid envelope.
    #[error("decode error: {0}")]
    Decode(String),

    /// The envelope was decoded but its status is not `"ok"`.
    #[error("{0}")]
    Remote(String),

    /// The payload could not be encoded in the requested body mode.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A required configuration value is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl SdkError {
    /// Server-supplied message when this is a `Remote` error.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            SdkError::Remote(msg) => Some(msg),
            _ => None,
        }
    }
}
