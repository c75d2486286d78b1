//! The `{status, msg, data, data2}` envelope every endpoint responds with.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::SdkError;

/// Status value of a successful envelope. Anything else is a failure.
pub const STATUS_OK: &str = "ok";

/// Status value the service uses for business failures.
pub const STATUS_ERROR: &str = "error";

/// `data` value of a write that changed server-side state.
pub const AFFECTED: &str = "Affected";

/// A decoded response envelope.
///
/// `data` and `data2` are opaque; their shape depends on the endpoint.
/// Absent payload fields decode as `Value::Null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub msg: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub data2: Value,
}

impl Response {
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// True when `data` is the `"Affected"` sentinel.
    pub fn is_affected(&self) -> bool {
        self.data.as_str() == Some(AFFECTED)
    }

    /// Decode `data` into a typed value.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, SdkError> {
        T::deserialize(&self.data).map_err(|e| SdkError::Decode(e.to_string()))
    }

    /// Decode `data2` into a typed value.
    pub fn data2_as<T: DeserializeOwned>(&self) -> Result<T, SdkError> {
        T::deserialize(&self.data2).map_err(|e| SdkError::Decode(e.to_string()))
    }
}

/// Parse an envelope and fail with `Remote` unless its status is `"ok"`.
pub fn decode_checked(raw: &[u8]) -> Result<Response, SdkError> {
    let response: Response =
        serde_json::from_slice(raw).map_err(|e| SdkError::Decode(e.to_string()))?;
    if !response.is_ok() {
        return Err(SdkError::Remote(response.msg));
    }
    Ok(response)
}

/// Status probe used by `decode_unchecked`; every field is optional so any
/// JSON object parses.
#[derive(Deserialize)]
struct StatusProbe {
    status: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    msg: String,
}

/// `"msg": null` reads as an empty message.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Return `raw` untouched unless it is an envelope whose status is
/// explicitly `"error"`.
///
/// Bodies that are not envelopes at all (arrays, other object shapes, even
/// invalid JSON) pass through; the caller decodes them itself.
pub fn decode_unchecked(raw: Vec<u8>) -> Result<Vec<u8>, SdkError> {
    if let Ok(probe) = serde_json::from_slice::<StatusProbe>(&raw) {
        if probe.status.as_deref() == Some(STATUS_ERROR) {
            return Err(SdkError::Remote(probe.msg));
        }
    }
    Ok(raw)
}

/// Re-serialize the `data` field alone.
pub fn unwrap_data(response: &Response) -> Result<Vec<u8>, SdkError> {
    serde_json::to_vec(&response.data).map_err(|e| SdkError::Encoding(e.to_string()))
}
