//! Client configuration and its environment loader.

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::SdkError;

pub const ENV_ENDPOINT: &str = "CASDOOR_ENDPOINT";
pub const ENV_CLIENT_ID: &str = "CASDOOR_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "CASDOOR_CLIENT_SECRET";
pub const ENV_CERTIFICATE: &str = "CASDOOR_CERTIFICATE";
pub const ENV_ORGANIZATION: &str = "CASDOOR_ORGANIZATION";
pub const ENV_APPLICATION: &str = "CASDOOR_APPLICATION";

/// Everything a `Client` needs, supplied once at construction.
///
/// `endpoint` is the API base URL (for a stock deployment
/// `https://door.example.com/api`). `certificate` is the PEM public key used
/// to verify tokens issued by the service; this crate only carries it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub endpoint: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub certificate: String,
    pub organization_name: String,
    pub application_name: String,
}

impl ClientConfig {
    /// Read the `CASDOOR_*` variables, loading a `.env` file first if one
    /// exists in the working directory or its parents.
    pub fn from_env() -> Result<Self, SdkError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Every variable except
    /// `CASDOOR_CERTIFICATE` is required.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SdkError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| SdkError::Config(format!("missing {key}")))
        };
        Ok(Self {
            endpoint: required(ENV_ENDPOINT)?,
            client_id: required(ENV_CLIENT_ID)?,
            client_secret: required(ENV_CLIENT_SECRET)?,
            certificate: lookup(ENV_CERTIFICATE).unwrap_or_default(),
            organization_name: required(ENV_ORGANIZATION)?,
            application_name: required(ENV_APPLICATION)?,
        })
    }

    /// Client on the default network sender.
    pub fn into_client(self) -> Client {
        Client::new(self)
    }
}
