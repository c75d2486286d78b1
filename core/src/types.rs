//! Typed resources exposed by the service.
//!
//! # Design
//! Each struct names the identity fields and the handful of kind-specific
//! fields callers commonly touch. Every other field the server sends is kept
//! in `extra` and written back unchanged, so an update never drops data this
//! crate does not model. All structs use the service's camelCase field names.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::resource::Resource;

/// Implements `Resource` for a struct with `owner` and `name` fields using
/// the organization-owner default.
macro_rules! impl_resource {
    ($ty:ty, $kind:literal) => {
        impl Resource for $ty {
            const KIND: &'static str = $kind;

            fn owner(&self) -> &str {
                &self.owner
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn set_owner(&mut self, owner: String) {
                self.owner = owner;
            }
        }
    };
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Adapter {
    pub owner: String,
    pub name: String,
    pub created_time: String,
    #[serde(rename = "type")]
    pub adapter_type: String,
    pub database_type: String,
    pub host: String,
    pub port: i32,
    pub user: String,
    pub database: String,
    pub table: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_resource!(Adapter, "adapter");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Application {
    pub owner: String,
    pub name: String,
    pub created_time: String,
    pub display_name: String,
    pub organization: String,
    pub logo: String,
    pub homepage_url: String,
    pub description: String,
    pub cert: String,
    pub enable_password: bool,
    pub enable_sign_up: bool,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uris: Vec<String>,
    pub expire_in_hours: i32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// Applications belong to the built-in admin owner, not to the organization
// they serve.
impl Resource for Application {
    const KIND: &'static str = "application";

    fn owner(&self) -> &str {
        &self.owner
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_owner(&mut self, owner: String) {
        self.owner = owner;
    }

    fn default_owner(_organization: &str) -> String {
        "admin".to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cert {
    pub owner: String,
    pub name: String,
    pub created_time: String,
    pub display_name: String,
    pub scope: String,
    #[serde(rename = "type")]
    pub cert_type: String,
    pub crypto_algorithm: String,
    pub bit_size: i32,
    pub expire_in_years: i32,
    pub certificate: String,
    pub private_key: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_resource!(Cert, "cert");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Enforcer {
    pub owner: String,
    pub name: String,
    pub created_time: String,
    pub display_name: String,
    pub description: String,
    pub model: String,
    pub adapter: String,
    pub is_enabled: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_resource!(Enforcer, "enforcer");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Group {
    pub owner: String,
    pub name: String,
    pub created_time: String,
    pub display_name: String,
    pub manager: String,
    pub contact_email: String,
    #[serde(rename = "type")]
    pub group_type: String,
    pub parent_id: String,
    pub is_top_group: bool,
    pub users: Vec<String>,
    pub is_enabled: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_resource!(Group, "group");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Model {
    pub owner: String,
    pub name: String,
    pub created_time: String,
    pub display_name: String,
    pub description: String,
    pub model_text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_resource!(Model, "model");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Organization {
    pub owner: String,
    pub name: String,
    pub created_time: String,
    pub display_name: String,
    pub website_url: String,
    pub favicon: String,
    pub password_type: String,
    pub default_avatar: String,
    pub default_application: String,
    pub enable_soft_deletion: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// Organizations are stored under the built-in admin owner, so reads address
// them there.
impl Resource for Organization {
    const KIND: &'static str = "organization";

    fn owner(&self) -> &str {
        &self.owner
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_owner(&mut self, owner: String) {
        self.owner = owner;
    }

    fn query_owner(_organization: &str) -> String {
        "admin".to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Payment {
    pub owner: String,
    pub name: String,
    pub created_time: String,
    pub display_name: String,
    pub provider: String,
    #[serde(rename = "type")]
    pub payment_type: String,
    pub product_name: String,
    pub price: f64,
    pub currency: String,
    pub user: String,
    pub state: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_resource!(Payment, "payment");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Permission {
    pub owner: String,
    pub name: String,
    pub created_time: String,
    pub display_name: String,
    pub description: String,
    pub users: Vec<String>,
    pub roles: Vec<String>,
    pub domains: Vec<String>,
    pub model: String,
    pub adapter: String,
    pub resource_type: String,
    pub resources: Vec<String>,
    pub actions: Vec<String>,
    pub effect: String,
    pub is_enabled: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_resource!(Permission, "permission");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Plan {
    pub owner: String,
    pub name: String,
    pub created_time: String,
    pub display_name: String,
    pub description: String,
    pub price_per_month: f64,
    pub price_per_year: f64,
    pub currency: String,
    pub role: String,
    pub is_enabled: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_resource!(Plan, "plan");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pricing {
    pub owner: String,
    pub name: String,
    pub created_time: String,
    pub display_name: String,
    pub description: String,
    pub plans: Vec<String>,
    pub application: String,
    pub trial_duration: i32,
    pub is_enabled: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_resource!(Pricing, "pricing");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    pub owner: String,
    pub name: String,
    pub created_time: String,
    pub display_name: String,
    pub image: String,
    pub detail: String,
    pub description: String,
    pub tag: String,
    pub currency: String,
    pub price: f64,
    pub quantity: i32,
    pub sold: i32,
    pub providers: Vec<String>,
    pub state: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_resource!(Product, "product");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Provider {
    pub owner: String,
    pub name: String,
    pub created_time: String,
    pub display_name: String,
    pub category: String,
    #[serde(rename = "type")]
    pub provider_type: String,
    pub sub_type: String,
    pub client_id: String,
    pub client_secret: String,
    pub host: String,
    pub port: i32,
    pub provider_url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_resource!(Provider, "provider");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Role {
    pub owner: String,
    pub name: String,
    pub created_time: String,
    pub display_name: String,
    pub description: String,
    pub users: Vec<String>,
    pub roles: Vec<String>,
    pub domains: Vec<String>,
    pub is_enabled: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_resource!(Role, "role");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Session {
    pub owner: String,
    pub name: String,
    pub application: String,
    pub created_time: String,
    pub session_id: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_resource!(Session, "session");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Subscription {
    pub owner: String,
    pub name: String,
    pub created_time: String,
    pub display_name: String,
    pub description: String,
    pub user: String,
    pub pricing: String,
    pub plan: String,
    pub start_time: String,
    pub end_time: String,
    pub period: String,
    pub state: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_resource!(Subscription, "subscription");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Syncer {
    pub owner: String,
    pub name: String,
    pub created_time: String,
    pub organization: String,
    #[serde(rename = "type")]
    pub syncer_type: String,
    pub host: String,
    pub port: i32,
    pub user: String,
    pub database_type: String,
    pub database: String,
    pub table: String,
    pub sync_interval: i32,
    pub is_enabled: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_resource!(Syncer, "syncer");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub owner: String,
    pub name: String,
    pub created_time: String,
    pub id: String,
    #[serde(rename = "type")]
    pub user_type: String,
    pub password: String,
    pub display_name: String,
    pub avatar: String,
    pub email: String,
    pub phone: String,
    pub is_admin: bool,
    pub is_forbidden: bool,
    pub signup_application: String,
    pub groups: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_resource!(User, "user");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Webhook {
    pub owner: String,
    pub name: String,
    pub created_time: String,
    pub organization: String,
    pub url: String,
    pub method: String,
    pub content_type: String,
    pub events: Vec<String>,
    pub is_user_extended: bool,
    pub is_enabled: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_resource!(Webhook, "webhook");
