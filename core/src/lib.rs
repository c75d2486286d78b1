//! Blocking client for the Casdoor identity and access-management API.
//!
//! # Overview
//! Every endpoint speaks one protocol: Basic-authenticated GET or POST to
//! `<endpoint>/<action>?<query>`, answered with a `{status, msg, data,
//! data2}` envelope. This crate implements that protocol once and exposes
//! typed CRUD over it for every resource kind.
//!
//! # Design
//! - `Client` is immutable after construction and holds its `HttpSender`
//!   behind an `Arc`, so it is cheap to clone and safe to share.
//! - Network I/O is isolated behind `HttpSender`; tests inject a fake.
//! - Writes for all kinds go through one generic dispatcher and return a
//!   `WriteOutcome`, which keeps "accepted but nothing changed" distinct
//!   from an error.
//! - No retries and no timeouts here. Deadlines belong to the sender
//!   (`UreqSender::with_timeout`).

pub mod body;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod http;
pub mod ops;
pub mod resource;
pub mod types;

#[cfg(test)]
mod testing;

pub use body::{BodyMode, EncodedBody};
pub use client::Client;
pub use config::ClientConfig;
pub use envelope::Response;
pub use error::SdkError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpSender, UreqSender};
pub use ops::Page;
pub use resource::{Resource, WriteOutcome};
pub use types::{
    Adapter, Application, Cert, Enforcer, Group, Model, Organization, Payment, Permission, Plan,
    Pricing, Product, Provider, Role, Session, Subscription, Syncer, User, Webhook,
};
