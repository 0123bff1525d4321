//! Authenticated HTTP transport for the Hummingbot API.
//!
//! Wraps `reqwest` with Basic Auth, per-call timeouts, transient-failure
//! retry with a fixed delay, and error classification. Authentication
//! failures are never retried: without new credentials a retry cannot
//! succeed.

pub mod auth;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod policy;

pub use auth::Credentials;
pub use client::ApiTransport;
pub use error::{TransportError, TransportResult};
pub use policy::RetryPolicy;
