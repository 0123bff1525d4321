//! High-level client facade for the Hummingbot API executor lifecycle.
//!
//! Wires configuration, transport, the executor registry, the barrier
//! monitor, and the reconciler into one entry point:
//!
//! ```ignore
//! let client = HummingbotClient::from_default_store()?;
//! client.connect().await?;
//! let executor = client.registry().create(request).await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod rest_api;

pub use client::{HummingbotClient, RegistrySource};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use rest_api::RestExecutorApi;
