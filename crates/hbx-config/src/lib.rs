//! Multi-server configuration for the Hummingbot executor client.
//!
//! Servers (name, URL, credentials, default flag) persist in a TOML file
//! with an explicit load/save lifecycle. The store is a trait so tests
//! and embedders can substitute an in-memory provider instead of
//! touching the filesystem.

pub mod defaults;
pub mod error;
pub mod server;
pub mod store;

pub use defaults::ExecutorDefaults;
pub use error::{ConfigError, ConfigResult};
pub use server::{ServerEntry, ServersConfig};
pub use store::{FileServerStore, MemoryServerStore, ServerStore};
