//! Error types for hbx-config.

use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid server URL '{0}': must start with http:// or https://")]
    InvalidUrl(String),

    #[error("Server '{name}' not found. Available servers: {available:?}")]
    UnknownServer { name: String, available: Vec<String> },

    #[error("No servers configured")]
    NoServers,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type alias for config operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
