//! Client configuration.
//!
//! Resolution order: an explicit TOML file (path in `HBX_CONFIG`, or
//! `config/default.toml`), then the server store's default entry, then
//! environment variables, then the documented localhost defaults.

use crate::error::ClientResult;
use hbx_config::ServerEntry;
use serde::{Deserialize, Serialize};

/// Environment variable naming a config file path.
pub const ENV_CONFIG_PATH: &str = "HBX_CONFIG";

fn default_api_url() -> String {
    std::env::var(hbx_config::server::ENV_API_URL)
        .unwrap_or_else(|_| hbx_config::server::DEFAULT_API_URL.to_string())
}

fn default_username() -> String {
    std::env::var(hbx_config::server::ENV_USERNAME).unwrap_or_else(|_| "admin".to_string())
}

fn default_password() -> String {
    std::env::var(hbx_config::server::ENV_PASSWORD).unwrap_or_else(|_| "admin".to_string())
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    2
}

fn default_account() -> String {
    "master_account".to_string()
}

/// Settings for one client instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Total attempt budget for transient failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Fixed delay between attempts, in seconds.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    /// Account executors run under when the request does not say.
    #[serde(default = "default_account")]
    pub default_account: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ClientConfig {
    /// Build from environment variables and defaults.
    pub fn from_env() -> Self {
        Self {
            api_url: default_api_url(),
            username: default_username(),
            password: default_password(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            default_account: default_account(),
        }
    }

    /// Load from the config file if present, otherwise from env.
    pub fn load() -> ClientResult<Self> {
        let path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| "config/default.toml".to_string());
        if std::path::Path::new(&path).exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::from_env())
        }
    }

    /// Load from a TOML file.
    pub fn from_file(path: &str) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content).map_err(hbx_config::ConfigError::from)?)
    }

    /// Build from a server store entry, keeping the other defaults.
    pub fn from_server_entry(entry: &ServerEntry) -> Self {
        Self {
            api_url: entry.url.clone(),
            username: entry.username.clone(),
            password: entry.password.clone(),
            ..Self::from_env()
        }
    }
}
