//! Server entries and the servers collection.
//!
//! Invariant: a non-empty collection has exactly one default server.
//! Every mutation re-establishes this before the caller can observe the
//! collection.

use crate::defaults::ExecutorDefaults;
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// Environment variables consulted when seeding a default server.
pub const ENV_API_URL: &str = "HUMMINGBOT_API_URL";
pub const ENV_USERNAME: &str = "HUMMINGBOT_USERNAME";
pub const ENV_PASSWORD: &str = "HUMMINGBOT_PASSWORD";

/// Fallback API URL when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

fn default_username() -> String {
    "admin".to_string()
}

fn default_password() -> String {
    "admin".to_string()
}

/// One configured API server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEntry {
    /// Unique name for this server.
    pub name: String,
    /// API base URL.
    pub url: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
    #[serde(default)]
    pub is_default: bool,
}

impl ServerEntry {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            username: default_username(),
            password: default_password(),
            is_default: false,
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.url.starts_with("http://") || self.url.starts_with("https://") {
            Ok(())
        } else {
            Err(ConfigError::InvalidUrl(self.url.clone()))
        }
    }
}

/// The persisted configuration: servers plus per-type executor defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServersConfig {
    #[serde(default)]
    servers: Vec<ServerEntry>,
    /// Default `executor_config` fields applied per executor type.
    #[serde(default, skip_serializing_if = "ExecutorDefaults::is_empty")]
    pub defaults: ExecutorDefaults,
}

impl ServersConfig {
    /// Seed a single-server config from the environment, falling back to
    /// the documented localhost defaults.
    pub fn from_env() -> Self {
        let entry = ServerEntry {
            name: "default".to_string(),
            url: std::env::var(ENV_API_URL).unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            username: std::env::var(ENV_USERNAME).unwrap_or_else(|_| default_username()),
            password: std::env::var(ENV_PASSWORD).unwrap_or_else(|_| default_password()),
            is_default: true,
        };
        Self {
            servers: vec![entry],
            defaults: ExecutorDefaults::default(),
        }
    }

    /// Add a server, or replace one with the same name keeping its
    /// default flag. The first server added becomes the default.
    pub fn add(&mut self, entry: ServerEntry) -> ConfigResult<()> {
        entry.validate()?;
        let was_default = self
            .servers
            .iter()
            .find(|s| s.name == entry.name)
            .map(|s| s.is_default)
            .unwrap_or(false);

        self.servers.retain(|s| s.name != entry.name);
        self.servers.push(ServerEntry {
            is_default: was_default,
            ..entry
        });
        self.ensure_default();
        Ok(())
    }

    /// Modify fields of an existing server. `None` leaves a field as is.
    pub fn modify(
        &mut self,
        name: &str,
        url: Option<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> ConfigResult<()> {
        let available = self.names();
        let server = self
            .servers
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| ConfigError::UnknownServer {
                name: name.to_string(),
                available,
            })?;

        if let Some(url) = url {
            server.url = url;
        }
        if let Some(username) = username {
            server.username = username;
        }
        if let Some(password) = password {
            server.password = password;
        }
        server.validate()
    }

    /// Remove a server. If it was the default, the first remaining
    /// server takes over.
    pub fn remove(&mut self, name: &str) -> ConfigResult<ServerEntry> {
        let idx = self
            .servers
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| ConfigError::UnknownServer {
                name: name.to_string(),
                available: self.names(),
            })?;
        let removed = self.servers.remove(idx);
        self.ensure_default();
        Ok(removed)
    }

    /// Make `name` the single default server.
    pub fn set_default(&mut self, name: &str) -> ConfigResult<()> {
        if !self.servers.iter().any(|s| s.name == name) {
            return Err(ConfigError::UnknownServer {
                name: name.to_string(),
                available: self.names(),
            });
        }
        for server in &mut self.servers {
            server.is_default = server.name == name;
        }
        Ok(())
    }

    /// The default server.
    pub fn default_server(&self) -> ConfigResult<&ServerEntry> {
        self.servers
            .iter()
            .find(|s| s.is_default)
            .or_else(|| self.servers.first())
            .ok_or(ConfigError::NoServers)
    }

    /// Look up a server by name.
    pub fn get(&self, name: &str) -> Option<&ServerEntry> {
        self.servers.iter().find(|s| s.name == name)
    }

    /// All configured servers, in insertion order.
    pub fn servers(&self) -> &[ServerEntry] {
        &self.servers
    }

    /// Configured server names.
    pub fn names(&self) -> Vec<String> {
        self.servers.iter().map(|s| s.name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Re-establish the exactly-one-default invariant.
    fn ensure_default(&mut self) {
        if self.servers.is_empty() {
            return;
        }
        let defaults = self.servers.iter().filter(|s| s.is_default).count();
        if defaults != 1 {
            for server in &mut self.servers {
                server.is_default = false;
            }
            self.servers[0].is_default = true;
        }
    }
}
