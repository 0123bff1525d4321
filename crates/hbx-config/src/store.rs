//! Persistence for the servers configuration.
//!
//! `ServerStore` is the injection seam: production code uses the TOML
//! file store, tests use the in-memory store. `load_or_init` seeds a
//! fresh store from the environment so first runs work without manual
//! setup.

use crate::error::{ConfigError, ConfigResult};
use crate::server::ServersConfig;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Storage backend for [`ServersConfig`].
pub trait ServerStore: Send + Sync {
    /// Load the persisted configuration.
    fn load(&self) -> ConfigResult<ServersConfig>;

    /// Persist the configuration.
    fn save(&self, config: &ServersConfig) -> ConfigResult<()>;

    /// Whether a configuration has been persisted before.
    fn exists(&self) -> bool;

    /// Load the configuration, seeding from the environment on first use.
    fn load_or_init(&self) -> ConfigResult<ServersConfig> {
        if self.exists() {
            self.load()
        } else {
            let config = ServersConfig::from_env();
            self.save(&config)?;
            info!("seeded server configuration from environment");
            Ok(config)
        }
    }
}

/// TOML file store, conventionally at `~/.hbx/servers.toml`.
pub struct FileServerStore {
    path: PathBuf,
}

impl FileServerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Conventional location under the user's home directory.
    pub fn default_location() -> Self {
        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(home.join(".hbx").join("servers.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ServerStore for FileServerStore {
    fn load(&self) -> ConfigResult<ServersConfig> {
        debug!(path = %self.path.display(), "loading server configuration");
        let content = std::fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&content)?)
    }

    fn save(&self, config: &ServersConfig) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(config)?;
        std::fs::write(&self.path, content)?;
        debug!(path = %self.path.display(), "saved server configuration");
        Ok(())
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }
}

/// In-memory store for tests and embedders that manage persistence
/// themselves.
#[derive(Default)]
pub struct MemoryServerStore {
    config: Mutex<Option<ServersConfig>>,
}

impl MemoryServerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the store.
    pub fn with_config(config: ServersConfig) -> Self {
        Self {
            config: Mutex::new(Some(config)),
        }
    }
}

impl ServerStore for MemoryServerStore {
    fn load(&self) -> ConfigResult<ServersConfig> {
        self.config.lock().clone().ok_or(ConfigError::NoServers)
    }

    fn save(&self, config: &ServersConfig) -> ConfigResult<()> {
        *self.config.lock() = Some(config.clone());
        Ok(())
    }

    fn exists(&self) -> bool {
        self.config.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::ServerEntry;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryServerStore::new();
        assert!(!store.exists());

        let mut config = ServersConfig::default();
        config
            .add(ServerEntry::new("local", "http://localhost:8000"))
            .unwrap();
        store.save(&config).unwrap();

        assert!(store.exists());
        assert_eq!(store.load().unwrap(), config);
    }

    #[test]
    fn test_load_or_init_seeds_default_server() {
        let store = MemoryServerStore::new();
        let config = store.load_or_init().unwrap();
        assert_eq!(config.servers().len(), 1);
        assert_eq!(config.default_server().unwrap().name, "default");
        // Seeding persisted the config.
        assert!(store.exists());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = std::env::temp_dir().join(format!("hbx-config-test-{}", std::process::id()));
        let store = FileServerStore::new(dir.join("servers.toml"));

        let mut config = ServersConfig::default();
        config
            .add(
                ServerEntry::new("staging", "https://staging.example.com")
                    .with_credentials("ops", "secret"),
            )
            .unwrap();
        store.save(&config).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.get("staging").unwrap().username, "ops");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_file_store_missing_file_is_io_error() {
        let store = FileServerStore::new("/nonexistent/hbx/servers.toml");
        assert!(matches!(store.load(), Err(ConfigError::Io(_))));
    }
}
