//! The client facade.
//!
//! Owns the transport and wires the registry, barrier monitor, and
//! reconciler around it. One instance talks to one API server; build a
//! second instance for a second server.

use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::rest_api::RestExecutorApi;
use hbx_barrier::{
    BarrierEvent, BarrierMonitor, BarrierWatcher, ExecutorSource, PriceProvider, WatcherConfig,
};
use hbx_config::{ServerStore, ServersConfig};
use hbx_core::Executor;
use hbx_registry::{ExecutorFilter, ExecutorRegistry};
use hbx_reconcile::Reconciler;
use hbx_transport::{endpoints, ApiTransport, Credentials, RetryPolicy};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// High-level client for one Hummingbot API server.
pub struct HummingbotClient {
    config: ClientConfig,
    transport: Arc<ApiTransport>,
    registry: Arc<ExecutorRegistry<RestExecutorApi>>,
    reconciler: Reconciler<RestExecutorApi>,
    monitor: Arc<BarrierMonitor>,
    cancel: CancellationToken,
}

impl HummingbotClient {
    /// Build a client from explicit settings.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        Self::with_defaults(config, hbx_config::ExecutorDefaults::default())
    }

    /// Build a client whose registry merges saved per-type defaults
    /// into every create request.
    pub fn with_defaults(
        config: ClientConfig,
        defaults: hbx_config::ExecutorDefaults,
    ) -> ClientResult<Self> {
        let cancel = CancellationToken::new();
        let credentials = Credentials::new(&config.username, &config.password);
        let policy = RetryPolicy::new(
            config.max_retries,
            Duration::from_secs(config.retry_delay_secs),
        );
        let transport = Arc::new(ApiTransport::with_options(
            config.api_url.clone(),
            credentials,
            Duration::from_secs(config.timeout_secs),
            policy,
            cancel.clone(),
        )?);

        let api = Arc::new(RestExecutorApi::new(transport.clone()));
        let registry = Arc::new(ExecutorRegistry::with_defaults(api.clone(), defaults));
        let reconciler = Reconciler::new(api.clone());

        Ok(Self {
            config,
            transport,
            registry,
            reconciler,
            monitor: Arc::new(BarrierMonitor::new()),
            cancel,
        })
    }

    /// Build a client from a server store, using the default server's
    /// URL and credentials plus any saved executor defaults. Seeds the
    /// store from the environment on first use.
    pub fn from_store(store: &dyn ServerStore) -> ClientResult<Self> {
        let servers: ServersConfig = store.load_or_init()?;
        let entry = servers.default_server()?;
        let config = ClientConfig::from_server_entry(entry);
        info!(server = %entry.name, url = %entry.url, "using configured server");
        Self::with_defaults(config, servers.defaults.clone())
    }

    /// Build a client from the conventional `~/.hbx/servers.toml` store.
    pub fn from_default_store() -> ClientResult<Self> {
        Self::from_store(&hbx_config::FileServerStore::default_location())
    }

    /// Verify connectivity and credentials with an accounts listing.
    /// Returns the account names the server reports.
    pub async fn connect(&self) -> ClientResult<Vec<String>> {
        let value = self.transport.get(endpoints::ACCOUNTS).await?;
        let accounts = parse_account_names(&value);
        info!(
            url = %self.transport.base_url(),
            identity = %self.transport.identity(),
            accounts = accounts.len(),
            "connected to Hummingbot API"
        );
        Ok(accounts)
    }

    /// Probe the server root. Returns `Ok` with a human-readable status
    /// line, or the classified error.
    pub async fn health_check(&self) -> ClientResult<String> {
        self.transport.get("/").await?;
        Ok(format!("server at {} is healthy", self.transport.base_url()))
    }

    /// The executor registry.
    pub fn registry(&self) -> &Arc<ExecutorRegistry<RestExecutorApi>> {
        &self.registry
    }

    /// The drift reconciler.
    pub fn reconciler(&self) -> &Reconciler<RestExecutorApi> {
        &self.reconciler
    }

    /// The barrier monitor (for one-shot evaluations).
    pub fn monitor(&self) -> &Arc<BarrierMonitor> {
        &self.monitor
    }

    /// The raw transport, for endpoints outside the executor core.
    pub fn transport(&self) -> &Arc<ApiTransport> {
        &self.transport
    }

    /// Settings this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Signal cooperative shutdown: in-flight retry loops stop between
    /// attempts and spawned watchers exit.
    pub fn shutdown(&self) {
        info!("client shutdown requested");
        self.cancel.cancel();
    }

    /// Spawn a background barrier watcher over the registry.
    ///
    /// Events arrive on the returned channel; the watcher stops on
    /// [`Self::shutdown`] or when the receiver is dropped.
    pub fn spawn_barrier_watcher<P: PriceProvider + 'static>(
        &self,
        provider: Arc<P>,
        config: WatcherConfig,
    ) -> (JoinHandle<()>, mpsc::Receiver<BarrierEvent>) {
        let (tx, rx) = mpsc::channel(64);
        let watcher = BarrierWatcher::new(
            self.monitor.clone(),
            provider,
            Arc::new(RegistrySource(self.registry.clone())),
            tx,
            config,
            self.cancel.clone(),
        );
        (tokio::spawn(watcher.run()), rx)
    }

    // --- Controller/bot endpoints: same transport vocabulary, thin
    // passthroughs outside the executor core. ---

    pub async fn list_controllers(&self) -> ClientResult<Value> {
        Ok(self.transport.get(endpoints::CONTROLLERS).await?)
    }

    pub async fn list_controller_configs(&self) -> ClientResult<Value> {
        Ok(self.transport.get(endpoints::CONTROLLER_CONFIGS).await?)
    }

    pub async fn deploy_bot(&self, payload: &Value) -> ClientResult<Value> {
        Ok(self.transport.post(endpoints::BOTS_DEPLOY, payload).await?)
    }

    pub async fn stop_bot(&self, name: &str) -> ClientResult<Value> {
        Ok(self
            .transport
            .post(&endpoints::bot_stop(name), &json!({}))
            .await?)
    }

    /// Clear the held-position bookkeeping for one market.
    pub async fn clear_position(&self, connector: &str, trading_pair: &str) -> ClientResult<Value> {
        Ok(self
            .transport
            .delete(&endpoints::position(connector, trading_pair))
            .await?)
    }
}

/// Adapter exposing the registry's local view to the barrier watcher.
pub struct RegistrySource(pub Arc<ExecutorRegistry<RestExecutorApi>>);

impl ExecutorSource for RegistrySource {
    fn executors(&self) -> Vec<Executor> {
        self.0
            .list(&ExecutorFilter::all())
            .into_iter()
            .map(|record| record.executor)
            .collect()
    }
}

/// Accounts arrive as `["name", ...]` or `[{"name": ...}, ...]`.
fn parse_account_names(value: &Value) -> Vec<String> {
    let list = value.get("accounts").unwrap_or(value);
    list.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(o) => o.get("name").and_then(|n| n.as_str()).map(String::from),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

impl std::fmt::Debug for HummingbotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HummingbotClient")
            .field("url", &self.transport.base_url())
            .field("identity", &self.transport.identity())
            .finish()
    }
}
