//! Hummingbot API endpoint vocabulary.
//!
//! Paths are relative to the configured base URL. Executor lifecycle
//! endpoints are the core surface; controller/bot endpoints share the
//! same transport and auth.

/// Create an executor (POST).
pub const EXECUTORS: &str = "/api/v1/executors";
/// Enumerate executors with filters (GET).
pub const EXECUTORS_SEARCH: &str = "/api/v1/executors/search";
/// Summary of positions held by executors (GET).
pub const POSITIONS_SUMMARY: &str = "/api/v1/executors/positions/summary";
/// List controllers (GET).
pub const CONTROLLERS: &str = "/api/v1/controllers";
/// List controller configs (GET).
pub const CONTROLLER_CONFIGS: &str = "/api/v1/controller-configs";
/// Deploy a bot from controller configs (POST).
pub const BOTS_DEPLOY: &str = "/api/v1/bots/deploy";
/// List accounts (GET); used as the connection sanity check.
pub const ACCOUNTS: &str = "/api/v1/accounts";

/// Fetch one executor's current state (GET).
pub fn executor(id: &str) -> String {
    format!("{EXECUTORS}/{id}")
}

/// Stop an executor, optionally keeping its position (POST).
pub fn executor_stop(id: &str) -> String {
    format!("{EXECUTORS}/{id}/stop")
}

/// Held-position bookkeeping for one market (GET to fetch, DELETE to clear).
pub fn position(connector: &str, trading_pair: &str) -> String {
    format!("{EXECUTORS}/positions/{connector}/{trading_pair}")
}

/// Stop a deployed bot (POST).
pub fn bot_stop(name: &str) -> String {
    format!("/api/v1/bots/{name}/stop")
}
