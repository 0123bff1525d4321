//! Client error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] hbx_config::ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] hbx_transport::TransportError),

    #[error("Registry error: {0}")]
    Registry(#[from] hbx_registry::RegistryError),

    #[error("Reconciliation error: {0}")]
    Reconcile(#[from] hbx_reconcile::ReconcileError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] hbx_telemetry::TelemetryError),

    #[error("Core error: {0}")]
    Core(#[from] hbx_core::CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;
