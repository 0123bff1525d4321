//! Error types for hbx-registry.

use hbx_core::{CoreError, ExecutorId};
use hbx_transport::TransportError;
use thiserror::Error;

/// Registry error types.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Client-side validation failed before any network call.
    #[error("Invalid executor request: {0}")]
    Validation(#[from] CoreError),

    /// The request shape does not match the executor type.
    #[error("Invalid executor request: {0}")]
    InvalidRequest(String),

    /// The executor id is not known to this registry.
    #[error("Executor '{0}' is not tracked by this registry")]
    UnknownExecutor(ExecutorId),

    /// The remote call failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Result type alias for registry operations.
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
