//! Error types for hbx-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid trading pair: {0}")]
    InvalidPair(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid grid config: {0}")]
    InvalidGrid(String),

    #[error("Invalid barrier config: {0}")]
    InvalidBarrier(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
