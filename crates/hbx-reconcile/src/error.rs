//! Error types for hbx-reconcile.

use hbx_transport::TransportError;
use thiserror::Error;

/// Reconciliation error types.
///
/// A detected drift is not an error: it is a reported outcome. Errors
/// here mean the comparison itself could not be carried out.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Result type alias for reconciliation operations.
pub type ReconcileResult<T> = std::result::Result<T, ReconcileError>;
