//! Drift detection between local and authoritative remote state.
//!
//! The reconciler compares the registry's view against remote/on-chain
//! position queries and reports mismatches. It never corrects anything:
//! auto-"fixing" a live position's bookkeeping could mask real financial
//! state, so every correction requires explicit caller action.

pub mod error;
pub mod reconciler;

pub use error::{ReconcileError, ReconcileResult};
pub use reconciler::{
    BoxFuture, Drift, DriftReason, PositionQuery, ReconciliationResult, Reconciler,
};
