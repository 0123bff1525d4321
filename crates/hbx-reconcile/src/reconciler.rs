//! The reconciler.
//!
//! Read-only by contract: the registry record stays untouched even when
//! drift is found. The caller decides whether to mark an executor
//! terminated, clear a position, or escalate.

use crate::error::ReconcileResult;
use hbx_core::{Executor, ExecutorId, ExecutorType, Position, PositionKey, TradingPair};
use hbx_transport::TransportResult;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, warn};

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Remote/on-chain position lookups the reconciler depends on.
pub trait PositionQuery: Send + Sync {
    /// Look up the on-chain position backing an LP executor. `Ok(None)`
    /// means the chain reports no position at `address` for this market.
    fn lp_position(
        &self,
        connector: String,
        trading_pair: TradingPair,
        address: String,
    ) -> BoxFuture<'_, TransportResult<Option<Position>>>;

    /// All held positions per the remote summary.
    fn positions_summary(&self) -> BoxFuture<'_, TransportResult<Vec<Position>>>;
}

/// Why local and remote state disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriftReason {
    /// The on-chain position backing a locally active LP executor is
    /// gone: closed through an out-of-band channel.
    ExternallyClosed,
    /// The remote summary reports more than one position for a
    /// (connector, trading pair) key that the service contract says is
    /// unique.
    DuplicatePosition,
}

impl fmt::Display for DriftReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExternallyClosed => write!(f, "externally closed"),
            Self::DuplicatePosition => write!(f, "duplicate position"),
        }
    }
}

/// A detected mismatch requiring caller attention.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Drift {
    /// Executor the drift concerns, when there is one.
    pub executor_id: Option<ExecutorId>,
    pub reason: DriftReason,
    pub details: String,
}

/// Outcome of comparing one executor against remote truth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ReconciliationResult {
    InSync,
    Drifted(Drift),
}

impl ReconciliationResult {
    pub fn is_drifted(&self) -> bool {
        matches!(self, Self::Drifted(_))
    }
}

/// Compares local executor state against authoritative remote state.
pub struct Reconciler<Q: PositionQuery> {
    query: Arc<Q>,
}

impl<Q: PositionQuery> Reconciler<Q> {
    pub fn new(query: Arc<Q>) -> Self {
        Self { query }
    }

    /// Compare one executor's local state against remote truth.
    ///
    /// For LP executors that are locally active and carry a position
    /// address, the on-chain position is queried; absence means the
    /// position was closed out-of-band and the local record is stale.
    /// The record is NOT corrected here: the drift is reported and the
    /// caller must act on it explicitly.
    pub async fn reconcile(&self, executor: &Executor) -> ReconcileResult<ReconciliationResult> {
        if executor.executor_type != ExecutorType::LpExecutor {
            return Ok(ReconciliationResult::InSync);
        }
        if !executor.status.is_active() {
            return Ok(ReconciliationResult::InSync);
        }
        let Some(address) = &executor.position_address else {
            // Not minted yet (still opening); nothing to compare.
            debug!(id = %executor.id, "LP executor has no position address yet");
            return Ok(ReconciliationResult::InSync);
        };

        let position = self
            .query
            .lp_position(
                executor.connector.clone(),
                executor.trading_pair.clone(),
                address.clone(),
            )
            .await?;

        match position {
            Some(_) => Ok(ReconciliationResult::InSync),
            None => {
                let drift = Drift {
                    executor_id: Some(executor.id.clone()),
                    reason: DriftReason::ExternallyClosed,
                    details: format!(
                        "executor is locally {} but on-chain position {} no longer exists",
                        executor.status, address
                    ),
                };
                warn!(
                    id = %executor.id,
                    position_address = %address,
                    "LP position drift: {}",
                    drift.details
                );
                Ok(ReconciliationResult::Drifted(drift))
            }
        }
    }

    /// Audit the remote position summary against the one-position-per-key
    /// contract. Returns one drift per violated key.
    pub async fn audit_positions(&self) -> ReconcileResult<Vec<Drift>> {
        let positions = self.query.positions_summary().await?;
        let mut by_key: HashMap<PositionKey, usize> = HashMap::new();
        for position in &positions {
            *by_key.entry(position.key()).or_default() += 1;
        }

        let mut drifts: Vec<Drift> = by_key
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(key, count)| Drift {
                executor_id: None,
                reason: DriftReason::DuplicatePosition,
                details: format!("{count} positions reported for {key}, expected at most one"),
            })
            .collect();
        drifts.sort_by(|a, b| a.details.cmp(&b.details));

        for drift in &drifts {
            warn!("position audit drift: {}", drift.details);
        }
        Ok(drifts)
    }
}
