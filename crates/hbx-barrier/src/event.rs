//! Barrier events.

use chrono::{DateTime, Utc};
use hbx_core::{ExecutorId, Price};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which barrier fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BarrierKind {
    StopLoss,
    TakeProfit,
    TimeLimit,
    TrailingStop,
}

impl fmt::Display for BarrierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::StopLoss => "STOP_LOSS",
            Self::TakeProfit => "TAKE_PROFIT",
            Self::TimeLimit => "TIME_LIMIT",
            Self::TrailingStop => "TRAILING_STOP",
        };
        write!(f, "{s}")
    }
}

/// Advisory notification that a barrier condition is satisfied.
///
/// Callers should confirm against server state before acting; a fast
/// price move between polls can make this diverge from the remote
/// decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarrierEvent {
    pub executor_id: ExecutorId,
    pub kind: BarrierKind,
    /// Price observed when the barrier fired (zero for time-limit).
    pub observed_price: Price,
    /// Threshold that was crossed (zero for time-limit).
    pub threshold: Price,
    pub observed_at: DateTime<Utc>,
}
