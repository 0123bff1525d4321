//! Remote executor model: identifiers, type, status, and the tracked record.
//!
//! The status enum mirrors the remote service's state machine. It is a
//! cache of authoritative remote truth: the client never transitions an
//! executor unilaterally, it only records what the server reports and
//! rejects regressions from stale responses.

use crate::barrier::TripleBarrierConfig;
use crate::decimal::{Amount, Price};
use crate::pair::TradingPair;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Trade side: buy (long) or sell (short).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    /// Returns the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// Numeric code used inside `executor_config` payloads (1=BUY, 2=SELL).
    pub fn wire_code(&self) -> u8 {
        match self {
            Self::Buy => 1,
            Self::Sell => 2,
        }
    }

    /// Parse the numeric wire code.
    pub fn from_wire_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Buy),
            2 => Some(Self::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Kind of remote executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutorType {
    /// Single order placement.
    OrderExecutor,
    /// Single position with triple-barrier exits.
    PositionExecutor,
    /// Grid of buy/sell levels across a price range.
    GridExecutor,
    /// Dollar-cost averaging entries.
    DcaExecutor,
    /// Time-weighted average price execution.
    TwapExecutor,
    /// Cross-exchange price arbitrage.
    ArbitrageExecutor,
    /// Cross-exchange market making.
    XemmExecutor,
    /// Concentrated liquidity position.
    LpExecutor,
}

impl ExecutorType {
    /// Whether executors of this type carry a triple-barrier config.
    pub fn supports_barriers(&self) -> bool {
        matches!(self, Self::PositionExecutor | Self::DcaExecutor)
    }

    /// Wire name used in `executor_config.type` and search filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderExecutor => "order_executor",
            Self::PositionExecutor => "position_executor",
            Self::GridExecutor => "grid_executor",
            Self::DcaExecutor => "dca_executor",
            Self::TwapExecutor => "twap_executor",
            Self::ArbitrageExecutor => "arbitrage_executor",
            Self::XemmExecutor => "xemm_executor",
            Self::LpExecutor => "lp_executor",
        }
    }
}

impl fmt::Display for ExecutorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Server-reported executor lifecycle status.
///
/// `InRange` / `OutOfRange` are grid/LP refinements of the running
/// stage and may oscillate; everything else advances monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutorStatus {
    NotActive,
    Opening,
    Running,
    InRange,
    OutOfRange,
    Closing,
    Terminated,
    Completed,
    Failed,
}

impl ExecutorStatus {
    /// Lifecycle stage ordering used to reject regressions.
    ///
    /// Statuses at the same rank may replace each other (the running
    /// refinements); a lower rank never overwrites a higher one.
    pub fn rank(&self) -> u8 {
        match self {
            Self::NotActive => 0,
            Self::Opening => 1,
            Self::Running | Self::InRange | Self::OutOfRange => 2,
            Self::Closing => 3,
            Self::Terminated | Self::Completed | Self::Failed => 4,
        }
    }

    /// Whether this status ends the lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated | Self::Completed | Self::Failed)
    }

    /// Whether the executor is live on the server.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Opening | Self::Running | Self::InRange | Self::OutOfRange | Self::Closing
        )
    }

    /// Check if a server-reported status may replace this one.
    ///
    /// Transitions never go backwards: an executor cannot re-enter
    /// `NotActive` after `Opening`, and a terminal status is final.
    pub fn can_transition_to(&self, next: ExecutorStatus) -> bool {
        if self.is_terminal() {
            return *self == next;
        }
        next.rank() >= self.rank()
    }
}

impl fmt::Display for ExecutorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotActive => "NOT_ACTIVE",
            Self::Opening => "OPENING",
            Self::Running => "RUNNING",
            Self::InRange => "IN_RANGE",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::Closing => "CLOSING",
            Self::Terminated => "TERMINATED",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        };
        write!(f, "{s}")
    }
}

/// Opaque server-assigned executor identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutorId(String);

impl ExecutorId {
    /// Wrap a server-assigned id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a client-local placeholder id (used only in tests and
    /// for records awaiting server assignment).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExecutorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ExecutorId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ExecutorId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One deployed trading algorithm instance, as reported by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Executor {
    /// Server-assigned identifier.
    pub id: ExecutorId,
    /// Executor kind.
    #[serde(rename = "type")]
    pub executor_type: ExecutorType,
    /// Lifecycle status.
    pub status: ExecutorStatus,
    /// Exchange/chain connector (e.g., "binance_perpetual").
    pub connector: String,
    /// Market addressed by this executor.
    pub trading_pair: TradingPair,
    /// Direction of the exposure.
    pub side: TradeSide,
    /// Position size in base currency.
    pub amount: Amount,
    /// Average entry price, once known.
    #[serde(default)]
    pub entry_price: Option<Price>,
    /// Account the executor runs under.
    pub account_name: String,
    /// Server-side creation time.
    pub created_at: DateTime<Utc>,
    /// Exit barriers attached at creation (position-like executors).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barriers: Option<TripleBarrierConfig>,
    /// On-chain position address (LP executors only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_address: Option<String>,
    /// Net PnL in quote currency, as last reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_pnl_quote: Option<Decimal>,
}

impl Executor {
    /// Elapsed seconds since the executor was created.
    pub fn age_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_seconds()
    }

    /// Whether the lifecycle has ended.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opposite_and_wire_code() {
        assert_eq!(TradeSide::Buy.opposite(), TradeSide::Sell);
        assert_eq!(TradeSide::Buy.wire_code(), 1);
        assert_eq!(TradeSide::Sell.wire_code(), 2);
        assert_eq!(TradeSide::from_wire_code(2), Some(TradeSide::Sell));
        assert_eq!(TradeSide::from_wire_code(3), None);
    }

    #[test]
    fn test_side_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&TradeSide::Buy).unwrap(), "\"BUY\"");
    }

    #[test]
    fn test_status_serializes_screaming_snake() {
        let s = serde_json::to_string(&ExecutorStatus::OutOfRange).unwrap();
        assert_eq!(s, "\"OUT_OF_RANGE\"");
        let parsed: ExecutorStatus = serde_json::from_str("\"IN_RANGE\"").unwrap();
        assert_eq!(parsed, ExecutorStatus::InRange);
    }

    #[test]
    fn test_status_monotonic_forward() {
        assert!(ExecutorStatus::NotActive.can_transition_to(ExecutorStatus::Opening));
        assert!(ExecutorStatus::Opening.can_transition_to(ExecutorStatus::Running));
        assert!(ExecutorStatus::Running.can_transition_to(ExecutorStatus::Closing));
        assert!(ExecutorStatus::Closing.can_transition_to(ExecutorStatus::Terminated));
    }

    #[test]
    fn test_status_never_reenters_not_active() {
        assert!(!ExecutorStatus::Opening.can_transition_to(ExecutorStatus::NotActive));
        assert!(!ExecutorStatus::Running.can_transition_to(ExecutorStatus::NotActive));
    }

    #[test]
    fn test_running_refinements_oscillate() {
        assert!(ExecutorStatus::InRange.can_transition_to(ExecutorStatus::OutOfRange));
        assert!(ExecutorStatus::OutOfRange.can_transition_to(ExecutorStatus::InRange));
        assert!(ExecutorStatus::Running.can_transition_to(ExecutorStatus::InRange));
    }

    #[test]
    fn test_terminal_is_final() {
        assert!(!ExecutorStatus::Terminated.can_transition_to(ExecutorStatus::Running));
        assert!(!ExecutorStatus::Completed.can_transition_to(ExecutorStatus::Failed));
        // Refresh reporting the same terminal status is fine.
        assert!(ExecutorStatus::Terminated.can_transition_to(ExecutorStatus::Terminated));
    }

    #[test]
    fn test_executor_type_wire_names() {
        assert_eq!(ExecutorType::PositionExecutor.as_str(), "position_executor");
        assert_eq!(
            serde_json::to_string(&ExecutorType::GridExecutor).unwrap(),
            "\"grid_executor\""
        );
    }

    #[test]
    fn test_supports_barriers() {
        assert!(ExecutorType::PositionExecutor.supports_barriers());
        assert!(ExecutorType::DcaExecutor.supports_barriers());
        assert!(!ExecutorType::GridExecutor.supports_barriers());
        assert!(!ExecutorType::LpExecutor.supports_barriers());
    }
}
