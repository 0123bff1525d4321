//! Triple-barrier exit configuration.
//!
//! A position-like executor closes when the first of three conditions is
//! met: stop-loss, take-profit, or time-limit. An optional trailing stop
//! arms once price crosses an activation level and exits on retrace.
//! Enforcement is remote; this config is submitted with the executor and
//! mirrored locally for advisory evaluation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order type used when a barrier fires (wire codes per the API).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum BarrierOrderType {
    Market,
    Limit,
}

impl From<BarrierOrderType> for u8 {
    fn from(value: BarrierOrderType) -> Self {
        match value {
            BarrierOrderType::Market => 1,
            BarrierOrderType::Limit => 2,
        }
    }
}

impl TryFrom<u8> for BarrierOrderType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Market),
            2 => Ok(Self::Limit),
            other => Err(format!("unknown order type code {other}")),
        }
    }
}

/// Trailing stop: arms at `activation_price`, exits when price retraces
/// `trailing_delta` (fractional) from the best price seen since arming.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailingStopConfig {
    pub activation_price: Decimal,
    pub trailing_delta: Decimal,
}

/// Exit conditions attached to position-like executors.
///
/// All fields are optional on the wire. A config with no barrier at all
/// is legal but leaves the position without a bounded exit; callers are
/// expected to warn on `is_unbounded()` rather than reject.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripleBarrierConfig {
    /// Stop-loss as a fraction of entry price (0.02 = 2%).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<Decimal>,
    /// Take-profit as a fraction of entry price (0.04 = 4%).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<Decimal>,
    /// Auto-close after this many seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u64>,
    /// Optional trailing stop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing_stop: Option<TrailingStopConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss_order_type: Option<BarrierOrderType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit_order_type: Option<BarrierOrderType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_order_type: Option<BarrierOrderType>,
}

impl TripleBarrierConfig {
    /// Builder-style constructor for the common stop-loss/take-profit pair.
    pub fn with_bounds(stop_loss: Decimal, take_profit: Decimal) -> Self {
        Self {
            stop_loss: Some(stop_loss),
            take_profit: Some(take_profit),
            ..Self::default()
        }
    }

    /// Attach a time limit in seconds.
    pub fn with_time_limit(mut self, seconds: u64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    /// Attach a trailing stop.
    pub fn with_trailing_stop(mut self, config: TrailingStopConfig) -> Self {
        self.trailing_stop = Some(config);
        self
    }

    /// True when no barrier is configured at all.
    ///
    /// Unbounded risk is legal but discouraged; callers log a warning
    /// instead of rejecting the config.
    pub fn is_unbounded(&self) -> bool {
        self.stop_loss.is_none()
            && self.take_profit.is_none()
            && self.time_limit.is_none()
            && self.trailing_stop.is_none()
    }
}
