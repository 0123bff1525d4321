//! Held-position bookkeeping.
//!
//! A position outlives its originating executor when the executor is
//! stopped with `keep_position = true`. The remote service guarantees at
//! most one active position per (connector, trading pair) key; local
//! bookkeeping respects that uniqueness when reconciling.

use crate::decimal::{Amount, Price};
use crate::executor::TradeSide;
use crate::pair::TradingPair;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Uniqueness key for a held position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionKey {
    pub connector: String,
    pub trading_pair: TradingPair,
}

impl PositionKey {
    pub fn new(connector: impl Into<String>, trading_pair: TradingPair) -> Self {
        Self {
            connector: connector.into(),
            trading_pair,
        }
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.connector, self.trading_pair)
    }
}

/// A held asset exposure, as reported by the positions summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub connector: String,
    pub trading_pair: TradingPair,
    pub side: TradeSide,
    pub amount: Amount,
    pub entry_price: Price,
}

impl Position {
    /// Uniqueness key for this position.
    pub fn key(&self) -> PositionKey {
        PositionKey::new(self.connector.clone(), self.trading_pair.clone())
    }

    /// Notional exposure at the entry price, in quote currency.
    pub fn entry_notional(&self) -> Amount {
        self.amount.notional(self.entry_price)
    }

    /// Check if the position is empty (amount is zero).
    pub fn is_empty(&self) -> bool {
        self.amount.is_zero()
    }
}
