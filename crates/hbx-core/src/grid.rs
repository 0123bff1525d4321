//! Grid executor configuration and client-side validation.
//!
//! Grid configs are validated before submission so an ordering mistake
//! fails fast instead of burning a round trip. The level ceiling check
//! is advisory only; the remote service is the final arbiter.

use crate::decimal::{Amount, Price};
use crate::error::{CoreError, Result};
use crate::executor::TradeSide;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Advisory warning: more levels requested than the config can support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLevelCeiling {
    /// Levels the caller asked for.
    pub requested: u32,
    /// Maximum levels supported by capital and spread density.
    pub max_levels: u32,
}

/// Bounds and density parameters for a grid executor.
///
/// `start_price` and `end_price` are always the ascending range bounds;
/// the limit price sits below the range for LONG grids and above it for
/// SHORT grids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub side: TradeSide,
    /// Lower bound of the grid range.
    pub start_price: Price,
    /// Upper bound of the grid range.
    pub end_price: Price,
    /// Safety limit price outside the range.
    pub limit_price: Price,
    /// Total capital allocation in quote currency.
    pub total_amount_quote: Amount,
    /// Minimum order size in quote currency.
    pub min_order_amount_quote: Amount,
    /// Minimum fractional spread between adjacent levels (0.0005 = 0.05%).
    pub min_spread_between_orders: Decimal,
    /// Requested number of grid levels, if the caller wants a fixed count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_levels: Option<u32>,
    /// Maximum concurrent open orders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_open_orders: Option<u32>,
}

impl GridConfig {
    /// Validate the config; returns a soft level-ceiling warning if the
    /// requested level count exceeds what capital and spread allow.
    ///
    /// Ordering invariant (hard failure, checked before any network call):
    /// - LONG:  `limit_price < start_price < end_price`
    /// - SHORT: `start_price < end_price < limit_price`
    pub fn validate(&self) -> Result<Option<GridLevelCeiling>> {
        for (name, price) in [
            ("start_price", self.start_price),
            ("end_price", self.end_price),
            ("limit_price", self.limit_price),
        ] {
            if !price.is_positive() {
                return Err(CoreError::InvalidGrid(format!(
                    "{name} must be positive, got {price}"
                )));
            }
        }

        if self.start_price >= self.end_price {
            return Err(CoreError::InvalidGrid(format!(
                "start_price {} must be below end_price {}",
                self.start_price, self.end_price
            )));
        }

        match self.side {
            TradeSide::Buy => {
                if self.limit_price >= self.start_price {
                    return Err(CoreError::InvalidGrid(format!(
                        "LONG grid requires limit_price < start_price < end_price, \
                         got limit {} >= start {}",
                        self.limit_price, self.start_price
                    )));
                }
            }
            TradeSide::Sell => {
                if self.limit_price <= self.end_price {
                    return Err(CoreError::InvalidGrid(format!(
                        "SHORT grid requires start_price < end_price < limit_price, \
                         got limit {} <= end {}",
                        self.limit_price, self.end_price
                    )));
                }
            }
        }

        if !self.total_amount_quote.is_positive() {
            return Err(CoreError::InvalidGrid(
                "total_amount_quote must be positive".to_string(),
            ));
        }
        if !self.min_order_amount_quote.is_positive() {
            return Err(CoreError::InvalidGrid(
                "min_order_amount_quote must be positive".to_string(),
            ));
        }
        if self.min_spread_between_orders <= Decimal::ZERO {
            return Err(CoreError::InvalidGrid(
                "min_spread_between_orders must be positive".to_string(),
            ));
        }

        Ok(self.level_ceiling_warning())
    }

    /// Maximum levels supported: capital-bound and density-bound, whichever
    /// is tighter.
    ///
    /// `max_levels = min(total_quote / min_order_quote,
    ///                   price_range / (min_spread * mid_price))`
    pub fn max_levels(&self) -> u32 {
        let by_capital =
            (self.total_amount_quote.inner() / self.min_order_amount_quote.inner()).floor();

        let price_range = self.end_price.inner() - self.start_price.inner();
        let mid_price = (self.start_price.inner() + self.end_price.inner()) / Decimal::TWO;
        let min_level_gap = self.min_spread_between_orders * mid_price;
        let by_density = if min_level_gap > Decimal::ZERO {
            (price_range / min_level_gap).floor()
        } else {
            Decimal::ZERO
        };

        let ceiling = by_capital.min(by_density);
        ceiling.to_u32().unwrap_or(u32::MAX)
    }

    fn level_ceiling_warning(&self) -> Option<GridLevelCeiling> {
        let requested = self.grid_levels?;
        let max_levels = self.max_levels();
        (requested > max_levels).then_some(GridLevelCeiling {
            requested,
            max_levels,
        })
    }
}
