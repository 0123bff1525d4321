//! Barrier evaluation.
//!
//! Priority when several barriers are satisfied in one tick: stop-loss
//! first (capital preservation), then take-profit, then time-limit,
//! then trailing stop. This biases toward the conservative outcome when
//! a fast move crosses both bounds between polls; the remote tie-break
//! is authoritative and may differ.

use crate::event::{BarrierEvent, BarrierKind};
use chrono::{DateTime, Utc};
use hbx_core::{Executor, ExecutorId, Price, TradeSide, TrailingStopConfig};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::trace;

/// Evaluates barrier conditions against a live price feed.
///
/// Carries per-executor trailing-stop state (best price seen since the
/// trailing stop armed); everything else is stateless.
#[derive(Default)]
pub struct BarrierMonitor {
    /// Best price seen since the trailing stop armed, per executor.
    trailing_best: Mutex<HashMap<ExecutorId, Price>>,
}

impl BarrierMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate all configured barriers for one executor.
    ///
    /// Returns the highest-priority satisfied barrier, or `None` when
    /// nothing fired. Terminal executors and executors without barriers
    /// never fire. Price barriers need a known entry price; the time
    /// limit fires regardless.
    pub fn evaluate(
        &self,
        executor: &Executor,
        current_price: Price,
        now: DateTime<Utc>,
    ) -> Option<BarrierEvent> {
        if executor.status.is_terminal() {
            return None;
        }
        let barriers = executor.barriers.as_ref()?;

        let event = |kind: BarrierKind, threshold: Price, observed: Price| BarrierEvent {
            executor_id: executor.id.clone(),
            kind,
            observed_price: observed,
            threshold,
            observed_at: now,
        };

        if let Some(entry) = executor.entry_price {
            if let Some(stop_loss) = barriers.stop_loss {
                let threshold = match executor.side {
                    TradeSide::Buy => entry.with_fraction(-stop_loss),
                    TradeSide::Sell => entry.with_fraction(stop_loss),
                };
                let hit = match executor.side {
                    TradeSide::Buy => current_price <= threshold,
                    TradeSide::Sell => current_price >= threshold,
                };
                if hit {
                    return Some(event(BarrierKind::StopLoss, threshold, current_price));
                }
            }

            if let Some(take_profit) = barriers.take_profit {
                let threshold = match executor.side {
                    TradeSide::Buy => entry.with_fraction(take_profit),
                    TradeSide::Sell => entry.with_fraction(-take_profit),
                };
                let hit = match executor.side {
                    TradeSide::Buy => current_price >= threshold,
                    TradeSide::Sell => current_price <= threshold,
                };
                if hit {
                    return Some(event(BarrierKind::TakeProfit, threshold, current_price));
                }
            }
        }

        if let Some(time_limit) = barriers.time_limit {
            let age = executor.age_seconds(now);
            if age >= 0 && age as u64 >= time_limit {
                return Some(event(BarrierKind::TimeLimit, Price::ZERO, Price::ZERO));
            }
        }

        if let Some(trailing) = barriers.trailing_stop {
            if let Some(threshold) =
                self.trailing_threshold(&executor.id, executor.side, trailing, current_price)
            {
                return Some(event(BarrierKind::TrailingStop, threshold, current_price));
            }
        }

        None
    }

    /// Drop trailing state for an executor that is no longer watched.
    pub fn clear(&self, id: &ExecutorId) {
        self.trailing_best.lock().remove(id);
    }

    /// Update trailing state and return the exit threshold if crossed.
    ///
    /// BUY: arms once price reaches `activation_price`, tracks the high
    /// water mark, fires when price retraces `trailing_delta` from it.
    /// SELL mirrors with the low water mark.
    fn trailing_threshold(
        &self,
        id: &ExecutorId,
        side: TradeSide,
        config: TrailingStopConfig,
        current_price: Price,
    ) -> Option<Price> {
        let activation = Price::new(config.activation_price);
        let mut best_map = self.trailing_best.lock();

        let armed = best_map.contains_key(id)
            || match side {
                TradeSide::Buy => current_price >= activation,
                TradeSide::Sell => current_price <= activation,
            };
        if !armed {
            return None;
        }

        let best = best_map
            .entry(id.clone())
            .and_modify(|best| {
                *best = match side {
                    TradeSide::Buy => (*best).max(current_price),
                    TradeSide::Sell => (*best).min(current_price),
                };
            })
            .or_insert(current_price);

        let threshold = match side {
            TradeSide::Buy => best.with_fraction(-config.trailing_delta),
            TradeSide::Sell => best.with_fraction(config.trailing_delta),
        };
        trace!(%id, best = %best, threshold = %threshold, "trailing stop armed");

        let hit = match side {
            TradeSide::Buy => current_price <= threshold,
            TradeSide::Sell => current_price >= threshold,
        };
        hit.then_some(threshold)
    }
}
