//! Background barrier watcher.
//!
//! Polls a price provider on an interval, evaluates barriers for every
//! active executor, and emits events over a channel. Each executor
//! fires at most once until it leaves the active set; the caller
//! decides what to do with the event (typically confirm against server
//! state, then stop the executor).

use crate::event::BarrierEvent;
use crate::monitor::BarrierMonitor;
use chrono::Utc;
use hbx_core::{Executor, ExecutorId, Price, TradingPair};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Source of current market prices.
pub trait PriceProvider: Send + Sync {
    /// Current price for a market, or `None` when unavailable.
    fn price_for(&self, connector: &str, trading_pair: &TradingPair) -> Option<Price>;
}

/// Source of the executors to watch (typically a registry snapshot).
pub trait ExecutorSource: Send + Sync {
    /// Current local view of all executors.
    fn executors(&self) -> Vec<Executor>;
}

/// Watcher configuration.
#[derive(Debug, Clone, Copy)]
pub struct WatcherConfig {
    /// Poll interval.
    pub interval: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

/// Background loop evaluating barriers for active executors.
pub struct BarrierWatcher<P: PriceProvider, S: ExecutorSource> {
    monitor: Arc<BarrierMonitor>,
    provider: Arc<P>,
    source: Arc<S>,
    event_tx: mpsc::Sender<BarrierEvent>,
    config: WatcherConfig,
    cancel: CancellationToken,
    /// Executors that already fired; suppressed until they leave the
    /// active set so one crossing does not spam an event per tick.
    fired: HashSet<ExecutorId>,
}

impl<P: PriceProvider + 'static, S: ExecutorSource + 'static> BarrierWatcher<P, S> {
    pub fn new(
        monitor: Arc<BarrierMonitor>,
        provider: Arc<P>,
        source: Arc<S>,
        event_tx: mpsc::Sender<BarrierEvent>,
        config: WatcherConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            monitor,
            provider,
            source,
            event_tx,
            config,
            cancel,
            fired: HashSet::new(),
        }
    }

    /// Run until cancelled or the event channel closes.
    pub async fn run(mut self) {
        info!(interval_ms = self.config.interval.as_millis() as u64, "barrier watcher started");
        let mut ticker = tokio::time::interval(self.config.interval);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("barrier watcher stopped");
                    return;
                }
                _ = ticker.tick() => {}
            }

            if !self.tick().await {
                info!("event channel closed, stopping barrier watcher");
                return;
            }
        }
    }

    /// One evaluation pass. Returns false when the event channel closed.
    async fn tick(&mut self) -> bool {
        let now = Utc::now();
        for executor in self.source.executors() {
            if !executor.status.is_active() {
                // Dropped from the active set: release state so a new
                // lifecycle on the same market starts clean.
                self.monitor.clear(&executor.id);
                self.fired.remove(&executor.id);
                continue;
            }
            if self.fired.contains(&executor.id) {
                continue;
            }
            let Some(price) = self
                .provider
                .price_for(&executor.connector, &executor.trading_pair)
            else {
                debug!(
                    id = %executor.id,
                    trading_pair = %executor.trading_pair,
                    "no price available, skipping barrier evaluation"
                );
                continue;
            };

            if let Some(event) = self.monitor.evaluate(&executor, price, now) {
                info!(
                    id = %event.executor_id,
                    kind = %event.kind,
                    price = %event.observed_price,
                    "barrier fired"
                );
                self.fired.insert(executor.id.clone());
                if self.event_tx.send(event).await.is_err() {
                    return false;
                }
            }
        }
        true
    }
}
