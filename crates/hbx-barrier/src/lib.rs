//! Client-side triple-barrier monitor.
//!
//! Mirrors the remote barrier evaluation for pre-emptive alerting. The
//! authoritative enforcement is remote: this component never executes an
//! exit, it only raises events for the caller to log, alert on, and
//! confirm against server state.

pub mod event;
pub mod monitor;
pub mod watcher;

pub use event::{BarrierEvent, BarrierKind};
pub use monitor::BarrierMonitor;
pub use watcher::{BarrierWatcher, ExecutorSource, PriceProvider, WatcherConfig};
