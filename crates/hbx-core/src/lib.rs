//! Core domain types for the Hummingbot executor client.
//!
//! This crate provides the fundamental types used throughout the client:
//! - `Price`, `Amount`: precision-safe numeric types
//! - `Executor`, `ExecutorType`, `ExecutorStatus`: remote executor model
//! - `TripleBarrierConfig`: stop-loss / take-profit / time-limit exits
//! - `GridConfig`: grid bounds with client-side validation
//! - `Position`, `PositionKey`: held-asset exposure bookkeeping

pub mod barrier;
pub mod decimal;
pub mod error;
pub mod executor;
pub mod grid;
pub mod pair;
pub mod position;

pub use barrier::{BarrierOrderType, TrailingStopConfig, TripleBarrierConfig};
pub use decimal::{Amount, Price};
pub use error::{CoreError, Result};
pub use executor::{Executor, ExecutorId, ExecutorStatus, ExecutorType, TradeSide};
pub use grid::{GridConfig, GridLevelCeiling};
pub use pair::TradingPair;
pub use position::{Position, PositionKey};
