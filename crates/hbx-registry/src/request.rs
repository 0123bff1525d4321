//! Executor creation requests and search filters.
//!
//! Requests are validated client-side before any network call: grid
//! ordering violations fail fast, an unbounded exit produces a warning
//! but not a rejection.

use crate::error::{RegistryError, RegistryResult};
use hbx_core::{
    Amount, CoreError, ExecutorStatus, ExecutorType, GridConfig, GridLevelCeiling, TradeSide,
    TradingPair, TripleBarrierConfig,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Soft warning produced by request validation. Logged, never fatal:
/// the remote service is the final arbiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationWarning {
    /// No stop-loss, take-profit, time-limit, or trailing stop: the
    /// position has no bounded exit condition.
    UnboundedExit,
    /// More grid levels requested than capital and spread density allow.
    GridLevels(GridLevelCeiling),
}

/// Request to create one executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateExecutorRequest {
    pub executor_type: ExecutorType,
    pub connector: String,
    pub trading_pair: TradingPair,
    pub side: TradeSide,
    /// Position size in base currency.
    pub amount: Amount,
    /// Account to run the executor under.
    pub account_name: String,
    /// Exit barriers; meaningful for position-like executors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barriers: Option<TripleBarrierConfig>,
    /// Grid parameters; required for grid executors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridConfig>,
}

impl CreateExecutorRequest {
    /// Validate the request shape for its executor type.
    ///
    /// Hard failures (returned as errors) never reach the network; soft
    /// findings come back as warnings for the caller to log.
    pub fn validate(&self) -> RegistryResult<Vec<ValidationWarning>> {
        let mut warnings = Vec::new();

        if !self.amount.is_positive() {
            return Err(CoreError::InvalidAmount(format!(
                "amount must be positive, got {}",
                self.amount
            ))
            .into());
        }

        match self.executor_type {
            ExecutorType::GridExecutor => {
                let grid = self.grid.as_ref().ok_or_else(|| {
                    RegistryError::InvalidRequest(
                        "grid_executor requires a grid config".to_string(),
                    )
                })?;
                if grid.side != self.side {
                    return Err(RegistryError::InvalidRequest(format!(
                        "grid side {} does not match request side {}",
                        grid.side, self.side
                    )));
                }
                if let Some(ceiling) = grid.validate()? {
                    warnings.push(ValidationWarning::GridLevels(ceiling));
                }
            }
            t if t.supports_barriers() => {
                match &self.barriers {
                    None => warnings.push(ValidationWarning::UnboundedExit),
                    Some(barriers) => {
                        validate_barrier_fractions(barriers)?;
                        if barriers.is_unbounded() {
                            warnings.push(ValidationWarning::UnboundedExit);
                        }
                    }
                }
            }
            _ => {}
        }

        Ok(warnings)
    }

    /// Build the `executor_config` wire payload.
    pub fn to_wire(&self) -> Value {
        let mut config = json!({
            "type": self.executor_type.as_str(),
            "connector_name": self.connector,
            "trading_pair": self.trading_pair.as_str(),
            "side": self.side.wire_code(),
            "amount": self.amount,
        });
        let object = config.as_object_mut().expect("config is an object");

        if let Some(barriers) = &self.barriers {
            let barrier_value =
                serde_json::to_value(barriers).expect("barrier config serializes");
            if let Value::Object(fields) = barrier_value {
                object.extend(fields);
            }
        }
        if let Some(grid) = &self.grid {
            let grid_value = serde_json::to_value(grid).expect("grid config serializes");
            if let Value::Object(mut fields) = grid_value {
                // Side is already carried at the top level.
                fields.remove("side");
                object.extend(fields);
            }
        }
        config
    }
}

fn validate_barrier_fractions(barriers: &TripleBarrierConfig) -> RegistryResult<()> {
    for (name, value) in [
        ("stop_loss", barriers.stop_loss),
        ("take_profit", barriers.take_profit),
    ] {
        if let Some(fraction) = value {
            if fraction <= Decimal::ZERO {
                return Err(CoreError::InvalidBarrier(format!(
                    "{name} must be a positive fraction, got {fraction}"
                ))
                .into());
            }
        }
    }
    if barriers.time_limit == Some(0) {
        return Err(CoreError::InvalidBarrier(
            "time_limit must be at least one second".to_string(),
        )
        .into());
    }
    Ok(())
}

/// Filter for `list` and server-side search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutorFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ExecutorStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor_type: Option<ExecutorType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trading_pair: Option<TradingPair>,
}

impl ExecutorFilter {
    /// Filter that matches everything.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: ExecutorStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_connector(mut self, connector: impl Into<String>) -> Self {
        self.connector = Some(connector.into());
        self
    }

    pub fn with_trading_pair(mut self, pair: TradingPair) -> Self {
        self.trading_pair = Some(pair);
        self
    }

    pub fn with_type(mut self, executor_type: ExecutorType) -> Self {
        self.executor_type = Some(executor_type);
        self
    }

    /// Whether an executor matches every set field.
    pub fn matches(&self, executor: &hbx_core::Executor) -> bool {
        self.status.map_or(true, |s| executor.status == s)
            && self
                .executor_type
                .map_or(true, |t| executor.executor_type == t)
            && self
                .connector
                .as_ref()
                .map_or(true, |c| &executor.connector == c)
            && self
                .trading_pair
                .as_ref()
                .map_or(true, |p| &executor.trading_pair == p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hbx_core::Price;
    use rust_decimal_macros::dec;

    fn position_request() -> CreateExecutorRequest {
        CreateExecutorRequest {
            executor_type: ExecutorType::PositionExecutor,
            connector: "binance_perpetual".to_string(),
            trading_pair: TradingPair::new("BTC-USDT").unwrap(),
            side: TradeSide::Buy,
            amount: Amount::new(dec!(0.01)),
            account_name: "master_account".to_string(),
            barriers: Some(TripleBarrierConfig::with_bounds(dec!(0.02), dec!(0.04))),
            grid: None,
        }
    }

    fn grid_request() -> CreateExecutorRequest {
        CreateExecutorRequest {
            executor_type: ExecutorType::GridExecutor,
            barriers: None,
            grid: Some(GridConfig {
                side: TradeSide::Buy,
                start_price: Price::new(dec!(100)),
                end_price: Price::new(dec!(120)),
                limit_price: Price::new(dec!(95)),
                total_amount_quote: Amount::new(dec!(1000)),
                min_order_amount_quote: Amount::new(dec!(10)),
                min_spread_between_orders: dec!(0.005),
                grid_levels: None,
                max_open_orders: None,
            }),
            ..position_request()
        }
    }

    #[test]
    fn test_valid_position_request() {
        assert!(position_request().validate().unwrap().is_empty());
    }

    #[test]
    fn test_missing_barriers_is_warning_not_error() {
        let mut request = position_request();
        request.barriers = None;
        let warnings = request.validate().unwrap();
        assert_eq!(warnings, vec![ValidationWarning::UnboundedExit]);

        request.barriers = Some(TripleBarrierConfig::default());
        let warnings = request.validate().unwrap();
        assert_eq!(warnings, vec![ValidationWarning::UnboundedExit]);
    }

    #[test]
    fn test_negative_stop_loss_rejected() {
        let mut request = position_request();
        request.barriers = Some(TripleBarrierConfig::with_bounds(dec!(-0.02), dec!(0.04)));
        assert!(matches!(
            request.validate(),
            Err(RegistryError::Validation(CoreError::InvalidBarrier(_)))
        ));
    }

    #[test]
    fn test_grid_request_requires_grid_config() {
        let mut request = grid_request();
        request.grid = None;
        assert!(matches!(
            request.validate(),
            Err(RegistryError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_invalid_grid_ordering_rejected_before_network() {
        let mut request = grid_request();
        if let Some(grid) = &mut request.grid {
            grid.limit_price = Price::new(dec!(110));
        }
        assert!(matches!(
            request.validate(),
            Err(RegistryError::Validation(_))
        ));
    }

    #[test]
    fn test_grid_side_mismatch_rejected() {
        let mut request = grid_request();
        request.side = TradeSide::Sell;
        assert!(matches!(
            request.validate(),
            Err(RegistryError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_grid_level_ceiling_is_warning() {
        let mut request = grid_request();
        if let Some(grid) = &mut request.grid {
            grid.grid_levels = Some(500);
        }
        let warnings = request.validate().unwrap();
        assert!(matches!(warnings[0], ValidationWarning::GridLevels(_)));
    }

    #[test]
    fn test_wire_payload_shape() {
        let wire = position_request().to_wire();
        assert_eq!(wire["type"], "position_executor");
        assert_eq!(wire["connector_name"], "binance_perpetual");
        assert_eq!(wire["trading_pair"], "BTC-USDT");
        assert_eq!(wire["side"], 1);
        assert!(wire.get("stop_loss").is_some());
        assert!(wire.get("take_profit").is_some());
        // Unset barriers stay off the wire.
        assert!(wire.get("time_limit").is_none());
    }

    #[test]
    fn test_grid_wire_carries_bounds_once() {
        let wire = grid_request().to_wire();
        assert_eq!(wire["type"], "grid_executor");
        assert!(wire.get("start_price").is_some());
        assert!(wire.get("limit_price").is_some());
        // Side appears only as the top-level wire code.
        assert_eq!(wire["side"], 1);
    }

    #[test]
    fn test_filter_matching() {
        use chrono::Utc;
        use hbx_core::{Executor, ExecutorId, ExecutorStatus};

        let executor = Executor {
            id: ExecutorId::new("e1"),
            executor_type: ExecutorType::PositionExecutor,
            status: ExecutorStatus::Running,
            connector: "binance_perpetual".to_string(),
            trading_pair: TradingPair::new("BTC-USDT").unwrap(),
            side: TradeSide::Buy,
            amount: Amount::new(dec!(0.01)),
            entry_price: None,
            account_name: "master_account".to_string(),
            created_at: Utc::now(),
            barriers: None,
            position_address: None,
            net_pnl_quote: None,
        };

        assert!(ExecutorFilter::all().matches(&executor));
        assert!(ExecutorFilter::all()
            .with_status(ExecutorStatus::Running)
            .with_connector("binance_perpetual")
            .matches(&executor));
        assert!(!ExecutorFilter::all()
            .with_status(ExecutorStatus::Terminated)
            .matches(&executor));
        assert!(!ExecutorFilter::all()
            .with_trading_pair(TradingPair::new("ETH-USDT").unwrap())
            .matches(&executor));
    }
}
