//! REST adapter implementing the registry and reconciler trait seams
//! over the HTTP transport.
//!
//! Server payloads are parsed best-effort: the API has grown field
//! aliases over time (`id` vs `executor_id`, `connector_name` vs
//! `connector`, numeric vs string sides), so lookups try the known
//! spellings before giving up.

use chrono::{DateTime, TimeZone, Utc};
use hbx_core::{
    Amount, Executor, ExecutorId, ExecutorStatus, ExecutorType, Position, Price, TradeSide,
    TradingPair, TripleBarrierConfig,
};
use hbx_reconcile::PositionQuery;
use hbx_registry::{BoxFuture, ExecutorApi, ExecutorFilter};
use hbx_transport::{endpoints, ApiTransport, TransportError, TransportResult};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

/// `ExecutorApi` + `PositionQuery` over an [`ApiTransport`].
pub struct RestExecutorApi {
    transport: Arc<ApiTransport>,
}

impl RestExecutorApi {
    pub fn new(transport: Arc<ApiTransport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<ApiTransport> {
        &self.transport
    }

    fn decode_error(&self, path: &str, message: impl Into<String>) -> TransportError {
        TransportError::Decode {
            url: format!("{}{}", self.transport.base_url(), path),
            message: message.into(),
        }
    }
}

impl ExecutorApi for RestExecutorApi {
    fn create_executor(
        &self,
        executor_config: Value,
        account_name: String,
    ) -> BoxFuture<'_, TransportResult<Executor>> {
        Box::pin(async move {
            let body = json!({
                "executor_config": executor_config.clone(),
                "account_name": account_name,
            });
            let response = self.transport.post(endpoints::EXECUTORS, &body).await?;
            parse_executor(unwrap_executor(&response), Some(&executor_config))
                .ok_or_else(|| {
                    self.decode_error(endpoints::EXECUTORS, "unrecognized executor payload")
                })
        })
    }

    fn get_executor(&self, id: ExecutorId) -> BoxFuture<'_, TransportResult<Executor>> {
        Box::pin(async move {
            let path = endpoints::executor(id.as_str());
            let response = self.transport.get(&path).await?;
            parse_executor(unwrap_executor(&response), None)
                .ok_or_else(|| self.decode_error(&path, "unrecognized executor payload"))
        })
    }

    fn stop_executor(
        &self,
        id: ExecutorId,
        keep_position: bool,
    ) -> BoxFuture<'_, TransportResult<Executor>> {
        Box::pin(async move {
            let path = endpoints::executor_stop(id.as_str());
            let body = json!({ "keep_position": keep_position });
            let response = self.transport.post(&path, &body).await?;

            // Some deployments answer a stop with the full executor,
            // others with a bare acknowledgement; fall back to a fetch.
            if let Some(executor) = parse_executor(unwrap_executor(&response), None) {
                return Ok(executor);
            }
            self.get_executor(id).await
        })
    }

    fn search_executors(
        &self,
        filter: ExecutorFilter,
    ) -> BoxFuture<'_, TransportResult<Vec<Executor>>> {
        Box::pin(async move {
            let path = search_path(&filter);
            let response = self.transport.get(&path).await?;
            let items = unwrap_executor_list(&response);

            let mut executors = Vec::with_capacity(items.len());
            for (idx, item) in items.iter().enumerate() {
                match parse_executor(item, None) {
                    Some(executor) => executors.push(executor),
                    None => warn!(idx, "skipping unparseable executor in search response"),
                }
            }
            Ok(executors)
        })
    }
}

impl PositionQuery for RestExecutorApi {
    fn lp_position(
        &self,
        connector: String,
        trading_pair: TradingPair,
        address: String,
    ) -> BoxFuture<'_, TransportResult<Option<Position>>> {
        Box::pin(async move {
            let path = endpoints::position(&connector, trading_pair.as_str());
            let response = match self.transport.get(&path).await {
                Ok(value) => value,
                Err(TransportError::NotFound { .. }) => return Ok(None),
                Err(err) => return Err(err),
            };
            if response.is_null() {
                return Ok(None);
            }

            // A position held for a different address means the tracked
            // one no longer exists.
            if let Some(reported) = string_field(&response, &["position_address", "address"]) {
                if reported != address {
                    return Ok(None);
                }
            }
            Ok(parse_position(&response))
        })
    }

    fn positions_summary(&self) -> BoxFuture<'_, TransportResult<Vec<Position>>> {
        Box::pin(async move {
            let response = self.transport.get(endpoints::POSITIONS_SUMMARY).await?;
            let items = unwrap_position_list(&response);
            Ok(items.iter().filter_map(|item| parse_position(item)).collect())
        })
    }
}

fn search_path(filter: &ExecutorFilter) -> String {
    let mut params = Vec::new();
    if let Some(status) = filter.status {
        params.push(format!("status={status}"));
    }
    if let Some(executor_type) = filter.executor_type {
        params.push(format!("executor_type={executor_type}"));
    }
    if let Some(connector) = &filter.connector {
        params.push(format!("connector_name={connector}"));
    }
    if let Some(pair) = &filter.trading_pair {
        params.push(format!("trading_pair={pair}"));
    }
    if params.is_empty() {
        endpoints::EXECUTORS_SEARCH.to_string()
    } else {
        format!("{}?{}", endpoints::EXECUTORS_SEARCH, params.join("&"))
    }
}

/// Unwrap `{"executor": {...}}` envelopes.
fn unwrap_executor(value: &Value) -> &Value {
    value.get("executor").unwrap_or(value)
}

fn unwrap_executor_list(value: &Value) -> Vec<&Value> {
    let list = value
        .get("executors")
        .or_else(|| value.get("data"))
        .unwrap_or(value);
    list.as_array().map(|a| a.iter().collect()).unwrap_or_default()
}

fn unwrap_position_list(value: &Value) -> Vec<&Value> {
    let list = value.get("positions").unwrap_or(value);
    list.as_array().map(|a| a.iter().collect()).unwrap_or_default()
}

/// Best-effort executor parse.
///
/// `fallback` is the submitted `executor_config`: fields the response
/// omits (creation acks are often sparse) are taken from what was sent.
fn parse_executor(value: &Value, fallback: Option<&Value>) -> Option<Executor> {
    let config = value.get("config").or_else(|| value.get("executor_config"));
    let sources = [Some(value), config, fallback];
    let lookup = |keys: &[&str]| -> Option<Value> {
        for source in sources.iter().flatten() {
            for key in keys {
                if let Some(found) = source.get(*key) {
                    if !found.is_null() {
                        return Some(found.clone());
                    }
                }
            }
        }
        None
    };

    let id = lookup(&["id", "executor_id"])?;
    let id = ExecutorId::new(id.as_str()?.to_string());

    let executor_type: ExecutorType =
        serde_json::from_value(lookup(&["type", "executor_type"])?).ok()?;
    let status = lookup(&["status"])
        .and_then(|s| serde_json::from_value(s).ok())
        .unwrap_or(ExecutorStatus::NotActive);

    let connector = lookup(&["connector_name", "connector"])?.as_str()?.to_string();
    let trading_pair = TradingPair::new(lookup(&["trading_pair"])?.as_str()?).ok()?;
    let side = parse_side(&lookup(&["side"])?)?;
    let amount = Amount::new(parse_decimal(&lookup(&["amount"])?)?);
    let entry_price = lookup(&["entry_price"])
        .as_ref()
        .and_then(parse_decimal)
        .map(Price::new);
    let account_name = lookup(&["account_name"])
        .and_then(|v| v.as_str().map(String::from))
        .unwrap_or_else(|| "master_account".to_string());
    let created_at = lookup(&["created_at", "timestamp"])
        .as_ref()
        .and_then(parse_timestamp)
        .unwrap_or_else(Utc::now);

    // Barrier fields live beside the config fields; an all-empty parse
    // means no barriers were configured.
    let barrier_source = config.or(fallback).unwrap_or(value);
    let barriers = serde_json::from_value::<TripleBarrierConfig>(barrier_source.clone())
        .ok()
        .filter(|b| !b.is_unbounded());

    let position_address = lookup(&["position_address"]).and_then(|v| v.as_str().map(String::from));
    let net_pnl_quote = lookup(&["net_pnl_quote"]).as_ref().and_then(parse_decimal);

    Some(Executor {
        id,
        executor_type,
        status,
        connector,
        trading_pair,
        side,
        amount,
        entry_price,
        account_name,
        created_at,
        barriers,
        position_address,
        net_pnl_quote,
    })
}

fn parse_position(value: &Value) -> Option<Position> {
    let connector = string_field(value, &["connector_name", "connector"])?;
    let trading_pair = TradingPair::new(string_field(value, &["trading_pair"])?).ok()?;
    let side = parse_side(value.get("side")?)?;
    let amount = Amount::new(parse_decimal(value.get("amount")?)?);
    let entry_price = value
        .get("entry_price")
        .and_then(parse_decimal)
        .map(Price::new)
        .unwrap_or(Price::ZERO);
    Some(Position {
        connector,
        trading_pair,
        side,
        amount,
        entry_price,
    })
}

fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| value.get(*k))
        .and_then(|v| v.as_str())
        .map(String::from)
}

/// Sides arrive as "BUY"/"SELL" strings or as 1/2 wire codes.
fn parse_side(value: &Value) -> Option<TradeSide> {
    match value {
        Value::String(s) => match s.to_uppercase().as_str() {
            "BUY" => Some(TradeSide::Buy),
            "SELL" => Some(TradeSide::Sell),
            _ => None,
        },
        Value::Number(n) => TradeSide::from_wire_code(n.as_u64()? as u8),
        _ => None,
    }
}

/// Decimals arrive as strings or JSON numbers.
fn parse_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}

/// Timestamps arrive as RFC 3339 strings or unix epoch seconds.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => {
            let secs = n.as_f64()?;
            Utc.timestamp_opt(secs as i64, 0).single()
        }
        _ => None,
    }
}
