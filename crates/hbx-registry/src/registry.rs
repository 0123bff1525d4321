//! The executor registry.
//!
//! A mutex-guarded, insertion-ordered collection of executor records.
//! All mutations are serialized through the lock and guarded by the
//! status transition rules, so a stale response can never move a record
//! backwards. The lock is never held across a network call.

use crate::api::ExecutorApi;
use crate::error::{RegistryError, RegistryResult};
use crate::request::{CreateExecutorRequest, ExecutorFilter, ValidationWarning};
use hbx_config::ExecutorDefaults;
use hbx_core::{Executor, ExecutorId, ExecutorStatus};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One locally known executor.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutorRecord {
    /// Last accepted server-reported state.
    pub executor: Executor,
    /// False for executors discovered out-of-band: they are listed for
    /// visibility but were not created through this registry.
    pub tracked: bool,
    /// Bumped on every accepted state change; a record whose sequence
    /// advanced past a caller's snapshot has newer state than the
    /// snapshot suggests.
    pub seq: u64,
}

/// Aggregate statistics over the registry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrySummary {
    pub total: usize,
    pub active: usize,
    pub terminal: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_status: BTreeMap<String, usize>,
    /// Sum of reported net PnL across records that carry one.
    pub total_net_pnl_quote: Decimal,
}

/// Local view of remote executors, reconciled against polled state.
pub struct ExecutorRegistry<A: ExecutorApi> {
    api: Arc<A>,
    defaults: ExecutorDefaults,
    records: Mutex<Vec<ExecutorRecord>>,
}

impl<A: ExecutorApi> ExecutorRegistry<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self::with_defaults(api, ExecutorDefaults::default())
    }

    /// Registry that merges saved per-type defaults into every create.
    pub fn with_defaults(api: Arc<A>, defaults: ExecutorDefaults) -> Self {
        Self {
            api,
            defaults,
            records: Mutex::new(Vec::new()),
        }
    }

    /// Validate and submit a create request; on success the executor is
    /// tracked with status `Opening`.
    ///
    /// Validation failures (grid ordering, malformed barriers) are
    /// returned before any network call. Soft warnings are logged.
    pub async fn create(&self, request: CreateExecutorRequest) -> RegistryResult<Executor> {
        let warnings = request.validate()?;
        for warning in &warnings {
            match warning {
                ValidationWarning::UnboundedExit => warn!(
                    connector = %request.connector,
                    trading_pair = %request.trading_pair,
                    "executor has no bounded exit condition (no stop-loss, take-profit, or time limit)"
                ),
                ValidationWarning::GridLevels(ceiling) => warn!(
                    requested = ceiling.requested,
                    max_levels = ceiling.max_levels,
                    "requested grid levels exceed what capital and spread density support"
                ),
            }
        }

        let mut wire = request.to_wire();
        self.defaults
            .apply(request.executor_type.as_str(), &mut wire);

        let mut executor = self
            .api
            .create_executor(wire, request.account_name.clone())
            .await?;

        // Submission implies the lifecycle has begun even if the server
        // answers before its own state machine ticks.
        if executor.status == ExecutorStatus::NotActive {
            executor.status = ExecutorStatus::Opening;
        }

        info!(
            id = %executor.id,
            executor_type = %executor.executor_type,
            trading_pair = %executor.trading_pair,
            "executor created"
        );

        let mut records = self.records.lock();
        records.push(ExecutorRecord {
            executor: executor.clone(),
            tracked: true,
            seq: 0,
        });
        Ok(executor)
    }

    /// Poll the server for one executor and fold the result into the
    /// local record. Ids unknown locally are added as untracked.
    pub async fn refresh(&self, id: &ExecutorId) -> RegistryResult<Executor> {
        let server_state = self.api.get_executor(id.clone()).await?;
        Ok(self.apply_server_state(server_state))
    }

    /// Stop an executor.
    ///
    /// Calling stop on an already-terminal executor is a no-op that
    /// returns the current state without touching the network. On
    /// failure the record keeps its last known state and the error
    /// propagates: stopping a live position must not be masked.
    pub async fn stop(
        &self,
        id: &ExecutorId,
        keep_position: bool,
    ) -> RegistryResult<Executor> {
        {
            let records = self.records.lock();
            let record = find(&records, id).ok_or_else(|| {
                RegistryError::UnknownExecutor(id.clone())
            })?;
            if record.executor.is_terminal() {
                debug!(id = %id, status = %record.executor.status, "stop on terminal executor is a no-op");
                return Ok(record.executor.clone());
            }
        }

        let server_state = self.api.stop_executor(id.clone(), keep_position).await?;
        info!(id = %id, keep_position, status = %server_state.status, "executor stopped");
        Ok(self.apply_server_state(server_state))
    }

    /// Locally tracked executors matching a filter, in insertion order.
    pub fn list(&self, filter: &ExecutorFilter) -> Vec<ExecutorRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| filter.matches(&r.executor))
            .cloned()
            .collect()
    }

    /// Current record for one executor.
    pub fn get(&self, id: &ExecutorId) -> Option<ExecutorRecord> {
        find(&self.records.lock(), id).cloned()
    }

    /// Pull the server's executor list and fold it into local state.
    /// Returns the ids that were previously unknown (added untracked).
    pub async fn sync_from_server(
        &self,
        filter: ExecutorFilter,
    ) -> RegistryResult<Vec<ExecutorId>> {
        let executors = self.api.search_executors(filter).await?;
        let mut discovered = Vec::new();
        for executor in executors {
            let known = {
                let records = self.records.lock();
                find(&records, &executor.id).is_some()
            };
            if !known {
                discovered.push(executor.id.clone());
            }
            self.apply_server_state(executor);
        }
        if !discovered.is_empty() {
            info!(count = discovered.len(), "discovered out-of-band executors");
        }
        Ok(discovered)
    }

    /// Drop an executor from local tracking. The remote executor is not
    /// touched; this mirrors deleting it from the tracked set.
    pub fn forget(&self, id: &ExecutorId) -> RegistryResult<ExecutorRecord> {
        let mut records = self.records.lock();
        let idx = records
            .iter()
            .position(|r| &r.executor.id == id)
            .ok_or_else(|| RegistryError::UnknownExecutor(id.clone()))?;
        Ok(records.remove(idx))
    }

    /// Aggregate statistics over all local records.
    pub fn summary(&self) -> RegistrySummary {
        let records = self.records.lock();
        let mut summary = RegistrySummary {
            total: records.len(),
            ..Default::default()
        };
        for record in records.iter() {
            let executor = &record.executor;
            if executor.status.is_active() {
                summary.active += 1;
            }
            if executor.is_terminal() {
                summary.terminal += 1;
            }
            *summary
                .by_type
                .entry(executor.executor_type.to_string())
                .or_default() += 1;
            *summary
                .by_status
                .entry(executor.status.to_string())
                .or_default() += 1;
            if let Some(pnl) = executor.net_pnl_quote {
                summary.total_net_pnl_quote += pnl;
            }
        }
        summary
    }

    /// Fold a server-reported state into the local record, refusing
    /// regressions (e.g. a stale `Running` after a terminal status).
    /// Unknown ids are added as untracked.
    fn apply_server_state(&self, server: Executor) -> Executor {
        let mut records = self.records.lock();
        match records.iter_mut().find(|r| r.executor.id == server.id) {
            Some(record) => {
                if record.executor.status.can_transition_to(server.status) {
                    record.executor = server;
                    record.seq += 1;
                } else {
                    warn!(
                        id = %server.id,
                        local = %record.executor.status,
                        reported = %server.status,
                        "ignoring stale server state: transition would go backwards"
                    );
                }
                record.executor.clone()
            }
            None => {
                debug!(id = %server.id, "adding out-of-band executor as untracked");
                records.push(ExecutorRecord {
                    executor: server.clone(),
                    tracked: false,
                    seq: 0,
                });
                server
            }
        }
    }
}

fn find<'a>(records: &'a [ExecutorRecord], id: &ExecutorId) -> Option<&'a ExecutorRecord> {
    records.iter().find(|r| &r.executor.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiCall, RecordingApi};
    use hbx_core::{Amount, ExecutorType, TradeSide, TradingPair, TripleBarrierConfig};
    use hbx_transport::TransportError;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn sample_executor(id: &str, status: ExecutorStatus) -> Executor {
        Executor {
            id: ExecutorId::new(id),
            executor_type: ExecutorType::PositionExecutor,
            status,
            connector: "binance_perpetual".to_string(),
            trading_pair: TradingPair::new("BTC-USDT").unwrap(),
            side: TradeSide::Buy,
            amount: Amount::new(dec!(0.01)),
            entry_price: None,
            account_name: "master_account".to_string(),
            created_at: chrono::Utc::now(),
            barriers: None,
            position_address: None,
            net_pnl_quote: None,
        }
    }

    fn sample_request() -> CreateExecutorRequest {
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

    fn registry() -> (Arc<RecordingApi>, ExecutorRegistry<RecordingApi>) {
        let api = Arc::new(RecordingApi::new());
        let registry = ExecutorRegistry::new(api.clone());
        (api, registry)
    }

    #[tokio::test]
    async fn test_create_tracks_executor_as_opening() {
        let (api, registry) = registry();
        api.push_create(Ok(sample_executor("e1", ExecutorStatus::NotActive)));

        let executor = registry.create(sample_request()).await.unwrap();
        assert_eq!(executor.status, ExecutorStatus::Opening);

        let record = registry.get(&ExecutorId::new("e1")).unwrap();
        assert!(record.tracked);
        assert_eq!(record.executor.status, ExecutorStatus::Opening);
    }

    #[tokio::test]
    async fn test_create_sends_account_and_wire_config() {
        let (api, registry) = registry();
        api.push_create(Ok(sample_executor("e1", ExecutorStatus::Opening)));

        registry.create(sample_request()).await.unwrap();

        match &api.calls()[0] {
            ApiCall::Create {
                executor_config,
                account_name,
            } => {
                assert_eq!(account_name, "master_account");
                assert_eq!(executor_config["type"], "position_executor");
                assert_eq!(executor_config["side"], 1);
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_invalid_grid_never_reaches_network() {
        let (api, registry) = registry();
        let mut request = sample_request();
        request.executor_type = ExecutorType::GridExecutor;
        request.grid = None;

        let err = registry.create(request).await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidRequest(_)));
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_create_merges_saved_defaults() {
        let api = Arc::new(RecordingApi::new());
        let mut defaults = ExecutorDefaults::default();
        defaults.set("position_executor", json!({"leverage": 5}));
        let registry = ExecutorRegistry::with_defaults(api.clone(), defaults);

        api.push_create(Ok(sample_executor("e1", ExecutorStatus::Opening)));
        registry.create(sample_request()).await.unwrap();

        match &api.calls()[0] {
            ApiCall::Create {
                executor_config, ..
            } => {
                assert_eq!(executor_config["leverage"], 5);
                // Explicit request fields are untouched by defaults.
                assert_eq!(executor_config["connector_name"], "binance_perpetual");
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_refresh_advances_status() {
        let (api, registry) = registry();
        api.push_create(Ok(sample_executor("e1", ExecutorStatus::Opening)));
        registry.create(sample_request()).await.unwrap();

        api.push_get(Ok(sample_executor("e1", ExecutorStatus::Running)));
        let executor = registry.refresh(&ExecutorId::new("e1")).await.unwrap();
        assert_eq!(executor.status, ExecutorStatus::Running);
        assert_eq!(registry.get(&ExecutorId::new("e1")).unwrap().seq, 1);
    }

    #[tokio::test]
    async fn test_refresh_unknown_id_added_untracked() {
        let (api, registry) = registry();
        api.push_get(Ok(sample_executor("ext", ExecutorStatus::Running)));

        registry.refresh(&ExecutorId::new("ext")).await.unwrap();
        let record = registry.get(&ExecutorId::new("ext")).unwrap();
        assert!(!record.tracked);
    }

    #[tokio::test]
    async fn test_stale_refresh_cannot_resurrect_stopped_executor() {
        let (api, registry) = registry();
        api.push_create(Ok(sample_executor("e1", ExecutorStatus::Running)));
        registry.create(sample_request()).await.unwrap();

        api.push_stop(Ok(sample_executor("e1", ExecutorStatus::Terminated)));
        registry
            .stop(&ExecutorId::new("e1"), false)
            .await
            .unwrap();

        // A refresh that raced the stop reports stale Running data.
        api.push_get(Ok(sample_executor("e1", ExecutorStatus::Running)));
        let executor = registry.refresh(&ExecutorId::new("e1")).await.unwrap();
        assert_eq!(executor.status, ExecutorStatus::Terminated);
    }

    #[tokio::test]
    async fn test_stop_terminal_is_idempotent_no_network() {
        let (api, registry) = registry();
        api.push_create(Ok(sample_executor("e1", ExecutorStatus::Running)));
        registry.create(sample_request()).await.unwrap();

        api.push_stop(Ok(sample_executor("e1", ExecutorStatus::Terminated)));
        let first = registry.stop(&ExecutorId::new("e1"), false).await.unwrap();
        let calls_after_first = api.call_count();

        let second = registry.stop(&ExecutorId::new("e1"), false).await.unwrap();
        assert_eq!(first.status, second.status);
        assert_eq!(api.call_count(), calls_after_first);
    }

    #[tokio::test]
    async fn test_stop_failure_keeps_last_known_state() {
        let (api, registry) = registry();
        api.push_create(Ok(sample_executor("e1", ExecutorStatus::Running)));
        registry.create(sample_request()).await.unwrap();

        api.push_stop(Err(TransportError::Server {
            url: "http://localhost:8000".into(),
            status: 503,
            body: String::new(),
        }));
        let err = registry.stop(&ExecutorId::new("e1"), false).await.unwrap_err();
        assert!(matches!(err, RegistryError::Transport(_)));

        let record = registry.get(&ExecutorId::new("e1")).unwrap();
        assert_eq!(record.executor.status, ExecutorStatus::Running);
    }

    #[tokio::test]
    async fn test_stop_unknown_id_rejected_locally() {
        let (api, registry) = registry();
        let err = registry
            .stop(&ExecutorId::new("missing"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownExecutor(_)));
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_stop_keep_position_flag_forwarded() {
        let (api, registry) = registry();
        api.push_create(Ok(sample_executor("e1", ExecutorStatus::Running)));
        registry.create(sample_request()).await.unwrap();

        api.push_stop(Ok(sample_executor("e1", ExecutorStatus::Terminated)));
        registry.stop(&ExecutorId::new("e1"), true).await.unwrap();

        assert!(api.calls().iter().any(|c| matches!(
            c,
            ApiCall::Stop {
                keep_position: true,
                ..
            }
        )));
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order_and_filters() {
        let (api, registry) = registry();
        for id in ["e1", "e2", "e3"] {
            api.push_create(Ok(sample_executor(id, ExecutorStatus::Running)));
            registry.create(sample_request()).await.unwrap();
        }
        api.push_stop(Ok(sample_executor("e2", ExecutorStatus::Terminated)));
        registry.stop(&ExecutorId::new("e2"), false).await.unwrap();

        let all = registry.list(&ExecutorFilter::all());
        let ids: Vec<_> = all.iter().map(|r| r.executor.id.as_str().to_string()).collect();
        assert_eq!(ids, vec!["e1", "e2", "e3"]);

        let running = registry.list(&ExecutorFilter::all().with_status(ExecutorStatus::Running));
        assert_eq!(running.len(), 2);
    }

    #[tokio::test]
    async fn test_sync_from_server_discovers_untracked() {
        let (api, registry) = registry();
        api.push_create(Ok(sample_executor("mine", ExecutorStatus::Running)));
        registry.create(sample_request()).await.unwrap();

        api.push_search(Ok(vec![
            sample_executor("mine", ExecutorStatus::Running),
            sample_executor("other", ExecutorStatus::Running),
        ]));
        let discovered = registry.sync_from_server(ExecutorFilter::all()).await.unwrap();
        assert_eq!(discovered, vec![ExecutorId::new("other")]);

        assert!(registry.get(&ExecutorId::new("mine")).unwrap().tracked);
        assert!(!registry.get(&ExecutorId::new("other")).unwrap().tracked);
    }

    #[tokio::test]
    async fn test_forget_removes_record() {
        let (api, registry) = registry();
        api.push_create(Ok(sample_executor("e1", ExecutorStatus::Terminated)));
        registry.create(sample_request()).await.unwrap();

        registry.forget(&ExecutorId::new("e1")).unwrap();
        assert!(registry.get(&ExecutorId::new("e1")).is_none());
        assert!(registry.forget(&ExecutorId::new("e1")).is_err());
    }

    #[tokio::test]
    async fn test_summary_counts() {
        let (api, registry) = registry();
        let mut winner = sample_executor("e1", ExecutorStatus::Running);
        winner.net_pnl_quote = Some(dec!(12.5));
        let mut loser = sample_executor("e2", ExecutorStatus::Terminated);
        loser.net_pnl_quote = Some(dec!(-2.5));

        api.push_create(Ok(winner));
        registry.create(sample_request()).await.unwrap();
        api.push_create(Ok(loser));
        registry.create(sample_request()).await.unwrap();

        let summary = registry.summary();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.active, 1);
        assert_eq!(summary.terminal, 1);
        assert_eq!(summary.by_type["position_executor"], 2);
        assert_eq!(summary.total_net_pnl_quote, dec!(10.0));
    }
}
