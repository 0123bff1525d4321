//! Executor API trait for the registry.
//!
//! Abstracts the remote calls the registry performs so tests can run
//! against a recording mock instead of a live server. The real
//! implementation over the HTTP transport lives in the client facade.

use crate::request::ExecutorFilter;
use hbx_core::{Executor, ExecutorId};
use hbx_transport::TransportResult;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Remote executor operations the registry depends on.
pub trait ExecutorApi: Send + Sync {
    /// Create and start an executor from a wire config.
    fn create_executor(
        &self,
        executor_config: Value,
        account_name: String,
    ) -> BoxFuture<'_, TransportResult<Executor>>;

    /// Fetch one executor's current state.
    fn get_executor(&self, id: ExecutorId) -> BoxFuture<'_, TransportResult<Executor>>;

    /// Stop an executor, optionally keeping its position open.
    fn stop_executor(
        &self,
        id: ExecutorId,
        keep_position: bool,
    ) -> BoxFuture<'_, TransportResult<Executor>>;

    /// Enumerate executors matching a filter.
    fn search_executors(
        &self,
        filter: ExecutorFilter,
    ) -> BoxFuture<'_, TransportResult<Vec<Executor>>>;
}

/// Arc wrapper for ExecutorApi trait objects.
pub type DynExecutorApi = Arc<dyn ExecutorApi>;

/// One recorded call against the mock API.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Create {
        executor_config: Value,
        account_name: String,
    },
    Get {
        id: ExecutorId,
    },
    Stop {
        id: ExecutorId,
        keep_position: bool,
    },
    Search {
        filter: ExecutorFilter,
    },
}

/// Recording mock API for tests.
///
/// Canned results are queued per operation and consumed in order; every
/// call is recorded for verification. Panics when a queue runs dry so a
/// missing expectation fails loudly.
#[derive(Default)]
pub struct RecordingApi {
    calls: Mutex<Vec<ApiCall>>,
    create_results: Mutex<VecDeque<TransportResult<Executor>>>,
    get_results: Mutex<VecDeque<TransportResult<Executor>>>,
    stop_results: Mutex<VecDeque<TransportResult<Executor>>>,
    search_results: Mutex<VecDeque<TransportResult<Vec<Executor>>>>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_create(&self, result: TransportResult<Executor>) {
        self.create_results.lock().push_back(result);
    }

    pub fn push_get(&self, result: TransportResult<Executor>) {
        self.get_results.lock().push_back(result);
    }

    pub fn push_stop(&self, result: TransportResult<Executor>) {
        self.stop_results.lock().push_back(result);
    }

    pub fn push_search(&self, result: TransportResult<Vec<Executor>>) {
        self.search_results.lock().push_back(result);
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().clone()
    }

    /// Number of calls of any kind made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl ExecutorApi for RecordingApi {
    fn create_executor(
        &self,
        executor_config: Value,
        account_name: String,
    ) -> BoxFuture<'_, TransportResult<Executor>> {
        Box::pin(async move {
            self.calls.lock().push(ApiCall::Create {
                executor_config,
                account_name,
            });
            self.create_results
                .lock()
                .pop_front()
                .expect("RecordingApi: no canned create result")
        })
    }

    fn get_executor(&self, id: ExecutorId) -> BoxFuture<'_, TransportResult<Executor>> {
        Box::pin(async move {
            self.calls.lock().push(ApiCall::Get { id });
            self.get_results
                .lock()
                .pop_front()
                .expect("RecordingApi: no canned get result")
        })
    }

    fn stop_executor(
        &self,
        id: ExecutorId,
        keep_position: bool,
    ) -> BoxFuture<'_, TransportResult<Executor>> {
        Box::pin(async move {
            self.calls.lock().push(ApiCall::Stop { id, keep_position });
            self.stop_results
                .lock()
                .pop_front()
                .expect("RecordingApi: no canned stop result")
        })
    }

    fn search_executors(
        &self,
        filter: ExecutorFilter,
    ) -> BoxFuture<'_, TransportResult<Vec<Executor>>> {
        Box::pin(async move {
            self.calls.lock().push(ApiCall::Search { filter });
            self.search_results
                .lock()
                .pop_front()
                .expect("RecordingApi: no canned search result")
        })
    }
}
