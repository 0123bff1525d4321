//! Local executor registry.
//!
//! Tracks executors created through this client and reconciles them with
//! server-reported state. The server owns the state machine; the
//! registry is a cache of authoritative remote truth that refuses to go
//! backwards: a stale in-flight refresh can never overwrite a stop's
//! terminal outcome.

pub mod api;
pub mod error;
pub mod registry;
pub mod request;

pub use api::{ApiCall, BoxFuture, ExecutorApi, RecordingApi};
pub use error::{RegistryError, RegistryResult};
pub use registry::{ExecutorRecord, ExecutorRegistry, RegistrySummary};
pub use request::{CreateExecutorRequest, ExecutorFilter, ValidationWarning};
