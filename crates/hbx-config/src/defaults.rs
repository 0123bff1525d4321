//! Per-executor-type default configuration fields.
//!
//! Saved defaults are merged into an `executor_config` at create time;
//! fields the caller sets explicitly always win over saved defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Default `executor_config` fields keyed by executor type name
/// (e.g., "position_executor").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutorDefaults(BTreeMap<String, Value>);

impl ExecutorDefaults {
    /// Saved defaults for one executor type.
    pub fn get(&self, executor_type: &str) -> Option<&Value> {
        self.0.get(executor_type)
    }

    /// Save defaults for an executor type, replacing any previous value.
    pub fn set(&mut self, executor_type: impl Into<String>, defaults: Value) {
        self.0.insert(executor_type.into(), defaults);
    }

    /// Drop saved defaults for an executor type.
    pub fn reset(&mut self, executor_type: &str) -> Option<Value> {
        self.0.remove(executor_type)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge saved defaults into `config`: keys missing from `config`
    /// are filled in, explicit keys are left untouched. Non-object
    /// configs and defaults are returned unchanged.
    pub fn apply(&self, executor_type: &str, config: &mut Value) {
        let (Some(Value::Object(defaults)), Some(target)) =
            (self.get(executor_type), config.as_object_mut())
        else {
            return;
        };
        for (key, value) in defaults {
            target.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }
}
