use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::PoisonError;

use crate::module::ModuleOption;

/// Sentinel stored for a counter that was never fetched or whose fetch
/// failed. Distinct from a real zero.
pub const UNAVAILABLE_COUNT: i64 = -1;

/// Persisted integer counters (an external collaborator).
///
/// Missing keys read as [`UNAVAILABLE_COUNT`].
pub trait CounterStore: Send + Sync {
    fn get_int(&self, key: &str) -> i64;
    fn set_int(&self, key: &str, value: i64);
}

/// Key under which a module persists one of its counters,
/// e.g. `safety_hub.account_passwords.compromised`.
pub fn counter_key(option: ModuleOption, field: &str) -> String {
    format!("safety_hub.{}.{field}", option.key())
}

/// In-process counter store.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    values: Mutex<HashMap<String, i64>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<String>,
    {
        Self {
            values: Mutex::new(values.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }

    /// Sorted copy of every stored counter.
    pub fn snapshot(&self) -> BTreeMap<String, i64> {
        let guard = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        guard.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }
}

impl CounterStore for MemoryCounterStore {
    fn get_int(&self, key: &str) -> i64 {
        let guard = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        guard.get(key).copied().unwrap_or(UNAVAILABLE_COUNT)
    }

    fn set_int(&self, key: &str, value: i64) {
        let mut guard = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        guard.insert(key.to_string(), value);
    }
}
