use super::store::SharedStore;

use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

/// Process-local shared store.
///
/// Visible to everything holding the same `Arc`, but never outside the process.
/// Backs the standalone backend and each named map of the in-process cluster.
#[derive(Debug, Default)]
pub struct LocalStore {
    entries: DashMap<String, Value>,
}

impl LocalStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Snapshot of every entry, in no particular order.
    pub fn dump(&self) -> Vec<(String, Value)> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

impl SharedStore for LocalStore {
    fn get(&self, name: &str) -> Option<Value> {
        self.entries.get(name).map(|entry| entry.value().clone())
    }

    fn put(&self, name: &str, value: Value) {
        self.entries.insert(name.to_string(), value);
    }

    fn remove(&self, name: &str) -> Option<Value> {
        self.entries.remove(name).map(|(_, value)| value)
    }

    fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
