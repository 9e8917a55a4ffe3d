use serde_json::Value;

/// Name → value view over whatever storage a backend shares between members.
///
/// Implementations decide the consistency model; callers get no locking or
/// check-and-set guarantees from this trait.
pub trait SharedStore: Send + Sync {
    fn get(&self, name: &str) -> Option<Value>;

    /// Stores `value` under `name`, overwriting any previous value.
    fn put(&self, name: &str, value: Value);

    fn remove(&self, name: &str) -> Option<Value>;

    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
