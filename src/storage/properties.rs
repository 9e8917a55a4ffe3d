//! Distributed Property Accessor
//!
//! Typed reads and writes over a backend's shared store. Values are kept as JSON,
//! and a typed read succeeds only when the stored value deserializes into the
//! requested type; anything else reads as absent.
//!
//! This layer adds no synchronization. Concurrent writers on different members race
//! with last-write-wins semantics, exactly as the underlying store allows. Callers that
//! need check-and-set must bring their own lock.

use super::store::SharedStore;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

#[derive(Clone)]
pub struct Properties {
    store: Arc<dyn SharedStore>,
}

impl Properties {
    pub fn new(store: Arc<dyn SharedStore>) -> Self {
        Self { store }
    }

    /// Returns the property as text, or `None` if it is unset or not a string.
    pub fn get(&self, name: &str) -> Option<String> {
        self.get_as::<String>(name)
    }

    /// Returns the property if it is set and of kind `T`.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let value = self.store.get(name)?;

        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                tracing::trace!(
                    "Property '{}' is not a {}: {}",
                    name,
                    std::any::type_name::<T>(),
                    e
                );
                None
            }
        }
    }

    /// Returns the property if it is set and of kind `T`, `fallback` otherwise.
    pub fn get_or<T: DeserializeOwned>(&self, name: &str, fallback: T) -> T {
        self.get_as(name).unwrap_or(fallback)
    }

    /// Overwrites the property with `value`.
    ///
    /// Fails only if `value` cannot be represented as JSON.
    pub fn set<V: Serialize + ?Sized>(&self, name: &str, value: &V) -> Result<()> {
        let value = serde_json::to_value(value)
            .with_context(|| format!("Property '{}' is not serializable", name))?;
        self.store.put(name, value);

        tracing::debug!("Set distributed property '{}'", name);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.store.contains(name)
    }

    /// Removes the property, returning whether it was set.
    pub fn remove(&self, name: &str) -> bool {
        self.store.remove(name).is_some()
    }

    pub fn store(&self) -> &Arc<dyn SharedStore> {
        &self.store
    }
}
