//! Instruction Registry
//!
//! Maps string identifiers (e.g. "report_load") to factories that build ready-to-run
//! instructions from a JSON payload. Factories capture whatever services their
//! instructions need when they are registered, so nothing has to be injected into an
//! instruction after it has been built.

use super::types::SharedInstruction;

use anyhow::Result;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

/// Instruction exchanging JSON values, as produced by the registry.
pub type JsonInstruction = SharedInstruction<Value>;

/// Thread-safe factory turning a payload into a configured instruction.
pub type InstructionFactoryFn = Arc<dyn Fn(Value) -> Result<JsonInstruction> + Send + Sync>;

/// Registry holding the mapping between instruction names and their factories.
pub struct InstructionRegistry {
    factories: DashMap<String, InstructionFactoryFn>,
}

impl InstructionRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers a factory under `name`, replacing any previous one.
    pub fn register<F>(&self, name: &str, factory: F)
    where
        F: Fn(Value) -> Result<JsonInstruction> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Arc::new(factory));

        tracing::info!("Registered instruction factory: {}", name);
    }

    /// Builds the instruction registered under `name` for the given payload.
    ///
    /// # Returns
    /// * `Err` if no factory exists for `name` or the factory rejects the payload.
    pub fn build(&self, name: &str, payload: Value) -> Result<JsonInstruction> {
        // Clone the factory out so the map shard is not locked while it runs.
        let factory = self
            .factories
            .get(name)
            .map(|entry| entry.value().clone());

        match factory {
            Some(factory) => {
                tracing::debug!(
                    "Building instruction '{}' (payload size: {} bytes)",
                    name,
                    payload.to_string().len()
                );
                factory(payload)
            }
            None => {
                let error = format!("Unknown instruction: {}", name);
                tracing::error!("{}", error);
                Err(anyhow::anyhow!(error))
            }
        }
    }

    pub fn list_instructions(&self) -> Vec<String> {
        self.factories
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    pub fn has_instruction(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn instruction_count(&self) -> usize {
        self.factories.len()
    }
}

impl Default for InstructionRegistry {
    fn default() -> Self {
        Self {
            factories: DashMap::new(),
        }
    }
}
