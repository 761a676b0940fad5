//! In-memory key-value storage
//!
//! Used for tests and for sessions that don't need history to outlive
//! the process.

use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::sync::RwLock;

use super::KvStore;

/// In-memory implementation of KvStore
pub struct InMemoryKvStore {
    slots: RwLock<HashMap<String, String>>,
}

impl InMemoryKvStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore for InMemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let slots = self.slots.read().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = self.slots.write().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut slots = self.slots.write().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        slots.remove(key);
        Ok(())
    }
}
