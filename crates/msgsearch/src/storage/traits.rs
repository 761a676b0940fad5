//! Storage trait definitions

use anyhow::Result;

/// Durable string-keyed slot storage
///
/// Backs the search history (and anything else that needs to survive a
/// restart). Values are opaque strings; callers own serialization.
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if the slot is empty
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the slot entirely. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
