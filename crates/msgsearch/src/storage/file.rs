//! File-based key-value storage
//!
//! Directory structure:
//! ```text
//! state/
//!   chat_search_history.json
//!   other_slot.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::KvStore;

/// One file per slot under a root directory
pub struct FileKvStore {
    root: PathBuf,
}

impl FileKvStore {
    /// Create a new file store rooted at the given path
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).context("Failed to create slot storage directory")?;
        Ok(Self { root })
    }

    /// Get the file path for a key
    ///
    /// Keys are percent-encoded, so distinct keys never share a file and a
    /// key can never name a path outside the root directory.
    fn slot_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", urlencoding::encode(key)))
    }
}

impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let value = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read slot file: {}", path.display()))?;
        Ok(Some(value))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key);

        // Write atomically (write to temp, then rename)
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, value)
            .with_context(|| format!("Failed to write slot file: {}", temp_path.display()))?;
        fs::rename(&temp_path, &path)?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.slot_path(key);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}
