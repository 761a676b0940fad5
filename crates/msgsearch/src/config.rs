//! Engine configuration
//!
//! Loaded from (in order of priority):
//! 1. `search.json` in the shared config directory (~/.config/chatsearch/)
//! 2. Built-in defaults
//!
//! Every field is optional in the file; missing fields keep their defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config filename in the shared config directory
const CONFIG_FILE: &str = "search.json";

/// Slot name the search history is persisted under
pub const DEFAULT_HISTORY_KEY: &str = "chat_search_history";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Results per page
    pub page_size: usize,
    /// Matches kept per search before pagination
    pub max_results: usize,
    /// History entries kept in storage
    pub history_max_entries: usize,
    /// History entries surfaced by `list`
    pub history_display_max: usize,
    /// Suggestions returned per call
    pub suggestion_max: usize,
    /// Key-value slot holding the history
    pub history_key: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            max_results: 1000,
            history_max_entries: 20,
            history_display_max: 20,
            suggestion_max: 10,
            history_key: DEFAULT_HISTORY_KEY.to_string(),
        }
    }
}

impl SearchConfig {
    /// Load `search.json` from the config directory, or defaults if absent
    pub fn load() -> Result<Self> {
        if config::config_exists(CONFIG_FILE) {
            config::load_json(CONFIG_FILE)
        } else {
            Ok(Self::default())
        }
    }

    /// Whether `search.json` exists in the config directory
    pub fn exists() -> bool {
        config::config_exists(CONFIG_FILE)
    }

    /// Write this config as `search.json` in the config directory
    pub fn save(&self) -> Result<()> {
        config::save_json(CONFIG_FILE, self)
    }

    /// Load from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        config::load_json_file(path)
    }

    /// Load from a specific JSON file, or defaults if it doesn't exist
    pub fn from_file_or_default(path: &Path) -> Result<Self> {
        config::load_json_or_default(path)
    }

    /// Parse from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse search config JSON")
    }
}
