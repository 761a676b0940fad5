//! Configuration and data-directory helpers for the chat search tools
//!
//! Settings live in the platform config directory (`~/.config/chatsearch/`
//! on Linux), persisted state such as the history database in the platform
//! data directory (`~/.local/share/chatsearch/`).
//!
//! Call [`init`] at application startup to bootstrap the config directory.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name used under the platform config and data roots
const APP_DIR: &str = "chatsearch";

fn app_dir(root: Option<PathBuf>, kind: &str) -> Result<PathBuf> {
    root.map(|p| p.join(APP_DIR))
        .with_context(|| format!("Could not determine {} directory", kind))
}

/// Create the config directory if it doesn't exist and return its path
pub fn init() -> Result<PathBuf> {
    let dir = app_dir(dirs::config_dir(), "config")?;
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
    Ok(dir)
}

/// Path of `filename` inside the config directory
pub fn config_path(filename: &str) -> Option<PathBuf> {
    app_dir(dirs::config_dir(), "config")
        .ok()
        .map(|dir| dir.join(filename))
}

/// Path of `filename` inside the data directory
pub fn data_path(filename: &str) -> Option<PathBuf> {
    app_dir(dirs::data_dir(), "data")
        .ok()
        .map(|dir| dir.join(filename))
}

/// Whether `filename` exists in the config directory
pub fn config_exists(filename: &str) -> bool {
    config_path(filename).is_some_and(|p| p.exists())
}

/// Parse `filename` from the config directory
pub fn load_json<T: DeserializeOwned>(filename: &str) -> Result<T> {
    let path = app_dir(dirs::config_dir(), "config")?.join(filename);
    load_json_file(&path)
}

/// Parse a JSON file at an explicit path
pub fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse a JSON file, or return `T::default()` when it doesn't exist.
///
/// A file that exists but fails to parse is still an error.
pub fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    load_json_file(path)
}

/// Write `value` as pretty JSON to `filename` in the config directory
pub fn save_json<T: Serialize>(filename: &str, value: &T) -> Result<()> {
    let path = init()?.join(filename);
    let content = serde_json::to_string_pretty(value).context("Failed to serialize config")?;
    fs::write(&path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))
}
