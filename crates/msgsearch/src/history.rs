//! Search history
//!
//! A bounded, most-recent-first list of past searches, persisted as JSON in
//! a single key-value slot. One entry per keyword: searching an existing
//! keyword again moves it to the front. Unreadable persisted data loads as
//! an empty history.

use std::sync::{Arc, PoisonError, RwLock};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::models::SearchFilters;
use crate::storage::KvStore;

/// A record of one completed search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryEntry {
    pub id: String,
    pub keyword: String,
    pub searched_at: DateTime<Utc>,
    /// Number of matches when the search ran
    pub result_count: usize,
    pub filters: SearchFilters,
}

impl SearchHistoryEntry {
    /// Create an entry timestamped now
    pub fn new(keyword: impl Into<String>, result_count: usize, filters: SearchFilters) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            keyword: keyword.into(),
            searched_at: Utc::now(),
            result_count,
            filters,
        }
    }
}

/// Aggregates over the stored history
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total_searches: usize,
    pub total_results: usize,
    pub zero_result_searches: usize,
    pub last_searched_at: Option<DateTime<Utc>>,
}

impl HistoryStats {
    fn compute(entries: &[SearchHistoryEntry]) -> Self {
        Self {
            total_searches: entries.len(),
            total_results: entries.iter().map(|e| e.result_count).sum(),
            zero_result_searches: entries.iter().filter(|e| e.result_count == 0).count(),
            last_searched_at: entries.iter().map(|e| e.searched_at).max(),
        }
    }
}

/// Bounded search history backed by a key-value slot
///
/// Mutations update memory first, then write the full list to the slot.
/// A crash between the two loses at most the latest change.
pub struct HistoryStore {
    kv: Arc<dyn KvStore>,
    key: String,
    max_entries: usize,
    display_max: usize,
    entries: RwLock<Vec<SearchHistoryEntry>>,
    /// Cleared on every mutation
    stats_cache: RwLock<Option<HistoryStats>>,
}

impl HistoryStore {
    /// Load history from `key` in `kv`.
    ///
    /// Missing, unreadable or corrupt data yields an empty history.
    pub fn load(
        kv: Arc<dyn KvStore>,
        key: impl Into<String>,
        max_entries: usize,
        display_max: usize,
    ) -> Self {
        let key = key.into();
        let mut entries = match kv.get(&key) {
            Ok(Some(json)) => match serde_json::from_str::<Vec<SearchHistoryEntry>>(&json) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Discarding corrupt search history in '{}': {}", key, e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to read search history from '{}': {:#}", key, e);
                Vec::new()
            }
        };
        entries.truncate(max_entries);

        Self {
            kv,
            key,
            max_entries,
            display_max,
            entries: RwLock::new(entries),
            stats_cache: RwLock::new(None),
        }
    }

    /// Load history using the slot and limits from `config`
    pub fn from_config(kv: Arc<dyn KvStore>, config: &SearchConfig) -> Self {
        Self::load(
            kv,
            config.history_key.clone(),
            config.history_max_entries,
            config.history_display_max,
        )
    }

    /// Record a search at the front of the history.
    ///
    /// An existing entry with the same keyword is replaced, and the oldest
    /// entries beyond the maximum are dropped. The in-memory history is
    /// updated even when persisting fails.
    pub fn record(&self, entry: SearchHistoryEntry) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|e| e.keyword != entry.keyword);
        entries.insert(0, entry);
        entries.truncate(self.max_entries);
        self.invalidate_stats();

        let json = serde_json::to_string(&*entries).context("Failed to serialize search history")?;
        self.kv
            .set(&self.key, &json)
            .with_context(|| format!("Failed to persist search history to '{}'", self.key))
    }

    /// Entries newest first, capped at the display maximum
    pub fn list(&self) -> Vec<SearchHistoryEntry> {
        let mut entries = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        entries.sort_by(|a, b| b.searched_at.cmp(&a.searched_at));
        entries.truncate(self.display_max);
        entries
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry and remove the persisted slot
    pub fn clear(&self) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
        self.invalidate_stats();
        info!("Cleared search history");

        self.kv
            .remove(&self.key)
            .with_context(|| format!("Failed to remove search history slot '{}'", self.key))
    }

    /// Aggregate statistics, computed on first use after each mutation
    pub fn stats(&self) -> HistoryStats {
        if let Some(stats) = self
            .stats_cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return stats.clone();
        }

        // Entries stay locked until the cache is written
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let stats = HistoryStats::compute(&entries);
        *self
            .stats_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(stats.clone());
        stats
    }

    fn invalidate_stats(&self) {
        *self
            .stats_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryKvStore;
    use chrono::Duration;

    const KEY: &str = "chat_search_history";

    fn store_with(kv: Arc<InMemoryKvStore>, max: usize) -> HistoryStore {
        HistoryStore::load(kv, KEY, max, max)
    }

    fn entry(keyword: &str, count: usize) -> SearchHistoryEntry {
        SearchHistoryEntry::new(keyword, count, SearchFilters::keyword(keyword))
    }

    fn keywords(history: &HistoryStore) -> Vec<String> {
        history.list().into_iter().map(|e| e.keyword).collect()
    }

    /// Entry timestamped `offset_secs` from now
    fn entry_at(keyword: &str, offset_secs: i64) -> SearchHistoryEntry {
        let mut e = entry(keyword, 1);
        e.searched_at = Utc::now() + Duration::seconds(offset_secs);
        e
    }

    #[test]
    fn test_record_puts_newest_first() {
        let history = store_with(Arc::new(InMemoryKvStore::new()), 10);
        history.record(entry_at("a", 0)).unwrap();
        history.record(entry_at("b", 1)).unwrap();
        history.record(entry_at("c", 2)).unwrap();
        assert_eq!(keywords(&history), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_duplicate_keyword_moves_to_front() {
        let history = store_with(Arc::new(InMemoryKvStore::new()), 10);
        history.record(entry_at("refund", 0)).unwrap();
        history.record(entry_at("delivery", 1)).unwrap();
        history.record(entry_at("refund", 2)).unwrap();

        assert_eq!(keywords(&history), vec!["refund", "delivery"]);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_oldest_evicted_at_capacity() {
        let history = store_with(Arc::new(InMemoryKvStore::new()), 3);
        for (i, kw) in ["a", "b", "c", "d"].iter().enumerate() {
            history.record(entry_at(kw, i as i64)).unwrap();
        }
        assert_eq!(history.len(), 3);
        assert_eq!(keywords(&history), vec!["d", "c", "b"]);
    }

    #[test]
    fn test_list_capped_at_display_max() {
        let kv = Arc::new(InMemoryKvStore::new());
        let history = HistoryStore::load(kv, KEY, 10, 2);
        for (i, kw) in ["a", "b", "c"].iter().enumerate() {
            history.record(entry_at(kw, i as i64)).unwrap();
        }
        assert_eq!(history.len(), 3);
        assert_eq!(keywords(&history), vec!["c", "b"]);
    }

    #[test]
    fn test_persists_and_reloads() {
        let kv = Arc::new(InMemoryKvStore::new());
        {
            let history = store_with(kv.clone(), 10);
            history.record(entry_at("first", 0)).unwrap();
            history.record(entry_at("second", 1)).unwrap();
        }

        let reloaded = store_with(kv, 10);
        assert_eq!(keywords(&reloaded), vec!["second", "first"]);
    }

    #[test]
    fn test_corrupt_data_loads_empty() {
        let kv = Arc::new(InMemoryKvStore::new());
        kv.set(KEY, "{definitely not a list").unwrap();

        let history = store_with(kv.clone(), 10);
        assert!(history.is_empty());

        // Still usable afterwards, overwriting the garbage
        history.record(entry("fresh", 0)).unwrap();
        let reloaded = store_with(kv, 10);
        assert_eq!(keywords(&reloaded), vec!["fresh"]);
    }

    #[test]
    fn test_oversized_persisted_list_truncated() {
        let kv = Arc::new(InMemoryKvStore::new());
        {
            let history = store_with(kv.clone(), 10);
            for (i, kw) in ["a", "b", "c", "d"].iter().enumerate() {
                history.record(entry_at(kw, i as i64)).unwrap();
            }
        }
        let smaller = store_with(kv, 2);
        assert_eq!(smaller.len(), 2);
        assert_eq!(keywords(&smaller), vec!["d", "c"]);
    }

    #[test]
    fn test_clear_removes_slot() {
        let kv = Arc::new(InMemoryKvStore::new());
        let history = store_with(kv.clone(), 10);
        history.record(entry("x", 1)).unwrap();
        assert!(kv.get(KEY).unwrap().is_some());

        history.clear().unwrap();
        assert!(history.is_empty());
        assert!(kv.get(KEY).unwrap().is_none());
    }

    #[test]
    fn test_stats_cached_and_invalidated() {
        let history = store_with(Arc::new(InMemoryKvStore::new()), 10);
        history.record(entry("a", 3)).unwrap();
        history.record(entry("b", 0)).unwrap();

        assert!(history.stats_cache.read().unwrap().is_none());
        let stats = history.stats();
        assert_eq!(stats.total_searches, 2);
        assert_eq!(stats.total_results, 3);
        assert_eq!(stats.zero_result_searches, 1);
        assert!(stats.last_searched_at.is_some());
        assert!(history.stats_cache.read().unwrap().is_some());

        history.record(entry("c", 5)).unwrap();
        assert!(history.stats_cache.read().unwrap().is_none());
        assert_eq!(history.stats().total_results, 8);

        history.clear().unwrap();
        assert_eq!(history.stats(), HistoryStats::default());
    }

    #[test]
    fn test_entry_serializes_iso_timestamp() {
        let json = serde_json::to_value(entry("k", 0)).unwrap();
        let ts = json["searchedAt"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(ts).is_ok());
        assert_eq!(json["resultCount"], 0);
    }
}
