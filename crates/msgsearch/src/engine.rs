//! Search engine facade
//!
//! Ties a message source, the history store and the suggestion generator
//! together. One engine serves any number of conversations and may be shared
//! across threads.

use std::sync::Arc;

use log::{debug, warn};

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::history::{HistoryStats, HistoryStore, SearchHistoryEntry};
use crate::models::{ConversationId, SearchFilters, Sender};
use crate::search::{SearchOptions, SearchRequest, SearchResponse, execute_over};
use crate::source::MessageSource;
use crate::storage::KvStore;
use crate::suggest::{SearchSuggestion, SuggestionGenerator};

pub struct SearchEngine {
    source: Arc<dyn MessageSource>,
    history: HistoryStore,
    suggestions: SuggestionGenerator,
    config: SearchConfig,
}

impl SearchEngine {
    /// Create an engine, loading any history persisted in `kv`
    pub fn new(source: Arc<dyn MessageSource>, kv: Arc<dyn KvStore>, config: SearchConfig) -> Self {
        let history = HistoryStore::from_config(kv, &config);
        let suggestions = SuggestionGenerator::new(config.suggestion_max);
        Self {
            source,
            history,
            suggestions,
            config,
        }
    }

    /// Set the people offered as suggestions
    pub fn with_people(mut self, people: Vec<Sender>) -> Self {
        self.suggestions = SuggestionGenerator::new(self.config.suggestion_max).with_people(people);
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Build a first-page request using this engine's configured options
    pub fn request(&self, conversation: ConversationId, filters: SearchFilters) -> SearchRequest {
        SearchRequest::new(conversation, filters).with_options(SearchOptions::from_config(&self.config))
    }

    /// Run a search and record it in the history.
    ///
    /// An empty keyword returns an empty response without fetching or
    /// recording anything. Only a failing message source is an error; a
    /// failed history write is logged and the response is still returned.
    pub fn execute(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        let keyword = request.filters.keyword.trim();
        if keyword.is_empty() {
            return Ok(SearchResponse::empty(request.page, request.options.page_size.max(1)));
        }

        let messages = self
            .source
            .fetch_messages(&request.conversation_id)
            .map_err(SearchError::unavailable)?;
        debug!(
            "Fetched {} messages for conversation {}",
            messages.len(),
            request.conversation_id.as_str()
        );

        let response = execute_over(&messages, request);

        let entry = SearchHistoryEntry::new(
            keyword,
            response.pagination.total,
            request.filters.clone(),
        );
        if let Err(e) = self.history.record(entry) {
            warn!("Failed to record search history: {:#}", e);
        }

        Ok(response)
    }

    /// Suggestions for a partially typed keyword
    pub fn suggest(&self, partial: &str) -> Vec<SearchSuggestion> {
        self.suggestions.suggest(partial, &self.history)
    }

    /// Forget cached suggestions so new history becomes visible
    pub fn clear_suggestion_cache(&self) {
        self.suggestions.clear_cache();
    }

    /// Recent searches, newest first
    pub fn history(&self) -> Vec<SearchHistoryEntry> {
        self.history.list()
    }

    pub fn history_stats(&self) -> HistoryStats {
        self.history.stats()
    }

    /// Drop all history. Storage failures are logged.
    pub fn clear_history(&self) {
        if let Err(e) = self.history.clear() {
            warn!("Failed to clear search history: {:#}", e);
        }
    }
}
