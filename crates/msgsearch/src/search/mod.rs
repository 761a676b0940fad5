//! In-memory message search
//!
//! Literal, case-insensitive substring search over one conversation's
//! messages: filter, match, score, highlight, sort and paginate.

mod executor;
mod filter;
mod highlight;
mod scorer;

pub use executor::execute_over;
pub use filter::passes;
pub use highlight::{HighlightFragment, highlight, highlight_with, keyword_pattern};
pub use scorer::{score, score_text};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::models::{ConversationId, MessageId, MessageType, SearchFilters, Sender};

/// Key results are ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Relevance,
    Time,
    /// Sender display name
    Sender,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Per-call knobs for a search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchOptions {
    pub page_size: usize,
    /// Matches beyond this many (after sorting) are dropped
    pub max_results: usize,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    /// Reserved, matching is always literal
    pub fuzzy: bool,
    /// Reserved, matching is always literal
    pub phonetic: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

impl SearchOptions {
    /// Options using the page size and result cap from `config`
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            page_size: config.page_size,
            max_results: config.max_results,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
            fuzzy: false,
            phonetic: false,
        }
    }

    pub fn sorted(mut self, sort_by: SortBy, sort_order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

/// Everything needed to run one search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub conversation_id: ConversationId,
    pub filters: SearchFilters,
    #[serde(default)]
    pub options: SearchOptions,
    /// Zero-based page index
    #[serde(default)]
    pub page: usize,
}

impl SearchRequest {
    pub fn new(conversation_id: ConversationId, filters: SearchFilters) -> Self {
        Self {
            conversation_id,
            filters,
            options: SearchOptions::default(),
            page: 0,
        }
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }
}

/// A single matching message, ready for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub message_id: MessageId,
    pub content: String,
    pub message_type: MessageType,
    pub sender: Sender,
    pub sent_at: DateTime<Utc>,
    /// Keywords that matched this message's content
    pub matched_keywords: Vec<String>,
    pub highlights: Vec<HighlightFragment>,
    /// Relevance score in `[0, 1]`
    pub relevance: f64,
    pub is_own: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
    /// Number of matches across all pages
    pub total: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: usize, page_size: usize, total: usize) -> Self {
        let total_pages = total.div_ceil(page_size.max(1));
        Self {
            page,
            page_size,
            total,
            total_pages,
            has_next: page.saturating_add(1) < total_pages,
            has_prev: page > 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStatistics {
    /// Matches before pagination
    pub total_results: usize,
    /// Wall-clock duration of the search in milliseconds
    pub search_time_ms: f64,
    /// Deduplicated keywords that produced matches
    pub matched_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub pagination: Pagination,
    pub statistics: SearchStatistics,
}

impl SearchResponse {
    /// Zero-result response for `page` at `page_size`
    pub fn empty(page: usize, page_size: usize) -> Self {
        Self {
            results: Vec::new(),
            pagination: Pagination::new(page, page_size, 0),
            statistics: SearchStatistics {
                total_results: 0,
                search_time_ms: 0.0,
                matched_keywords: Vec::new(),
            },
        }
    }
}
