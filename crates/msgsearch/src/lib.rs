//! Msgsearch crate - Message search for customer-service chat
//!
//! This crate provides platform-independent search over chat conversations:
//! - Domain models (Message, Sender, SearchFilters) and validation of raw records
//! - Literal keyword search with filtering, scoring, highlighting and pagination
//! - Bounded search history persisted through a key-value store
//! - Type-ahead suggestions from history, people and date phrases
//! - Storage and message source trait abstractions with in-memory,
//!   SQLite and file backends
//!
//! The crate has zero UI dependencies. Messages are fetched from a
//! [`MessageSource`] on every search; the crate never owns a corpus.

pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod models;
pub mod search;
pub mod source;
pub mod storage;
pub mod suggest;

pub use config::SearchConfig;
pub use engine::SearchEngine;
pub use error::SearchError;
pub use history::{HistoryStats, HistoryStore, SearchHistoryEntry};
pub use models::{
    ConversationId, DateRange, Message, MessageId, MessageType, MessageValidationError,
    RawId, RawMessage, RawTimestamp, SearchFilters, Sender, SenderRole, validate_messages,
};
pub use search::{
    HighlightFragment, Pagination, SearchOptions, SearchRequest, SearchResponse, SearchResult,
    SearchStatistics, SortBy, SortOrder, execute_over, highlight, highlight_with, keyword_pattern,
    score,
};
pub use source::{InMemoryMessageSource, JsonMessageSource, MessageSource};
pub use storage::{FileKvStore, InMemoryKvStore, KvStore, SqliteKvStore};
pub use suggest::{
    DatePhrase, SearchSuggestion, SuggestionGenerator, SuggestionKind, people_from_messages,
};
