//! Type-ahead suggestions
//!
//! Combines, in order: matching history keywords, matching known people and
//! recognized date phrases. Results are cached per normalized input for the
//! lifetime of the generator.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Datelike, Duration, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::history::HistoryStore;
use crate::models::{DateRange, Message, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Keyword,
    Person,
    Date,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSuggestion {
    pub text: String,
    pub kind: SuggestionKind,
    pub description: Option<String>,
    pub icon: Option<String>,
}

/// Relative dates recognized in typed input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePhrase {
    Today,
    Yesterday,
    ThisWeek,
}

impl DatePhrase {
    pub const ALL: [DatePhrase; 3] = [DatePhrase::Today, DatePhrase::Yesterday, DatePhrase::ThisWeek];

    /// Substrings of the input that trigger this phrase
    fn triggers(&self) -> &'static [&'static str] {
        match self {
            DatePhrase::Today => &["today", "今天"],
            DatePhrase::Yesterday => &["yesterday", "昨天"],
            DatePhrase::ThisWeek => &["this week", "本周", "这周"],
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            DatePhrase::Today => "today",
            DatePhrase::Yesterday => "yesterday",
            DatePhrase::ThisWeek => "this week",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            DatePhrase::Today => "Messages from today",
            DatePhrase::Yesterday => "Messages from yesterday",
            DatePhrase::ThisWeek => "Messages from this week",
        }
    }

    /// Look up a phrase by its suggestion text
    pub fn from_text(text: &str) -> Option<Self> {
        let text = text.trim().to_lowercase();
        Self::ALL.into_iter().find(|p| p.text() == text)
    }

    /// Inclusive UTC window the phrase refers to, relative to `now`.
    ///
    /// Weeks start on Monday.
    pub fn range(&self, now: DateTime<Utc>) -> DateRange {
        let day_start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or(now);
        let day_end = day_start + Duration::days(1) - Duration::milliseconds(1);

        match self {
            DatePhrase::Today => DateRange::new(day_start, day_end),
            DatePhrase::Yesterday => {
                DateRange::new(day_start - Duration::days(1), day_end - Duration::days(1))
            }
            DatePhrase::ThisWeek => {
                let since_monday = now.weekday().num_days_from_monday() as i64;
                DateRange::new(day_start - Duration::days(since_monday), day_end)
            }
        }
    }
}

/// Distinct senders of `messages`, in first-seen order
pub fn people_from_messages(messages: &[Message]) -> Vec<Sender> {
    let mut people: Vec<Sender> = Vec::new();
    for message in messages {
        if !people.iter().any(|p| p.id == message.sender.id) {
            people.push(message.sender.clone());
        }
    }
    people
}

pub struct SuggestionGenerator {
    people: Vec<Sender>,
    max_suggestions: usize,
    cache: RwLock<HashMap<String, Vec<SearchSuggestion>>>,
}

impl SuggestionGenerator {
    pub fn new(max_suggestions: usize) -> Self {
        Self {
            people: Vec::new(),
            max_suggestions,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Set the directory of people matched by name
    pub fn with_people(mut self, people: Vec<Sender>) -> Self {
        self.people = people;
        self
    }

    /// Suggestions for a partially typed keyword.
    ///
    /// Empty input yields nothing. Repeated calls with the same normalized
    /// input (trimmed, lower-cased) return the cached list, even if the
    /// history changed in between.
    pub fn suggest(&self, partial: &str, history: &HistoryStore) -> Vec<SearchSuggestion> {
        let normalized = partial.trim().to_lowercase();
        if normalized.is_empty() {
            return Vec::new();
        }

        if let Some(cached) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&normalized)
        {
            debug!("Suggestion cache hit for {:?}", normalized);
            return cached.clone();
        }

        let suggestions = self.generate(&normalized, history);
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(normalized, suggestions.clone());
        suggestions
    }

    /// Forget every cached suggestion list
    pub fn clear_cache(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of cached inputs
    pub fn cached_len(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn generate(&self, normalized: &str, history: &HistoryStore) -> Vec<SearchSuggestion> {
        let mut candidates = Vec::new();

        for entry in history.list() {
            if entry.keyword.to_lowercase().contains(normalized) {
                candidates.push(SearchSuggestion {
                    text: entry.keyword,
                    kind: SuggestionKind::Keyword,
                    description: Some(format!("{} results", entry.result_count)),
                    icon: Some("history".to_string()),
                });
            }
        }

        for person in &self.people {
            if person.name.to_lowercase().contains(normalized) {
                candidates.push(SearchSuggestion {
                    text: person.name.clone(),
                    kind: SuggestionKind::Person,
                    description: Some(person.role.label().to_string()),
                    icon: Some("person".to_string()),
                });
            }
        }

        for phrase in DatePhrase::ALL {
            if phrase.triggers().iter().any(|t| normalized.contains(t)) {
                candidates.push(SearchSuggestion {
                    text: phrase.text().to_string(),
                    kind: SuggestionKind::Date,
                    description: Some(phrase.description().to_string()),
                    icon: Some("calendar".to_string()),
                });
            }
        }

        let mut suggestions: Vec<SearchSuggestion> = Vec::new();
        for candidate in candidates {
            if suggestions.len() >= self.max_suggestions {
                break;
            }
            if !suggestions.iter().any(|s| s.text == candidate.text) {
                suggestions.push(candidate);
            }
        }
        suggestions
    }
}
