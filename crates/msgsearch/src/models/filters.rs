//! Search filters applied to messages before scoring

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::MessageType;

/// Inclusive time window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Check whether `at` falls within `[start, end]`
    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        *at >= self.start && *at <= self.end
    }
}

/// Keyword plus the constraints a message must satisfy to be searched.
///
/// Empty `message_types` / `senders` sets mean "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchFilters {
    pub keyword: String,
    pub message_types: BTreeSet<MessageType>,
    pub senders: BTreeSet<String>,
    pub date_range: Option<DateRange>,
    pub own_messages_only: bool,
    pub include_recalled: bool,
}

impl SearchFilters {
    /// Filters with only a keyword set
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..Self::default()
        }
    }

    pub fn with_message_type(mut self, message_type: MessageType) -> Self {
        self.message_types.insert(message_type);
        self
    }

    pub fn with_sender(mut self, sender_id: impl Into<String>) -> Self {
        self.senders.insert(sender_id.into());
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn own_messages_only(mut self, own_only: bool) -> Self {
        self.own_messages_only = own_only;
        self
    }

    pub fn include_recalled(mut self, include: bool) -> Self {
        self.include_recalled = include;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_date_range_is_inclusive() {
        let start = Utc::now();
        let end = start + Duration::hours(1);
        let range = DateRange::new(start, end);

        assert!(range.contains(&start));
        assert!(range.contains(&end));
        assert!(!range.contains(&(end + Duration::milliseconds(1))));
        assert!(!range.contains(&(start - Duration::milliseconds(1))));
    }

    #[test]
    fn test_filters_deserialize_with_defaults() {
        let filters: SearchFilters = serde_json::from_str(r#"{"keyword":"消息"}"#).unwrap();
        assert_eq!(filters.keyword, "消息");
        assert!(filters.message_types.is_empty());
        assert!(!filters.include_recalled);
    }
}
