use std::cmp::Ordering;
use std::time::Instant;

use log::debug;
use regex::Regex;

use crate::models::Message;

use super::filter::passes;
use super::highlight::{highlight_with, keyword_pattern};
use super::scorer::score;
use super::{
    Pagination, SearchRequest, SearchResponse, SearchResult, SearchStatistics, SortBy, SortOrder,
};

/// Run `request` against an already loaded message set.
///
/// This is the pure part of a search: no fetching and no history. An empty
/// or whitespace-only keyword yields an empty response. Out-of-range pages
/// yield no results but correct pagination totals.
///
/// Matching and highlighting share one compiled pattern, so every result
/// carries at least one matched fragment.
pub fn execute_over(messages: &[Message], request: &SearchRequest) -> SearchResponse {
    let started = Instant::now();
    let options = &request.options;
    let page_size = options.page_size.max(1);

    let keyword = request.filters.keyword.trim();
    if keyword.is_empty() {
        return SearchResponse::empty(request.page, page_size);
    }

    if options.fuzzy || options.phonetic {
        debug!("Fuzzy/phonetic matching requested but not supported, using literal matching");
    }

    let Some(pattern) = keyword_pattern(keyword) else {
        return SearchResponse::empty(request.page, page_size);
    };
    let terms = keyword_terms(keyword);

    let mut matches: Vec<SearchResult> = messages
        .iter()
        .filter(|m| passes(m, &request.filters))
        .filter_map(|m| {
            if !pattern.is_match(&m.content) {
                return None;
            }

            let mut matched_keywords = vec![keyword.to_string()];
            for (term, term_pattern) in &terms {
                if term_pattern.is_match(&m.content) && !matched_keywords.contains(term) {
                    matched_keywords.push(term.clone());
                }
            }

            Some(SearchResult {
                message_id: m.id.clone(),
                content: m.content.clone(),
                message_type: m.message_type,
                sender: m.sender.clone(),
                sent_at: m.sent_at,
                matched_keywords,
                highlights: highlight_with(&pattern, &m.content),
                relevance: score(m, keyword),
                is_own: m.is_own,
            })
        })
        .collect();

    sort_results(&mut matches, options.sort_by, options.sort_order);
    matches.truncate(options.max_results);

    let mut matched_keywords = vec![keyword.to_string()];
    for result in &matches {
        for kw in &result.matched_keywords {
            if !matched_keywords.contains(kw) {
                matched_keywords.push(kw.clone());
            }
        }
    }

    let total = matches.len();
    let pagination = Pagination::new(request.page, page_size, total);
    let start = request.page.saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);
    let results: Vec<SearchResult> = matches.drain(start..end).collect();

    let elapsed = started.elapsed();
    debug!(
        "Searched {} messages for {:?}: {} matches in {:?}",
        messages.len(),
        keyword,
        total,
        elapsed
    );

    SearchResponse {
        results,
        pagination,
        statistics: SearchStatistics {
            total_results: total,
            search_time_ms: elapsed.as_secs_f64() * 1000.0,
            matched_keywords,
        },
    }
}

/// Distinct whitespace-separated terms of a multi-term keyword, each with
/// its own pattern.
///
/// A single-term keyword has no separate terms.
fn keyword_terms(keyword: &str) -> Vec<(String, Regex)> {
    let mut terms: Vec<(String, Regex)> = Vec::new();
    for term in keyword.split_whitespace() {
        if terms.iter().any(|(t, _)| t == term) {
            continue;
        }
        if let Some(pattern) = keyword_pattern(term) {
            terms.push((term.to_string(), pattern));
        }
    }
    if terms.len() > 1 { terms } else { Vec::new() }
}

/// Stable sort; equal keys keep message-source order.
fn sort_results(results: &mut [SearchResult], sort_by: SortBy, sort_order: SortOrder) {
    results.sort_by(|a, b| {
        let ordering = match sort_by {
            SortBy::Relevance => a
                .relevance
                .partial_cmp(&b.relevance)
                .unwrap_or(Ordering::Equal),
            SortBy::Time => a.sent_at.cmp(&b.sent_at),
            SortBy::Sender => a.sender.name.cmp(&b.sender.name),
        };
        match sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConversationId, MessageId, SearchFilters, Sender, SenderRole};
    use crate::search::SearchOptions;
    use chrono::{Duration, TimeZone, Utc};

    fn msg(id: &str, content: &str, sender: &str, minutes: i64) -> Message {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        Message::builder(MessageId::new(id))
            .content(content)
            .sender(Sender::new(sender.to_lowercase(), sender, SenderRole::Customer))
            .sent_at(base + Duration::minutes(minutes))
            .build()
    }

    fn request(keyword: &str) -> SearchRequest {
        SearchRequest::new(ConversationId::new("c"), SearchFilters::keyword(keyword))
    }

    fn ids(response: &SearchResponse) -> Vec<&str> {
        response
            .results
            .iter()
            .map(|r| r.message_id.as_str())
            .collect()
    }

    #[test]
    fn test_empty_keyword_short_circuits() {
        let messages = vec![msg("1", "anything", "Alice", 0)];
        for keyword in ["", "   ", "\n\t"] {
            let response = execute_over(&messages, &request(keyword));
            assert!(response.results.is_empty());
            assert_eq!(response.pagination.total, 0);
            assert!(response.statistics.matched_keywords.is_empty());
        }
    }

    #[test]
    fn test_case_insensitive_containment() {
        let messages = vec![
            msg("1", "Refund requested", "Alice", 0),
            msg("2", "no match here", "Bob", 1),
            msg("3", "about the REFUND", "Carol", 2),
        ];
        let response = execute_over(&messages, &request("refund"));
        assert_eq!(response.pagination.total, 2);
        let mut found = ids(&response);
        found.sort();
        assert_eq!(found, vec!["1", "3"]);
    }

    #[test]
    fn test_keyword_is_trimmed() {
        let messages = vec![msg("1", "refund", "Alice", 0)];
        let response = execute_over(&messages, &request("  refund  "));
        assert_eq!(response.pagination.total, 1);
        assert_eq!(response.results[0].relevance, 1.0);
        assert_eq!(response.results[0].matched_keywords, vec!["refund"]);
    }

    #[test]
    fn test_relevance_sort_exact_first() {
        let messages = vec![
            msg("substring", "这是一条包含测试关键词的消息", "Alice", 0),
            msg("exact", "测试", "Bob", 1),
        ];
        let response = execute_over(&messages, &request("测试"));
        assert_eq!(ids(&response), vec!["exact", "substring"]);
        assert!(response.results[0].relevance > response.results[1].relevance);
    }

    #[test]
    fn test_relevance_ascending() {
        let messages = vec![
            msg("exact", "测试", "Bob", 1),
            msg("substring", "这是一条包含测试关键词的消息", "Alice", 0),
        ];
        let req = request("测试").with_options(
            SearchOptions::default().sorted(SortBy::Relevance, SortOrder::Asc),
        );
        let response = execute_over(&messages, &req);
        assert_eq!(ids(&response), vec!["substring", "exact"]);
    }

    #[test]
    fn test_time_sort_both_directions() {
        let messages = vec![
            msg("mid", "ping", "A", 5),
            msg("old", "ping", "B", 0),
            msg("new", "ping", "C", 10),
        ];

        let desc = request("ping")
            .with_options(SearchOptions::default().sorted(SortBy::Time, SortOrder::Desc));
        assert_eq!(ids(&execute_over(&messages, &desc)), vec!["new", "mid", "old"]);

        let asc = request("ping")
            .with_options(SearchOptions::default().sorted(SortBy::Time, SortOrder::Asc));
        assert_eq!(ids(&execute_over(&messages, &asc)), vec!["old", "mid", "new"]);
    }

    #[test]
    fn test_sender_sort() {
        let messages = vec![
            msg("b", "ping", "Bob", 0),
            msg("c", "ping", "Carol", 1),
            msg("a", "ping", "Alice", 2),
        ];

        let asc = request("ping")
            .with_options(SearchOptions::default().sorted(SortBy::Sender, SortOrder::Asc));
        assert_eq!(ids(&execute_over(&messages, &asc)), vec!["a", "b", "c"]);

        let desc = request("ping")
            .with_options(SearchOptions::default().sorted(SortBy::Sender, SortOrder::Desc));
        assert_eq!(ids(&execute_over(&messages, &desc)), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_pagination_slices_and_reconstructs() {
        let messages: Vec<Message> = (0..7)
            .map(|i| msg(&format!("m{}", i), "page me", "A", i))
            .collect();
        let options = SearchOptions::default()
            .sorted(SortBy::Time, SortOrder::Asc)
            .with_page_size(3);

        let first = execute_over(&messages, &request("page").with_options(options.clone()));
        assert_eq!(first.pagination.total, 7);
        assert_eq!(first.pagination.total_pages, 3);
        assert!(first.pagination.has_next);
        assert!(!first.pagination.has_prev);

        let mut all = Vec::new();
        for page in 0..first.pagination.total_pages {
            let response = execute_over(
                &messages,
                &request("page").with_options(options.clone()).with_page(page),
            );
            assert_eq!(response.pagination.total, 7);
            all.extend(response.results.into_iter().map(|r| r.message_id.0));
        }
        let expected: Vec<String> = (0..7).map(|i| format!("m{}", i)).collect();
        assert_eq!(all, expected);
    }

    #[test]
    fn test_out_of_range_page_is_empty_with_totals() {
        let messages = vec![msg("1", "ping", "A", 0), msg("2", "ping", "B", 1)];
        let response = execute_over(&messages, &request("ping").with_page(5));
        assert!(response.results.is_empty());
        assert_eq!(response.pagination.total, 2);
        assert_eq!(response.pagination.total_pages, 1);
        assert!(!response.pagination.has_next);
        assert!(response.pagination.has_prev);
    }

    #[test]
    fn test_max_results_caps_matches() {
        let messages: Vec<Message> = (0..10)
            .map(|i| msg(&format!("m{}", i), "cap", "A", i))
            .collect();
        let mut options = SearchOptions::default();
        options.max_results = 4;
        let response = execute_over(&messages, &request("cap").with_options(options));
        assert_eq!(response.pagination.total, 4);
        assert_eq!(response.statistics.total_results, 4);
    }

    #[test]
    fn test_zero_page_size_does_not_panic() {
        let messages = vec![msg("1", "ping", "A", 0)];
        let response = execute_over(
            &messages,
            &request("ping").with_options(SearchOptions::default().with_page_size(0)),
        );
        assert_eq!(response.pagination.page_size, 1);
        assert_eq!(response.results.len(), 1);
    }

    #[test]
    fn test_multi_term_keywords_attributed() {
        let messages = vec![msg("1", "order refund pending", "A", 0)];
        let response = execute_over(&messages, &request("refund pending"));
        assert_eq!(
            response.results[0].matched_keywords,
            vec!["refund pending", "refund", "pending"]
        );
        assert_eq!(
            response.statistics.matched_keywords,
            vec!["refund pending", "refund", "pending"]
        );
    }

    #[test]
    fn test_statistics_keyword_present_without_matches() {
        let messages = vec![msg("1", "hello", "A", 0)];
        let response = execute_over(&messages, &request("absent"));
        assert_eq!(response.statistics.total_results, 0);
        assert_eq!(response.statistics.matched_keywords, vec!["absent"]);
    }

    #[test]
    fn test_filters_applied_before_matching() {
        let mut own = msg("own", "shared text", "Me", 0);
        own.is_own = true;
        let messages = vec![msg("other", "shared text", "Bob", 1), own];

        let req = SearchRequest::new(
            ConversationId::new("c"),
            SearchFilters::keyword("shared").own_messages_only(true),
        );
        assert_eq!(ids(&execute_over(&messages, &req)), vec!["own"]);
    }

    #[test]
    fn test_highlights_attached() {
        let messages = vec![msg("1", "Say Hello twice: hello", "A", 0)];
        let response = execute_over(&messages, &request("hello"));
        let fragments = &response.results[0].highlights;
        let joined: String = fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(joined, "Say Hello twice: hello");
        assert_eq!(fragments.iter().filter(|f| f.is_match).count(), 2);
    }

    #[test]
    fn test_every_result_has_a_matched_fragment() {
        // Lower-casing 'İ' yields "i̇", which simple case folding does not match
        let messages = vec![
            msg("1", "İstanbul", "A", 0),
            msg("2", "istanbul office", "B", 1),
            msg("3", "ISTANBUL", "C", 2),
        ];
        for keyword in ["i̇", "istanbul", "İstanbul"] {
            let response = execute_over(&messages, &request(keyword));
            assert_eq!(response.pagination.total, response.results.len());
            for result in &response.results {
                assert!(
                    result.highlights.iter().any(|f| f.is_match),
                    "{:?} has no matched fragment for {:?}",
                    result.content,
                    keyword
                );
            }
        }

        let response = execute_over(&messages, &request("istanbul"));
        let found = ids(&response);
        assert!(found.contains(&"2"));
        assert!(found.contains(&"3"));
    }

    #[test]
    fn test_repeatable() {
        let messages = vec![
            msg("1", "repeat me", "A", 0),
            msg("2", "repeat", "B", 1),
            msg("3", "me repeat", "C", 2),
        ];
        let first = execute_over(&messages, &request("repeat"));
        let second = execute_over(&messages, &request("repeat"));
        assert_eq!(first.results, second.results);
        assert_eq!(first.pagination, second.pagination);
    }
}
