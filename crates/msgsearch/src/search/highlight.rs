use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// A piece of text that is either a query match or the text between matches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HighlightFragment {
    pub text: String,
    pub is_match: bool,
}

impl HighlightFragment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            is_match: false,
        }
    }

    fn matched(text: &str) -> Self {
        Self {
            text: text.to_string(),
            is_match: true,
        }
    }
}

/// Literal, case-insensitive pattern for `query`.
///
/// Regex metacharacters in the query carry no meaning. Returns `None` for a
/// whitespace-only query, or one past the regex size limit.
pub fn keyword_pattern(query: &str) -> Option<Regex> {
    if query.trim().is_empty() {
        return None;
    }

    match RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            log::warn!("Cannot build pattern for query of {} bytes: {}", query.len(), e);
            None
        }
    }
}

/// Split `text` around every case-insensitive occurrence of `query`.
///
/// Concatenating the fragment texts always reproduces `text` exactly. The
/// trailing unmatched fragment is always present, even when empty, so the
/// last fragment is never a match.
pub fn highlight(text: &str, query: &str) -> Vec<HighlightFragment> {
    match keyword_pattern(query) {
        Some(pattern) => highlight_with(&pattern, text),
        None => vec![HighlightFragment::plain(text)],
    }
}

/// Split `text` around every match of an already built `pattern`
pub fn highlight_with(pattern: &Regex, text: &str) -> Vec<HighlightFragment> {
    let mut fragments = Vec::new();
    let mut last_end = 0;
    for m in pattern.find_iter(text) {
        if m.start() > last_end {
            fragments.push(HighlightFragment::plain(&text[last_end..m.start()]));
        }
        fragments.push(HighlightFragment::matched(m.as_str()));
        last_end = m.end();
    }
    fragments.push(HighlightFragment::plain(&text[last_end..]));

    fragments
}
