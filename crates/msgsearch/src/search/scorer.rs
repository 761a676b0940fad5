use crate::models::Message;

/// Credit for content that equals the keyword
const EXACT_MATCH: f64 = 1.0;
/// Credit for content that starts with the keyword
const PREFIX_MATCH: f64 = 0.8;
/// Credit for content that contains the keyword
const CONTAINS_MATCH: f64 = 0.6;
/// Maximum credit for content close in length to the keyword
const LENGTH_PROXIMITY: f64 = 0.4;
/// Excess characters over which the length credit drops to zero
const LENGTH_FALLOFF_CHARS: f64 = 100.0;

/// Relevance of a matching message for `keyword`, in `[0, 1]`.
///
/// See [`score_text`].
pub fn score(message: &Message, keyword: &str) -> f64 {
    score_text(&message.content, keyword)
}

/// Relevance of `content` for `keyword`, in `[0, 1]`.
///
/// Comparison is case-insensitive on trimmed text. Credits are additive and
/// the sum is clamped to 1.0: exact match 1.0, prefix 0.8, substring 0.6,
/// plus up to 0.4 that shrinks linearly with every character the content is
/// longer than the keyword, reaching 0 at 100 extra characters.
///
/// Only meaningful for content that contains the keyword.
pub fn score_text(content: &str, keyword: &str) -> f64 {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return 0.0;
    }
    let content = content.trim().to_lowercase();

    let mut score = 0.0;
    if content == keyword {
        score += EXACT_MATCH;
    }
    if content.starts_with(&keyword) {
        score += PREFIX_MATCH;
    }
    if content.contains(&keyword) {
        score += CONTAINS_MATCH;
    }

    let excess = content
        .chars()
        .count()
        .saturating_sub(keyword.chars().count()) as f64;
    score += (LENGTH_PROXIMITY * (1.0 - excess / LENGTH_FALLOFF_CHARS)).max(0.0);

    score.clamp(0.0, 1.0)
}
