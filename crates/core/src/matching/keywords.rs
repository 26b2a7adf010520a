//! Bag-of-keywords extraction for English glosses and Chinese definitions.

use std::collections::{BTreeSet, HashSet};

lazy_static::lazy_static! {
    /// English function words that carry no sense signal.
    static ref STOPWORDS: HashSet<&'static str> = [
        "a", "an", "the", "of", "to", "in", "on", "at", "by", "for", "with", "is", "are",
        "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did",
        "but", "and", "or", "as", "if", "so", "than", "that", "this", "these", "those",
        "from", "up", "down", "out", "into", "over", "under", "again", "further", "then",
        "once", "here", "there", "when", "where", "why", "how", "all", "any", "both",
        "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not", "only",
        "own", "same", "too", "very", "can", "will", "just", "don", "should", "now",
        "sth", "someone", "something", "used",
    ]
    .into_iter()
    .collect();
}

/// Lower-cased content words longer than two characters.
///
/// Punctuation splits words; stop-words are dropped.
pub fn keywords(text: &str) -> BTreeSet<String> {
    let lowered = text.to_lowercase();
    lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| w.chars().count() > 2 && !STOPWORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// True for characters in the CJK Unified Ideographs block.
pub fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Maximal runs of CJK ideographs in a definition.
pub fn chinese_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if is_cjk(c) {
            current.push(c);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}
