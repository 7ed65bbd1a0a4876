//! Text fragment normalization shared by local extraction and the external
//! merge filter.

use super::brief::{Channel, MAX_CHANNELS};
use crate::utils::text::collapse_whitespace;

/// Quote marks stripped independently from either end.
const QUOTES: &[char] = &['"', '\'', '`', '“', '”', '‘', '’'];

/// Bracket pairs stripped only when they wrap the whole fragment.
const BRACKET_PAIRS: &[(char, char)] = &[
    ('(', ')'),
    ('[', ']'),
    ('{', '}'),
    ('<', '>'),
    ('「', '」'),
    ('『', '』'),
    ('《', '》'),
    ('【', '】'),
];

/// Trailing punctuation dropped from answers.
const TRAILING_PUNCTUATION: &[char] = &[
    '.', ',', '!', '?', ';', ':', '~', '…', '。', '！', '？', '，',
];

/// Sentence-final politeness endings, longest first.
const POLITE_SUFFIXES: &[&str] = &["입니다", "이에요", "이예요", "에요", "예요", "이요"];

/// Normalize one answer fragment.
///
/// Whitespace is collapsed, then surrounding quotes, wrapping brackets,
/// trailing punctuation and polite endings are peeled repeatedly until
/// nothing changes, which makes the function idempotent.
pub fn canonicalize(raw: &str) -> String {
    let mut current = collapse_whitespace(raw);
    loop {
        let next = peel_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn peel_once(text: &str) -> String {
    let mut s = text.trim().trim_matches(QUOTES).trim();

    for (open, close) in BRACKET_PAIRS {
        if let Some(inner) = s.strip_prefix(*open).and_then(|rest| rest.strip_suffix(*close)) {
            s = inner.trim();
        }
    }

    s = s.trim_end_matches(TRAILING_PUNCTUATION).trim_end();

    for suffix in POLITE_SUFFIXES {
        if let Some(stem) = s.strip_suffix(suffix)
            && !stem.trim().is_empty()
        {
            s = stem.trim_end();
            break;
        }
    }

    s.to_string()
}

/// Append `incoming` to `existing`, skipping case-insensitive duplicates and
/// blank items, keeping at most `limit` entries in first-seen order.
pub fn merge_unique(existing: &[String], incoming: &[String], limit: usize) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(limit);
    let mut seen: Vec<String> = Vec::with_capacity(limit);
    for item in existing.iter().chain(incoming) {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let key = item.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        merged.push(item.to_string());
        if merged.len() >= limit {
            break;
        }
    }
    merged
}

/// Channel counterpart of [`merge_unique`] with the fixed channel cap.
pub fn merge_channels(existing: &[Channel], incoming: &[Channel]) -> Vec<Channel> {
    let mut merged: Vec<Channel> = Vec::with_capacity(MAX_CHANNELS);
    for channel in existing.iter().chain(incoming) {
        if merged.len() >= MAX_CHANNELS {
            break;
        }
        if !merged.contains(channel) {
            merged.push(*channel);
        }
    }
    merged
}
