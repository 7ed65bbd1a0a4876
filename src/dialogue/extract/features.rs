use super::ExtractionContext;
use super::labeled::{mentions_label, starts_with_label};
use crate::coerce::split_list;
use crate::dialogue::brief::{FieldPath, FieldUpdate, FieldValue, MAX_FEATURES};
use crate::dialogue::canonical::{canonicalize, merge_unique};
use crate::utils::text::char_len;
use regex::Regex;
use std::sync::LazyLock;

/// Tokens that scope the rest of the utterance to the feature list.
const TRIGGERS: &[&str] = &["특징", "장점", "핵심", "포인트", "features", "feature"];

/// Filler words never stored as features.
pub const STOP_WORDS: &[&str] = &[
    "등", "기타", "정도", "없음", "없어요", "몰라요", "그리고", "및", "또", "etc", "and",
];

/// Longest token the whitespace fallback treats as a feature.
const MAX_TOKEN_CHARS: usize = 12;

static SCOPE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\d+\s*(?:가지|개)\s*)?(?:은|는|으로|로|:)?\s*").expect("scope prefix pattern")
});

static DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,\n/|;·、]").expect("delimiter pattern"));

/// Feature list candidates, merged into what the brief already holds.
pub fn extract(ctx: &ExtractionContext<'_>) -> Option<FieldUpdate> {
    let (candidates, confidence) = candidates(ctx)?;
    let existing = &ctx.brief.product.features;
    let merged = merge_unique(existing, &candidates, MAX_FEATURES);
    if merged.len() <= existing.len() {
        return None;
    }
    Some(FieldUpdate::new(
        FieldPath::ProductFeatures,
        FieldValue::List(merged),
        confidence,
    ))
}

fn candidates(ctx: &ExtractionContext<'_>) -> Option<(Vec<String>, f64)> {
    if let Some(scope) = trigger_scope(ctx.message) {
        let items = clean_items(split_list(scope));
        return (!items.is_empty()).then_some((items, 0.82));
    }

    // Untriggered fallbacks never read "label: value" phrasing as features.
    if ctx.expects(FieldPath::ProductFeatures) && !mentions_label(ctx.message) {
        if DELIMITER.is_match(ctx.message) {
            let items = clean_items(split_list(ctx.message));
            return (!items.is_empty()).then_some((items, 0.74));
        }
        let tokens = short_tokens(ctx.message);
        if tokens.len() >= 3 {
            let items = if tokens.len() >= 6 {
                tokens.chunks(2).map(|pair| pair.join(" ")).collect()
            } else {
                tokens
            };
            return Some((items, 0.6));
        }
    }
    None
}

/// Text after the trigger tokens, applied in order so "핵심 특징은 ..."
/// scopes past both.
fn trigger_scope(message: &str) -> Option<&str> {
    // ASCII-only lowering keeps byte offsets aligned with `message`.
    let lowered = message.to_ascii_lowercase();
    let mut start = None;
    for trigger in TRIGGERS {
        let from = start.unwrap_or(0);
        if let Some(pos) = lowered[from..].find(trigger) {
            start = Some(from + pos + trigger.len());
        }
    }
    let scope = &message[start?..];
    let prefix_end = SCOPE_PREFIX.find(scope).map_or(0, |m| m.end());
    Some(&scope[prefix_end..])
}

/// Canonicalize items, stopping at the first segment that belongs to
/// another field ("가격은 ...").
fn clean_items(raw: Vec<String>) -> Vec<String> {
    raw.into_iter()
        .take_while(|item| !starts_with_label(item))
        .map(|item| canonicalize(&item))
        .filter(|item| is_plausible(item, usize::MAX))
        .collect()
}

fn short_tokens(message: &str) -> Vec<String> {
    message
        .split_whitespace()
        .map(canonicalize)
        .filter(|token| is_plausible(token, MAX_TOKEN_CHARS))
        .collect()
}

fn is_plausible(item: &str, max_chars: usize) -> bool {
    let len = char_len(item);
    len >= 2
        && len <= max_chars
        && !STOP_WORDS.contains(&item.to_lowercase().as_str())
        && !item.chars().all(|c| c.is_ascii_digit())
}
