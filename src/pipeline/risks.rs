use crate::utils::text::collapse_whitespace;
use std::collections::HashSet;

/// Merge per-task risk lists: whitespace-normalized, exact duplicates
/// dropped (first occurrence wins), capped at `max`.
pub fn merge_risks<'a, I>(lists: I, max: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for risk in lists.into_iter().flatten() {
        let normalized = collapse_whitespace(risk);
        if normalized.is_empty() || !seen.insert(normalized.clone()) {
            continue;
        }
        merged.push(normalized);
        if merged.len() == max {
            break;
        }
    }
    merged
}
