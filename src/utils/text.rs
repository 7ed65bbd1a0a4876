/// Number of Unicode scalar values in `s`.
///
/// Every budget in this crate (narration, scene, CTA, field length caps) is
/// measured in characters, never bytes, so Hangul and ASCII count the same.
#[must_use]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Keep at most `max_chars` characters of `s`, cutting on a char boundary.
#[must_use]
pub fn clip_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[must_use]
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            let truncated = &s[..idx];
            format!("{}...", truncated.trim_end())
        }
        None => s.to_string(),
    }
}

/// Collapse every run of whitespace (including newlines) into one space and
/// trim both ends.
#[must_use]
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether the last Hangul syllable of `word` carries a final consonant.
///
/// Non-Hangul endings are treated as vowel-final.
#[must_use]
pub fn has_final_consonant(word: &str) -> bool {
    word.trim_end()
        .chars()
        .last()
        .is_some_and(|c| ('\u{AC00}'..='\u{D7A3}').contains(&c) && (c as u32 - 0xAC00) % 28 != 0)
}

/// Topic particle for `word`: "은" after a final consonant, "는" otherwise.
#[must_use]
pub fn topic_particle(word: &str) -> &'static str {
    if has_final_consonant(word) { "은" } else { "는" }
}
