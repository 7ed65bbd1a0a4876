//! Question and delegation detection.

use crate::dialogue::brief::FieldPath;

/// Interrogative markers that turn an utterance into a question.
const INTERROGATIVE_MARKERS: &[&str] = &[
    "왜", "어떻게", "뭐예요", "뭔가요", "뭐야", "뭐죠", "뭐지", "뭘", "무엇", "무슨", "어떤 걸",
    "어떤걸", "필요해?", "필요해요?", "필요한가", "필요한 이유", "이게 맞", "맞나요", "맞아?",
    "맞아요?", "되나요", "is this right",
];

/// English markers matched as whole tokens.
const INTERROGATIVE_TOKENS: &[&str] = &["why", "how", "what", "need"];

/// Phrases that start with a marker but answer rather than ask.
const MARKER_EXCEPTIONS: &[&str] = &["왜냐하면", "왜냐면"];

const REMAINING_CUES: &[&str] = &[
    "남았", "남은", "뭐가 더", "더 필요", "얼마나 더", "몇 개 더", "what's left", "remaining",
];

const PRICE_FORMAT_CUES: &[&str] = &[
    "형식", "어떻게 입력", "어떻게 적", "어떻게 써", "숫자로", "원 단위", "얼마로", "범위",
];

const DELEGATION_CUES: &[&str] = &[
    "알아서", "추천해", "추천 해", "골라줘", "골라 줘", "골라주", "정해줘", "정해 줘", "정해주",
    "맡길게", "맡길께", "아무거나", "you decide", "pick for me", "your call",
];

/// What kind of meta-query a question utterance is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaQuery {
    /// "What's left?"
    Remaining,
    /// "How should I write the price?"
    PriceFormat,
    /// "Why do you need this?" about the given field.
    Rationale(FieldPath),
    /// A question with nothing pending to explain.
    General,
}

/// Whether the utterance reads as a question rather than a field answer.
///
/// A lone token ending in a question mark ("글로우세럼?") still counts as an
/// answer unless the token itself is an interrogative.
pub fn is_question(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }
    let has_question_mark = trimmed.contains(['?', '？']);
    let token_count = trimmed.split_whitespace().count();
    if has_question_mark && token_count > 1 {
        return true;
    }
    has_marker(&trimmed.to_lowercase())
}

fn has_marker(lowered: &str) -> bool {
    let mut scrubbed = lowered.to_string();
    for exception in MARKER_EXCEPTIONS {
        scrubbed = scrubbed.replace(exception, " ");
    }
    if INTERROGATIVE_MARKERS
        .iter()
        .any(|marker| scrubbed.contains(marker))
    {
        return true;
    }
    scrubbed
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .any(|token| INTERROGATIVE_TOKENS.contains(&token))
}

/// Classify a question utterance for the composer.
pub fn classify(lowered: &str, expected: Option<FieldPath>) -> MetaQuery {
    if REMAINING_CUES.iter().any(|cue| lowered.contains(cue)) {
        return MetaQuery::Remaining;
    }
    if expected == Some(FieldPath::ProductPriceBand)
        && PRICE_FORMAT_CUES.iter().any(|cue| lowered.contains(cue))
    {
        return MetaQuery::PriceFormat;
    }
    expected.map_or(MetaQuery::General, MetaQuery::Rationale)
}

/// "You decide" / "pick for me" style hand-off.
pub fn is_delegation(lowered: &str) -> bool {
    DELEGATION_CUES.iter().any(|cue| lowered.contains(cue))
}
