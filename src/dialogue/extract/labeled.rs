//! "label: value" extraction for the free-text slots plus the plain-answer
//! fallback.

use super::ExtractionContext;
use super::meta::is_question;
use crate::dialogue::brief::{FieldPath, FieldUpdate, FieldValue};
use crate::dialogue::canonical::canonicalize;
use crate::utils::text::char_len;
use regex::Regex;
use std::sync::LazyLock;

static NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:제품\s*명|상품\s*명|제품\s*이름|상품\s*이름|브랜드\s*명|이름|product\s+name\s*:|name\s*:)\s*(?:은|는|:)?\s*([^\n,.;]{2,40})",
    )
    .expect("name pattern")
});

static CATEGORY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:카테고리|분야|업종|품목|category\s*:)\s*(?:은|는|:)?\s*([^\n,.;]{2,40})")
        .expect("category pattern")
});

static WHO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:(?:주요\s*)?(?:타겟|타깃)(?:\s*고객층?)?\s*(?:은|는|:)?|(?:고객층?|대상|target\s*:)\s*(?:은|는|:)?)\s*([^\n,.;]{2,60})",
    )
    .expect("who pattern")
});

static WHY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:(?:구매\s*)?(?:이유|니즈|동기)\s*(?:은|는|:)?|(?:문제|고민)\s*(?:은|는|:)|왜냐하면|because)\s*([^\n,.;]{2,80})",
    )
    .expect("why pattern")
});

/// A segment that opens with another field's label ("가격은 ...").
static LEADING_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:제품\s*명|상품\s*명|이름|카테고리|분야|업종|가격대?|타겟|타깃|고객층?|대상|구매\s*이유|이유|채널|주간\s*목표|목표|영상(?:\s*길이)?|예산|특징|장점)\s*(?:은|는|:)",
    )
    .expect("leading label pattern")
});

/// Another field's label starting mid-value ("X이고 카테고리는 Y").
static INNER_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\s(?:제품\s*명|카테고리|분야|가격대?|타겟|타깃|구매\s*이유|이유|채널|주간\s*목표|목표|영상(?:\s*길이)?|특징|장점)\s*(?:은|는|:)",
    )
    .expect("inner label pattern")
});

/// Connective endings left dangling after cutting at an inner label.
const CONNECTIVE_ENDINGS: &[&str] = &["이고", "이며", "인데", "이구요"];

/// Keyword table for category inference, checked in order.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "스킨케어",
        &["스킨", "세럼", "화장품", "크림", "토너", "앰플", "로션", "선크림"],
    ),
    ("패션", &["의류", "패션", "신발", "가방", "옷"]),
    ("헬스케어", &["건강식품", "영양제", "헬스", "비타민", "유산균"]),
    ("푸드", &["식품", "간식", "음료", "커피", "디저트"]),
    ("가전", &["가전", "디바이스", "기기", "전자제품"]),
];

pub fn name(ctx: &ExtractionContext<'_>) -> Option<FieldUpdate> {
    labeled_value(&NAME, ctx.message, 40)
        .map(|v| FieldUpdate::new(FieldPath::ProductName, FieldValue::Text(v), 0.93))
}

/// Labeled category, else a category inferred from product keywords.
pub fn category(ctx: &ExtractionContext<'_>) -> Option<FieldUpdate> {
    if let Some(value) = labeled_value(&CATEGORY, ctx.message, 40) {
        return Some(FieldUpdate::new(
            FieldPath::ProductCategory,
            FieldValue::Text(value),
            0.9,
        ));
    }
    infer_category(&ctx.lowered).map(|c| {
        FieldUpdate::new(
            FieldPath::ProductCategory,
            FieldValue::Text(c.to_string()),
            0.72,
        )
    })
}

pub fn who(ctx: &ExtractionContext<'_>) -> Option<FieldUpdate> {
    labeled_value(&WHO, ctx.message, 60)
        .map(|v| FieldUpdate::new(FieldPath::TargetWho, FieldValue::Text(v), 0.88))
}

pub fn why(ctx: &ExtractionContext<'_>) -> Option<FieldUpdate> {
    labeled_value(&WHY, ctx.message, 80)
        .map(|v| FieldUpdate::new(FieldPath::TargetWhy, FieldValue::Text(v), 0.84))
}

/// Plain one-line answer for `expected`. Only the free-text slots accept
/// one; the list and enum slots have their own fallbacks.
pub fn plain_answer(expected: FieldPath, ctx: &ExtractionContext<'_>) -> Option<FieldUpdate> {
    let cleaned = canonicalize(ctx.message);
    let len = char_len(&cleaned);
    if len < 2 || is_question(&cleaned) {
        return None;
    }
    let text = |confidence| {
        Some(FieldUpdate::new(
            expected,
            FieldValue::Text(cleaned.clone()),
            confidence,
        ))
    };
    match expected {
        FieldPath::ProductName if len <= 40 => text(0.62),
        FieldPath::ProductCategory => {
            if let Some(inferred) = infer_category(&ctx.lowered) {
                Some(FieldUpdate::new(
                    expected,
                    FieldValue::Text(inferred.to_string()),
                    0.67,
                ))
            } else if len <= 40 && !cleaned.contains(',') {
                text(0.58)
            } else {
                None
            }
        }
        FieldPath::TargetWho if len <= 60 => text(0.55),
        FieldPath::TargetWhy if len <= 80 => text(0.55),
        _ => None,
    }
}

/// Category implied by product keywords in a lowercase utterance.
pub fn infer_category(lowered: &str) -> Option<&'static str> {
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(category, _)| *category)
}

/// Whether `segment` opens with another field's label.
pub fn starts_with_label(segment: &str) -> bool {
    LEADING_LABEL.is_match(segment.trim())
}

/// Whether the utterance uses "label: value" phrasing anywhere.
pub fn mentions_label(message: &str) -> bool {
    starts_with_label(message) || INNER_LABEL.is_match(message)
}

fn labeled_value(pattern: &Regex, message: &str, max_chars: usize) -> Option<String> {
    let captured = pattern.captures(message)?.get(1)?.as_str();
    let mut value = cut_at_inner_label(captured);
    value = canonicalize(&value);
    let len = char_len(&value);
    if len < 2 || len > max_chars || is_question(&value) || starts_with_label(&value) {
        return None;
    }
    Some(value)
}

fn cut_at_inner_label(captured: &str) -> String {
    let Some(found) = INNER_LABEL.find(captured) else {
        return captured.to_string();
    };
    let mut head = captured[..found.start()].trim_end();
    for ending in CONNECTIVE_ENDINGS {
        if let Some(stem) = head.strip_suffix(ending)
            && !stem.is_empty()
        {
            head = stem;
            break;
        }
    }
    head.to_string()
}
