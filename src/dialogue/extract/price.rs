use super::ExtractionContext;
use crate::dialogue::brief::{FieldPath, FieldUpdate, FieldValue, PriceBand};
use regex::Regex;
use std::sync::LazyLock;

/// Direct band vocabulary, checked before any number.
const BAND_KEYWORDS: &[(PriceBand, &[&str])] = &[
    (PriceBand::Low, &["저가", "가성비", "저렴", "싼 편", "low price"]),
    (
        PriceBand::Mid,
        &["중가", "중간 가격", "중간가", "미드", "적당한 가격", "mid price", "mid-range"],
    ),
    (
        PriceBand::Premium,
        &["고가", "프리미엄", "고급", "럭셔리", "하이엔드", "premium", "luxury"],
    ),
];

/// Words that make a bare number read as a price.
const CURRENCY_CONTEXT: &[&str] = &["가격", "판매가", "정가", "원가", "가격대", "price", "값"];

/// "3만원", "3만 5천원", "2.5만 원"
static TEN_THOUSANDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*만\s*(?:(\d+)\s*천\s*)?원").expect("man-won pattern")
});

/// "5천원"
static THOUSANDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*천\s*원").expect("cheon-won pattern"));

/// "39,000원"
static WON_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d[\d,]*)\s*원").expect("won pattern"));

/// "₩39,000", "39000 krw"
static CURRENCY_SYMBOL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[₩￦]|krw)\s*(\d[\d,]*)|(\d[\d,]*)\s*krw").expect("currency symbol pattern")
});

/// Bare integer of four or more digits, with an optional trailing unit that
/// disqualifies it.
static BARE_INTEGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,3}(?:,\d{3})+|\d{4,})\s*(년|초|개|명|%|ml|g|kg|위)?")
        .expect("bare integer pattern")
});

pub fn extract(ctx: &ExtractionContext<'_>) -> Option<FieldUpdate> {
    if let Some(band) = match_band_keyword(&ctx.lowered) {
        return Some(FieldUpdate::new(
            FieldPath::ProductPriceBand,
            FieldValue::PriceBand(band),
            0.88,
        ));
    }
    let amount = amount_in(ctx)?;
    Some(FieldUpdate::new(
        FieldPath::ProductPriceBand,
        FieldValue::PriceBand(PriceBand::from_amount(amount)),
        0.86,
    ))
}

/// First band whose vocabulary appears in the lowercase text.
pub fn match_band_keyword(lowered: &str) -> Option<PriceBand> {
    BAND_KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lowered.contains(w)))
        .map(|(band, _)| *band)
}

/// Amount stated in the utterance. Bare integers count only when price was
/// the expected answer or the text talks about price.
pub fn amount_in(ctx: &ExtractionContext<'_>) -> Option<u64> {
    stated_amount(&ctx.lowered, ctx.expected)
}

/// [`amount_in`] over a bare lowercase message.
pub fn stated_amount(lowered: &str, expected: Option<FieldPath>) -> Option<u64> {
    let allow_bare = expected == Some(FieldPath::ProductPriceBand)
        || CURRENCY_CONTEXT.iter().any(|w| lowered.contains(w));
    parse_amount(lowered, allow_bare)
}

/// Tiered KRW amount parsing over lowercase text.
///
/// # Tiers
///
/// 1. ten-thousand phrasing ("3만 5천원") and thousand phrasing ("5천원")
/// 2. plain won suffix ("39,000원")
/// 3. currency symbol or code ("₩39,000", "39000 krw")
/// 4. bare integer ≥ 1,000, only when `allow_bare`
pub fn parse_amount(lowered: &str, allow_bare: bool) -> Option<u64> {
    if let Some(caps) = TEN_THOUSANDS.captures(lowered) {
        let man: f64 = caps.get(1)?.as_str().parse().ok()?;
        let cheon: u64 = caps
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        return Some(whole(man * 10_000.0) + cheon * 1_000);
    }
    if let Some(caps) = THOUSANDS.captures(lowered) {
        let cheon: u64 = caps.get(1)?.as_str().parse().ok()?;
        return Some(cheon * 1_000);
    }
    if let Some(caps) = WON_SUFFIX.captures(lowered) {
        return digits(caps.get(1)?.as_str());
    }
    if let Some(caps) = CURRENCY_SYMBOL.captures(lowered) {
        let group = caps.get(1).or_else(|| caps.get(2))?;
        return digits(group.as_str());
    }
    if allow_bare {
        return BARE_INTEGER
            .captures_iter(lowered)
            .filter(|caps| caps.get(2).is_none())
            .find_map(|caps| digits(caps.get(1)?.as_str()))
            .filter(|amount| *amount >= 1_000);
    }
    None
}

fn digits(text: &str) -> Option<u64> {
    text.replace(',', "").parse().ok()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole(value: f64) -> u64 {
    value.max(0.0).round() as u64
}
