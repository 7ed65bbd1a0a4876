//! Contradictions inside a single utterance.

use super::brief::{FieldPath, PriceBand};

/// Amounts at or above this, next to discount vocabulary, contradict each
/// other.
pub const HIGH_PRICE_THRESHOLD: u64 = 100_000;

/// Discount vocabulary, in cue-reporting order.
const DISCOUNT_WORDS: &[&str] = &[
    "할인",
    "세일",
    "특가",
    "초특가",
    "떨이",
    "반값",
    "파격",
    "땡처리",
    "재고 정리",
    "재고정리",
    "클리어런스",
    "덤핑",
    "discount",
    "sale",
    "clearance",
];

/// A value held back from the brief until the user clarifies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub path: FieldPath,
    pub amount: u64,
    pub cue: String,
}

/// A high stated price alongside discount vocabulary.
///
/// `named_band` is a band the user or collaborator named outright. An
/// explicit low or mid band already agrees with the discount wording.
pub fn detect_price_conflict(
    lowered: &str,
    named_band: Option<PriceBand>,
    amount: Option<u64>,
) -> Option<Conflict> {
    if matches!(named_band, Some(PriceBand::Low | PriceBand::Mid)) {
        return None;
    }
    let amount = amount.filter(|a| *a >= HIGH_PRICE_THRESHOLD)?;
    let cue = DISCOUNT_WORDS.iter().find(|word| lowered.contains(*word))?;
    Some(Conflict {
        path: FieldPath::ProductPriceBand,
        amount,
        cue: (*cue).to_string(),
    })
}

/// "150,000" style KRW rendering.
pub fn format_krw(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
