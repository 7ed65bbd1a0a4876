//! Gatekeeper for field proposals from the semantic-extraction collaborator.
//!
//! Proposals are untrusted: they are validated against an allow-list,
//! coerced through [`RawValue`], canonicalized like local answers, and never
//! overwrite a field the user already confirmed.

use super::brief::{
    Brief, Channel, DurationClass, FieldPath, FieldUpdate, FieldValue, MAX_FEATURES, PriceBand,
    WeeklyGoal,
};
use super::canonical::{canonicalize, merge_channels, merge_unique};
use super::conflict::detect_price_conflict;
use super::extract::meta::is_question;
use super::extract::{duration_notice, match_band_keyword, match_goal, parse_amount, stated_amount};
use crate::coerce::{RawValue, extract_json};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// Confidence assumed when a proposal carries none.
pub const DEFAULT_PROPOSAL_CONFIDENCE: f64 = 0.72;

/// One untrusted field proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalProposal {
    pub path: String,
    #[serde(default)]
    pub value: RawValue,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn default_confidence() -> f64 {
    DEFAULT_PROPOSAL_CONFIDENCE
}

impl ExternalProposal {
    pub fn new(path: impl Into<String>, value: impl Into<RawValue>, confidence: f64) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
            confidence,
        }
    }
}

/// Proposals that survived filtering, plus duration notices they produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    pub updates: Vec<FieldUpdate>,
    pub notices: Vec<String>,
}

/// Filter a proposal batch against `brief` and the user message that
/// triggered it. Order is preserved; later proposals see earlier accepted
/// ones, so two proposals for the same scalar keep only the first.
///
/// `expected` is the field the previous turn asked about; it decides whether
/// a bare number in the message reads as a price, as in local extraction.
pub fn filter(
    proposals: &[ExternalProposal],
    brief: &Brief,
    message: &str,
    expected: Option<FieldPath>,
) -> MergeOutcome {
    let lowered = message.trim().to_lowercase();
    let mut scratch = brief.clone();
    let mut outcome = MergeOutcome::default();

    for proposal in proposals {
        match admit(proposal, &scratch, &lowered, expected) {
            Ok((update, notice)) => {
                if outcome
                    .updates
                    .iter()
                    .any(|u| u.path == update.path && u.value == update.value)
                {
                    continue;
                }
                scratch.apply(&update);
                outcome.notices.extend(notice);
                outcome.updates.push(update);
            }
            Err(reason) => {
                debug!(path = %proposal.path, reason, "rejecting external proposal");
            }
        }
    }
    outcome
}

type Admitted = (FieldUpdate, Option<String>);

fn admit(
    proposal: &ExternalProposal,
    brief: &Brief,
    lowered_message: &str,
    expected: Option<FieldPath>,
) -> Result<Admitted, &'static str> {
    let path = FieldPath::from_str(proposal.path.trim()).map_err(|_| "path not allowed")?;
    let confidence = if proposal.confidence.is_nan() {
        DEFAULT_PROPOSAL_CONFIDENCE
    } else {
        proposal.confidence.clamp(0.0, 1.0)
    };
    let raw = &proposal.value;
    let accepted = |value| Ok((FieldUpdate::new(path, value, confidence), None));

    match path {
        FieldPath::ProductName
        | FieldPath::ProductCategory
        | FieldPath::TargetWho
        | FieldPath::TargetWhy => {
            if !brief.is_unset(path) {
                return Err("field already filled");
            }
            let text = raw.as_scalar().map(|s| canonicalize(&s)).unwrap_or_default();
            if text.is_empty() {
                return Err("empty value");
            }
            if is_question(&text) {
                return Err("value reads as a question");
            }
            accepted(FieldValue::Text(text))
        }
        FieldPath::ProductPriceBand => {
            if !brief.is_unset(path) {
                return Err("price band already set");
            }
            let (band, amount) = resolve_price(raw).ok_or("unrecognized price value")?;
            let named = amount.is_none().then_some(band);
            let amount = amount.or_else(|| stated_amount(lowered_message, expected));
            if detect_price_conflict(lowered_message, named, amount).is_some() {
                return Err("conflicts with discount wording");
            }
            accepted(FieldValue::PriceBand(band))
        }
        FieldPath::GoalWeeklyGoal => {
            if !brief.is_unset(path) {
                return Err("weekly goal already set");
            }
            let goal = raw
                .as_enum::<WeeklyGoal>()
                .or_else(|| raw.as_scalar().and_then(|s| match_goal(&s)))
                .ok_or("unrecognized goal value")?;
            accepted(FieldValue::Goal(goal))
        }
        FieldPath::ProductFeatures => {
            let items: Vec<String> = raw
                .as_text_list()
                .iter()
                .map(|item| canonicalize(item))
                .filter(|item| !item.is_empty() && !is_question(item))
                .collect();
            let existing = &brief.product.features;
            let merged = merge_unique(existing, &items, MAX_FEATURES);
            if merged.len() <= existing.len() {
                return Err("no new features");
            }
            accepted(FieldValue::List(merged))
        }
        FieldPath::ChannelChannels => {
            let found: Vec<Channel> = raw
                .as_text_list()
                .iter()
                .filter_map(|item| Channel::resolve(item))
                .collect();
            let existing = &brief.channel.channels;
            let merged = merge_channels(existing, &found);
            if &merged == existing {
                return Err("no new channels");
            }
            accepted(FieldValue::Channels(merged))
        }
        FieldPath::GoalVideoSeconds => {
            let requested = raw.as_integer().ok_or("video length is not a number")?;
            let normalized = DurationClass::nearest(requested);
            let previous = brief.goal.video_duration;
            if previous == Some(normalized) {
                return Err("video length unchanged");
            }
            let notice = duration_notice(requested, normalized, previous);
            Ok((
                FieldUpdate::new(path, FieldValue::Duration(normalized), confidence),
                notice,
            ))
        }
    }
}

/// Band plus the amount it was derived from, when there was one.
fn resolve_price(raw: &RawValue) -> Option<(PriceBand, Option<u64>)> {
    if let Some(band) = raw.as_enum::<PriceBand>() {
        return Some((band, None));
    }
    if let RawValue::Number(_) = raw {
        let amount = u64::try_from(raw.as_integer()?).ok()?;
        return Some((PriceBand::from_amount(amount), Some(amount)));
    }
    let text = raw.as_scalar()?.to_lowercase();
    if let Some(band) = match_band_keyword(&text) {
        return Some((band, None));
    }
    let amount = parse_amount(&text, true)?;
    Some((PriceBand::from_amount(amount), Some(amount)))
}

/// Parse collaborator output into proposals.
///
/// Accepts a JSON object with an `updates` array, a bare array, a fenced
/// ```json block, or the first object/array embedded in prose. Anything
/// unparseable yields no proposals.
pub fn parse_proposals(text: &str) -> Vec<ExternalProposal> {
    let Some(payload) = extract_json(text) else {
        return Vec::new();
    };

    let items = match payload {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove("updates") {
            Some(serde_json::Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| {
            let serde_json::Value::Object(mut entry) = item else {
                return None;
            };
            let path = entry.get("path")?.as_str()?.trim().to_string();
            if path.is_empty() {
                return None;
            }
            let value = entry.remove("value").map(RawValue::from).unwrap_or_default();
            let confidence = entry
                .remove("confidence")
                .map_or(RawValue::Null, RawValue::from)
                .as_confidence(DEFAULT_PROPOSAL_CONFIDENCE);
            Some(ExternalProposal {
                path,
                value,
                confidence,
            })
        })
        .collect()
}
