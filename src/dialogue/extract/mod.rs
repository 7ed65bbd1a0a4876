//! Per-field heuristics, run as a priority-ordered table.
//!
//! Every extractor is a tagged [`Extractor`] variant with a predicate
//! ([`Extractor::applies`]) and an extraction step ([`Extractor::extract`]).
//! [`run`] walks [`Extractor::ORDER`], routes price candidates through the
//! conflict detector, and finally offers the expected-field plain answer
//! fallback when the expected field got no value.

mod channels;
mod duration;
mod features;
mod goal;
mod labeled;
pub mod meta;
mod price;

pub use channels::find_channels;
pub use duration::duration_notice;
pub use features::STOP_WORDS;
pub use goal::match_goal;
pub use labeled::{infer_category, starts_with_label};
pub use price::{match_band_keyword, parse_amount, stated_amount};

use super::brief::{Brief, FieldPath, FieldUpdate, MAX_CHANNELS, MAX_FEATURES};
use super::conflict::{self, Conflict};

/// Everything an extractor may look at for one utterance.
#[derive(Debug, Clone)]
pub struct ExtractionContext<'a> {
    /// Trimmed raw utterance.
    pub message: &'a str,
    /// Lowercase form for case-insensitive keyword checks.
    pub lowered: String,
    /// Brief after external proposals were merged.
    pub brief: &'a Brief,
    /// Field the previous assistant turn asked about.
    pub expected: Option<FieldPath>,
    /// Utterance reads as a question rather than an answer.
    pub question: bool,
    /// Paths filled by external proposals earlier in this turn; price and
    /// goal extraction may still confirm or correct them.
    pub externally_set: &'a [FieldPath],
}

impl<'a> ExtractionContext<'a> {
    pub fn new(
        message: &'a str,
        brief: &'a Brief,
        expected: Option<FieldPath>,
        externally_set: &'a [FieldPath],
    ) -> Self {
        let message = message.trim();
        Self {
            message,
            lowered: message.to_lowercase(),
            brief,
            expected,
            question: meta::is_question(message),
            externally_set,
        }
    }

    fn expects(&self, path: FieldPath) -> bool {
        self.expected == Some(path)
    }

    /// Scalar/enum slots fire when empty, or when an external proposal set
    /// them earlier in this same turn.
    fn open_for(&self, path: FieldPath) -> bool {
        self.brief.is_unset(path) || self.externally_set.contains(&path)
    }
}

/// Output of a single extractor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractorOutput {
    pub update: Option<FieldUpdate>,
    pub notice: Option<String>,
}

impl ExtractorOutput {
    fn update(update: Option<FieldUpdate>) -> Self {
        Self {
            update,
            notice: None,
        }
    }
}

/// Aggregate result of one pass over the extractor table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub updates: Vec<FieldUpdate>,
    pub notices: Vec<String>,
    pub conflicts: Vec<Conflict>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    Name,
    Category,
    Features,
    PriceBand,
    Who,
    Why,
    Channels,
    Goal,
    Duration,
}

impl Extractor {
    /// Declared evaluation order.
    pub const ORDER: [Self; 9] = [
        Self::Name,
        Self::Category,
        Self::Features,
        Self::PriceBand,
        Self::Who,
        Self::Why,
        Self::Channels,
        Self::Goal,
        Self::Duration,
    ];

    pub fn target(self) -> FieldPath {
        match self {
            Self::Name => FieldPath::ProductName,
            Self::Category => FieldPath::ProductCategory,
            Self::Features => FieldPath::ProductFeatures,
            Self::PriceBand => FieldPath::ProductPriceBand,
            Self::Who => FieldPath::TargetWho,
            Self::Why => FieldPath::TargetWhy,
            Self::Channels => FieldPath::ChannelChannels,
            Self::Goal => FieldPath::GoalWeeklyGoal,
            Self::Duration => FieldPath::GoalVideoSeconds,
        }
    }

    /// Predicate half of the table entry.
    pub fn applies(self, ctx: &ExtractionContext<'_>) -> bool {
        if ctx.question {
            return false;
        }
        match self {
            Self::Name | Self::Category | Self::Who | Self::Why => {
                ctx.brief.is_unset(self.target())
            }
            Self::Features => ctx.brief.product.features.len() < MAX_FEATURES,
            Self::Channels => ctx.brief.channel.channels.len() < MAX_CHANNELS,
            Self::PriceBand | Self::Goal => ctx.open_for(self.target()),
            Self::Duration => true,
        }
    }

    /// Extraction half of the table entry. Callers check [`Self::applies`]
    /// first.
    pub fn extract(self, ctx: &ExtractionContext<'_>) -> ExtractorOutput {
        match self {
            Self::Name => ExtractorOutput::update(labeled::name(ctx)),
            Self::Category => ExtractorOutput::update(labeled::category(ctx)),
            Self::Who => ExtractorOutput::update(labeled::who(ctx)),
            Self::Why => ExtractorOutput::update(labeled::why(ctx)),
            Self::Features => ExtractorOutput::update(features::extract(ctx)),
            Self::PriceBand => ExtractorOutput::update(price::extract(ctx)),
            Self::Channels => ExtractorOutput::update(channels::extract(ctx)),
            Self::Goal => ExtractorOutput::update(goal::extract(ctx)),
            Self::Duration => duration::extract(ctx),
        }
    }
}

/// Run the whole table over one utterance.
pub fn run(ctx: &ExtractionContext<'_>) -> Extraction {
    let mut extraction = Extraction::default();

    for extractor in Extractor::ORDER {
        if !extractor.applies(ctx) {
            continue;
        }
        let output = extractor.extract(ctx);
        if let Some(notice) = output.notice {
            extraction.notices.push(notice);
        }
        let Some(update) = output.update else {
            continue;
        };
        if extractor == Extractor::PriceBand
            && let Some(found) = conflict::detect_price_conflict(
                &ctx.lowered,
                price::match_band_keyword(&ctx.lowered),
                price::amount_in(ctx),
            )
        {
            tracing::debug!(cue = %found.cue, amount = found.amount, "discarding conflicting price");
            extraction.conflicts.push(found);
            continue;
        }
        // Re-confirming an externally set value is not a new update.
        if ctx.brief.value_of(update.path).as_ref() == Some(&update.value) {
            continue;
        }
        extraction.updates.push(update);
    }

    let expected_answered = ctx
        .expected
        .is_some_and(|path| extraction.updates.iter().any(|u| u.path == path));
    if extraction.conflicts.is_empty()
        && !expected_answered
        && let Some(update) = plain_answer(ctx)
    {
        extraction.updates.push(update);
    }

    extraction
}

/// Accept a bare one-line answer for the field that was just asked about.
///
/// Utterances that carry any "label: value" phrasing are left to the labeled
/// extractors.
fn plain_answer(ctx: &ExtractionContext<'_>) -> Option<FieldUpdate> {
    let expected = ctx.expected?;
    if ctx.question
        || ctx.message.contains('\n')
        || meta::is_delegation(&ctx.lowered)
        || labeled::mentions_label(ctx.message)
        || !ctx.brief.is_unset(expected)
    {
        return None;
    }
    labeled::plain_answer(expected, ctx)
}
