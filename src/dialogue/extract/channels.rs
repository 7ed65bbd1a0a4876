use super::ExtractionContext;
use crate::dialogue::brief::{Channel, FieldPath, FieldUpdate, FieldValue};
use crate::dialogue::canonical::merge_channels;

pub fn extract(ctx: &ExtractionContext<'_>) -> Option<FieldUpdate> {
    let found = find_channels(&ctx.lowered);
    if found.is_empty() {
        return None;
    }
    let existing = &ctx.brief.channel.channels;
    let merged = merge_channels(existing, &found);
    if &merged == existing {
        return None;
    }
    Some(FieldUpdate::new(
        FieldPath::ChannelChannels,
        FieldValue::Channels(merged),
        0.9,
    ))
}

/// Channels mentioned in a lowercase utterance, in order of first mention.
///
/// Channels are matched in [`Channel::ALL`] order and each matched span is
/// blanked out, so "유튜브 쇼츠" yields only YouTube Shorts.
pub fn find_channels(lowered: &str) -> Vec<Channel> {
    let mut masked = lowered.to_string();
    let mut hits: Vec<(usize, Channel)> = Vec::new();

    for channel in Channel::ALL {
        let mut first: Option<usize> = None;
        for synonym in channel.synonyms() {
            while let Some(pos) = masked.find(synonym) {
                first = Some(first.map_or(pos, |f| f.min(pos)));
                masked.replace_range(pos..pos + synonym.len(), &" ".repeat(synonym.len()));
            }
        }
        if let Some(pos) = first {
            hits.push((pos, channel));
        }
    }

    hits.sort_by_key(|(pos, _)| *pos);
    hits.into_iter().map(|(_, channel)| channel).collect()
}
