use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum::{Display, EnumString};

/// Opening phrase style for assistant replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ReplyTone {
    #[serde(alias = "friendly_ko")]
    #[strum(to_string = "friendly", serialize = "friendly_ko")]
    Friendly,
    #[serde(alias = "calm_ko")]
    #[strum(to_string = "calm", serialize = "calm_ko")]
    Calm,
    #[serde(alias = "neutral_ko")]
    #[strum(to_string = "neutral", serialize = "neutral_ko")]
    Neutral,
}

/// Turn-loop tuning. The relaxed gate numbers are product-tuned, not derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueConfig {
    /// Allow READY before all eight required paths are filled.
    #[serde(default = "default_true")]
    pub relaxed_ready_enabled: bool,
    /// Minimum completeness for the relaxed path (5 of 8 by default).
    #[serde(default = "default_relaxed_ready_threshold")]
    pub relaxed_ready_threshold: f64,
    /// Deadline for the external semantic-extraction round-trip.
    #[serde(default = "default_extractor_timeout_secs")]
    pub extractor_timeout_secs: u64,
    /// Recent turns forwarded to the semantic-extraction collaborator.
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,
    /// Unset keeps replies unprefixed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<ReplyTone>,
}

fn default_true() -> bool {
    true
}

fn default_relaxed_ready_threshold() -> f64 {
    0.625
}

fn default_extractor_timeout_secs() -> u64 {
    12
}

fn default_history_turns() -> usize {
    16
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            relaxed_ready_enabled: true,
            relaxed_ready_threshold: default_relaxed_ready_threshold(),
            extractor_timeout_secs: default_extractor_timeout_secs(),
            history_turns: default_history_turns(),
            tone: None,
        }
    }
}

impl DialogueConfig {
    pub fn extractor_timeout(&self) -> Duration {
        Duration::from_secs(self.extractor_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_accepts_locale_suffixed_names() {
        let config: DialogueConfig = toml::from_str("tone = \"calm_ko\"").unwrap();
        assert_eq!(config.tone, Some(ReplyTone::Calm));
        assert_eq!("Neutral".parse::<ReplyTone>().unwrap(), ReplyTone::Neutral);
        assert!("cheerful".parse::<ReplyTone>().is_err());
        assert!(DialogueConfig::default().tone.is_none());
    }
}
