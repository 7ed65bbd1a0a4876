use super::super::{DialogueConfig, MediaConfig, ObservabilityConfig, PipelineConfig};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub dialogue: DialogueConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub media: MediaConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Reject values the dialogue gate or pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.dialogue.relaxed_ready_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(invalid(
                "dialogue.relaxed_ready_threshold",
                format!("{threshold} is outside 0..=1"),
            ));
        }
        if self.dialogue.extractor_timeout_secs == 0 {
            return Err(invalid("dialogue.extractor_timeout_secs", "must be positive"));
        }
        if self.pipeline.phase_timeout_secs == 0 {
            return Err(invalid("pipeline.phase_timeout_secs", "must be positive"));
        }
        if self.pipeline.max_risks == 0 {
            return Err(invalid("pipeline.max_risks", "must be positive"));
        }
        if self.media.video_models.is_empty() {
            return Err(invalid("media.video_models", "needs at least one model"));
        }
        if self.media.video_sizes.is_empty() {
            return Err(invalid("media.video_sizes", "needs at least one size"));
        }
        if let Some(bad) = self
            .media
            .video_sizes
            .iter()
            .find(|size| crate::pipeline::media::parse_size(size).is_none())
        {
            return Err(invalid(
                "media.video_sizes",
                format!("'{bad}' is not WIDTHxHEIGHT"),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.into(),
        reason: reason.into(),
    }
}
