use super::Config;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("LAUNCH_STUDIO_LOG")
            && !level.is_empty()
        {
            self.observability.log_level = level;
        }

        if let Ok(secs) = std::env::var("LAUNCH_STUDIO_PHASE_TIMEOUT_SECS")
            && let Ok(secs) = secs.parse::<u64>()
            && secs > 0
        {
            self.pipeline.phase_timeout_secs = secs;
        }

        if let Ok(max) = std::env::var("LAUNCH_STUDIO_MAX_RISKS")
            && let Ok(max) = max.parse::<usize>()
            && max > 0
        {
            self.pipeline.max_risks = max;
        }

        if let Ok(threshold) = std::env::var("LAUNCH_STUDIO_RELAXED_THRESHOLD")
            && let Ok(threshold) = threshold.parse::<f64>()
            && (0.0..=1.0).contains(&threshold)
        {
            self.dialogue.relaxed_ready_threshold = threshold;
        }

        if let Ok(tone) = std::env::var("LAUNCH_STUDIO_TONE") {
            match tone.trim() {
                "" | "none" | "off" => self.dialogue.tone = None,
                other => {
                    if let Ok(tone) = other.parse() {
                        self.dialogue.tone = Some(tone);
                    }
                }
            }
        }

        if let Ok(models) = std::env::var("LAUNCH_STUDIO_VIDEO_MODELS") {
            let models: Vec<String> = models
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from)
                .collect();
            if !models.is_empty() {
                self.media.video_models = models;
            }
        }

        if let Ok(flag) = std::env::var("LAUNCH_STUDIO_KEYFRAME_FALLBACK") {
            match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.media.keyframe_fallback = true,
                "0" | "false" | "no" => self.media.keyframe_fallback = false,
                _ => {}
            }
        }
    }
}
