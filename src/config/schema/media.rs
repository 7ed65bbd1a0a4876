use serde::{Deserialize, Serialize};

/// Media-rendering fallback chain settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Video models tried in order.
    #[serde(default = "default_video_models")]
    pub video_models: Vec<String>,
    /// `WIDTHxHEIGHT` sizes tried in order for every model.
    #[serde(default = "default_video_sizes")]
    pub video_sizes: Vec<String>,
    /// Compose a video from a still keyframe when every candidate fails.
    #[serde(default = "default_keyframe_fallback")]
    pub keyframe_fallback: bool,
    /// Long-edge cap for enhancement targets.
    #[serde(default = "default_max_long_edge")]
    pub max_long_edge: u32,
}

fn default_video_models() -> Vec<String> {
    vec!["sora-2-pro".into()]
}

fn default_video_sizes() -> Vec<String> {
    ["1280x720", "720x1280", "1792x1024", "1024x1792"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_keyframe_fallback() -> bool {
    true
}

fn default_max_long_edge() -> u32 {
    1920
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            video_models: default_video_models(),
            video_sizes: default_video_sizes(),
            keyframe_fallback: default_keyframe_fallback(),
            max_long_edge: default_max_long_edge(),
        }
    }
}
