use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Shared deadline for every task of one phase.
    #[serde(default = "default_phase_timeout_secs")]
    pub phase_timeout_secs: u64,
    /// Cap on the merged risk list.
    #[serde(default = "default_max_risks")]
    pub max_risks: usize,
    #[serde(default = "default_budget_krw")]
    pub default_budget_krw: i64,
    /// Days between brief finalization and the planned launch date.
    #[serde(default = "default_launch_lead_days")]
    pub launch_lead_days: i64,
    #[serde(default = "default_region")]
    pub region: String,
    /// Used when the brief never stated a video length.
    #[serde(default = "default_video_seconds")]
    pub default_video_seconds: u32,
}

fn default_phase_timeout_secs() -> u64 {
    180
}

fn default_max_risks() -> usize {
    10
}

fn default_budget_krw() -> i64 {
    1_000_000
}

fn default_launch_lead_days() -> i64 {
    7
}

fn default_region() -> String {
    "KR".into()
}

fn default_video_seconds() -> u32 {
    8
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            phase_timeout_secs: default_phase_timeout_secs(),
            max_risks: default_max_risks(),
            default_budget_krw: default_budget_krw(),
            launch_lead_days: default_launch_lead_days(),
            region: default_region(),
            default_video_seconds: default_video_seconds(),
        }
    }
}

impl PipelineConfig {
    pub fn phase_timeout(&self) -> Duration {
        Duration::from_secs(self.phase_timeout_secs)
    }
}
