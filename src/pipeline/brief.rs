use crate::config::Config;
use crate::dialogue::gate;
use crate::dialogue::{Brief, Channel, DurationClass, PriceBand, WeeklyGoal};
use crate::error::PipelineError;
use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

const UNNAMED_PRODUCT: &str = "미정 제품";
const UNKNOWN_CATEGORY: &str = "기타";
const UNKNOWN_AUDIENCE: &str = "미정 타겟";

/// Brief handed to the generation pipeline. Every field is concrete; gaps
/// left by a relaxed gate are filled with defaults at finalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchBrief {
    pub product_name: String,
    pub product_category: String,
    #[serde(default)]
    pub key_features: Vec<String>,
    pub target_audience: String,
    #[serde(default)]
    pub purchase_reason: Option<String>,
    pub price_band: PriceBand,
    pub total_budget_krw: i64,
    pub launch_date: NaiveDate,
    pub core_kpi: String,
    pub region: String,
    #[serde(default)]
    pub channel_focus: Vec<Channel>,
    pub video_seconds: u32,
    #[serde(default)]
    pub product_image_url: Option<String>,
    #[serde(default)]
    pub product_image_context: Option<String>,
}

impl LaunchBrief {
    /// Freeze a collected brief for generation. Refuses briefs the gate
    /// does not consider ready.
    pub fn finalize(brief: &Brief, config: &Config) -> Result<Self, PipelineError> {
        let status = gate::evaluate(brief, &config.dialogue);
        if !status.ready {
            return Err(PipelineError::BriefNotReady {
                missing: status
                    .missing_required
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
            });
        }

        let today = Utc::now().date_naive();
        let launch_date = u64::try_from(config.pipeline.launch_lead_days)
            .ok()
            .and_then(|days| today.checked_add_days(Days::new(days)))
            .unwrap_or(today);
        let video_seconds = brief.goal.video_duration.map_or_else(
            || DurationClass::nearest(i64::from(config.pipeline.default_video_seconds)).seconds(),
            DurationClass::seconds,
        );

        Ok(Self {
            product_name: text_or(brief.product.name.as_deref(), UNNAMED_PRODUCT),
            product_category: text_or(brief.product.category.as_deref(), UNKNOWN_CATEGORY),
            key_features: brief.product.features.clone(),
            target_audience: text_or(brief.target.who.as_deref(), UNKNOWN_AUDIENCE),
            purchase_reason: brief.target.why.clone(),
            price_band: brief.product.price_band.unwrap_or(PriceBand::Mid),
            total_budget_krw: config.pipeline.default_budget_krw,
            launch_date,
            core_kpi: brief
                .goal
                .weekly_goal
                .unwrap_or(WeeklyGoal::Inquiry)
                .core_kpi()
                .to_string(),
            region: config.pipeline.region.clone(),
            channel_focus: brief.channel.channels.clone(),
            video_seconds,
            product_image_url: brief.product.image_url.clone(),
            product_image_context: brief.product.image_context.clone(),
        })
    }

    /// Supported duration class for `video_seconds`.
    pub fn duration(&self) -> DurationClass {
        DurationClass::nearest(i64::from(self.video_seconds))
    }
}

fn text_or(value: Option<&str>, fallback: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}
