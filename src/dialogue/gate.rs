use super::brief::{Brief, FieldPath, REQUIRED_FIELDS};
use crate::config::DialogueConfig;
use serde::Serialize;

/// Paths that must be filled for the relaxed readiness path.
pub const ESSENTIAL_FIELDS: [FieldPath; 4] = [
    FieldPath::ProductName,
    FieldPath::ProductCategory,
    FieldPath::TargetWho,
    FieldPath::GoalWeeklyGoal,
];

/// Readiness of a brief. Pure function of the brief and config.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateStatus {
    pub ready: bool,
    /// Unresolved required paths in priority order.
    pub missing_required: Vec<FieldPath>,
    /// `(8 - missing) / 8`, rounded to 3 decimals.
    pub completeness: f64,
}

impl GateStatus {
    /// Next field to ask about.
    pub fn first_missing(&self) -> Option<FieldPath> {
        self.missing_required.first().copied()
    }
}

pub fn evaluate(brief: &Brief, config: &DialogueConfig) -> GateStatus {
    let missing_required: Vec<FieldPath> = REQUIRED_FIELDS
        .into_iter()
        .filter(|path| !brief.is_filled(*path))
        .collect();

    #[allow(clippy::cast_precision_loss)]
    let ratio = (REQUIRED_FIELDS.len() - missing_required.len()) as f64 / REQUIRED_FIELDS.len() as f64;
    let completeness = (ratio * 1000.0).round() / 1000.0;

    let strict = missing_required.is_empty();
    let relaxed = config.relaxed_ready_enabled
        && ESSENTIAL_FIELDS.iter().all(|path| brief.is_filled(*path))
        && completeness >= config.relaxed_ready_threshold;

    GateStatus {
        ready: strict || relaxed,
        missing_required,
        completeness,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::brief::{Channel, PriceBand, WeeklyGoal};

    fn essentials() -> Brief {
        let mut brief = Brief::default();
        brief.product.name = Some("글로우세럼X".into());
        brief.product.category = Some("스킨케어".into());
        brief.target.who = Some("20대 직장인".into());
        brief.goal.weekly_goal = Some(WeeklyGoal::Inquiry);
        brief
    }

    #[test]
    fn empty_brief_misses_everything() {
        let status = evaluate(&Brief::default(), &DialogueConfig::default());
        assert!(!status.ready);
        assert!(status.completeness.abs() < f64::EPSILON);
        assert_eq!(status.missing_required, REQUIRED_FIELDS.to_vec());
        assert_eq!(status.first_missing(), Some(FieldPath::ProductName));
    }

    #[test]
    fn essentials_alone_are_not_enough() {
        let status = evaluate(&essentials(), &DialogueConfig::default());
        assert!(!status.ready);
        assert!((status.completeness - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn relaxed_path_at_five_of_eight() {
        let mut brief = essentials();
        brief.product.price_band = Some(PriceBand::Mid);
        let status = evaluate(&brief, &DialogueConfig::default());
        assert!(status.ready);
        assert!((status.completeness - 0.625).abs() < f64::EPSILON);
        assert_eq!(
            status.missing_required,
            vec![
                FieldPath::ProductFeatures,
                FieldPath::TargetWhy,
                FieldPath::ChannelChannels
            ]
        );

        let strict_only = DialogueConfig {
            relaxed_ready_enabled: false,
            ..DialogueConfig::default()
        };
        assert!(!evaluate(&brief, &strict_only).ready);
    }

    #[test]
    fn relaxed_path_requires_essentials() {
        let mut brief = Brief::default();
        brief.product.name = Some("글로우세럼X".into());
        brief.product.category = Some("스킨케어".into());
        brief.product.features = vec!["a1".into(), "b2".into(), "c3".into()];
        brief.product.price_band = Some(PriceBand::Low);
        brief.target.why = Some("진정".into());
        brief.channel.channels = vec![Channel::Naver];
        let status = evaluate(&brief, &DialogueConfig::default());
        assert!((status.completeness - 0.75).abs() < f64::EPSILON);
        assert!(!status.ready);
    }

    #[test]
    fn rounding_and_idempotence() {
        let mut brief = Brief::default();
        brief.product.name = Some("x1".into());
        let first = evaluate(&brief, &DialogueConfig::default());
        assert!((first.completeness - 0.125).abs() < f64::EPSILON);
        assert_eq!(first, evaluate(&brief, &DialogueConfig::default()));
    }
}
