use super::ExtractionContext;
use crate::dialogue::brief::{FieldPath, FieldUpdate, FieldValue, WeeklyGoal};
use regex::Regex;
use std::sync::LazyLock;

/// Goal vocabulary in priority order.
const GOAL_KEYWORDS: &[(WeeklyGoal, &[&str])] = &[
    (
        WeeklyGoal::Reach,
        &["조회", "도달", "노출", "인지도", "리치", "reach", "views", "awareness"],
    ),
    (WeeklyGoal::Inquiry, &["문의", "리드", "상담", "inquiry", "lead"]),
    (
        WeeklyGoal::Purchase,
        &["구매", "전환", "매출", "판매", "purchase", "sales", "conversion"],
    ),
];

/// Verbs that mark a sentence as talking about a target metric.
const GOAL_CUES: &[&str] = &["늘리", "증가", "올리", "높이", "확보", "끌어", "키우", "목표"];

static LABELED_GOAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:주간\s*)?(?:목표|goal\s*:)\s*(?:은|는|:)?\s*([^\n,.;]{1,40})")
        .expect("goal pattern")
});

pub fn extract(ctx: &ExtractionContext<'_>) -> Option<FieldUpdate> {
    if let Some(scope) = LABELED_GOAL
        .captures(ctx.message)
        .and_then(|caps| caps.get(1))
        && let Some(goal) = match_goal(scope.as_str())
    {
        return Some(FieldUpdate::new(
            FieldPath::GoalWeeklyGoal,
            FieldValue::Goal(goal),
            0.91,
        ));
    }

    let cued = GOAL_CUES.iter().any(|cue| ctx.lowered.contains(cue));
    if !ctx.expects(FieldPath::GoalWeeklyGoal) && !cued {
        return None;
    }
    match_goal(&ctx.lowered)
        .map(|goal| FieldUpdate::new(FieldPath::GoalWeeklyGoal, FieldValue::Goal(goal), 0.8))
}

/// First goal whose vocabulary appears in `text`.
pub fn match_goal(text: &str) -> Option<WeeklyGoal> {
    let lowered = text.to_lowercase();
    GOAL_KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lowered.contains(w)))
        .map(|(goal, _)| *goal)
}
