use launch_studio::config::DialogueConfig;
use launch_studio::dialogue::{
    Brief, Channel, DialogueEngine, FieldPath, PriceBand, REQUIRED_FIELDS, WeeklyGoal,
};

fn engine() -> DialogueEngine {
    DialogueEngine::new(DialogueConfig::default())
}

#[test]
fn empty_brief_is_not_ready() {
    let gate = engine().evaluate_gate(&Brief::default());
    assert!(!gate.ready);
    assert!(gate.completeness.abs() < f64::EPSILON);
    assert_eq!(gate.missing_required, REQUIRED_FIELDS.to_vec());
    assert_eq!(gate.missing_required[0], FieldPath::ProductName);
}

#[test]
fn completeness_tracks_filled_fields() {
    let engine = engine();
    let mut brief = Brief::default();
    let fills: [fn(&mut Brief); 8] = [
        |b| b.product.name = Some("글로우세럼X".into()),
        |b| b.product.category = Some("스킨케어".into()),
        |b| b.product.features = vec!["저자극".into(), "빠른흡수".into(), "비건".into()],
        |b| b.product.price_band = Some(PriceBand::Mid),
        |b| b.target.who = Some("20대 직장인".into()),
        |b| b.target.why = Some("민감 피부 진정".into()),
        |b| b.channel.channels = vec![Channel::Instagram],
        |b| b.goal.weekly_goal = Some(WeeklyGoal::Inquiry),
    ];
    for (filled, fill) in fills.iter().enumerate() {
        fill(&mut brief);
        let gate = engine.evaluate_gate(&brief);
        #[allow(clippy::cast_precision_loss)]
        let expected = ((filled + 1) as f64 / 8.0 * 1000.0).round() / 1000.0;
        assert!((gate.completeness - expected).abs() < 1e-9);
        assert_eq!(gate.missing_required.len(), 7 - filled);
        assert!((0.0..=1.0).contains(&gate.completeness));
    }
    assert!(engine.evaluate_gate(&brief).ready);
}

#[test]
fn gate_evaluation_is_idempotent() {
    let engine = engine();
    let mut brief = Brief::default();
    brief.product.name = Some("글로우세럼X".into());
    brief.target.who = Some("20대".into());
    assert_eq!(engine.evaluate_gate(&brief), engine.evaluate_gate(&brief));
}

#[test]
fn relaxed_gate_can_be_disabled() {
    let mut brief = Brief::default();
    brief.product.name = Some("글로우세럼X".into());
    brief.product.category = Some("스킨케어".into());
    brief.product.features = vec!["저자극".into(), "빠른흡수".into(), "비건".into()];
    brief.target.who = Some("20대 직장인".into());
    brief.goal.weekly_goal = Some(WeeklyGoal::Inquiry);

    assert!(engine().evaluate_gate(&brief).ready);

    let strict = DialogueEngine::new(DialogueConfig {
        relaxed_ready_enabled: false,
        ..DialogueConfig::default()
    });
    assert!(!strict.evaluate_gate(&brief).ready);
}
