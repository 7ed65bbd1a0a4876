use launch_studio::config::{Config, DialogueConfig};
use launch_studio::dialogue::{
    Brief, DialogueEngine, DialogueState, DurationClass, PriceBand, TurnRequest, TurnResult,
    WeeklyGoal,
};
use launch_studio::error::PipelineError;
use launch_studio::pipeline::LaunchBrief;

fn engine() -> DialogueEngine {
    DialogueEngine::new(DialogueConfig::default())
}

fn say(engine: &DialogueEngine, utterance: &str, previous: Option<&TurnResult>) -> TurnResult {
    let (brief, state) = previous.map_or_else(
        || (Brief::default(), DialogueState::Collecting),
        |p| (p.brief.clone(), p.state),
    );
    engine.process_turn(TurnRequest::new(utterance, brief).with_state(state))
}

#[test]
fn brief_is_collected_over_several_turns() {
    let engine = engine();
    let session = engine.new_session();
    assert!(session.session_id.starts_with("sess_"));

    let first = say(&engine, "글로우세럼X", None);
    assert_eq!(first.brief.product.name.as_deref(), Some("글로우세럼X"));
    assert_eq!(first.brief.product.category.as_deref(), Some("스킨케어"));
    assert_eq!(first.state, DialogueState::Collecting);

    let second = say(
        &engine,
        "특징은 저자극, 빠른흡수, 비건포뮬라, 가격은 39000원",
        Some(&first),
    );
    assert_eq!(second.brief.product.features.len(), 3);
    assert_eq!(second.brief.product.price_band, Some(PriceBand::Mid));
    assert!(second.gate.completeness > first.gate.completeness);

    let third = say(
        &engine,
        "타겟은 20대 직장인, 이유는 민감 피부 진정 필요, 채널은 인스타와 네이버, 목표는 문의",
        Some(&second),
    );
    assert_eq!(third.state, DialogueState::Ready);
    assert!(third.gate.ready);
    assert!((third.gate.completeness - 1.0).abs() < f64::EPSILON);
    assert_eq!(third.brief.goal.weekly_goal, Some(WeeklyGoal::Inquiry));
}

#[test]
fn ready_brief_finalizes_for_generation() {
    let engine = engine();
    let result = say(
        &engine,
        "제품명은 글로우세럼X, 카테고리는 스킨케어, 특징은 저자극, 빠른흡수, 비건포뮬라, \
         가격은 39000원, 타겟은 20대 직장인, 이유는 민감 피부 진정 필요, \
         채널은 인스타와 네이버, 목표는 문의",
        None,
    );
    assert_eq!(result.state, DialogueState::Ready);

    let launch = LaunchBrief::finalize(&result.brief, &Config::default()).unwrap();
    assert_eq!(launch.product_name, "글로우세럼X");
    assert_eq!(launch.core_kpi, "주간 문의 증가");
    assert_eq!(launch.channel_focus.len(), 2);
    assert_eq!(launch.video_seconds, 8);
}

#[test]
fn unfinished_brief_cannot_be_finalized() {
    let result = say(&engine(), "글로우세럼X", None);
    let err = LaunchBrief::finalize(&result.brief, &Config::default()).unwrap_err();
    assert!(matches!(err, PipelineError::BriefNotReady { ref missing } if !missing.is_empty()));
}

#[test]
fn requested_length_is_normalized_and_reported() {
    let result = say(&engine(), "영상은 6초로 해주세요", None);
    assert_eq!(result.brief.goal.video_duration, Some(DurationClass::Short));
    assert!(result.message.contains("6초"));
    assert!(result.message.contains("4초"));
}

#[test]
fn discounted_premium_price_is_questioned() {
    let mut brief = Brief::default();
    brief.product.name = Some("글로우세럼X".into());
    brief.product.category = Some("스킨케어".into());
    brief.product.features = vec!["저자극".into(), "빠른흡수".into(), "비건".into()];

    let result = engine().process_turn(TurnRequest::new("초특가 할인인데 150000원이에요", brief));

    assert!(result.brief.product.price_band.is_none());
    assert!(result.message.contains("150,000원"));
    assert_eq!(result.state, DialogueState::Collecting);
}
