use std::sync::Arc;

use launch_studio::config::Config;
use launch_studio::pipeline::{PhaseExecutor, Stage, TaskKind};
use launch_studio::utils::text::char_len;

use super::support::{FixedMedia, RecordingSink, ScriptedBackend, launch_brief};

#[tokio::test]
async fn run_without_media_builds_a_complete_package() {
    let backend = Arc::new(ScriptedBackend::default());
    let executor = PhaseExecutor::new(backend.clone(), &Config::default());

    let package = executor.run(&launch_brief(), false, None).await.unwrap();

    assert_eq!(package.brief.product_name, "글로우세럼X");
    assert_eq!(package.research.payload.summary, "민감 피부 수요 증가");
    assert_eq!(package.launch_plan.milestones.len(), 1);
    assert_eq!(package.budget.budget_split_krw.get("instagram"), Some(&600_000));
    assert_eq!(package.budget.budget_split_krw.get("naver"), Some(&400_000));
    assert!(package.media_note.is_none());
    assert!(package.marketing_assets.video_url.is_none());
    assert!(package.marketing_assets.poster_image_url.is_none());

    let stages: Vec<(TaskKind, Stage)> = package
        .timeline
        .iter()
        .map(|entry| (entry.task, entry.stage))
        .collect();
    assert_eq!(stages.len(), 9);
    assert_eq!(stages[0], (TaskKind::Research, Stage::Phase1Parallel));
    assert_eq!(stages[3], (TaskKind::LaunchPlan, Stage::Phase2Synthesis));
    assert_eq!(stages[8], (TaskKind::ProductCopy, Stage::Phase3Assets));

    assert_eq!(
        package.risks,
        vec!["경쟁 심화", "재고 부족", "일정 지연", "광고비 상승", "촬영 지연", "시안 지연", "표현 규제"]
    );
}

#[tokio::test]
async fn creative_assets_are_fitted_to_the_duration() {
    let backend = Arc::new(ScriptedBackend::default());
    let executor = PhaseExecutor::new(backend, &Config::default());

    let package = executor.run(&launch_brief(), false, None).await.unwrap();
    let assets = &package.marketing_assets;

    assert!(!assets.video_script.is_empty());
    assert!(char_len(&assets.video_script) <= 56);
    assert_eq!(assets.video_scene_plan, vec!["세럼 클로즈업", "피부 진정 장면", "로고"]);
    assert_eq!(assets.poster_headline, "예민한 날에도 편안하게");
    assert_eq!(assets.poster_brief, "저자극 진정 세럼");
    assert_eq!(assets.product_copy, "민감 피부를 위한 저자극 세럼입니다.");
    assert_eq!(assets.product_copy_bullets, vec!["저자극", "빠른흡수"]);
}

#[tokio::test]
async fn later_phases_see_earlier_summaries() {
    let backend = Arc::new(ScriptedBackend::default());
    let executor = PhaseExecutor::new(backend.clone(), &Config::default());
    executor.run(&launch_brief(), false, None).await.unwrap();

    let research = backend.request_for(TaskKind::Research).unwrap();
    assert!(research.prompt.contains("[공유 컨텍스트]\n없음"));

    let campaign = backend.request_for(TaskKind::Campaign).unwrap();
    assert!(campaign.prompt.contains("[Research] 민감 피부 수요 증가"));
    assert!(campaign.prompt.contains("- 저자극 포지셔닝 포인트"));
    assert!(campaign.prompt.contains("[Dev] 데모 준비 가능"));

    let poster = backend.request_for(TaskKind::Poster).unwrap();
    assert!(poster.prompt.contains("[Marketer] 진정 메시지 캠페인"));
    assert!(poster.prompt.contains("[Planner] 2주 런칭 계획"));

    let copy = backend.request_for(TaskKind::ProductCopy).unwrap();
    assert!(copy.prompt.contains("[MD] 저자극 포지셔닝"));
}

#[tokio::test]
async fn missing_poster_does_not_fail_the_run() {
    let media = Arc::new(FixedMedia::new(None, Some("https://cdn.example/video.mp4")));
    let executor = PhaseExecutor::new(Arc::new(ScriptedBackend::default()), &Config::default())
        .with_media(media.clone(), &Config::default());

    let package = executor.run(&launch_brief(), true, None).await.unwrap();
    let assets = &package.marketing_assets;

    assert_eq!(assets.video_url.as_deref(), Some("https://cdn.example/video.mp4"));
    assert!(assets.poster_image_url.is_none());
    assert!(
        package
            .media_note
            .as_deref()
            .unwrap()
            .contains("포스터 이미지는 만들지 못했어요")
    );

    let images = media.images.lock().unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].headline, "예민한 날에도 편안하게");
    let videos = media.videos.lock().unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!((videos[0].width, videos[0].height), (1280, 720));
    assert!(videos[0].prompt.contains("exactly 8 seconds"));
}

#[tokio::test]
async fn media_without_backend_is_skipped_with_a_note() {
    let executor = PhaseExecutor::new(Arc::new(ScriptedBackend::default()), &Config::default());
    let package = executor.run(&launch_brief(), true, None).await.unwrap();
    assert!(package.media_note.is_some());
    assert!(package.marketing_assets.video_url.is_none());
}

#[tokio::test]
async fn progress_points_increase_monotonically() {
    let media = Arc::new(FixedMedia::new(Some("poster.png"), Some("video.mp4")));
    let executor = PhaseExecutor::new(Arc::new(ScriptedBackend::default()), &Config::default())
        .with_media(media, &Config::default());
    let sink = RecordingSink::default();

    executor.run(&launch_brief(), true, Some(&sink)).await.unwrap();

    assert_eq!(sink.progress(), vec![15, 35, 45, 65, 75, 88, 93, 96, 99]);
}

#[tokio::test]
async fn progress_skips_media_points_without_media() {
    let executor = PhaseExecutor::new(Arc::new(ScriptedBackend::default()), &Config::default());
    let sink = RecordingSink::default();

    executor.run(&launch_brief(), false, Some(&sink)).await.unwrap();

    assert_eq!(sink.progress(), vec![15, 35, 45, 65, 75, 88, 99]);
}
