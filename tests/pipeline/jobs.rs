use std::sync::Arc;

use launch_studio::config::Config;
use launch_studio::jobs::{JobFilter, JobRegistry, JobSnapshot, JobStatus};
use launch_studio::pipeline::{PhaseExecutor, TaskKind};

use super::support::{FixedMedia, ScriptedBackend, launch_brief};

fn registry(backend: ScriptedBackend, media: Option<Arc<FixedMedia>>) -> Arc<JobRegistry> {
    let config = Config::default();
    let mut executor = PhaseExecutor::new(Arc::new(backend), &config);
    if let Some(media) = media {
        executor = executor.with_media(media, &config);
    }
    Arc::new(JobRegistry::new(Arc::new(executor)))
}

async fn finished(registry: &JobRegistry, job_id: &str) -> JobSnapshot {
    let mut updates = registry.subscribe(job_id).unwrap();
    updates
        .wait_for(|snapshot| snapshot.status.is_terminal())
        .await
        .unwrap()
        .clone()
}

#[tokio::test]
async fn poster_failure_still_completes_the_job() {
    let media = Arc::new(FixedMedia::new(None, Some("video.mp4")));
    let registry = registry(ScriptedBackend::default(), Some(media));

    let queued = registry.submit_run(Some("sess_demo".into()), launch_brief(), true);
    let done = finished(&registry, &queued.job_id).await;

    assert_eq!(done.status, JobStatus::Completed);
    assert_eq!(done.progress, 100);
    let package = registry.package(done.run_id.as_deref().unwrap()).unwrap();
    assert_eq!(package.marketing_assets.video_url.as_deref(), Some("video.mp4"));
    assert!(package.marketing_assets.poster_image_url.is_none());
    assert!(
        package
            .media_note
            .unwrap()
            .contains("포스터 이미지는 만들지 못했어요")
    );
}

#[tokio::test]
async fn task_failure_fails_the_job_without_a_package() {
    let registry = registry(ScriptedBackend::failing(TaskKind::Feasibility), None);

    let queued = registry.submit_run(Some("sess_demo".into()), launch_brief(), false);
    let done = finished(&registry, &queued.job_id).await;

    assert_eq!(done.status, JobStatus::Failed);
    assert!(done.run_id.is_none());
    assert!(done.error.unwrap().contains("feasibility"));
}

#[tokio::test]
async fn jobs_are_listed_per_session() {
    let registry = registry(ScriptedBackend::default(), None);
    let first = registry.submit_run(Some("sess_a".into()), launch_brief(), false);
    let second = registry.submit_run(Some("sess_b".into()), launch_brief(), false);
    finished(&registry, &first.job_id).await;
    finished(&registry, &second.job_id).await;

    let listed = registry.list(&JobFilter {
        session_id: Some("sess_b".into()),
        ..JobFilter::default()
    });
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].job_id, second.job_id);
    assert_eq!(listed[0].status, JobStatus::Completed);
}
