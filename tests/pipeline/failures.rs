use std::sync::Arc;

use launch_studio::config::Config;
use launch_studio::error::PipelineError;
use launch_studio::pipeline::{PhaseExecutor, TaskKind};

use super::support::{RecordingSink, ScriptedBackend, launch_brief};

#[tokio::test]
async fn failing_phase_one_task_aborts_the_run() {
    let backend = Arc::new(ScriptedBackend::failing(TaskKind::Research));
    let executor = PhaseExecutor::new(backend.clone(), &Config::default());
    let sink = RecordingSink::default();

    let err = executor
        .run(&launch_brief(), false, Some(&sink))
        .await
        .unwrap_err();

    match &err {
        PipelineError::TaskFailed { task, reason } => {
            assert_eq!(task, "research");
            assert!(reason.contains("backend unavailable"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!err.is_timeout());
    assert!(backend.request_for(TaskKind::LaunchPlan).is_none());
    assert_eq!(sink.progress(), vec![15]);
}

#[tokio::test]
async fn failing_asset_task_aborts_after_synthesis() {
    let backend = Arc::new(ScriptedBackend::failing(TaskKind::Poster));
    let executor = PhaseExecutor::new(backend, &Config::default());

    let err = executor.run(&launch_brief(), false, None).await.unwrap_err();

    assert!(matches!(err, PipelineError::TaskFailed { ref task, .. } if task == "poster"));
}

#[tokio::test]
async fn stalled_phase_times_out_with_a_distinct_error() {
    let mut config = Config::default();
    config.pipeline.phase_timeout_secs = 1;
    let backend = Arc::new(ScriptedBackend::stalling(TaskKind::Budget));
    let executor = PhaseExecutor::new(backend, &config);

    let err = executor.run(&launch_brief(), false, None).await.unwrap_err();

    assert!(err.is_timeout());
    match err {
        PipelineError::PhaseTimeout {
            phase,
            timeout_secs,
        } => {
            assert_eq!(phase, "phase2_synthesis");
            assert_eq!(timeout_secs, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}
