//! Background generation jobs.
//!
//! A job owns one pipeline run (or one asset regeneration) on a detached
//! tokio task and exposes a pollable status record. Status moves
//! `queued → running → completed | failed`; progress only ever increases.

use crate::error::JobError;
use crate::pipeline::progress::ProgressSink;
use crate::pipeline::{GenerationPackage, LaunchBrief, PhaseExecutor};
use crate::utils::text::truncate_with_ellipsis;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use strum::Display;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

const NOTE_QUEUED: &str = "작업이 대기열에 등록되었습니다.";
const NOTE_RUN_STARTED: &str = "기획 패키지 생성을 시작했습니다.";
const NOTE_ASSETS_STARTED: &str = "에셋 재생성을 시작했습니다.";
const NOTE_COMPLETED: &str = "작업이 완료되었습니다.";
const NOTE_FAILED: &str = "작업이 실패했습니다.";
const NOTE_CANCELLED: &str = "작업이 취소되었습니다.";

const START_PROGRESS: u8 = 10;
const DONE_PROGRESS: u8 = 100;
const DEFAULT_LIST_LIMIT: usize = 20;
const MAX_LIST_LIMIT: usize = 100;
const MAX_ERROR_CHARS: usize = 500;
const DEFAULT_RETAINED_JOBS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    fn can_move_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Running | Self::Failed)
                | (Self::Running, Self::Completed | Self::Failed)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobKind {
    /// Full three-phase pipeline run.
    Run,
    /// Media-only regeneration of a stored package.
    Assets,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSnapshot {
    pub job_id: String,
    pub kind: JobKind,
    pub status: JobStatus,
    pub progress: u8,
    pub note: String,
    pub session_id: Option<String>,
    /// Package id; known up front for asset jobs, set on completion for runs.
    pub run_id: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing filter. `limit` is clamped to `1..=100`.
#[derive(Debug, Clone)]
pub struct JobFilter {
    pub run_id: Option<String>,
    pub session_id: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for JobFilter {
    fn default() -> Self {
        Self {
            run_id: None,
            session_id: None,
            limit: DEFAULT_LIST_LIMIT,
            offset: 0,
        }
    }
}

struct JobEntry {
    seq: u64,
    snapshot: JobSnapshot,
    updates: watch::Sender<JobSnapshot>,
    handle: Option<JoinHandle<()>>,
}

/// Instance-based job registry. No global statics.
pub struct JobRegistry {
    executor: Arc<PhaseExecutor>,
    jobs: Mutex<HashMap<String, JobEntry>>,
    packages: Mutex<HashMap<String, GenerationPackage>>,
    next_seq: AtomicU64,
    /// Finished jobs kept around for polling.
    retain_finished: usize,
}

impl JobRegistry {
    pub fn new(executor: Arc<PhaseExecutor>) -> Self {
        Self {
            executor,
            jobs: Mutex::new(HashMap::new()),
            packages: Mutex::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
            retain_finished: DEFAULT_RETAINED_JOBS,
        }
    }

    /// Keep at most `keep` finished jobs; older ones are pruned as new jobs
    /// finish.
    pub fn with_retention(mut self, keep: usize) -> Self {
        self.retain_finished = keep;
        self
    }

    /// Queue a full pipeline run and return its initial snapshot.
    pub fn submit_run(
        self: &Arc<Self>,
        session_id: Option<String>,
        brief: LaunchBrief,
        include_media: bool,
    ) -> JobSnapshot {
        let snapshot = self.enqueue(JobKind::Run, session_id, None);
        let job_id = snapshot.job_id.clone();

        let registry = Arc::clone(self);
        let handle = tokio::spawn(async move {
            if !registry.start(&job_id, NOTE_RUN_STARTED) {
                return;
            }
            let sink = JobProgress {
                registry: Arc::clone(&registry),
                job_id: job_id.clone(),
            };
            match registry
                .executor
                .run(&brief, include_media, Some(&sink as &dyn ProgressSink))
                .await
            {
                Ok(package) => {
                    let run_id = package.request_id.clone();
                    registry.store_package(package);
                    registry.finish(&job_id, Ok(Some(run_id)));
                }
                Err(e) => registry.finish(&job_id, Err(e.to_string())),
            }
        });
        self.attach(&snapshot.job_id, handle);
        snapshot
    }

    /// Queue a media-only regeneration for a stored package.
    pub fn submit_assets(self: &Arc<Self>, run_id: &str) -> Result<JobSnapshot, JobError> {
        if self.package(run_id).is_none() {
            return Err(JobError::NotFound(run_id.to_string()));
        }
        let snapshot = self.enqueue(JobKind::Assets, None, Some(run_id.to_string()));
        let job_id = snapshot.job_id.clone();
        let run_id = run_id.to_string();

        let registry = Arc::clone(self);
        let handle = tokio::spawn(async move {
            if !registry.start(&job_id, NOTE_ASSETS_STARTED) {
                return;
            }
            let Some(package) = registry.package(&run_id) else {
                registry.finish(&job_id, Err(format!("package {run_id} disappeared")));
                return;
            };
            let assets = registry.executor.regenerate_assets(&package).await;
            {
                let mut packages = registry
                    .packages
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner);
                if let Some(stored) = packages.get_mut(&run_id) {
                    stored.marketing_assets = assets;
                }
            }
            registry.finish(&job_id, Ok(None));
        });
        self.attach(&snapshot.job_id, handle);
        Ok(snapshot)
    }

    pub fn get(&self, job_id: &str) -> Option<JobSnapshot> {
        let jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        jobs.get(job_id).map(|entry| entry.snapshot.clone())
    }

    /// Newest first.
    pub fn list(&self, filter: &JobFilter) -> Vec<JobSnapshot> {
        let jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut matching = jobs
            .values()
            .filter(|entry| {
                filter
                    .run_id
                    .as_ref()
                    .is_none_or(|id| entry.snapshot.run_id.as_ref() == Some(id))
                    && filter
                        .session_id
                        .as_ref()
                        .is_none_or(|id| entry.snapshot.session_id.as_ref() == Some(id))
            })
            .collect::<Vec<_>>();
        matching.sort_by(|a, b| b.seq.cmp(&a.seq));
        matching
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit.clamp(1, MAX_LIST_LIMIT))
            .map(|entry| entry.snapshot.clone())
            .collect()
    }

    /// Receiver that sees every snapshot change of `job_id`.
    pub fn subscribe(&self, job_id: &str) -> Result<watch::Receiver<JobSnapshot>, JobError> {
        let jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        jobs.get(job_id)
            .map(|entry| entry.updates.subscribe())
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))
    }

    /// Abort a queued or running job and mark it failed.
    pub fn cancel(&self, job_id: &str) -> Result<JobSnapshot, JobError> {
        let snapshot = {
            let mut jobs = self
                .jobs
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let Some(entry) = jobs.get_mut(job_id) else {
                return Err(JobError::NotFound(job_id.to_string()));
            };
            check_transition(&entry.snapshot, JobStatus::Failed)?;
            if let Some(handle) = entry.handle.take() {
                handle.abort();
            }
            entry.snapshot.status = JobStatus::Failed;
            entry.snapshot.note = NOTE_CANCELLED.to_string();
            entry.snapshot.error = Some("cancelled".to_string());
            entry.snapshot.updated_at = Utc::now();
            entry.updates.send_replace(entry.snapshot.clone());
            entry.snapshot.clone()
        };
        info!(job_id, "job cancelled");
        self.prune(self.retain_finished);
        Ok(snapshot)
    }

    /// Drop the oldest finished jobs beyond the newest `keep`, together with
    /// packages that only those runs produced. Returns the number of jobs
    /// removed.
    pub fn prune(&self, keep: usize) -> usize {
        let (removed, orphaned) = {
            let mut jobs = self
                .jobs
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let mut finished: Vec<(u64, String)> = jobs
                .values()
                .filter(|entry| entry.snapshot.status.is_terminal())
                .map(|entry| (entry.seq, entry.snapshot.job_id.clone()))
                .collect();
            if finished.len() <= keep {
                return 0;
            }
            finished.sort_unstable_by(|a, b| b.0.cmp(&a.0));
            let removed: Vec<JobSnapshot> = finished
                .into_iter()
                .skip(keep)
                .filter_map(|(_, job_id)| jobs.remove(&job_id))
                .map(|entry| entry.snapshot)
                .collect();
            let referenced: HashSet<&String> = jobs
                .values()
                .filter_map(|entry| entry.snapshot.run_id.as_ref())
                .collect();
            let orphaned: Vec<String> = removed
                .iter()
                .filter(|snapshot| snapshot.kind == JobKind::Run)
                .filter_map(|snapshot| snapshot.run_id.clone())
                .filter(|run_id| !referenced.contains(run_id))
                .collect();
            (removed.len(), orphaned)
        };

        if !orphaned.is_empty() {
            let mut packages = self
                .packages
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            for run_id in &orphaned {
                packages.remove(run_id);
            }
        }
        debug!(removed, packages = orphaned.len(), "pruned finished jobs");
        removed
    }

    /// Stored package for `run_id`.
    pub fn package(&self, run_id: &str) -> Option<GenerationPackage> {
        let packages = self
            .packages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        packages.get(run_id).cloned()
    }

    /// Forget a stored package.
    pub fn remove_package(&self, run_id: &str) -> Option<GenerationPackage> {
        let mut packages = self
            .packages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        packages.remove(run_id)
    }

    /// Keep a package under its request id so assets can be regenerated.
    pub fn store_package(&self, package: GenerationPackage) -> String {
        let run_id = package.request_id.clone();
        let mut packages = self
            .packages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        packages.insert(run_id.clone(), package);
        run_id
    }

    /// Raise progress of a running job. Lower values are ignored.
    pub fn record_progress(&self, job_id: &str, progress: u8, note: &str) -> Result<(), JobError> {
        self.update(job_id, |snapshot| {
            if snapshot.status != JobStatus::Running {
                return false;
            }
            let progress = progress.min(DONE_PROGRESS);
            if progress < snapshot.progress {
                return false;
            }
            snapshot.progress = progress;
            snapshot.note = note.to_string();
            true
        })
    }

    fn enqueue(
        &self,
        kind: JobKind,
        session_id: Option<String>,
        run_id: Option<String>,
    ) -> JobSnapshot {
        let now = Utc::now();
        let snapshot = JobSnapshot {
            job_id: format!("job_{}", &Uuid::new_v4().simple().to_string()[..16]),
            kind,
            status: JobStatus::Queued,
            progress: 0,
            note: NOTE_QUEUED.to_string(),
            session_id,
            run_id,
            error: None,
            created_at: now,
            updated_at: now,
        };
        let (updates, _) = watch::channel(snapshot.clone());
        let mut jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        jobs.insert(
            snapshot.job_id.clone(),
            JobEntry {
                seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                snapshot: snapshot.clone(),
                updates,
                handle: None,
            },
        );
        info!(job_id = %snapshot.job_id, kind = %kind, "job queued");
        snapshot
    }

    fn attach(&self, job_id: &str, handle: JoinHandle<()>) {
        let mut jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match jobs.get_mut(job_id) {
            Some(entry) if !entry.snapshot.status.is_terminal() => entry.handle = Some(handle),
            _ => {}
        }
    }

    /// Queued → running. False when the job was cancelled before starting.
    fn start(&self, job_id: &str, note: &str) -> bool {
        match self.transition(job_id, JobStatus::Running, |snapshot| {
            snapshot.progress = START_PROGRESS;
            snapshot.note = note.to_string();
        }) {
            Ok(()) => true,
            Err(e) => {
                debug!(job_id, "job not started: {e}");
                false
            }
        }
    }

    fn finish(&self, job_id: &str, outcome: std::result::Result<Option<String>, String>) {
        let result = match outcome {
            Ok(run_id) => self.transition(job_id, JobStatus::Completed, |snapshot| {
                snapshot.progress = DONE_PROGRESS;
                snapshot.note = NOTE_COMPLETED.to_string();
                if run_id.is_some() {
                    snapshot.run_id = run_id;
                }
            }),
            Err(reason) => {
                warn!(job_id, "job failed: {reason}");
                self.transition(job_id, JobStatus::Failed, |snapshot| {
                    snapshot.note = NOTE_FAILED.to_string();
                    snapshot.error = Some(truncate_with_ellipsis(&reason, MAX_ERROR_CHARS));
                })
            }
        };
        match result {
            Ok(()) => {
                self.prune(self.retain_finished);
            }
            Err(e) => debug!(job_id, "job outcome dropped: {e}"),
        }
    }

    fn transition(
        &self,
        job_id: &str,
        to: JobStatus,
        apply: impl FnOnce(&mut JobSnapshot),
    ) -> Result<(), JobError> {
        let mut jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let Some(entry) = jobs.get_mut(job_id) else {
            return Err(JobError::NotFound(job_id.to_string()));
        };
        check_transition(&entry.snapshot, to)?;
        let from = entry.snapshot.status;
        entry.snapshot.status = to;
        apply(&mut entry.snapshot);
        entry.snapshot.updated_at = Utc::now();
        if to.is_terminal() {
            entry.handle = None;
        }
        entry.updates.send_replace(entry.snapshot.clone());
        info!(job_id, from = %from, to = %to, "job transition");
        Ok(())
    }

    fn update(
        &self,
        job_id: &str,
        apply: impl FnOnce(&mut JobSnapshot) -> bool,
    ) -> Result<(), JobError> {
        let mut jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let Some(entry) = jobs.get_mut(job_id) else {
            return Err(JobError::NotFound(job_id.to_string()));
        };
        if apply(&mut entry.snapshot) {
            entry.snapshot.updated_at = Utc::now();
            entry.updates.send_replace(entry.snapshot.clone());
            debug!(job_id, progress = entry.snapshot.progress, "job progress");
        }
        Ok(())
    }
}

fn check_transition(snapshot: &JobSnapshot, to: JobStatus) -> Result<(), JobError> {
    if snapshot.status.can_move_to(to) {
        Ok(())
    } else {
        Err(JobError::InvalidTransition {
            job_id: snapshot.job_id.clone(),
            from: snapshot.status.to_string(),
            to: to.to_string(),
        })
    }
}

/// Forwards pipeline progress into the owning job record.
struct JobProgress {
    registry: Arc<JobRegistry>,
    job_id: String,
}

impl ProgressSink for JobProgress {
    fn report<'a>(
        &'a self,
        progress: u8,
        note: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.registry
                .record_progress(&self.job_id, progress, note)
                .map_err(Into::into)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dialogue::PriceBand;
    use crate::pipeline::{GenerationBackend, TaskRequest};
    use chrono::NaiveDate;
    use serde_json::{Value, json};
    use std::time::Duration;

    struct Echo {
        stall: bool,
    }

    impl GenerationBackend for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn generate<'a>(
            &'a self,
            request: &'a TaskRequest,
        ) -> Pin<Box<dyn Future<Output = Result<Value>> + Send + 'a>> {
            Box::pin(async move {
                if self.stall {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                }
                Ok(json!({
                    "summary": format!("{} 요약", request.task),
                    "key_points": [],
                    "risks": [format!("{} 리스크", request.task)],
                }))
            })
        }
    }

    fn brief() -> LaunchBrief {
        LaunchBrief {
            product_name: "글로우세럼X".into(),
            product_category: "스킨케어".into(),
            key_features: vec!["저자극".into()],
            target_audience: "20대 직장인".into(),
            purchase_reason: None,
            price_band: PriceBand::Mid,
            total_budget_krw: 1_000_000,
            launch_date: NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
            core_kpi: "주간 문의 증가".into(),
            region: "KR".into(),
            channel_focus: Vec::new(),
            video_seconds: 8,
            product_image_url: None,
            product_image_context: None,
        }
    }

    fn registry(stall: bool) -> Arc<JobRegistry> {
        let executor = PhaseExecutor::new(Arc::new(Echo { stall }), &Config::default());
        Arc::new(JobRegistry::new(Arc::new(executor)))
    }

    async fn wait_terminal(registry: &JobRegistry, job_id: &str) -> JobSnapshot {
        let mut updates = registry.subscribe(job_id).unwrap();
        updates
            .wait_for(|snapshot| snapshot.status.is_terminal())
            .await
            .unwrap()
            .clone()
    }

    #[tokio::test]
    async fn run_job_completes_and_stores_package() {
        let registry = registry(false);
        let queued = registry.submit_run(Some("sess_1".into()), brief(), false);
        assert!(queued.job_id.starts_with("job_"));
        assert_eq!(queued.job_id.len(), 20);
        assert_eq!(queued.status, JobStatus::Queued);

        let done = wait_terminal(&registry, &queued.job_id).await;
        assert_eq!(done.status, JobStatus::Completed);
        assert_eq!(done.progress, 100);
        let run_id = done.run_id.unwrap();
        let package = registry.package(&run_id).unwrap();
        assert_eq!(package.timeline.len(), 9);
        assert_eq!(package.risks.len(), 9);
    }

    #[tokio::test]
    async fn progress_never_decreases() {
        let registry = registry(false);
        let queued = registry.submit_run(None, brief(), false);
        let mut updates = registry.subscribe(&queued.job_id).unwrap();
        let mut seen = vec![updates.borrow().progress];
        loop {
            if updates.changed().await.is_err() {
                break;
            }
            let snapshot = updates.borrow_and_update().clone();
            seen.push(snapshot.progress);
            if snapshot.status.is_terminal() {
                break;
            }
        }
        assert!(seen.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(seen.last(), Some(&100));
    }

    #[tokio::test]
    async fn cancel_marks_running_job_failed() {
        let registry = registry(true);
        let queued = registry.submit_run(None, brief(), false);
        let cancelled = registry.cancel(&queued.job_id).unwrap();
        assert_eq!(cancelled.status, JobStatus::Failed);
        assert_eq!(cancelled.error.as_deref(), Some("cancelled"));

        let err = registry.cancel(&queued.job_id).unwrap_err();
        assert!(matches!(err, JobError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn progress_on_finished_job_is_ignored() {
        let registry = registry(true);
        let queued = registry.submit_run(None, brief(), false);
        registry.cancel(&queued.job_id).unwrap();
        registry.record_progress(&queued.job_id, 50, "late").unwrap();
        assert_eq!(registry.get(&queued.job_id).unwrap().progress, 0);
    }

    #[tokio::test]
    async fn assets_job_needs_a_stored_package() {
        let registry = registry(false);
        let err = registry.submit_assets("missing").unwrap_err();
        assert!(matches!(err, JobError::NotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn assets_job_regenerates_stored_package() {
        let registry = registry(false);
        let queued = registry.submit_run(None, brief(), false);
        let run_id = wait_terminal(&registry, &queued.job_id)
            .await
            .run_id
            .unwrap();

        let assets = registry.submit_assets(&run_id).unwrap();
        assert_eq!(assets.kind, JobKind::Assets);
        assert_eq!(assets.run_id.as_deref(), Some(run_id.as_str()));
        let done = wait_terminal(&registry, &assets.job_id).await;
        assert_eq!(done.status, JobStatus::Completed);
        assert!(registry.package(&run_id).is_some());
    }

    #[tokio::test]
    async fn list_filters_and_orders_newest_first() {
        let registry = registry(true);
        let first = registry.submit_run(Some("sess_a".into()), brief(), false);
        let second = registry.submit_run(Some("sess_b".into()), brief(), false);
        let third = registry.submit_run(Some("sess_a".into()), brief(), false);

        let all = registry.list(&JobFilter::default());
        let ids: Vec<_> = all.iter().map(|s| s.job_id.as_str()).collect();
        assert_eq!(ids, vec![
            third.job_id.as_str(),
            second.job_id.as_str(),
            first.job_id.as_str()
        ]);

        let session_a = registry.list(&JobFilter {
            session_id: Some("sess_a".into()),
            ..JobFilter::default()
        });
        assert_eq!(session_a.len(), 2);

        let paged = registry.list(&JobFilter {
            limit: 0,
            offset: 1,
            ..JobFilter::default()
        });
        assert_eq!(paged.len(), 1);
        assert_eq!(paged[0].job_id, second.job_id);

        for job in [first, second, third] {
            registry.cancel(&job.job_id).unwrap();
        }
    }

    #[tokio::test]
    async fn retention_drops_oldest_finished_jobs() {
        let executor = PhaseExecutor::new(Arc::new(Echo { stall: true }), &Config::default());
        let registry = Arc::new(JobRegistry::new(Arc::new(executor)).with_retention(2));
        let jobs: Vec<JobSnapshot> = (0..3)
            .map(|_| registry.submit_run(None, brief(), false))
            .collect();
        for job in &jobs {
            registry.cancel(&job.job_id).unwrap();
        }

        assert!(registry.get(&jobs[0].job_id).is_none());
        assert!(registry.get(&jobs[1].job_id).is_some());
        assert!(registry.get(&jobs[2].job_id).is_some());
        assert_eq!(registry.prune(0), 2);
        assert!(registry.list(&JobFilter::default()).is_empty());
    }

    #[tokio::test]
    async fn prune_leaves_running_jobs_alone() {
        let registry = registry(true);
        let running = registry.submit_run(None, brief(), false);
        assert_eq!(registry.prune(0), 0);
        assert!(registry.get(&running.job_id).is_some());
        registry.cancel(&running.job_id).unwrap();
    }

    #[tokio::test]
    async fn prune_drops_packages_of_removed_runs() {
        let registry = registry(false);
        let queued = registry.submit_run(None, brief(), false);
        let run_id = wait_terminal(&registry, &queued.job_id)
            .await
            .run_id
            .unwrap();

        let mut kept = registry.package(&run_id).unwrap();
        kept.request_id = "req_manual".into();
        registry.store_package(kept);

        assert_eq!(registry.prune(0), 1);
        assert!(registry.package(&run_id).is_none());
        assert!(registry.package("req_manual").is_some());
        assert!(registry.remove_package("req_manual").is_some());
        assert!(registry.package("req_manual").is_none());
    }

    #[test]
    fn transitions_follow_the_state_machine() {
        assert!(JobStatus::Queued.can_move_to(JobStatus::Running));
        assert!(JobStatus::Queued.can_move_to(JobStatus::Failed));
        assert!(JobStatus::Running.can_move_to(JobStatus::Completed));
        assert!(!JobStatus::Queued.can_move_to(JobStatus::Completed));
        assert!(!JobStatus::Completed.can_move_to(JobStatus::Running));
        assert!(!JobStatus::Failed.can_move_to(JobStatus::Completed));
    }
}
