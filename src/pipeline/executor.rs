use super::brief::LaunchBrief;
use super::fitting::{fit_narration, fit_scenes};
use super::media::{self, MediaBackend, MediaStage};
use super::payload::{
    BudgetOutput, CampaignOutput, FeasibilityOutput, GenerationPackage, LaunchPlanOutput,
    MarketingAssets, PositioningOutput, PosterOutput, ProductCopyOutput, ResearchOutput,
    StageOutput, TaskPayload, TimelineEntry, VideoScriptOutput, decode,
};
use super::progress::{ProgressSink, emit};
use super::risks::merge_risks;
use super::tasks::{GenerationBackend, Stage, TaskRequest};
use crate::config::{Config, PipelineConfig};
use crate::error::PipelineError;
use chrono::Utc;
use futures_util::future::try_join3;
use std::fmt::Write as _;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

const NOTE_PHASE1_STARTED: &str = "리서치/MD/기술 에이전트를 호출했습니다.";
const NOTE_PHASE1_DONE: &str = "리서치 분석이 완료되어 전략 수립 단계로 이동합니다.";
const NOTE_PHASE2_STARTED: &str = "플래너/마케터/비즈 에이전트가 전략을 종합하고 있습니다.";
const NOTE_PHASE2_DONE: &str = "전략 종합이 완료되었습니다. 크리에이티브 초안을 작성합니다.";
const NOTE_PHASE3_STARTED: &str = "비디오/포스터/카피 에이전트가 초안을 생성하고 있습니다.";
const NOTE_PHASE3_DONE: &str = "에이전트 초안 정리가 완료되었습니다.";
const NOTE_MEDIA_STARTED: &str =
    "포스터/영상 생성 모델을 실행하고 있습니다. 고화질 영상은 2~3분 정도 소요될 수 있습니다.";
const NOTE_MEDIA_DONE: &str = "미디어 생성 결과를 패키지에 병합하고 있습니다.";
const NOTE_PACKAGED: &str = "최종 기획 패키지를 구성했습니다.";
const NOTE_NO_MEDIA_BACKEND: &str = "미디어 생성기가 설정되지 않아 포스터와 영상 생성을 건너뛰었어요.";

/// Poster keywords taken from campaign pillars on asset regeneration.
const REGENERATION_KEYWORDS: usize = 4;

/// Three-phase generation pipeline.
///
/// Each phase runs its three tasks concurrently under one shared deadline.
/// Any task failure or a phase timeout aborts the run; nothing partial is
/// returned.
pub struct PhaseExecutor {
    backend: Arc<dyn GenerationBackend>,
    media: Option<MediaStage>,
    config: PipelineConfig,
}

impl PhaseExecutor {
    pub fn new(backend: Arc<dyn GenerationBackend>, config: &Config) -> Self {
        Self {
            backend,
            media: None,
            config: config.pipeline.clone(),
        }
    }

    /// Attach a media backend; without one the media stage is skipped.
    pub fn with_media(mut self, backend: Arc<dyn MediaBackend>, config: &Config) -> Self {
        self.media = Some(MediaStage::new(backend, config.media.clone()));
        self
    }

    #[allow(clippy::too_many_lines)]
    pub async fn run(
        &self,
        brief: &LaunchBrief,
        include_media: bool,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<GenerationPackage, PipelineError> {
        let started = Instant::now();
        let mut timeline = Vec::with_capacity(9);

        emit(progress, 15, NOTE_PHASE1_STARTED).await;
        let (research, positioning, feasibility) = self
            .phase(
                Stage::Phase1Parallel,
                self.task::<ResearchOutput>(brief, ""),
                self.task::<PositioningOutput>(brief, ""),
                self.task::<FeasibilityOutput>(brief, ""),
            )
            .await?;
        emit(progress, 35, NOTE_PHASE1_DONE).await;
        timeline.extend([
            TimelineEntry::new(&research),
            TimelineEntry::new(&positioning),
            TimelineEntry::new(&feasibility),
        ]);

        let synthesis_context = context_block(
            &[&research.payload, &positioning.payload, &feasibility.payload],
            &["Research", "MD", "Dev"],
        );
        emit(progress, 45, NOTE_PHASE2_STARTED).await;
        let (launch_plan, campaign, budget) = self
            .phase(
                Stage::Phase2Synthesis,
                self.task::<LaunchPlanOutput>(brief, &synthesis_context),
                self.task::<CampaignOutput>(brief, &synthesis_context),
                self.task::<BudgetOutput>(brief, &synthesis_context),
            )
            .await?;
        emit(progress, 65, NOTE_PHASE2_DONE).await;
        timeline.extend([
            TimelineEntry::new(&launch_plan),
            TimelineEntry::new(&campaign),
            TimelineEntry::new(&budget),
        ]);

        let marketing_context =
            context_block(&[&campaign.payload, &launch_plan.payload], &["Marketer", "Planner"]);
        let positioning_context =
            context_block(&[&positioning.payload, &campaign.payload], &["MD", "Marketer"]);
        emit(progress, 75, NOTE_PHASE3_STARTED).await;
        let (video, poster, product_copy) = self
            .phase(
                Stage::Phase3Assets,
                self.task::<VideoScriptOutput>(brief, &marketing_context),
                self.task::<PosterOutput>(brief, &marketing_context),
                self.task::<ProductCopyOutput>(brief, &positioning_context),
            )
            .await?;
        emit(progress, 88, NOTE_PHASE3_DONE).await;
        timeline.extend([
            TimelineEntry::new(&video),
            TimelineEntry::new(&poster),
            TimelineEntry::new(&product_copy),
        ]);

        let duration = brief.duration();
        let narration = if video.narration_script.trim().is_empty() {
            &video.payload.summary
        } else {
            &video.narration_script
        };
        let mut assets = MarketingAssets {
            video_script: fit_narration(narration, &video.cta_line, duration),
            poster_brief: non_empty_or(&poster.subheadline, &poster.payload.summary),
            product_copy: non_empty_or(&product_copy.body, &product_copy.payload.summary),
            video_scene_plan: fit_scenes(&video.scene_plan, duration),
            poster_headline: poster.headline.clone(),
            product_copy_bullets: product_copy.bullet_points.clone(),
            video_url: None,
            poster_image_url: None,
        };

        let media_note = if include_media {
            match &self.media {
                Some(stage) => {
                    emit(progress, 93, NOTE_MEDIA_STARTED).await;
                    let poster_brief = assets.poster_brief.clone();
                    assets.poster_image_url = stage
                        .render_poster(
                            &assets.poster_headline,
                            &poster_brief,
                            &poster.key_visual_keywords,
                            brief,
                        )
                        .await;
                    let prompt =
                        media::video_prompt(&brief.product_name, &assets.video_script, duration);
                    assets.video_url = stage.render_video(&prompt, duration, brief).await;
                    emit(progress, 96, NOTE_MEDIA_DONE).await;
                    Some(media::completion_note(&assets))
                }
                None => {
                    debug!("media requested but no media backend is attached");
                    Some(NOTE_NO_MEDIA_BACKEND.to_string())
                }
            }
        } else {
            None
        };

        let risks = merge_risks(
            [
                research.payload.risks.as_slice(),
                positioning.payload.risks.as_slice(),
                feasibility.payload.risks.as_slice(),
                launch_plan.payload.risks.as_slice(),
                campaign.payload.risks.as_slice(),
                budget.payload.risks.as_slice(),
                video.payload.risks.as_slice(),
                poster.payload.risks.as_slice(),
                product_copy.payload.risks.as_slice(),
            ],
            self.config.max_risks,
        );

        let package = GenerationPackage {
            request_id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            brief: brief.clone(),
            research,
            positioning,
            feasibility,
            launch_plan,
            campaign,
            budget,
            marketing_assets: assets,
            risks,
            timeline,
            media_note,
        };
        emit(progress, 99, NOTE_PACKAGED).await;
        info!(
            product = %brief.product_name,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "generation pipeline completed"
        );
        Ok(package)
    }

    /// Re-fit the stored script and scenes, then re-run only the media stage.
    /// Non-asset parts of `package` are not touched.
    pub async fn regenerate_assets(&self, package: &GenerationPackage) -> MarketingAssets {
        let brief = &package.brief;
        let duration = brief.duration();
        let mut assets = package.marketing_assets.clone();
        assets.video_script = fit_narration(&assets.video_script, "", duration);
        assets.video_scene_plan = fit_scenes(&assets.video_scene_plan, duration);

        let Some(stage) = &self.media else {
            debug!("asset regeneration without a media backend keeps previous media");
            return assets;
        };

        let headline = non_empty_or(&assets.poster_headline, &brief.product_name);
        let poster_brief = non_empty_or(&assets.poster_brief, &package.campaign.payload.summary);
        let keywords: Vec<String> = package
            .campaign
            .message_pillars
            .iter()
            .take(REGENERATION_KEYWORDS)
            .cloned()
            .collect();
        assets.poster_image_url = stage
            .render_poster(&headline, &poster_brief, &keywords, brief)
            .await;
        let prompt = media::video_prompt(&brief.product_name, &assets.video_script, duration);
        assets.video_url = stage.render_video(&prompt, duration, brief).await;
        info!(
            request_id = %package.request_id,
            note = %media::completion_note(&assets),
            "marketing assets regenerated"
        );
        assets
    }

    async fn task<T: StageOutput>(
        &self,
        brief: &LaunchBrief,
        context: &str,
    ) -> Result<T, PipelineError> {
        let kind = T::KIND;
        let request = TaskRequest::new(kind, brief, context);
        let started = Instant::now();
        let raw = self
            .backend
            .generate(&request)
            .await
            .map_err(|e| PipelineError::TaskFailed {
                task: kind.to_string(),
                reason: format!("{e:#}"),
            })?;
        let output = decode::<T>(raw)?;
        debug!(
            task = %kind,
            backend = self.backend.name(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "task completed"
        );
        Ok(output)
    }

    async fn phase<A, B, C>(
        &self,
        stage: Stage,
        a: impl Future<Output = Result<A, PipelineError>>,
        b: impl Future<Output = Result<B, PipelineError>>,
        c: impl Future<Output = Result<C, PipelineError>>,
    ) -> Result<(A, B, C), PipelineError> {
        let started = Instant::now();
        info!(phase = %stage, "phase started");
        let outputs = tokio::time::timeout(self.config.phase_timeout(), try_join3(a, b, c))
            .await
            .map_err(|_| PipelineError::PhaseTimeout {
                phase: stage.to_string(),
                timeout_secs: self.config.phase_timeout_secs,
            })??;
        info!(
            phase = %stage,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "phase completed"
        );
        Ok(outputs)
    }
}

/// "[Label] summary" followed by "- point" lines, per payload.
fn context_block(payloads: &[&TaskPayload], labels: &[&str]) -> String {
    let mut block = String::new();
    for (payload, label) in payloads.iter().zip(labels) {
        let _ = writeln!(block, "[{label}] {}", payload.summary);
        for point in &payload.key_points {
            let _ = writeln!(block, "- {point}");
        }
    }
    block.trim_end().to_string()
}

fn non_empty_or(primary: &str, fallback: &str) -> String {
    if primary.trim().is_empty() {
        fallback.to_string()
    } else {
        primary.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_block_lists_summaries_and_points() {
        let research = TaskPayload {
            summary: "수요 증가".into(),
            key_points: vec!["검색량 상승".into(), "리뷰 증가".into()],
            ..TaskPayload::default()
        };
        let md = TaskPayload {
            summary: "저자극 포지셔닝".into(),
            ..TaskPayload::default()
        };
        assert_eq!(
            context_block(&[&research, &md], &["Research", "MD"]),
            "[Research] 수요 증가\n- 검색량 상승\n- 리뷰 증가\n[MD] 저자극 포지셔닝"
        );
    }

    #[test]
    fn blank_primary_falls_back() {
        assert_eq!(non_empty_or("  ", "요약"), "요약");
        assert_eq!(non_empty_or("본문", "요약"), "본문");
    }
}
