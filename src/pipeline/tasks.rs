//! Generation task catalogue: what each of the nine tasks is asked to do and
//! how its prompt is rendered from the launch brief.

use super::brief::LaunchBrief;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::future::Future;
use std::pin::Pin;
use strum::{Display, EnumString};

/// Pipeline phase a task belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum Stage {
    #[serde(rename = "phase1_parallel")]
    #[strum(serialize = "phase1_parallel")]
    Phase1Parallel,
    #[serde(rename = "phase2_synthesis")]
    #[strum(serialize = "phase2_synthesis")]
    Phase2Synthesis,
    #[serde(rename = "phase3_assets")]
    #[strum(serialize = "phase3_assets")]
    Phase3Assets,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskKind {
    Research,
    Positioning,
    Feasibility,
    LaunchPlan,
    Campaign,
    Budget,
    VideoScript,
    Poster,
    ProductCopy,
}

impl TaskKind {
    pub const ALL: [Self; 9] = [
        Self::Research,
        Self::Positioning,
        Self::Feasibility,
        Self::LaunchPlan,
        Self::Campaign,
        Self::Budget,
        Self::VideoScript,
        Self::Poster,
        Self::ProductCopy,
    ];

    pub fn stage(self) -> Stage {
        match self {
            Self::Research | Self::Positioning | Self::Feasibility => Stage::Phase1Parallel,
            Self::LaunchPlan | Self::Campaign | Self::Budget => Stage::Phase2Synthesis,
            Self::VideoScript | Self::Poster | Self::ProductCopy => Stage::Phase3Assets,
        }
    }

    /// Short tag used when this task's summary feeds a later phase.
    pub fn context_label(self) -> &'static str {
        match self {
            Self::Research => "Research",
            Self::Positioning => "MD",
            Self::Feasibility => "Dev",
            Self::LaunchPlan => "Planner",
            Self::Campaign => "Marketer",
            Self::Budget => "Biz",
            Self::VideoScript => "Video",
            Self::Poster => "Poster",
            Self::ProductCopy => "Copy",
        }
    }

    /// Role instruction sent alongside the prompt.
    pub fn instruction(self) -> &'static str {
        match self {
            Self::Research => {
                "당신은 시장 조사 전문가입니다. 트렌드, 경쟁사, 수요 시그널을 분석하여 한국어로 작성하십시오. \
                 출시 시사점에 대한 근거 중심의 분석을 반드시 한국어로 제공하십시오."
            }
            Self::Positioning => {
                "당신은 머천다이징 전략가입니다. 제품 포지셔닝, USP, 상품 구성을 정의하여 한국어로 작성하십시오. \
                 출시 시 즉시 실행 가능한 권장 사항을 반드시 한국어로 제안하십시오."
            }
            Self::Feasibility => {
                "당신은 제품 엔지니어링 리드입니다. 구현 범위, 기술적 리스크, 데모 준비 상태를 한국어로 분석하십시오. \
                 짧은 일정 내의 현실적인 범위를 반드시 한국어로 우선순위화하십시오."
            }
            Self::LaunchPlan => {
                "당신은 출시 PM 플래너입니다. 마일스톤 계획, 의존성, 실행 체크리스트를 한국어로 구축하십시오. \
                 핵심 경로와 출시일 주요 결정 사항을 반드시 한국어로 명시하십시오."
            }
            Self::Campaign => {
                "당신은 GTM 마케터입니다. 출시 메시지, 채널 믹스, 캠페인 접근 방식을 한국어로 구축하십시오. \
                 인지도와 전환의 균형을 최적화하여 반드시 한국어로 전략을 수립하십시오."
            }
            Self::Budget => {
                "당신은 비즈니스 기획 리드입니다. 예산 배분, 매출 가설, KPI 목표를 한국어로 수립하십시오. \
                 측정 가능한 가정과 리스크가 조정된 전망을 반드시 한국어로 제시하십시오."
            }
            Self::VideoScript => {
                "당신은 숏폼 홍보 영상 프로듀서입니다. \
                 브리프에 포함된 영상 길이(초)에 정확히 맞춰 장면 흐름, 나레이션 가이드, CTA를 한국어로 작성하십시오. \
                 나레이션은 해당 길이 안에서 끊김 없이 자연스럽게 완독 가능한 분량으로만 작성하십시오. \
                 영상 길이별 엄수 규칙: 4초=1문장(약 28자 이내), 8초=2문장(약 56자 이내), 12초=3문장(약 84자 이내). \
                 문장을 길게 늘이지 말고, 접속사 나열을 피하고, 한 문장에 메시지 1개만 담으십시오. \
                 CTA는 매우 짧게(8~14자 내외) 작성하십시오. \
                 한 장면당 메시지는 1개만 두고, 과도한 컷 전환보다 선명한 제품 클로즈업과 안정적 카메라 무빙을 우선하십시오. \
                 반드시 한국어만 사용하십시오."
            }
            Self::Poster => {
                "당신은 비주얼 캠페인 디자이너입니다. 헤드라인, 바디 카피, 레이아웃 가이드, 비주얼 계층 구조 힌트를 포함한 포스터 기획안을 한국어로 작성하십시오. \
                 반드시 한국어만 사용하십시오."
            }
            Self::ProductCopy => {
                "당신은 전문 카피라이터입니다. 제품의 이점, 사용 상황, 입증 자료를 포함한 제품 설명을 한국어로 작성하십시오. \
                 모든 내용은 MD 전략과 일관성을 유지해야 하며, 반드시 한국어만 사용하십시오."
            }
        }
    }

    /// Task-specific lines appended to the shared output requirements.
    fn output_requirements(self) -> &'static str {
        match self {
            Self::Research => {
                "5) market_signals: 시장 변화 시그널 2~4개\n\
                 6) competitor_insights: 경쟁 동향 1~3개\n\
                 7) audience_insights: 타깃 인사이트 1~3개"
            }
            Self::Positioning => {
                "5) usp: 제품 USP 2~4개\n\
                 6) hero_product_angle: 핵심 포지셔닝 1문장\n\
                 7) assortment_notes: SKU 구성 노트 1~3개"
            }
            Self::Feasibility => {
                "5) implementation_scope: 구현 범위 3~6개\n\
                 6) technical_constraints: 기술 제약 1~3개\n\
                 7) demo_readiness_checks: 데모 체크포인트 2~5개"
            }
            Self::LaunchPlan => {
                "5) milestones: [{name,due,owner,success_criteria}] 2~5개\n\
                 6) critical_path: 핵심 경로 2~4개\n\
                 7) dependencies: 선행 의존성 2~5개"
            }
            Self::Campaign => {
                "5) message_pillars: 핵심 메시지 2~4개\n\
                 6) channel_tactics: 채널별 실행전략 map\n\
                 7) conversion_hooks: 전환 유도 장치 2~4개"
            }
            Self::Budget => {
                "5) budget_split_krw: 카테고리별 예산 map\n\
                 6) kpi_targets: KPI 목표 2~5개\n\
                 7) roi_assumptions: ROI 가정 1~3개"
            }
            Self::VideoScript => {
                "5) scene_plan: 길이별 장면 수 제한 준수 (4초=최대3, 8초=최대4, 12초=최대5)\n\
                 6) narration_script: 길이에 맞춰 자연스럽게 읽히는 짧은 나레이션 원고\n\
                 7) cta_line: 8~14자 내외의 짧은 행동 유도 문구"
            }
            Self::Poster => {
                "5) headline: 메인 헤드라인\n\
                 6) subheadline: 보조 문구\n\
                 7) layout_directions: 레이아웃 지시 2~4개\n\
                 8) key_visual_keywords: 비주얼 키워드 3~6개"
            }
            Self::ProductCopy => {
                "5) title: 상품 제목\n\
                 6) body: 본문 설명 3~6문장\n\
                 7) bullet_points: 핵심 포인트 3~5개"
            }
        }
    }

    /// Top-level keys the backend must return.
    pub fn output_fields(self) -> &'static [&'static str] {
        match self {
            Self::Research => &[
                "summary",
                "key_points",
                "risks",
                "artifacts",
                "market_signals",
                "competitor_insights",
                "audience_insights",
            ],
            Self::Positioning => &[
                "summary",
                "key_points",
                "risks",
                "artifacts",
                "usp",
                "hero_product_angle",
                "assortment_notes",
            ],
            Self::Feasibility => &[
                "summary",
                "key_points",
                "risks",
                "artifacts",
                "implementation_scope",
                "technical_constraints",
                "demo_readiness_checks",
            ],
            Self::LaunchPlan => &[
                "summary",
                "key_points",
                "risks",
                "artifacts",
                "milestones",
                "critical_path",
                "dependencies",
            ],
            Self::Campaign => &[
                "summary",
                "key_points",
                "risks",
                "artifacts",
                "message_pillars",
                "channel_tactics",
                "conversion_hooks",
            ],
            Self::Budget => &[
                "summary",
                "key_points",
                "risks",
                "artifacts",
                "budget_split_krw",
                "kpi_targets",
                "roi_assumptions",
            ],
            Self::VideoScript => &[
                "summary",
                "key_points",
                "risks",
                "artifacts",
                "scene_plan",
                "narration_script",
                "cta_line",
            ],
            Self::Poster => &[
                "summary",
                "key_points",
                "risks",
                "artifacts",
                "headline",
                "subheadline",
                "layout_directions",
                "key_visual_keywords",
            ],
            Self::ProductCopy => &[
                "summary",
                "key_points",
                "risks",
                "artifacts",
                "title",
                "body",
                "bullet_points",
            ],
        }
    }
}

/// One call to a generation backend.
#[derive(Debug, Clone, Serialize)]
pub struct TaskRequest {
    pub task: TaskKind,
    pub instruction: &'static str,
    pub prompt: String,
    pub output_fields: &'static [&'static str],
}

impl TaskRequest {
    pub fn new(task: TaskKind, brief: &LaunchBrief, context: &str) -> Self {
        Self {
            task,
            instruction: task.instruction(),
            prompt: render_prompt(task, brief, context),
            output_fields: task.output_fields(),
        }
    }
}

/// Structured generation (typically an LLM with a JSON output contract).
///
/// The returned value is repaired and validated by the pipeline; a string
/// answer holding embedded JSON is accepted too.
pub trait GenerationBackend: Send + Sync {
    fn name(&self) -> &str;

    fn generate<'a>(
        &'a self,
        request: &'a TaskRequest,
    ) -> Pin<Box<dyn Future<Output = Result<serde_json::Value>> + Send + 'a>>;
}

/// Full prompt for `task`: brief block, shared context, output rules.
pub fn render_prompt(task: TaskKind, brief: &LaunchBrief, context: &str) -> String {
    let channels = if brief.channel_focus.is_empty() {
        "미지정".to_string()
    } else {
        brief
            .channel_focus
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let features = if brief.key_features.is_empty() {
        "미지정".to_string()
    } else {
        brief.key_features.join(", ")
    };
    let context = if context.trim().is_empty() {
        "없음"
    } else {
        context.trim()
    };

    let mut prompt = String::from(
        "당신은 AI Launch Studio의 실행형 에이전트입니다.\n\
         목표는 \"아이디어 설명\"이 아니라 \"즉시 실행 가능한 결과\"를 주는 것입니다.\n\n[브리프]\n",
    );
    let _ = writeln!(prompt, "- 제품명: {}", brief.product_name);
    let _ = writeln!(prompt, "- 카테고리: {}", brief.product_category);
    let _ = writeln!(prompt, "- 핵심 특징: {features}");
    let _ = writeln!(prompt, "- 타깃: {}", brief.target_audience);
    let _ = writeln!(
        prompt,
        "- 구매 이유: {}",
        brief.purchase_reason.as_deref().unwrap_or("미지정")
    );
    let _ = writeln!(prompt, "- 가격대: {}", brief.price_band);
    let _ = writeln!(prompt, "- 총예산(KRW): {}", brief.total_budget_krw);
    let _ = writeln!(prompt, "- 출시일: {}", brief.launch_date);
    let _ = writeln!(prompt, "- KPI: {}", brief.core_kpi);
    let _ = writeln!(prompt, "- 지역: {}", brief.region);
    let _ = writeln!(prompt, "- 채널: {channels}");
    let _ = writeln!(prompt, "- 영상 길이(초): {}", brief.video_seconds);
    let _ = writeln!(
        prompt,
        "- 제품 레퍼런스 이미지 URL: {}",
        brief.product_image_url.as_deref().unwrap_or("없음")
    );
    let _ = writeln!(
        prompt,
        "- 제품 레퍼런스 이미지 요약: {}",
        brief.product_image_context.as_deref().unwrap_or("없음")
    );
    let _ = write!(
        prompt,
        "\n[공유 컨텍스트]\n{context}\n\n\
         [출력 규칙]\n\
         1) 모든 출력은 한국어\n\
         2) 가짜/샘플/데모라고 표시된 문구 금지\n\
         3) 근거가 약한 항목은 단정하지 말고 `risks`에 불확실성을 명시\n\
         4) 실행 단위는 모호한 표현 대신 이번 주 실행 가능한 수준으로 작성\n\n\
         [필수 출력]\n\
         1) summary: 핵심 결론 1문단\n\
         2) key_points: 실행 포인트 3~5개\n\
         3) risks: 주요 리스크 1~3개\n\
         4) artifacts: 필요한 구조화 데이터\n\
         {}\n\n\
         중요: 출력 스키마 키 누락 없이 반환하세요.",
        task.output_requirements()
    );
    prompt
}
