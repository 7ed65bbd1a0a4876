#![allow(dead_code)]

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde_json::{Value, json};

use launch_studio::dialogue::PriceBand;
use launch_studio::pipeline::media::{ImageRequest, MediaBackend, MediaFuture, VideoRequest};
use launch_studio::pipeline::{GenerationBackend, LaunchBrief, ProgressSink, TaskKind, TaskRequest};

pub fn launch_brief() -> LaunchBrief {
    LaunchBrief {
        product_name: "글로우세럼X".into(),
        product_category: "스킨케어".into(),
        key_features: vec!["저자극".into(), "빠른흡수".into(), "비건포뮬라".into()],
        target_audience: "20대 직장인".into(),
        purchase_reason: Some("민감 피부 진정".into()),
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

/// Answers every task with a well-formed payload; selected tasks can fail
/// or stall.
#[derive(Default)]
pub struct ScriptedBackend {
    pub failing: HashSet<TaskKind>,
    pub stalling: HashSet<TaskKind>,
    pub requests: Mutex<Vec<TaskRequest>>,
}

impl ScriptedBackend {
    pub fn failing(task: TaskKind) -> Self {
        Self {
            failing: HashSet::from([task]),
            ..Self::default()
        }
    }

    pub fn stalling(task: TaskKind) -> Self {
        Self {
            stalling: HashSet::from([task]),
            ..Self::default()
        }
    }

    pub fn request_for(&self, task: TaskKind) -> Option<TaskRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.task == task)
            .cloned()
    }
}

impl GenerationBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn generate<'a>(
        &'a self,
        request: &'a TaskRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Value>> + Send + 'a>> {
        self.requests.lock().unwrap().push(request.clone());
        Box::pin(async move {
            if self.stalling.contains(&request.task) {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            if self.failing.contains(&request.task) {
                bail!("{} backend unavailable", request.task);
            }
            Ok(payload_for(request.task))
        })
    }
}

fn payload_for(task: TaskKind) -> Value {
    let base = |summary: &str, risk: &str| {
        json!({
            "summary": summary,
            "key_points": [format!("{summary} 포인트")],
            "risks": [risk],
            "artifacts": {},
        })
    };
    let mut value = match task {
        TaskKind::Research => base("민감 피부 수요 증가", "경쟁 심화"),
        TaskKind::Positioning => base("저자극 포지셔닝", "경쟁 심화"),
        TaskKind::Feasibility => base("데모 준비 가능", "재고 부족"),
        TaskKind::LaunchPlan => base("2주 런칭 계획", "일정 지연"),
        TaskKind::Campaign => base("진정 메시지 캠페인", "광고비 상승"),
        TaskKind::Budget => base("채널 중심 예산", "광고비 상승"),
        TaskKind::VideoScript => base("8초 진정 영상", "촬영 지연"),
        TaskKind::Poster => base("진정 포스터", "시안 지연"),
        TaskKind::ProductCopy => base("저자극 상세 카피", "표현 규제"),
    };
    let extra = match task {
        TaskKind::LaunchPlan => json!({
            "milestones": [{"name": "티저", "due": "D-7", "owner": "마케팅", "success_criteria": "조회수 1만"}],
        }),
        TaskKind::Campaign => json!({
            "message_pillars": ["진정", "저자극", "빠른흡수", "비건", "데일리"],
            "channel_tactics": {"instagram": "릴스"},
        }),
        TaskKind::Budget => json!({
            "budget_split_krw": {"instagram": "600000", "naver": 400000},
        }),
        TaskKind::VideoScript => json!({
            "scene_plan": ["1. 세럼 클로즈업", "2. 피부 진정 장면", "3. 로고"],
            "narration_script": "민감 피부도 편안하게. 하루 종일 촉촉해요.",
            "cta_line": "지금 확인",
        }),
        TaskKind::Poster => json!({
            "headline": "예민한 날에도 편안하게",
            "subheadline": "저자극 진정 세럼",
            "key_visual_keywords": ["세럼", "물방울"],
        }),
        TaskKind::ProductCopy => json!({
            "title": "글로우세럼X",
            "body": "민감 피부를 위한 저자극 세럼입니다.",
            "bullet_points": ["저자극", "빠른흡수"],
        }),
        _ => json!({}),
    };
    if let (Value::Object(target), Value::Object(fields)) = (&mut value, extra) {
        target.extend(fields);
    }
    value
}

/// Image and video outcomes fixed per instance.
pub struct FixedMedia {
    pub image: Option<String>,
    pub video: Option<String>,
    pub images: Mutex<Vec<ImageRequest>>,
    pub videos: Mutex<Vec<VideoRequest>>,
}

impl FixedMedia {
    pub fn new(image: Option<&str>, video: Option<&str>) -> Self {
        Self {
            image: image.map(String::from),
            video: video.map(String::from),
            images: Mutex::new(Vec::new()),
            videos: Mutex::new(Vec::new()),
        }
    }
}

impl MediaBackend for FixedMedia {
    fn name(&self) -> &str {
        "fixed"
    }

    fn render_image<'a>(&'a self, request: &'a ImageRequest) -> MediaFuture<'a> {
        self.images.lock().unwrap().push(request.clone());
        let image = self.image.clone();
        Box::pin(async move {
            match image {
                Some(url) => Ok(Some(url)),
                None => bail!("image model rejected the prompt"),
            }
        })
    }

    fn render_video<'a>(&'a self, request: &'a VideoRequest) -> MediaFuture<'a> {
        self.videos.lock().unwrap().push(request.clone());
        let video = self.video.clone();
        Box::pin(async move { Ok(video) })
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub points: Mutex<Vec<(u8, String)>>,
}

impl RecordingSink {
    pub fn progress(&self) -> Vec<u8> {
        self.points.lock().unwrap().iter().map(|(p, _)| *p).collect()
    }
}

impl ProgressSink for RecordingSink {
    fn report<'a>(
        &'a self,
        progress: u8,
        note: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        self.points.lock().unwrap().push((progress, note.to_string()));
        Box::pin(async { Ok(()) })
    }
}
