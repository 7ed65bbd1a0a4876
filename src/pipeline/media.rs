//! Optional media stage: poster image and promo video rendering with
//! fallback chains. Every failure here degrades the completion note; none
//! fails the run.

use super::brief::LaunchBrief;
use super::fitting::NarrationBudget;
use super::payload::MarketingAssets;
use crate::config::MediaConfig;
use crate::dialogue::DurationClass;
use anyhow::Result;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{info, warn};

/// Renderer answer: a URL or path, `None` when nothing was produced.
pub type MediaFuture<'a> = Pin<Box<dyn Future<Output = Result<Option<String>>> + Send + 'a>>;

const DEFAULT_POSTER_KEYWORDS: &str = "미니멀, 상업적, 제품 중심";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRequest {
    pub headline: String,
    pub brief: String,
    pub keywords: Vec<String>,
    pub reference_image_url: Option<String>,
    pub reference_notes: Option<String>,
    /// Fully rendered prompt.
    pub prompt: String,
}

impl ImageRequest {
    pub fn new(
        headline: &str,
        brief: &str,
        keywords: &[String],
        reference_image_url: Option<&str>,
        reference_notes: Option<&str>,
    ) -> Self {
        let keyword_text = if keywords.is_empty() {
            DEFAULT_POSTER_KEYWORDS.to_string()
        } else {
            keywords.join(", ")
        };
        let mut lines = vec![
            "Professional marketing poster for a product launch.".to_string(),
            format!("Headline: {headline}"),
            format!("Brief: {brief}"),
            format!("Visual Style Keywords: {keyword_text}"),
        ];
        if let Some(notes) = reference_notes {
            lines.push(format!("Reference Visual Notes: {notes}"));
        }
        if reference_image_url.is_some() {
            lines.push(
                "If a reference product image is provided, preserve core product identity \
                 (shape, packaging tone, logo placement cues, and category feel)."
                    .to_string(),
            );
        }
        lines.push(
            "Clean, modern, high-quality, product-focused, commercial photography style.".into(),
        );
        lines.push(
            "No text in the image except for the overall vibe and aesthetic.".into(),
        );

        Self {
            headline: headline.to_string(),
            brief: brief.to_string(),
            keywords: keywords.to_vec(),
            reference_image_url: reference_image_url.map(String::from),
            reference_notes: reference_notes.map(String::from),
            prompt: lines.join("\n"),
        }
    }

    fn without_reference(&self) -> Self {
        Self::new(
            &self.headline,
            &self.brief,
            &self.keywords,
            None,
            self.reference_notes.as_deref(),
        )
    }
}

/// One video model/size attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoRequest {
    pub prompt: String,
    pub model: String,
    pub width: u32,
    pub height: u32,
    pub duration: DurationClass,
    pub reference_image_url: Option<String>,
    /// Even-sided delivery size after enhancement.
    pub delivery_size: (u32, u32),
}

/// Still-keyframe composition request used after every video candidate failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyframeRequest {
    pub prompt: String,
    pub duration: DurationClass,
    pub reference_image_url: Option<String>,
}

/// Image and video generation behind the media stage.
pub trait MediaBackend: Send + Sync {
    fn name(&self) -> &str;

    fn render_image<'a>(&'a self, request: &'a ImageRequest) -> MediaFuture<'a>;

    fn render_video<'a>(&'a self, request: &'a VideoRequest) -> MediaFuture<'a>;

    /// Cheaper degradation path: render a keyframe and animate it.
    fn compose_from_keyframe<'a>(&'a self, _request: &'a KeyframeRequest) -> MediaFuture<'a> {
        Box::pin(async { Ok(None) })
    }
}

/// Parse `WIDTHxHEIGHT`; both sides must be positive.
pub fn parse_size(value: &str) -> Option<(u32, u32)> {
    let (width, height) = value.split_once(['x', 'X'])?;
    let width: u32 = width.trim().parse().ok()?;
    let height: u32 = height.trim().parse().ok()?;
    (width > 0 && height > 0).then_some((width, height))
}

/// Even dimensions with the long edge capped at `max_long_edge`, keeping the
/// aspect ratio.
pub fn enhancement_target_size(width: u32, height: u32, max_long_edge: u32) -> (u32, u32) {
    let even = |v: u32| {
        let v = v.max(2);
        if v % 2 == 0 { v } else { v - 1 }
    };
    let (mut w, mut h) = (even(width), even(height));
    let long_edge = w.max(h);
    let cap = max_long_edge.max(2);
    if long_edge > cap {
        let scale = f64::from(cap) / f64::from(long_edge);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let scaled = |v: u32| (f64::from(v) * scale).round() as u32;
        w = even(scaled(w));
        h = even(scaled(h));
    }
    (w, h)
}

/// Prompt for the video model: product, fitted narration and the text
/// density limits of the duration class.
pub fn video_prompt(product_name: &str, narration: &str, duration: DurationClass) -> String {
    let budget = NarrationBudget::for_class(duration);
    format!(
        "Cinematic product launch video for '{product_name}'. \
         Total runtime: exactly {} seconds. \
         Narration intent: {narration}. \
         Narration density limit: <= {} Korean characters across <= {} short sentences. \
         Keep pacing readable and avoid rushed voice delivery. \
         Visual quality target: premium commercial film look, ultra-sharp details, \
         clean highlights, physically plausible lighting, stable motion, rich textures, \
         natural skin/material rendering, no text overlay, no watermark.",
        duration.seconds(),
        budget.max_chars,
        budget.max_sentences,
    )
}

/// Append product-identity lines when a reference image or notes exist.
pub fn with_reference_lines(
    prompt: &str,
    reference_image_url: Option<&str>,
    reference_notes: Option<&str>,
) -> String {
    let mut lines = Vec::new();
    if reference_image_url.is_some() {
        lines.push(
            "Preserve exact product identity from the provided product reference image \
             (shape, packaging tone, material cues, and logo placement cues)."
                .to_string(),
        );
    }
    if let Some(notes) = reference_notes {
        lines.push(format!("Reference visual notes: {notes}"));
    }
    if lines.is_empty() {
        prompt.to_string()
    } else {
        format!("{prompt}\n{}", lines.join("\n"))
    }
}

/// Korean note describing which media assets were produced.
pub fn completion_note(assets: &MarketingAssets) -> String {
    match (assets.poster_image_url.is_some(), assets.video_url.is_some()) {
        (true, true) => "포스터 이미지와 영상 생성을 모두 완료했어요.".into(),
        (false, true) => "영상은 생성했지만 포스터 이미지는 만들지 못했어요. \
                          이미지 생성 모델의 응답이나 레퍼런스 이미지를 확인해 주세요."
            .into(),
        (true, false) => "포스터 이미지는 생성했지만 영상은 만들지 못했어요. \
                          영상 모델 대기열이나 길이 제한 때문일 수 있으니 잠시 후 에셋만 다시 생성해 주세요."
            .into(),
        (false, false) => "포스터 이미지와 영상을 모두 만들지 못했어요. \
                           미디어 생성 설정과 모델 상태를 확인한 뒤 에셋만 다시 생성해 주세요."
            .into(),
    }
}

/// Media rendering with model/size and reference fallbacks.
pub struct MediaStage {
    backend: Arc<dyn MediaBackend>,
    config: MediaConfig,
}

impl MediaStage {
    pub fn new(backend: Arc<dyn MediaBackend>, config: MediaConfig) -> Self {
        Self { backend, config }
    }

    /// Poster with the product reference first, then without it.
    pub async fn render_poster(
        &self,
        headline: &str,
        brief_text: &str,
        keywords: &[String],
        brief: &LaunchBrief,
    ) -> Option<String> {
        let request = ImageRequest::new(
            headline,
            brief_text,
            keywords,
            brief.product_image_url.as_deref(),
            brief.product_image_context.as_deref(),
        );
        if let Some(url) = self.try_image(&request).await {
            return Some(url);
        }
        if request.reference_image_url.is_none() {
            return None;
        }
        info!(backend = self.backend.name(), "retrying poster without reference image");
        self.try_image(&request.without_reference()).await
    }

    async fn try_image(&self, request: &ImageRequest) -> Option<String> {
        match self.backend.render_image(request).await {
            Ok(Some(url)) => Some(url),
            Ok(None) => {
                warn!(backend = self.backend.name(), "poster render returned nothing");
                None
            }
            Err(e) => {
                warn!(backend = self.backend.name(), "poster render failed: {e:#}");
                None
            }
        }
    }

    /// Walk every model × size candidate, then the keyframe fallback when
    /// enabled.
    pub async fn render_video(
        &self,
        prompt: &str,
        duration: DurationClass,
        brief: &LaunchBrief,
    ) -> Option<String> {
        let prompt = with_reference_lines(
            prompt,
            brief.product_image_url.as_deref(),
            brief.product_image_context.as_deref(),
        );

        for model in &self.config.video_models {
            for size in &self.config.video_sizes {
                let Some((width, height)) = parse_size(size) else {
                    warn!(size = %size, "skipping malformed video size");
                    continue;
                };
                let request = VideoRequest {
                    prompt: prompt.clone(),
                    model: model.clone(),
                    width,
                    height,
                    duration,
                    reference_image_url: brief.product_image_url.clone(),
                    delivery_size: enhancement_target_size(
                        width,
                        height,
                        self.config.max_long_edge,
                    ),
                };
                match self.backend.render_video(&request).await {
                    Ok(Some(url)) => {
                        info!(model = %model, size = %size, "video rendered");
                        return Some(url);
                    }
                    Ok(None) => warn!(model = %model, size = %size, "video render incomplete"),
                    Err(e) => warn!(model = %model, size = %size, "video render failed: {e:#}"),
                }
            }
        }

        if !self.config.keyframe_fallback {
            warn!("every video candidate failed; keyframe fallback disabled");
            return None;
        }
        warn!("every video candidate failed; composing from a keyframe");
        let request = KeyframeRequest {
            prompt: keyframe_prompt(&prompt, brief.product_image_context.as_deref()),
            duration,
            reference_image_url: brief.product_image_url.clone(),
        };
        match self.backend.compose_from_keyframe(&request).await {
            Ok(found) => found,
            Err(e) => {
                warn!(backend = self.backend.name(), "keyframe composition failed: {e:#}");
                None
            }
        }
    }
}

fn keyframe_prompt(scene: &str, reference_notes: Option<&str>) -> String {
    let mut parts = vec![
        "Create a cinematic commercial keyframe for a product launch video.".to_string(),
        "No text overlay, no watermark, clean product focus.".to_string(),
        format!("Scene direction: {scene}"),
    ];
    if let Some(notes) = reference_notes {
        parts.push(format!("Reference visual notes: {notes}"));
    }
    parts.join(" ")
}
