//! Stage outputs, the lenient decoder in front of them, and the final
//! generation package.

use super::brief::LaunchBrief;
use super::tasks::{Stage, TaskKind};
use crate::coerce::{RawValue, extract_json};
use crate::error::PipelineError;
use crate::utils::text::clip_chars;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// Keys that often carry the summary when `summary` itself is missing.
const SUMMARY_KEYS: [&str; 5] = ["overview", "result", "message", "text", "요약"];
const SUMMARY_FALLBACK: &str = "에이전트 응답 요약";
const EMPTY_SUMMARY: &str = "에이전트 응답을 요약하지 못했습니다.";
const MAX_SUMMARY_CHARS: usize = 300;

/// Fields every task returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPayload {
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub artifacts: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchOutput {
    #[serde(flatten)]
    pub payload: TaskPayload,
    #[serde(default)]
    pub market_signals: Vec<String>,
    #[serde(default)]
    pub competitor_insights: Vec<String>,
    #[serde(default)]
    pub audience_insights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositioningOutput {
    #[serde(flatten)]
    pub payload: TaskPayload,
    #[serde(default)]
    pub usp: Vec<String>,
    #[serde(default)]
    pub hero_product_angle: String,
    #[serde(default)]
    pub assortment_notes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityOutput {
    #[serde(flatten)]
    pub payload: TaskPayload,
    #[serde(default)]
    pub implementation_scope: Vec<String>,
    #[serde(default)]
    pub technical_constraints: Vec<String>,
    #[serde(default)]
    pub demo_readiness_checks: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub due: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub success_criteria: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaunchPlanOutput {
    #[serde(flatten)]
    pub payload: TaskPayload,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub critical_path: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignOutput {
    #[serde(flatten)]
    pub payload: TaskPayload,
    #[serde(default)]
    pub message_pillars: Vec<String>,
    /// Channel name to free-form tactics.
    #[serde(default)]
    pub channel_tactics: Map<String, Value>,
    #[serde(default)]
    pub conversion_hooks: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetOutput {
    #[serde(flatten)]
    pub payload: TaskPayload,
    /// Bucket to whole KRW.
    #[serde(default)]
    pub budget_split_krw: BTreeMap<String, i64>,
    #[serde(default)]
    pub kpi_targets: Vec<String>,
    #[serde(default)]
    pub roi_assumptions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoScriptOutput {
    #[serde(flatten)]
    pub payload: TaskPayload,
    #[serde(default)]
    pub scene_plan: Vec<String>,
    #[serde(default)]
    pub narration_script: String,
    #[serde(default)]
    pub cta_line: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PosterOutput {
    #[serde(flatten)]
    pub payload: TaskPayload,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub subheadline: String,
    #[serde(default)]
    pub layout_directions: Vec<String>,
    #[serde(default)]
    pub key_visual_keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductCopyOutput {
    #[serde(flatten)]
    pub payload: TaskPayload,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub bullet_points: Vec<String>,
}

/// Typed output of one generation task.
pub trait StageOutput: Serialize + DeserializeOwned + Send + 'static {
    const KIND: TaskKind;
    /// Fields coerced to string lists during repair.
    const LIST_FIELDS: &'static [&'static str];
    /// Fields coerced to a single string during repair.
    const TEXT_FIELDS: &'static [&'static str] = &[];
    /// Fields reset to an empty map when they are not objects.
    const MAP_FIELDS: &'static [&'static str] = &[];

    fn payload(&self) -> &TaskPayload;

    /// Output-specific repair of nested values.
    fn repair_fields(_fields: &mut Map<String, Value>) {}
}

macro_rules! stage_output {
    (
        $ty:ident, $kind:expr,
        lists: [$($list:literal),*],
        texts: [$($text:literal),*],
        maps: [$($map:literal),*]
    ) => {
        impl StageOutput for $ty {
            const KIND: TaskKind = $kind;
            const LIST_FIELDS: &'static [&'static str] = &[$($list),*];
            const TEXT_FIELDS: &'static [&'static str] = &[$($text),*];
            const MAP_FIELDS: &'static [&'static str] = &[$($map),*];

            fn payload(&self) -> &TaskPayload {
                &self.payload
            }
        }
    };
}

stage_output!(ResearchOutput, TaskKind::Research,
    lists: ["market_signals", "competitor_insights", "audience_insights"],
    texts: [], maps: []);
stage_output!(PositioningOutput, TaskKind::Positioning,
    lists: ["usp", "assortment_notes"],
    texts: ["hero_product_angle"], maps: []);
stage_output!(FeasibilityOutput, TaskKind::Feasibility,
    lists: ["implementation_scope", "technical_constraints", "demo_readiness_checks"],
    texts: [], maps: []);
stage_output!(CampaignOutput, TaskKind::Campaign,
    lists: ["message_pillars", "conversion_hooks"],
    texts: [], maps: ["channel_tactics"]);
stage_output!(BudgetOutput, TaskKind::Budget,
    lists: ["kpi_targets", "roi_assumptions"],
    texts: [], maps: ["budget_split_krw"]);
stage_output!(VideoScriptOutput, TaskKind::VideoScript,
    lists: ["scene_plan"],
    texts: ["narration_script", "cta_line"], maps: []);
stage_output!(PosterOutput, TaskKind::Poster,
    lists: ["layout_directions", "key_visual_keywords"],
    texts: ["headline", "subheadline"], maps: []);
stage_output!(ProductCopyOutput, TaskKind::ProductCopy,
    lists: ["bullet_points"],
    texts: ["title", "body"], maps: []);

impl StageOutput for LaunchPlanOutput {
    const KIND: TaskKind = TaskKind::LaunchPlan;
    const LIST_FIELDS: &'static [&'static str] = &["critical_path", "dependencies"];

    fn payload(&self) -> &TaskPayload {
        &self.payload
    }

    /// Milestones must be objects with text fields; anything else is dropped.
    fn repair_fields(fields: &mut Map<String, Value>) {
        let Some(raw) = fields.get_mut("milestones") else {
            return;
        };
        let items = match raw.take() {
            Value::Array(items) => items,
            _ => Vec::new(),
        };
        let milestones = items
            .into_iter()
            .filter_map(|item| {
                let Value::Object(entry) = item else {
                    return None;
                };
                let text = |key: &str| {
                    entry
                        .get(key)
                        .cloned()
                        .map(RawValue::from)
                        .and_then(|v| v.as_scalar())
                        .unwrap_or_default()
                };
                let milestone = Milestone {
                    name: text("name"),
                    due: text("due"),
                    owner: text("owner"),
                    success_criteria: text("success_criteria"),
                };
                (!milestone.name.is_empty()).then(|| {
                    serde_json::json!({
                        "name": milestone.name,
                        "due": milestone.due,
                        "owner": milestone.owner,
                        "success_criteria": milestone.success_criteria,
                    })
                })
            })
            .collect();
        *raw = Value::Array(milestones);
    }
}

/// Turn a backend answer into a typed output.
///
/// Objects are validated as-is first and repaired on failure; text holding
/// embedded JSON is decoded the same way; other text becomes a minimal
/// output carrying only the summary.
pub fn decode<T: StageOutput>(raw: Value) -> Result<T, PipelineError> {
    let task = T::KIND;
    let fields = match raw {
        Value::Object(fields) => fields,
        Value::String(text) => match extract_json(&text) {
            Some(Value::Object(fields)) => fields,
            _ => return minimal(&text, "text"),
        },
        Value::Null => return Err(invalid(task, "empty response")),
        other => return minimal(&other.to_string(), "stringified"),
    };

    match serde_json::from_value::<T>(Value::Object(fields.clone())) {
        Ok(output) if !output.payload().summary.trim().is_empty() => return Ok(output),
        Ok(_) => warn!(task = %task, "payload has an empty summary, repairing"),
        Err(e) => warn!(task = %task, "payload validation failed, repairing: {e}"),
    }

    serde_json::from_value(Value::Object(repair::<T>(fields)))
        .map_err(|e| invalid(task, format!("repair failed: {e}")))
}

fn repair<T: StageOutput>(mut fields: Map<String, Value>) -> Map<String, Value> {
    let summary = match fields.get("summary") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => summary_candidate(&fields),
    };
    fields.insert("summary".into(), Value::String(summary));

    for key in ["key_points", "risks"].iter().chain(T::LIST_FIELDS) {
        let list = fields
            .remove(*key)
            .map(|v| RawValue::from(v).as_text_list())
            .unwrap_or_default();
        fields.insert((*key).to_string(), text_array(list));
    }

    if !matches!(fields.get("artifacts"), Some(Value::Object(_))) {
        fields.insert("artifacts".into(), Value::Object(Map::new()));
    }

    for (key, value) in &mut fields {
        if key.ends_with("_krw") && matches!(value, Value::Object(_) | Value::Array(_)) {
            let amounts = RawValue::from(value.take()).as_amount_map();
            *value = Value::Object(
                amounts
                    .into_iter()
                    .map(|(bucket, amount)| (bucket, Value::from(amount)))
                    .collect(),
            );
        }
    }

    for key in T::TEXT_FIELDS {
        if let Some(value) = fields.get_mut(*key) {
            let text = RawValue::from(value.take()).as_scalar().unwrap_or_default();
            *value = Value::String(text);
        }
    }

    for key in T::MAP_FIELDS {
        if let Some(value) = fields.get_mut(*key)
            && !value.is_object()
        {
            *value = Value::Object(Map::new());
        }
    }

    T::repair_fields(&mut fields);
    fields
}

fn summary_candidate(fields: &Map<String, Value>) -> String {
    if let Some(found) = SUMMARY_KEYS.iter().find_map(|key| match fields.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }) {
        return found;
    }
    let compact = Value::Object(fields.clone()).to_string();
    let compact = clip_chars(compact.trim(), MAX_SUMMARY_CHARS);
    if compact.is_empty() || compact == "{}" {
        SUMMARY_FALLBACK.to_string()
    } else {
        compact.to_string()
    }
}

fn minimal<T: StageOutput>(text: &str, source: &str) -> Result<T, PipelineError> {
    let summary = match text.trim() {
        "" => EMPTY_SUMMARY,
        trimmed => trimmed,
    };
    serde_json::from_value(serde_json::json!({
        "summary": summary,
        "artifacts": { "source": source },
    }))
    .map_err(|e| invalid(T::KIND, e.to_string()))
}

fn text_array(items: Vec<String>) -> Value {
    Value::Array(items.into_iter().map(Value::String).collect())
}

fn invalid(task: TaskKind, reason: impl Into<String>) -> PipelineError {
    PipelineError::InvalidPayload {
        task: task.to_string(),
        reason: reason.into(),
    }
}

// ── Package ──────────────────────────────────────────────────────────────

/// Creative deliverables after fitting and media rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketingAssets {
    pub video_script: String,
    pub poster_brief: String,
    pub product_copy: String,
    #[serde(default)]
    pub video_scene_plan: Vec<String>,
    #[serde(default)]
    pub poster_headline: String,
    #[serde(default)]
    pub product_copy_bullets: Vec<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub poster_image_url: Option<String>,
}

/// One task's result in execution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub task: TaskKind,
    pub stage: Stage,
    pub payload: TaskPayload,
}

impl TimelineEntry {
    pub fn new<T: StageOutput>(output: &T) -> Self {
        Self {
            task: T::KIND,
            stage: T::KIND.stage(),
            payload: output.payload().clone(),
        }
    }
}

/// Aggregated result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationPackage {
    pub request_id: String,
    pub created_at: DateTime<Utc>,
    pub brief: LaunchBrief,
    pub research: ResearchOutput,
    pub positioning: PositioningOutput,
    pub feasibility: FeasibilityOutput,
    pub launch_plan: LaunchPlanOutput,
    pub campaign: CampaignOutput,
    pub budget: BudgetOutput,
    pub marketing_assets: MarketingAssets,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
    /// Outcome of the media stage when it ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_note: Option<String>,
}
