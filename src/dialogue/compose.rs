//! Korean assistant replies.

use super::brief::{Brief, Channel, FieldPath, FieldUpdate, MIN_FEATURES};
use super::conflict::{Conflict, format_krw};
use super::extract::meta::MetaQuery;
use super::gate::GateStatus;
use crate::config::ReplyTone;
use crate::utils::text::topic_particle;

/// Updates named in one acknowledgment.
const MAX_ACKNOWLEDGED: usize = 2;

pub fn question(path: FieldPath) -> &'static str {
    match path {
        FieldPath::ProductName => "제품명(상품명)을 알려주세요.",
        FieldPath::ProductCategory => "제품 카테고리는 무엇인가요?",
        FieldPath::ProductFeatures => "핵심 특징 3가지를 알려주세요. (쉼표로 구분)",
        FieldPath::ProductPriceBand => "가격대(저가/중가/프리미엄 또는 실제 가격)를 알려주세요.",
        FieldPath::TargetWho => "주요 타겟 고객은 누구인가요?",
        FieldPath::TargetWhy => "그 타겟이 이 제품을 사는 이유는 무엇인가요?",
        FieldPath::ChannelChannels => "우선 집중할 채널 1~2개를 알려주세요. (예: 인스타, 네이버)",
        FieldPath::GoalWeeklyGoal => "이번 주 목표를 선택해주세요. (조회/문의/구매)",
        FieldPath::GoalVideoSeconds => "영상 길이를 4/8/12초 중에서 골라주세요.",
    }
}

pub fn hint(path: FieldPath) -> &'static str {
    match path {
        FieldPath::ProductName => "예: 아이폰 17, 글로우세럼X",
        FieldPath::ProductCategory => "예: 스마트폰, 스킨케어",
        FieldPath::ProductFeatures => "예: 저자극, 빠른 흡수, 비건 포뮬러",
        FieldPath::ProductPriceBand => "예: 중가 또는 39,000원",
        FieldPath::TargetWho => "예: 20대 직장인, 30대 남성",
        FieldPath::TargetWhy => "예: 촉촉함 유지, 트러블 진정",
        FieldPath::ChannelChannels => "예: 인스타, 네이버",
        FieldPath::GoalWeeklyGoal => "예: 문의",
        FieldPath::GoalVideoSeconds => "예: 8초",
    }
}

/// Why a field is asked for; answers "왜 필요해요?" style questions.
pub fn rationale(path: FieldPath) -> &'static str {
    match path {
        FieldPath::ProductName => "제품명은 카피와 영상 자막에 그대로 들어가서 가장 먼저 확인하고 있어요.",
        FieldPath::ProductCategory => "카테고리에 따라 시장 조사 범위와 추천 채널이 달라져요.",
        FieldPath::ProductFeatures => "핵심 특징이 3가지는 있어야 카피와 영상 장면을 구체적으로 만들 수 있어요.",
        FieldPath::ProductPriceBand => "가격대에 따라 포지셔닝과 광고 톤, 예산 배분이 달라져요.",
        FieldPath::TargetWho => "타겟 고객을 알아야 메시지 톤과 채널을 맞출 수 있어요.",
        FieldPath::TargetWhy => "구매 이유가 광고의 핵심 메시지가 돼요.",
        FieldPath::ChannelChannels => "채널마다 콘텐츠 형식과 예산 배분이 달라서 1~2개에 집중하는 게 좋아요.",
        FieldPath::GoalWeeklyGoal => "주간 목표에 맞춰 KPI와 행동 유도 문구를 정해요.",
        FieldPath::GoalVideoSeconds => "영상 길이에 맞춰 내레이션 분량과 장면 수를 조절해요.",
    }
}

/// Short lead-in placed between an acknowledgment and the next question.
fn bridge(path: FieldPath) -> Option<&'static str> {
    match path {
        FieldPath::ProductFeatures => Some("이제 제품의 강점을 정리해볼게요."),
        FieldPath::ProductPriceBand => Some("포지셔닝을 잡으려면 가격대가 필요해요."),
        FieldPath::TargetWho => Some("이제 누구에게 팔지 정해볼게요."),
        FieldPath::ChannelChannels => Some("거의 다 왔어요."),
        FieldPath::GoalWeeklyGoal => Some("마지막으로 목표만 정하면 돼요."),
        _ => None,
    }
}

/// Category keyword table for "알아서 골라줘" on the channel question.
const CHANNEL_RECOMMENDATIONS: &[(&[&str], [Channel; 2])] = &[
    (
        &["스킨케어", "뷰티", "화장품", "코스메틱", "세럼", "skincare", "beauty"],
        [Channel::Instagram, Channel::YouTubeShorts],
    ),
    (
        &["패션", "의류", "신발", "가방", "fashion"],
        [Channel::Instagram, Channel::TikTok],
    ),
    (
        &["푸드", "식품", "간식", "음료", "커피", "디저트", "food"],
        [Channel::Instagram, Channel::Naver],
    ),
    (
        &["가전", "전자", "디바이스", "기기", "appliance"],
        [Channel::YouTube, Channel::Naver],
    ),
    (
        &["헬스케어", "건강", "영양제", "비타민", "healthcare"],
        [Channel::Naver, Channel::YouTube],
    ),
];

const DEFAULT_RECOMMENDATION: [Channel; 2] = [Channel::Instagram, Channel::Naver];

/// Channels recommended from the brief's category and product name.
pub fn recommend_channels(brief: &Brief) -> Vec<Channel> {
    let haystack = format!(
        "{} {}",
        brief.product.category.as_deref().unwrap_or_default(),
        brief.product.name.as_deref().unwrap_or_default()
    )
    .to_lowercase();
    CHANNEL_RECOMMENDATIONS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| haystack.contains(k)))
        .map_or(DEFAULT_RECOMMENDATION, |(_, channels)| *channels)
        .to_vec()
}

/// Opening message of a new session.
pub fn greeting() -> String {
    let first = FieldPath::ProductName;
    format!(
        "안녕하세요! 제품 런칭 브리프를 함께 정리해볼게요. {} ({})",
        question(first),
        hint(first)
    )
}

fn tone_prefix(tone: ReplyTone) -> &'static str {
    match tone {
        ReplyTone::Friendly => "좋아요.",
        ReplyTone::Calm => "천천히 정리해볼게요.",
        ReplyTone::Neutral => "다음 정보를 확인하겠습니다.",
    }
}

/// Open `message` with the tone's phrase unless it already does.
pub fn with_tone(message: &str, tone: ReplyTone) -> String {
    let prefix = tone_prefix(tone);
    let message = message.trim();
    if message.is_empty() {
        prefix.to_string()
    } else if message.starts_with(prefix) {
        message.to_string()
    } else {
        format!("{prefix} {message}")
    }
}

/// Everything the composer looks at for one turn.
#[derive(Debug, Clone)]
pub struct ComposeInput<'a> {
    pub brief: &'a Brief,
    pub gate: &'a GateStatus,
    /// External and local updates applied this turn, in order.
    pub applied: &'a [FieldUpdate],
    pub conflicts: &'a [Conflict],
    /// Set when the utterance was a question rather than an answer.
    pub meta: Option<MetaQuery>,
    /// Channels were auto-filled from a delegation request.
    pub delegated: bool,
    /// The session was already READY before this turn.
    pub was_ready: bool,
    /// Duration notices, prefixed verbatim.
    pub notices: &'a [String],
}

pub fn compose(input: &ComposeInput<'_>) -> String {
    let body = if let Some(conflict) = input.conflicts.first() {
        with_ack(input.applied, &conflict_message(conflict))
    } else if input.was_ready {
        post_ready_message(input)
    } else if input.gate.ready {
        ready_message(input)
    } else {
        followup_message(input)
    };

    if input.notices.is_empty() {
        body
    } else {
        let mut lines = input.notices.to_vec();
        lines.push(body);
        lines.join("\n")
    }
}

/// "가격대는 '프리미엄', 집중 채널은 '인스타그램'" for up to two fields; a
/// field updated twice in one turn shows its final value.
pub fn summarize_updates(updates: &[FieldUpdate]) -> String {
    let mut latest: Vec<&FieldUpdate> = Vec::new();
    for update in updates {
        if let Some(slot) = latest.iter_mut().find(|u| u.path == update.path) {
            *slot = update;
        } else {
            latest.push(update);
        }
    }
    latest
        .iter()
        .map(|update| {
            let label = update.path.label();
            (label, update.value.display())
        })
        .filter(|(_, value)| !value.is_empty())
        .take(MAX_ACKNOWLEDGED)
        .map(|(label, value)| format!("{label}{} '{value}'", topic_particle(label)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn with_ack(applied: &[FieldUpdate], rest: &str) -> String {
    let summary = summarize_updates(applied);
    if summary.is_empty() {
        rest.to_string()
    } else {
        format!("좋아요, {summary} 확인했어요. {rest}")
    }
}

fn conflict_message(conflict: &Conflict) -> String {
    format!(
        "가격 정보가 서로 맞지 않아요. '{}' 표현과 {}원이 함께 있어서 가격대를 확정하지 않았어요. \
         실제 판매가나 가격대(저가/중가/프리미엄)를 다시 알려주세요.",
        conflict.cue,
        format_krw(conflict.amount)
    )
}

fn ready_message(input: &ComposeInput<'_>) -> String {
    let summary = summarize_updates(input.applied);
    let mut message = if summary.is_empty() {
        "좋아요. 브리프 수집이 완료됐어요. 이제 시장 리서치와 전략 생성을 진행할 수 있어요."
            .to_string()
    } else {
        format!(
            "좋아요, {summary} 확인했어요. 브리프 수집이 완료됐고 이제 시장 리서치와 전략 생성을 진행할 수 있어요."
        )
    };
    if let Some(gap) = soft_followup(input.gate) {
        message.push(' ');
        message.push_str(&gap);
    }
    message
}

fn post_ready_message(input: &ComposeInput<'_>) -> String {
    if let Some(meta) = input.meta {
        return meta_answer(meta, input);
    }
    let summary = summarize_updates(input.applied);
    if summary.is_empty() {
        return "브리프 수집이 완료되었어요. 다음 생성 단계를 실행해 주세요.".to_string();
    }
    let mut message = format!("좋아요, {summary} 브리프에 반영했어요.");
    if let Some(gap) = soft_followup(input.gate) {
        message.push(' ');
        message.push_str(&gap);
    }
    message
}

/// Optional gap left after READY through the relaxed path.
fn soft_followup(gate: &GateStatus) -> Option<String> {
    gate.first_missing().map(|path| {
        format!(
            "더 정확한 결과를 위해 {}도 알려주시면 반영할게요. ({})",
            path.label(),
            hint(path)
        )
    })
}

fn followup_message(input: &ComposeInput<'_>) -> String {
    let Some(next) = input.gate.first_missing() else {
        return ready_message(input);
    };
    let prompt = field_prompt(next, input.brief);

    if let Some(meta) = input.meta {
        return format!("{} {prompt}", meta_answer(meta, input));
    }

    let summary = summarize_updates(input.applied);
    if summary.is_empty() {
        return format!("아직 {} 정보가 부족해요. {prompt} ({})", next.label(), hint(next));
    }

    let mut parts = Vec::with_capacity(4);
    parts.push(format!("좋아요, {summary} 확인했어요."));
    if input.delegated {
        parts.push(delegation_line(input.brief));
    }
    if channel_nudge_due(input) {
        parts.push("다른 채널도 함께 운영하면 하나 더 알려주세요.".to_string());
    }
    if let Some(lead) = bridge(next) {
        parts.push(lead.to_string());
    }
    parts.push(prompt);
    parts.join(" ")
}

/// Per-field question, with the feature countdown once a partial list
/// exists.
fn field_prompt(path: FieldPath, brief: &Brief) -> String {
    let have = brief.product.features.len();
    if path == FieldPath::ProductFeatures && (1..MIN_FEATURES).contains(&have) {
        return format!(
            "핵심 특징을 {have}개 받았어요. {}개만 더 알려주세요.",
            MIN_FEATURES - have
        );
    }
    question(path).to_string()
}

fn channel_nudge_due(input: &ComposeInput<'_>) -> bool {
    !input.delegated
        && input.brief.channel.channels.len() == 1
        && input
            .applied
            .iter()
            .any(|u| u.path == FieldPath::ChannelChannels)
}

fn delegation_line(brief: &Brief) -> String {
    let category = brief.product.category.as_deref().unwrap_or("이");
    let labels = brief
        .channel
        .channels
        .iter()
        .map(|c| c.label())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{category} 제품에는 {labels} 채널이 잘 맞아서 바로 설정했어요.")
}

fn meta_answer(meta: MetaQuery, input: &ComposeInput<'_>) -> String {
    match meta {
        MetaQuery::Remaining => {
            if input.gate.missing_required.is_empty() {
                return "필수 정보는 모두 받았어요.".to_string();
            }
            let labels = input
                .gate
                .missing_required
                .iter()
                .map(|path| path.label())
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "남은 필수 정보는 {}개예요: {labels}.",
                input.gate.missing_required.len()
            )
        }
        MetaQuery::PriceFormat => format!(
            "가격은 '39,000원'처럼 실제 판매가를 적거나 저가/중가/프리미엄 중 하나로 답해주시면 돼요. \
             {}원 이하는 저가, {}원 이하는 중가, 그보다 높으면 프리미엄으로 분류해요.",
            format_krw(super::brief::PriceBand::LOW_CEILING),
            format_krw(super::brief::PriceBand::MID_CEILING)
        ),
        MetaQuery::Rationale(path) => rationale(path).to_string(),
        MetaQuery::General => "궁금한 점은 편하게 물어봐 주세요.".to_string(),
    }
}
