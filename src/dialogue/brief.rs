use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// ── Field paths ──────────────────────────────────────────────────────────

/// Dot-qualified identifier of one brief attribute.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString,
)]
pub enum FieldPath {
    #[serde(rename = "product.name")]
    #[strum(serialize = "product.name")]
    ProductName,
    #[serde(rename = "product.category")]
    #[strum(serialize = "product.category")]
    ProductCategory,
    #[serde(rename = "product.features")]
    #[strum(serialize = "product.features")]
    ProductFeatures,
    #[serde(rename = "product.price_band")]
    #[strum(serialize = "product.price_band")]
    ProductPriceBand,
    #[serde(rename = "target.who")]
    #[strum(serialize = "target.who")]
    TargetWho,
    #[serde(rename = "target.why")]
    #[strum(serialize = "target.why")]
    TargetWhy,
    #[serde(rename = "channel.channels")]
    #[strum(serialize = "channel.channels")]
    ChannelChannels,
    #[serde(rename = "goal.weekly_goal")]
    #[strum(serialize = "goal.weekly_goal")]
    GoalWeeklyGoal,
    #[serde(rename = "goal.video_seconds")]
    #[strum(serialize = "goal.video_seconds")]
    GoalVideoSeconds,
}

/// Required paths in gate priority order. The first missing one is the next
/// question asked.
pub const REQUIRED_FIELDS: [FieldPath; 8] = [
    FieldPath::ProductName,
    FieldPath::ProductCategory,
    FieldPath::ProductFeatures,
    FieldPath::ProductPriceBand,
    FieldPath::TargetWho,
    FieldPath::TargetWhy,
    FieldPath::ChannelChannels,
    FieldPath::GoalWeeklyGoal,
];

/// Minimum distinct features for `product.features` to count as filled.
pub const MIN_FEATURES: usize = 3;
/// Hard cap on stored features.
pub const MAX_FEATURES: usize = 6;
/// Hard cap on stored channels.
pub const MAX_CHANNELS: usize = 2;

impl FieldPath {
    /// Korean display label used in questions and acknowledgments.
    pub fn label(self) -> &'static str {
        match self {
            Self::ProductName => "제품명",
            Self::ProductCategory => "카테고리",
            Self::ProductFeatures => "핵심 특징",
            Self::ProductPriceBand => "가격대",
            Self::TargetWho => "타겟 고객",
            Self::TargetWhy => "구매 이유",
            Self::ChannelChannels => "집중 채널",
            Self::GoalWeeklyGoal => "주간 목표",
            Self::GoalVideoSeconds => "영상 길이",
        }
    }

    pub fn is_required(self) -> bool {
        REQUIRED_FIELDS.contains(&self)
    }
}

// ── Enumerated slot values ───────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PriceBand {
    Low,
    Mid,
    Premium,
}

impl PriceBand {
    /// Upper bound (inclusive, KRW) of the low band.
    pub const LOW_CEILING: u64 = 30_000;
    /// Upper bound (inclusive, KRW) of the mid band.
    pub const MID_CEILING: u64 = 100_000;

    pub fn from_amount(amount: u64) -> Self {
        if amount <= Self::LOW_CEILING {
            Self::Low
        } else if amount <= Self::MID_CEILING {
            Self::Mid
        } else {
            Self::Premium
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "저가",
            Self::Mid => "중가",
            Self::Premium => "프리미엄",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum WeeklyGoal {
    Reach,
    Inquiry,
    Purchase,
}

impl WeeklyGoal {
    pub fn label(self) -> &'static str {
        match self {
            Self::Reach => "조회",
            Self::Inquiry => "문의",
            Self::Purchase => "구매",
        }
    }

    /// KPI phrase carried into the finalized launch brief.
    pub fn core_kpi(self) -> &'static str {
        match self {
            Self::Reach => "주간 조회수 증가",
            Self::Inquiry => "주간 문의 증가",
            Self::Purchase => "주간 구매 전환 증가",
        }
    }
}

/// Supported target lengths for generated video.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DurationClass {
    Short,
    Medium,
    Long,
}

impl DurationClass {
    pub const ALL: [Self; 3] = [Self::Short, Self::Medium, Self::Long];

    pub fn seconds(self) -> u32 {
        match self {
            Self::Short => 4,
            Self::Medium => 8,
            Self::Long => 12,
        }
    }

    /// Exact match on a supported second count.
    pub fn from_seconds(seconds: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.seconds() == seconds)
    }

    /// Closest supported class; ties resolve to the shorter one.
    pub fn nearest(requested: i64) -> Self {
        let requested = requested.max(1);
        let mut best = Self::Short;
        for class in Self::ALL {
            let distance = (i64::from(class.seconds()) - requested).abs();
            let best_distance = (i64::from(best.seconds()) - requested).abs();
            if distance < best_distance {
                best = class;
            }
        }
        best
    }

    /// "4/8/12" rendering for notices.
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|class| class.seconds().to_string())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Canonical channel set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum Channel {
    #[serde(rename = "Instagram")]
    #[strum(serialize = "Instagram")]
    Instagram,
    #[serde(rename = "YouTube Shorts")]
    #[strum(serialize = "YouTube Shorts")]
    YouTubeShorts,
    #[serde(rename = "YouTube")]
    #[strum(serialize = "YouTube")]
    YouTube,
    #[serde(rename = "Naver")]
    #[strum(serialize = "Naver")]
    Naver,
    #[serde(rename = "SmartStore")]
    #[strum(serialize = "SmartStore")]
    SmartStore,
    #[serde(rename = "Coupang")]
    #[strum(serialize = "Coupang")]
    Coupang,
    #[serde(rename = "TikTok")]
    #[strum(serialize = "TikTok")]
    TikTok,
    #[serde(rename = "KakaoTalk")]
    #[strum(serialize = "KakaoTalk")]
    KakaoTalk,
}

impl Channel {
    /// Declaration order doubles as match priority: longer synonyms that
    /// contain another channel's synonym come first.
    pub const ALL: [Self; 8] = [
        Self::Instagram,
        Self::YouTubeShorts,
        Self::YouTube,
        Self::Naver,
        Self::SmartStore,
        Self::Coupang,
        Self::TikTok,
        Self::KakaoTalk,
    ];

    /// Lowercase synonyms recognized in utterances.
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            Self::Instagram => &["인스타그램", "인스타", "instagram", "insta"],
            Self::YouTubeShorts => &["유튜브 쇼츠", "유튜브쇼츠", "유튜브숏", "youtube shorts", "쇼츠", "shorts"],
            Self::YouTube => &["유튜브", "youtube"],
            Self::Naver => &["네이버", "naver"],
            Self::SmartStore => &["스마트스토어", "smartstore", "smart store"],
            Self::Coupang => &["쿠팡", "coupang"],
            Self::TikTok => &["틱톡", "tiktok"],
            Self::KakaoTalk => &["카카오톡", "카톡", "카카오", "kakaotalk", "kakao"],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Instagram => "인스타그램",
            Self::YouTubeShorts => "유튜브 쇼츠",
            Self::YouTube => "유튜브",
            Self::Naver => "네이버",
            Self::SmartStore => "스마트스토어",
            Self::Coupang => "쿠팡",
            Self::TikTok => "틱톡",
            Self::KakaoTalk => "카카오톡",
        }
    }

    /// Resolve a free-text channel name (canonical name or any synonym).
    pub fn resolve(text: &str) -> Option<Self> {
        let lowered = text.trim().to_lowercase();
        if lowered.is_empty() {
            return None;
        }
        Self::ALL.into_iter().find(|channel| {
            channel.to_string().to_lowercase() == lowered
                || channel.synonyms().iter().any(|syn| lowered.contains(syn))
        })
    }
}

// ── Brief aggregate ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductSlots {
    pub name: Option<String>,
    pub category: Option<String>,
    pub features: Vec<String>,
    pub price_band: Option<PriceBand>,
    pub image_url: Option<String>,
    pub image_context: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSlots {
    pub who: Option<String>,
    pub why: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSlots {
    pub channels: Vec<Channel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalSlots {
    pub weekly_goal: Option<WeeklyGoal>,
    pub video_duration: Option<DurationClass>,
}

/// The structured aggregate collected across a conversation, persisted by
/// the caller as four field-group documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Brief {
    pub product: ProductSlots,
    pub target: TargetSlots,
    pub channel: ChannelSlots,
    pub goal: GoalSlots,
}

/// Value carried by a [`FieldUpdate`]. List updates carry the full merged
/// list, not a delta.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Channels(Vec<Channel>),
    PriceBand(PriceBand),
    Goal(WeeklyGoal),
    Duration(DurationClass),
}

impl FieldValue {
    /// Short human rendering; lists show their first three entries.
    pub fn display(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::List(items) => items.iter().take(3).cloned().collect::<Vec<_>>().join(", "),
            Self::Channels(channels) => channels
                .iter()
                .take(3)
                .map(|c| c.label())
                .collect::<Vec<_>>()
                .join(", "),
            Self::PriceBand(band) => band.label().to_string(),
            Self::Goal(goal) => goal.label().to_string(),
            Self::Duration(class) => format!("{}초", class.seconds()),
        }
    }
}

/// One proposed mutation of the brief.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldUpdate {
    pub path: FieldPath,
    pub value: FieldValue,
    pub confidence: f64,
}

impl FieldUpdate {
    pub fn new(path: FieldPath, value: FieldValue, confidence: f64) -> Self {
        Self {
            path,
            value,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

impl Brief {
    /// Whether `path` satisfies its gate check.
    pub fn is_filled(&self, path: FieldPath) -> bool {
        match path {
            FieldPath::ProductName => has_text(self.product.name.as_ref()),
            FieldPath::ProductCategory => has_text(self.product.category.as_ref()),
            FieldPath::ProductFeatures => self.product.features.len() >= MIN_FEATURES,
            FieldPath::ProductPriceBand => self.product.price_band.is_some(),
            FieldPath::TargetWho => has_text(self.target.who.as_ref()),
            FieldPath::TargetWhy => has_text(self.target.why.as_ref()),
            FieldPath::ChannelChannels => {
                (1..=MAX_CHANNELS).contains(&self.channel.channels.len())
            }
            FieldPath::GoalWeeklyGoal => self.goal.weekly_goal.is_some(),
            FieldPath::GoalVideoSeconds => self.goal.video_duration.is_some(),
        }
    }

    /// Whether `path` holds nothing at all (a partial feature list is not
    /// empty).
    pub fn is_unset(&self, path: FieldPath) -> bool {
        match path {
            FieldPath::ProductFeatures => self.product.features.is_empty(),
            FieldPath::ChannelChannels => self.channel.channels.is_empty(),
            other => !self.is_filled(other),
        }
    }

    /// Current value of `path`, if any.
    pub fn value_of(&self, path: FieldPath) -> Option<FieldValue> {
        let text = |value: &Option<String>| {
            value
                .as_ref()
                .filter(|v| !v.trim().is_empty())
                .map(|v| FieldValue::Text(v.clone()))
        };
        match path {
            FieldPath::ProductName => text(&self.product.name),
            FieldPath::ProductCategory => text(&self.product.category),
            FieldPath::ProductFeatures => (!self.product.features.is_empty())
                .then(|| FieldValue::List(self.product.features.clone())),
            FieldPath::ProductPriceBand => self.product.price_band.map(FieldValue::PriceBand),
            FieldPath::TargetWho => text(&self.target.who),
            FieldPath::TargetWhy => text(&self.target.why),
            FieldPath::ChannelChannels => (!self.channel.channels.is_empty())
                .then(|| FieldValue::Channels(self.channel.channels.clone())),
            FieldPath::GoalWeeklyGoal => self.goal.weekly_goal.map(FieldValue::Goal),
            FieldPath::GoalVideoSeconds => self.goal.video_duration.map(FieldValue::Duration),
        }
    }

    /// Empty `path` again.
    pub fn clear(&mut self, path: FieldPath) {
        match path {
            FieldPath::ProductName => self.product.name = None,
            FieldPath::ProductCategory => self.product.category = None,
            FieldPath::ProductFeatures => self.product.features.clear(),
            FieldPath::ProductPriceBand => self.product.price_band = None,
            FieldPath::TargetWho => self.target.who = None,
            FieldPath::TargetWhy => self.target.why = None,
            FieldPath::ChannelChannels => self.channel.channels.clear(),
            FieldPath::GoalWeeklyGoal => self.goal.weekly_goal = None,
            FieldPath::GoalVideoSeconds => self.goal.video_duration = None,
        }
    }

    /// Apply one update. Returns `false` (and leaves the brief untouched) when
    /// the value kind does not belong to the path.
    pub fn apply(&mut self, update: &FieldUpdate) -> bool {
        match (update.path, &update.value) {
            (FieldPath::ProductName, FieldValue::Text(v)) => self.product.name = Some(v.clone()),
            (FieldPath::ProductCategory, FieldValue::Text(v)) => {
                self.product.category = Some(v.clone());
            }
            (FieldPath::ProductFeatures, FieldValue::List(items)) => {
                self.product.features = super::canonical::merge_unique(&[], items, MAX_FEATURES);
            }
            (FieldPath::ProductPriceBand, FieldValue::PriceBand(band)) => {
                self.product.price_band = Some(*band);
            }
            (FieldPath::TargetWho, FieldValue::Text(v)) => self.target.who = Some(v.clone()),
            (FieldPath::TargetWhy, FieldValue::Text(v)) => self.target.why = Some(v.clone()),
            (FieldPath::ChannelChannels, FieldValue::Channels(channels)) => {
                self.channel.channels = super::canonical::merge_channels(&[], channels);
            }
            (FieldPath::GoalWeeklyGoal, FieldValue::Goal(goal)) => {
                self.goal.weekly_goal = Some(*goal);
            }
            (FieldPath::GoalVideoSeconds, FieldValue::Duration(class)) => {
                self.goal.video_duration = Some(*class);
            }
            (path, value) => {
                tracing::debug!(%path, ?value, "ignoring update with mismatched value kind");
                return false;
            }
        }
        true
    }
}

fn has_text(value: Option<&String>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}
