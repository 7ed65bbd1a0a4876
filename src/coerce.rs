//! Loosely typed values coming back from external collaborators.
//!
//! Semantic extraction and generation backends sometimes answer with a string
//! where a list was expected, a number where a string was expected, or a
//! nested map wrapping the real value. [`RawValue`] captures that shape once
//! and offers one coercion per target field kind, so callers never branch on
//! JSON types themselves.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::LazyLock;

static LIST_DELIMITERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,\n/|;·、]+").expect("list delimiter pattern"));

static SIGNED_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+").expect("integer pattern"));

static FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:json)?\s*(\{[\s\S]*\}|\[[\s\S]*\])\s*```").expect("fenced json pattern")
});
static EMBEDDED_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\{[\s\S]*\})").expect("embedded object pattern"));
static EMBEDDED_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\[[\s\S]*\])").expect("embedded array pattern"));

/// Map keys that commonly wrap a scalar answer.
const SCALAR_KEYS: &[&str] = &["value", "text", "name", "label"];

/// Map keys that commonly wrap a money amount.
const AMOUNT_KEYS: &[&str] = &["amount", "value", "krw", "cost", "budget"];

/// Map keys that commonly name the bucket of an amount entry.
const BUCKET_KEYS: &[&str] = &["name", "channel", "category", "item", "label"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<RawValue>),
    Map(BTreeMap<String, RawValue>),
}

impl From<serde_json::Value> for RawValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl RawValue {
    /// Single string answer.
    ///
    /// # Coercions
    ///
    /// - text -> trimmed text (empty becomes `None`)
    /// - number -> decimal rendering, integral values without a fraction
    /// - list -> first element that coerces
    /// - map -> first of `value` / `text` / `name` / `label`
    pub fn as_scalar(&self) -> Option<String> {
        match self {
            Self::Null | Self::Bool(_) => None,
            Self::Number(n) => Some(render_number(*n)),
            Self::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Self::List(items) => items.iter().find_map(Self::as_scalar),
            Self::Map(map) => SCALAR_KEYS
                .iter()
                .find_map(|key| map.get(*key).and_then(Self::as_scalar)),
        }
    }

    /// Ordered list of non-empty strings.
    ///
    /// Strings are split on the usual list delimiters (comma, slash, pipe,
    /// semicolon, middle dot, newline); lists are flattened one level; maps
    /// contribute their scalar values in key order.
    pub fn as_text_list(&self) -> Vec<String> {
        match self {
            Self::Null | Self::Bool(_) => Vec::new(),
            Self::Number(n) => vec![render_number(*n)],
            Self::Text(s) => split_list(s),
            Self::List(items) => items.iter().filter_map(Self::as_scalar).collect(),
            Self::Map(map) => map.values().filter_map(Self::as_scalar).collect(),
        }
    }

    /// Whole number, rounding floats and reading digits out of text.
    ///
    /// `"39,000원"` -> 39000, `12.6` -> 13, `{"amount": 5000}` -> 5000.
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Null | Self::Bool(_) | Self::List(_) => None,
            Self::Number(n) => n.is_finite().then(|| n.round() as i64),
            Self::Text(s) => {
                let compact = s.replace(',', "");
                SIGNED_INTEGER
                    .find(&compact)
                    .and_then(|m| m.as_str().parse().ok())
            }
            Self::Map(map) => AMOUNT_KEYS
                .iter()
                .find_map(|key| map.get(*key).and_then(Self::as_integer)),
        }
    }

    /// Enum value parsed from the scalar form.
    pub fn as_enum<T: FromStr>(&self) -> Option<T> {
        self.as_scalar()
            .and_then(|s| s.trim().to_lowercase().parse().ok())
    }

    /// Bucket name to whole amount.
    ///
    /// Accepts `{"instagram": 300000}` style maps (values may be wrapped or
    /// textual) and `[{"channel": "instagram", "amount": 300000}]` style
    /// lists. Entries without a usable amount are dropped.
    pub fn as_amount_map(&self) -> BTreeMap<String, i64> {
        match self {
            Self::Map(map) => map
                .iter()
                .filter_map(|(key, value)| value.as_integer().map(|n| (key.clone(), n)))
                .collect(),
            Self::List(items) => items
                .iter()
                .filter_map(|item| {
                    let Self::Map(entry) = item else {
                        return None;
                    };
                    let bucket = BUCKET_KEYS
                        .iter()
                        .find_map(|key| entry.get(*key).and_then(Self::as_scalar))?;
                    let amount = AMOUNT_KEYS
                        .iter()
                        .find_map(|key| entry.get(*key).and_then(Self::as_integer))?;
                    Some((bucket, amount))
                })
                .collect(),
            _ => BTreeMap::new(),
        }
    }

    /// Best-effort confidence in `[0, 1]`; anything unreadable yields `fallback`.
    pub fn as_confidence(&self, fallback: f64) -> f64 {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse().unwrap_or(fallback),
            _ => fallback,
        };
        if value.is_nan() {
            fallback.clamp(0.0, 1.0)
        } else {
            value.clamp(0.0, 1.0)
        }
    }
}

/// Split delimited text into trimmed, non-empty items.
pub fn split_list(text: &str) -> Vec<String> {
    LIST_DELIMITERS
        .split(text)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// First JSON document found in collaborator text: the whole text, a fenced
/// ```json block, or the outermost object/array embedded in prose.
pub fn extract_json(text: &str) -> Option<serde_json::Value> {
    let candidate = text.trim();
    if candidate.is_empty() {
        return None;
    }

    let mut variants = vec![candidate];
    for pattern in [&*FENCED_JSON, &*EMBEDDED_OBJECT, &*EMBEDDED_ARRAY] {
        if let Some(found) = pattern.captures(candidate).and_then(|caps| caps.get(1)) {
            variants.push(found.as_str().trim());
        }
    }

    variants
        .into_iter()
        .find_map(|variant| serde_json::from_str::<serde_json::Value>(variant).ok())
}

#[allow(clippy::cast_possible_truncation)]
fn render_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        (n as i64).to_string()
    } else {
        n.to_string()
    }
}
