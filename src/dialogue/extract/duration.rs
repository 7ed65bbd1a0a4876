use super::{ExtractionContext, ExtractorOutput};
use crate::dialogue::brief::{DurationClass, FieldPath, FieldUpdate, FieldValue};
use regex::Regex;
use std::sync::LazyLock;

const VIDEO_KEYWORDS: &[&str] = &["영상", "비디오", "video", "광고", "숏폼", "쇼츠"];

/// "영상 길이는 10초", "video: 6s"
static KEYWORD_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:영상|비디오|video|광고|숏폼|쇼츠)\s*(?:길이|시간|분량|duration|length)?\s*(?:은|는|을|를|:)?\s*(\d{1,3})\s*(?:초|s\b|sec)",
    )
    .expect("keyword-first duration pattern")
});

/// "15초짜리 영상", "8 seconds video"
static SECONDS_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d{1,3})\s*(?:초|sec(?:onds?)?|s\b)\s*(?:짜리|분량)?\s*(?:의\s*)?(?:영상|비디오|video|광고|숏폼|쇼츠)",
    )
    .expect("seconds-first duration pattern")
});

static ANY_SECONDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,3})\s*초").expect("seconds pattern"));

/// The whole utterance is a bare length ("12초", "8s").
static BARE_SECONDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{1,3})\s*(?:초|sec|seconds?|s)$").expect("bare seconds pattern")
});

pub fn extract(ctx: &ExtractionContext<'_>) -> ExtractorOutput {
    let Some(requested) = requested_seconds(&ctx.lowered) else {
        return ExtractorOutput::default();
    };
    let normalized = DurationClass::nearest(requested);
    let previous = ctx.brief.goal.video_duration;
    let notice = duration_notice(requested, normalized, previous);
    let update = (previous != Some(normalized)).then(|| {
        FieldUpdate::new(
            FieldPath::GoalVideoSeconds,
            FieldValue::Duration(normalized),
            0.93,
        )
    });
    ExtractorOutput { update, notice }
}

fn requested_seconds(lowered: &str) -> Option<i64> {
    let capture = |pattern: &Regex| -> Option<i64> {
        pattern.captures(lowered)?.get(1)?.as_str().parse().ok()
    };
    capture(&KEYWORD_FIRST)
        .or_else(|| capture(&SECONDS_FIRST))
        .or_else(|| {
            VIDEO_KEYWORDS
                .iter()
                .any(|k| lowered.contains(k))
                .then(|| capture(&ANY_SECONDS))
                .flatten()
        })
        .or_else(|| capture(&BARE_SECONDS))
}

/// User-facing notice for a duration request, or `None` when nothing changed.
pub fn duration_notice(
    requested: i64,
    normalized: DurationClass,
    previous: Option<DurationClass>,
) -> Option<String> {
    let seconds = normalized.seconds();
    if requested != i64::from(seconds) {
        return Some(format!(
            "영상 길이 {requested}초는 지원 범위를 벗어나 {seconds}초로 보정했어요. (지원: {}초)",
            DurationClass::supported_list()
        ));
    }
    match previous {
        None => Some(format!("영상 길이를 {seconds}초로 설정했어요.")),
        Some(prev) if prev != normalized => Some(format!("영상 길이를 {seconds}초로 변경했어요.")),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::brief::Brief;

    fn run(message: &str, brief: &Brief) -> ExtractorOutput {
        let ctx = ExtractionContext::new(message, brief, None, &[]);
        extract(&ctx)
    }

    #[test]
    fn recognizes_phrasings() {
        assert_eq!(requested_seconds("영상 길이는 12초로 해주세요"), Some(12));
        assert_eq!(requested_seconds("15초짜리 광고"), Some(15));
        assert_eq!(requested_seconds("8 seconds video"), Some(8));
        assert_eq!(requested_seconds("쇼츠용으로 한 6초 정도"), Some(6));
        assert_eq!(requested_seconds("4초"), Some(4));
        assert_eq!(requested_seconds("30초 만에 흡수"), None);
    }

    #[test]
    fn out_of_range_is_corrected_with_notice() {
        let brief = Brief::default();
        let output = run("영상 30초", &brief);
        assert_eq!(
            output.update.map(|u| u.value),
            Some(FieldValue::Duration(DurationClass::Long))
        );
        assert_eq!(
            output.notice.as_deref(),
            Some("영상 길이 30초는 지원 범위를 벗어나 12초로 보정했어요. (지원: 4/8/12초)")
        );
    }

    #[test]
    fn set_change_and_unchanged_notices() {
        let mut brief = Brief::default();
        assert_eq!(
            run("영상 8초", &brief).notice.as_deref(),
            Some("영상 길이를 8초로 설정했어요.")
        );

        brief.goal.video_duration = Some(DurationClass::Medium);
        let unchanged = run("영상 8초", &brief);
        assert!(unchanged.update.is_none());
        assert!(unchanged.notice.is_none());

        assert_eq!(
            run("영상 4초", &brief).notice.as_deref(),
            Some("영상 길이를 4초로 변경했어요.")
        );
    }

    #[test]
    fn ties_resolve_to_shorter_class() {
        let brief = Brief::default();
        let output = run("영상 10초", &brief);
        assert_eq!(
            output.update.map(|u| u.value),
            Some(FieldValue::Duration(DurationClass::Medium))
        );
    }
}
