//! Fit generated narration and scene lists to a video duration class.
//!
//! Every length below is counted in characters. The output narration never
//! exceeds `max_chars` and the scene list never exceeds `max_scenes`.

use crate::dialogue::DurationClass;
use crate::utils::text::{char_len, clip_chars, collapse_whitespace};

const SENTENCE_TERMINATORS: [char; 6] = ['.', '!', '?', '。', '！', '？'];
const CUT_PUNCTUATION: [char; 6] = ['.', ',', '!', '?', ';', ':'];
const EDGE_NOISE: [char; 8] = [' ', ',', '.', ';', ':', '|', '-', '/'];
const PART_NOISE: [char; 5] = [' ', ',', '.', ';', ':'];
const NATURAL_ENDINGS: [&str; 3] = ["요", "다", "죠"];
const DANGLING_CONNECTORS: [&str; 6] = ["그리고", "및", "또", "또는", "하지만", "그러나"];
const LAST_RESORT: &str = "핵심만 전달합니다";

/// Text limits for one duration class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrationBudget {
    pub max_chars: usize,
    pub max_sentences: usize,
    pub max_scenes: usize,
    pub scene_chars: usize,
    pub cta_chars: usize,
}

impl NarrationBudget {
    pub fn for_class(class: DurationClass) -> Self {
        match class {
            DurationClass::Short => Self {
                max_chars: 28,
                max_sentences: 1,
                max_scenes: 3,
                scene_chars: 26,
                cta_chars: 8,
            },
            DurationClass::Medium => Self {
                max_chars: 56,
                max_sentences: 2,
                max_scenes: 4,
                scene_chars: 34,
                cta_chars: 12,
            },
            DurationClass::Long => Self {
                max_chars: 84,
                max_sentences: 3,
                max_scenes: 5,
                scene_chars: 42,
                cta_chars: 14,
            },
        }
    }

    fn percent(self, pct: usize) -> usize {
        self.max_chars * pct / 100
    }
}

fn fallback_sentence(class: DurationClass) -> &'static str {
    match class {
        DurationClass::Short => "핵심만 빠르게 전합니다.",
        DurationClass::Medium => "핵심만 짧게 전하고, 바로 행동으로 이어갑니다.",
        DurationClass::Long => "핵심 혜택을 짧게 전달하고, 자연스럽게 행동으로 연결합니다.",
    }
}

fn fallback_scenes(class: DurationClass) -> &'static [&'static str] {
    match class {
        DurationClass::Short => &["제품 클로즈업 훅", "핵심 효능 1컷", "짧은 CTA"],
        DurationClass::Medium => &["훅 클로즈업", "사용 장면", "핵심 효능", "마무리 CTA"],
        DurationClass::Long => &["문제 제시 훅", "제품 제시", "사용 장면", "효능 강조", "마무리 CTA"],
    }
}

/// Fit `raw` narration (plus an optional call to action) into the budget of
/// `class`.
pub fn fit_narration(raw: &str, cta: &str, class: DurationClass) -> String {
    let budget = NarrationBudget::for_class(class);
    let max = budget.max_chars;

    let mut cleaned = collapse_whitespace(raw);
    if cleaned.is_empty() {
        cleaned = fallback_sentence(class).to_string();
    }
    let parts = split_sentences(&cleaned);

    let mut kept: Vec<&str> = Vec::new();
    for part in parts.iter().take(budget.max_sentences) {
        let mut candidate = kept.clone();
        candidate.push(part);
        if char_len(&candidate.join(". ")) <= max {
            kept.push(part);
        } else {
            break;
        }
    }

    let mut fitted = if kept.is_empty() {
        fit_words(parts.first().map_or(cleaned.as_str(), String::as_str), budget)
    } else {
        kept.join(". ").trim_matches([' ', '.']).to_string()
    };

    let short_cta = collapse_whitespace(cta);
    let short_cta = clip_chars(&short_cta, budget.cta_chars).trim_matches([' ', '.']);
    if !short_cta.is_empty() && !fitted.contains(short_cta) {
        let separator = if ends_with_terminator(&fitted) { " " } else { ". " };
        let candidate = format!("{fitted}{separator}{short_cta}");
        let candidate = candidate.trim_matches([' ', '.']);
        if char_len(candidate) <= max {
            fitted = candidate.to_string();
        }
    }

    if char_len(&fitted) > max {
        fitted = cut_to_budget(&fitted, budget);
    }

    if fitted.is_empty() {
        fitted = clip_chars(&cleaned, max).trim_matches([' ', '.']).to_string();
    }
    if fitted.is_empty() {
        fitted = LAST_RESORT.to_string();
    }
    if cleaned != fitted {
        fitted = ensure_natural(fitted, class, budget);
    }
    fitted
}

/// Clean, clip and cap a scene list; an empty result becomes the default
/// scene list of `class`.
pub fn fit_scenes(scenes: &[String], class: DurationClass) -> Vec<String> {
    let budget = NarrationBudget::for_class(class);
    let mut fitted: Vec<String> = Vec::new();
    for raw in scenes {
        let item = collapse_whitespace(raw);
        let item = item.trim_start_matches(|c: char| {
            c.is_ascii_digit() || c.is_whitespace() || matches!(c, '-' | '.' | ')' | '(' | ':')
        });
        let item = if char_len(item) > budget.scene_chars {
            clip_chars(item, budget.scene_chars).trim_end_matches(EDGE_NOISE)
        } else {
            item
        };
        if !item.is_empty() {
            fitted.push(item.to_string());
        }
        if fitted.len() >= budget.max_scenes {
            break;
        }
    }

    if fitted.is_empty() {
        fallback_scenes(class).iter().map(|s| (*s).to_string()).collect()
    } else {
        fitted
    }
}

/// Split on runs of sentence terminators. A terminator right after a digit
/// stays in the text so decimals like "3.5" survive.
fn split_sentences(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;
    let mut in_break = false;

    for c in text.chars() {
        let is_terminator = SENTENCE_TERMINATORS.contains(&c);
        let starts_break = is_terminator && !prev.is_some_and(|p| p.is_ascii_digit());
        if (in_break && is_terminator) || starts_break || c == '\n' {
            if !in_break {
                parts.push(std::mem::take(&mut current));
            }
            in_break = true;
        } else {
            in_break = false;
            current.push(c);
        }
        prev = Some(c);
    }
    parts.push(current);

    parts
        .iter()
        .map(|part| collapse_whitespace(part).trim_matches(PART_NOISE).to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

fn fit_words(source: &str, budget: NarrationBudget) -> String {
    let max = budget.max_chars;
    let mut kept: Vec<&str> = Vec::new();
    for token in source.split_whitespace() {
        let mut candidate = kept.clone();
        candidate.push(token);
        if char_len(&candidate.join(" ")) <= max {
            kept.push(token);
        } else {
            break;
        }
    }
    let joined = kept.join(" ");
    let fitted = joined.trim_matches(EDGE_NOISE);
    if !fitted.is_empty() {
        return fitted.to_string();
    }

    let hard = clip_chars(source, max).trim_end_matches(EDGE_NOISE);
    if hard.contains(' ')
        && char_len(hard) > budget.percent(60)
        && let Some((head, _)) = hard.rsplit_once(' ')
    {
        return head.trim_end_matches(EDGE_NOISE).to_string();
    }
    hard.to_string()
}

/// Hard cut to `max_chars`, preferring a late punctuation mark, then a late
/// word boundary.
fn cut_to_budget(text: &str, budget: NarrationBudget) -> String {
    let trimmed = clip_chars(text, budget.max_chars).trim_end_matches(EDGE_NOISE);
    let punctuation_cut = trimmed
        .chars()
        .enumerate()
        .filter(|(_, c)| CUT_PUNCTUATION.contains(c))
        .map(|(idx, _)| idx)
        .last();

    let cut = match punctuation_cut {
        Some(idx) if idx >= budget.percent(45) => clip_chars(trimmed, idx),
        _ if trimmed.contains(' ') && char_len(trimmed) > budget.percent(65) => trimmed
            .rsplit_once(' ')
            .map_or(trimmed, |(head, _)| head),
        _ => trimmed,
    };
    cut.trim_matches([' ', '.']).to_string()
}

/// Replace likely sentence fragments with the class fallback sentence.
fn ensure_natural(text: String, class: DurationClass, budget: NarrationBudget) -> String {
    let len = char_len(&text);
    let too_short = len < budget.percent(35).max(6);
    let natural_ending = NATURAL_ENDINGS.iter().any(|ending| text.ends_with(ending));
    let sentence_ending = ends_with_terminator(&text);
    let tail_len = text.split_whitespace().last().map_or(0, char_len);
    let dangling = DANGLING_CONNECTORS.iter().any(|word| text.ends_with(word));
    let fragment = tail_len <= 1 || text.ends_with(',') || dangling;

    if class == DurationClass::Short && !natural_ending && !sentence_ending {
        if fragment || text.contains(',') {
            return fallback_sentence(class).to_string();
        }
        if len < budget.max_chars {
            return format!("{text}.");
        }
        return text;
    }
    if too_short || (!natural_ending && !sentence_ending && fragment) {
        return fallback_sentence(class).to_string();
    }
    text
}

fn ends_with_terminator(text: &str) -> bool {
    text.chars()
        .last()
        .is_some_and(|c| SENTENCE_TERMINATORS.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budgets_follow_duration() {
        assert_eq!(NarrationBudget::for_class(DurationClass::Short).max_chars, 28);
        assert_eq!(NarrationBudget::for_class(DurationClass::Medium).max_sentences, 2);
        assert_eq!(NarrationBudget::for_class(DurationClass::Long).max_scenes, 5);
    }

    #[test]
    fn short_script_passes_unchanged() {
        let fitted = fit_narration("예민한 날에도 편안한 세럼이에요", "", DurationClass::Medium);
        assert_eq!(fitted, "예민한 날에도 편안한 세럼이에요");
    }

    #[test]
    fn sentences_are_capped_by_class() {
        let raw = "하루 종일 촉촉해요. 흡수가 빨라요. 지금 만나보세요.";
        let fitted = fit_narration(raw, "", DurationClass::Medium);
        assert_eq!(fitted, "하루 종일 촉촉해요. 흡수가 빨라요");
        assert!(char_len(&fitted) <= 56);
    }

    #[test]
    fn decimals_are_not_sentence_breaks() {
        let parts = split_sentences("보습력 3.5배 향상! 오늘 확인하세요");
        assert_eq!(parts, vec!["보습력 3.5배 향상", "오늘 확인하세요"]);
    }

    #[test]
    fn cta_is_appended_when_it_fits() {
        let fitted = fit_narration("하루 종일 촉촉해요.", "지금 바로 구매하세요", DurationClass::Medium);
        assert_eq!(fitted, "하루 종일 촉촉해요. 지금 바로 구매하세요");
    }

    #[test]
    fn empty_script_uses_class_fallback() {
        assert_eq!(
            fit_narration("   ", "", DurationClass::Long),
            "핵심 혜택을 짧게 전달하고, 자연스럽게 행동으로 연결합니다"
        );
    }

    #[test]
    fn dangling_fragment_is_replaced() {
        let raw = "민감 피부를 위한 저자극 순한 세럼 그리고 빠른흡수력";
        assert_eq!(fit_narration(raw, "", DurationClass::Short), "핵심만 빠르게 전합니다.");
    }

    #[test]
    fn short_class_closes_clean_cuts_with_a_period() {
        let raw = "민감한 피부를 위한 저자극 포뮬러로 하루 종일 편안한 사용감을 드립니다";
        assert_eq!(
            fit_narration(raw, "", DurationClass::Short),
            "민감한 피부를 위한 저자극 포뮬러로 하루 종일."
        );
    }

    #[test]
    fn narration_never_exceeds_budget() {
        let long_sentence = "아주 길고 장황한 설명이 계속 이어지는 문장 ".repeat(20);
        let many_sentences = "짧은 문장입니다. ".repeat(30);
        let no_spaces = "가".repeat(500);
        for class in DurationClass::ALL {
            let max = NarrationBudget::for_class(class).max_chars;
            for raw in [&long_sentence, &many_sentences, &no_spaces] {
                let fitted = fit_narration(raw, "지금 바로 확인하세요 그리고 구매", class);
                assert!(char_len(&fitted) <= max, "{class}: {fitted}");
                assert!(!fitted.is_empty());
            }
        }
    }

    #[test]
    fn scenes_are_cleaned_clipped_and_capped() {
        let scenes: Vec<String> = vec![
            "1) 제품 클로즈업".into(),
            "- 사용 장면".into(),
            "  ".into(),
            "3. 아주 길게 묘사된 장면 설명으로 예산을 넘기는 문장입니다".into(),
            "4: 마무리".into(),
            "5) 초과 장면".into(),
        ];
        let fitted = fit_scenes(&scenes, DurationClass::Short);
        assert_eq!(fitted.len(), 3);
        assert_eq!(fitted[0], "제품 클로즈업");
        assert_eq!(fitted[1], "사용 장면");
        assert!(char_len(&fitted[2]) <= 26);
    }

    #[test]
    fn empty_scene_list_uses_fallback() {
        assert_eq!(
            fit_scenes(&[], DurationClass::Medium),
            vec!["훅 클로즈업", "사용 장면", "핵심 효능", "마무리 CTA"]
        );
    }

    #[test]
    fn scene_count_never_exceeds_budget() {
        let scenes: Vec<String> = (0..40).map(|i| format!("{i}. 장면 {i}")).collect();
        for class in DurationClass::ALL {
            let budget = NarrationBudget::for_class(class);
            let fitted = fit_scenes(&scenes, class);
            assert!(fitted.len() <= budget.max_scenes);
            assert!(fitted.iter().all(|s| char_len(s) <= budget.scene_chars));
        }
    }
}
