use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use anyhow::{Result, bail};
use launch_studio::config::DialogueConfig;
use launch_studio::dialogue::{
    Brief, DialogueEngine, DialogueState, ExternalProposal, ExtractionRequest, FieldPath,
    HistoryTurn, SemanticExtractor, parse_proposals,
};

/// Replays a raw collaborator answer and records what it was asked.
struct RawAnswer {
    text: &'static str,
    seen: Mutex<Vec<ExtractionRequest>>,
}

impl RawAnswer {
    fn new(text: &'static str) -> Self {
        Self {
            text,
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl SemanticExtractor for RawAnswer {
    fn name(&self) -> &str {
        "raw-answer"
    }

    fn propose<'a>(
        &'a self,
        request: &'a ExtractionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ExternalProposal>>> + Send + 'a>> {
        self.seen.lock().unwrap().push(request.clone());
        Box::pin(async move { Ok(parse_proposals(self.text)) })
    }
}

struct Down;

impl SemanticExtractor for Down {
    fn name(&self) -> &str {
        "down"
    }

    fn propose<'a>(
        &'a self,
        _request: &'a ExtractionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ExternalProposal>>> + Send + 'a>> {
        Box::pin(async { bail!("connection refused") })
    }
}

fn engine() -> DialogueEngine {
    DialogueEngine::new(DialogueConfig {
        history_turns: 2,
        ..DialogueConfig::default()
    })
}

#[tokio::test]
async fn fenced_collaborator_answer_is_merged() {
    let extractor = RawAnswer::new(
        "추출 결과입니다.\n```json\n{\"updates\": [\
         {\"path\": \"product.name\", \"value\": \"글로우세럼X\", \"confidence\": 0.9},\
         {\"path\": \"product.category\", \"value\": \"스킨케어\"},\
         {\"path\": \"target.who\", \"value\": [\"20대 직장인\"]},\
         {\"path\": \"product.color\", \"value\": \"red\"}\
         ]}\n```",
    );
    let history = vec![
        HistoryTurn::assistant("제품명을 알려주세요."),
        HistoryTurn::user("잠시만요"),
        HistoryTurn::assistant("천천히 알려주세요."),
    ];

    let result = engine()
        .converse(
            Some(&extractor),
            "제 제품 소개할게요",
            Brief::default(),
            DialogueState::Collecting,
            &history,
        )
        .await;

    assert_eq!(result.brief.product.name.as_deref(), Some("글로우세럼X"));
    assert_eq!(result.brief.product.category.as_deref(), Some("스킨케어"));
    assert_eq!(result.brief.target.who.as_deref(), Some("20대 직장인"));
    let paths: Vec<FieldPath> = result.applied_updates.iter().map(|u| u.path).collect();
    assert!(paths.contains(&FieldPath::ProductName));
    assert!(paths.contains(&FieldPath::TargetWho));

    let seen = extractor.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].utterance, "제 제품 소개할게요");
    assert_eq!(seen[0].history.len(), 2);
}

#[tokio::test]
async fn collaborator_cannot_overwrite_user_answers() {
    let extractor = RawAnswer::new(
        "[{\"path\": \"product.name\", \"value\": \"다른 이름\", \"confidence\": 0.99}]",
    );
    let mut brief = Brief::default();
    brief.product.name = Some("글로우세럼X".into());

    let result = engine()
        .converse(Some(&extractor), "네", brief, DialogueState::Collecting, &[])
        .await;

    assert_eq!(result.brief.product.name.as_deref(), Some("글로우세럼X"));
}

#[tokio::test]
async fn failing_collaborator_falls_back_to_local_extraction() {
    let result = engine()
        .converse(
            Some(&Down),
            "글로우세럼X",
            Brief::default(),
            DialogueState::Collecting,
            &[],
        )
        .await;

    assert_eq!(result.brief.product.name.as_deref(), Some("글로우세럼X"));
    assert_eq!(result.state, DialogueState::Collecting);
}

#[test]
fn unparseable_collaborator_text_yields_nothing() {
    assert!(parse_proposals("죄송하지만 추출할 내용이 없습니다.").is_empty());
    assert!(parse_proposals("{\"updates\": \"none\"}").is_empty());
}
