use super::brief::{Brief, FieldPath, REQUIRED_FIELDS};
use super::engine::DialogueState;
use super::gate::GateStatus;
use super::merge::ExternalProposal;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: Role,
    pub content: String,
}

impl HistoryTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Snapshot handed to the semantic-extraction collaborator for one turn.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionRequest {
    pub state: DialogueState,
    pub gate: GateStatus,
    pub brief: Brief,
    pub utterance: String,
    /// Most recent turns, oldest first.
    pub history: Vec<HistoryTurn>,
    pub allowed_paths: Vec<FieldPath>,
}

impl ExtractionRequest {
    pub fn new(
        state: DialogueState,
        gate: GateStatus,
        brief: Brief,
        utterance: impl Into<String>,
        history: &[HistoryTurn],
        max_turns: usize,
    ) -> Self {
        let skip = history.len().saturating_sub(max_turns);
        let mut allowed_paths = REQUIRED_FIELDS.to_vec();
        allowed_paths.push(FieldPath::GoalVideoSeconds);
        Self {
            state,
            gate,
            brief,
            utterance: utterance.into(),
            history: history[skip..].to_vec(),
            allowed_paths,
        }
    }
}

/// External semantic extraction (typically an LLM call).
///
/// Implementations may use [`super::merge::parse_proposals`] to read raw
/// model output. Everything returned is filtered before it touches a brief.
pub trait SemanticExtractor: Send + Sync {
    fn name(&self) -> &str;

    fn propose<'a>(
        &'a self,
        request: &'a ExtractionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ExternalProposal>>> + Send + 'a>>;
}

/// Ask the collaborator for proposals. Failure and timeout both mean "no
/// proposals"; the turn continues with local extraction only.
pub async fn gather_proposals(
    extractor: Option<&dyn SemanticExtractor>,
    request: &ExtractionRequest,
    timeout: Duration,
) -> Vec<ExternalProposal> {
    let Some(extractor) = extractor else {
        return Vec::new();
    };
    match tokio::time::timeout(timeout, extractor.propose(request)).await {
        Ok(Ok(proposals)) => proposals,
        Ok(Err(e)) => {
            warn!(extractor = extractor.name(), "semantic extraction failed: {e:#}");
            Vec::new()
        }
        Err(_) => {
            warn!(
                extractor = extractor.name(),
                timeout_secs = timeout.as_secs(),
                "semantic extraction timed out"
            );
            Vec::new()
        }
    }
}
