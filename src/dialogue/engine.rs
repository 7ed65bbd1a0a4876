use super::brief::{Brief, FieldPath, FieldUpdate, FieldValue};
use super::collaborator::{ExtractionRequest, HistoryTurn, SemanticExtractor, gather_proposals};
use super::compose::{self, ComposeInput};
use super::extract::{self, ExtractionContext, meta};
use super::gate::{self, GateStatus};
use super::merge::{self, ExternalProposal};
use crate::config::DialogueConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Confidence of channels filled from the recommendation table.
const DELEGATED_CHANNEL_CONFIDENCE: f64 = 0.6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DialogueState {
    #[default]
    Collecting,
    /// Terminal for the collection loop; later turns only add soft detail.
    Ready,
}

/// A fresh conversation.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub session_id: String,
    pub brief: Brief,
    pub state: DialogueState,
    /// Opening assistant message.
    pub greeting: String,
}

/// Input to one turn. The caller owns the authoritative brief between turns
/// and must serialize turns per session.
#[derive(Debug, Clone, Default)]
pub struct TurnRequest {
    pub utterance: String,
    pub brief: Brief,
    pub state: DialogueState,
    pub external_updates: Vec<ExternalProposal>,
}

impl TurnRequest {
    pub fn new(utterance: impl Into<String>, brief: Brief) -> Self {
        Self {
            utterance: utterance.into(),
            brief,
            ..Self::default()
        }
    }

    pub fn with_state(mut self, state: DialogueState) -> Self {
        self.state = state;
        self
    }

    pub fn with_external_updates(mut self, proposals: Vec<ExternalProposal>) -> Self {
        self.external_updates = proposals;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnResult {
    pub state: DialogueState,
    pub brief: Brief,
    pub applied_updates: Vec<FieldUpdate>,
    pub gate: GateStatus,
    pub message: String,
}

pub struct DialogueEngine {
    config: DialogueConfig,
}

impl DialogueEngine {
    pub fn new(config: DialogueConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DialogueConfig {
        &self.config
    }

    pub fn new_session(&self) -> Session {
        let id = Uuid::new_v4().simple().to_string();
        Session {
            session_id: format!("sess_{}", &id[..16]),
            brief: Brief::default(),
            state: DialogueState::Collecting,
            greeting: self.toned(compose::greeting()),
        }
    }

    pub fn evaluate_gate(&self, brief: &Brief) -> GateStatus {
        gate::evaluate(brief, &self.config)
    }

    /// Run one utterance through merge, extraction, gate and composer.
    /// Never fails: ambiguity becomes conversation.
    pub fn process_turn(&self, request: TurnRequest) -> TurnResult {
        let TurnRequest {
            utterance,
            mut brief,
            state,
            external_updates,
        } = request;
        let message = utterance.trim();
        let expected = self.evaluate_gate(&brief).first_missing();

        let merged = merge::filter(&external_updates, &brief, message, expected);
        let mut notices = merged.notices;
        let mut applied: Vec<FieldUpdate> = Vec::new();
        for update in merged.updates {
            if brief.apply(&update) {
                applied.push(update);
            }
        }
        let externally_set: Vec<FieldPath> = applied.iter().map(|u| u.path).collect();

        let (mut extraction, question, lowered) = {
            let ctx = ExtractionContext::new(message, &brief, expected, &externally_set);
            (extract::run(&ctx), ctx.question, ctx.lowered.clone())
        };

        // A proposal the utterance itself contradicts is withdrawn.
        for conflict in &extraction.conflicts {
            if externally_set.contains(&conflict.path) {
                debug!(path = %conflict.path, "withdrawing contradicted external update");
                brief.clear(conflict.path);
                applied.retain(|u| u.path != conflict.path);
            }
        }

        let delegated = expected == Some(FieldPath::ChannelChannels)
            && brief.is_unset(FieldPath::ChannelChannels)
            && meta::is_delegation(&lowered)
            && !extraction
                .updates
                .iter()
                .any(|u| u.path == FieldPath::ChannelChannels);
        if delegated {
            extraction.updates.push(FieldUpdate::new(
                FieldPath::ChannelChannels,
                FieldValue::Channels(compose::recommend_channels(&brief)),
                DELEGATED_CHANNEL_CONFIDENCE,
            ));
        }

        for update in extraction.updates {
            if brief.apply(&update) {
                applied.push(update);
            }
        }
        notices.extend(extraction.notices);

        let gate = self.evaluate_gate(&brief);
        let was_ready = state == DialogueState::Ready;
        let next_state = if was_ready || gate.ready {
            DialogueState::Ready
        } else {
            DialogueState::Collecting
        };
        let meta = (question && !delegated).then(|| meta::classify(&lowered, expected));

        let message = self.toned(compose::compose(&ComposeInput {
            brief: &brief,
            gate: &gate,
            applied: &applied,
            conflicts: &extraction.conflicts,
            meta,
            delegated,
            was_ready,
            notices: &notices,
        }));

        debug!(
            applied = applied.len(),
            conflicts = extraction.conflicts.len(),
            completeness = gate.completeness,
            ready = gate.ready,
            "processed turn"
        );

        TurnResult {
            state: next_state,
            brief,
            applied_updates: applied,
            gate,
            message,
        }
    }

    fn toned(&self, message: String) -> String {
        match self.config.tone {
            Some(tone) => compose::with_tone(&message, tone),
            None => message,
        }
    }

    /// Turn with a semantic-extraction round-trip first. Collaborator
    /// failure degrades to local extraction.
    pub async fn converse(
        &self,
        extractor: Option<&dyn SemanticExtractor>,
        utterance: &str,
        brief: Brief,
        state: DialogueState,
        history: &[HistoryTurn],
    ) -> TurnResult {
        let proposals = if extractor.is_some() {
            let request = ExtractionRequest::new(
                state,
                self.evaluate_gate(&brief),
                brief.clone(),
                utterance,
                history,
                self.config.history_turns,
            );
            gather_proposals(extractor, &request, self.config.extractor_timeout()).await
        } else {
            Vec::new()
        };
        self.process_turn(
            TurnRequest::new(utterance, brief)
                .with_state(state)
                .with_external_updates(proposals),
        )
    }
}
