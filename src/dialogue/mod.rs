//! Slot-filling dialogue: turns free-form Korean utterances into a launch
//! brief and decides, turn by turn, when the brief is ready.
//!
//! Per turn: external proposals are filtered and merged ([`merge`]), the
//! extractor table runs over the utterance ([`extract`]), price candidates go
//! through the conflict check ([`conflict`]), the gate is re-evaluated
//! ([`gate`]) and the composer writes the reply ([`compose`]).

pub mod brief;
pub mod canonical;
pub mod collaborator;
pub mod compose;
pub mod conflict;
pub mod engine;
pub mod extract;
pub mod gate;
pub mod merge;

pub use brief::{
    Brief, Channel, DurationClass, FieldPath, FieldUpdate, FieldValue, PriceBand, REQUIRED_FIELDS,
    WeeklyGoal,
};
pub use collaborator::{ExtractionRequest, HistoryTurn, Role, SemanticExtractor};
pub use engine::{DialogueEngine, DialogueState, Session, TurnRequest, TurnResult};
pub use gate::GateStatus;
pub use merge::{ExternalProposal, parse_proposals};
