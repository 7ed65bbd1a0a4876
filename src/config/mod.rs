pub mod schema;

pub use schema::{
    Config, DialogueConfig, MediaConfig, ObservabilityConfig, PipelineConfig, ReplyTone,
};
