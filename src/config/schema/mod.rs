mod core;
mod dialogue;
mod media;
mod observability;
mod pipeline;

pub use core::Config;
pub use dialogue::{DialogueConfig, ReplyTone};
pub use media::MediaConfig;
pub use observability::ObservabilityConfig;
pub use pipeline::PipelineConfig;
