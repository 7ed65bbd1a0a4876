//! Three-phase generation pipeline.
//!
//! A finalized [`LaunchBrief`] feeds nine generation tasks in three phases:
//! research, positioning and feasibility run first; the launch plan, campaign
//! and budget are synthesized from their summaries; the video script, poster
//! and product copy are drafted last. Raw task answers go through the lenient
//! decoder in [`payload`], creative text is fitted to the video length in
//! [`fitting`], and an optional [`media`] stage renders the poster and video.

pub mod brief;
pub mod executor;
pub mod fitting;
pub mod media;
pub mod payload;
pub mod progress;
pub mod risks;
pub mod tasks;

pub use brief::LaunchBrief;
pub use executor::PhaseExecutor;
pub use media::{ImageRequest, KeyframeRequest, MediaBackend, MediaStage, VideoRequest};
pub use payload::{GenerationPackage, MarketingAssets, StageOutput, TaskPayload, TimelineEntry};
pub use progress::ProgressSink;
pub use tasks::{GenerationBackend, Stage, TaskKind, TaskRequest};
