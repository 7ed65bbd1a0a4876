#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unnecessary_literal_bound,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod app;
pub mod cli;
pub mod coerce;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod jobs;
pub mod pipeline;
pub mod utils;

pub use config::Config;
pub use dialogue::{Brief, DialogueEngine, GateStatus};
pub use error::{LaunchError, Result};
pub use jobs::JobRegistry;
pub use pipeline::{GenerationPackage, LaunchBrief, PhaseExecutor};
