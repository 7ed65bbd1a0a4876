use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for Launch Studio.
///
/// Dialogue turns never fail; ambiguity stays inside the conversation. Only
/// configuration, the generation pipeline and the job registry surface typed
/// errors. Collaborator traits keep returning `anyhow::Result` and are
/// down-converted at the boundary.
#[derive(Debug, Error)]
pub enum LaunchError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Generation pipeline ─────────────────────────────────────────────
    #[error("pipeline: {0}")]
    Pipeline(#[from] PipelineError),

    // ── Background jobs ─────────────────────────────────────────────────
    #[error("job: {0}")]
    Job(#[from] JobError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load {path}: {reason}")]
    Load { path: String, reason: String },

    #[error("invalid {field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Pipeline errors ────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A phase did not finish inside its shared deadline. Outstanding tasks
    /// were dropped and no package exists.
    #[error("phase {phase} timed out after {timeout_secs}s")]
    PhaseTimeout { phase: String, timeout_secs: u64 },

    #[error("task {task} failed: {reason}")]
    TaskFailed { task: String, reason: String },

    #[error("task {task} returned an unusable payload: {reason}")]
    InvalidPayload { task: String, reason: String },

    #[error("brief is not ready (missing: {})", missing.join(", "))]
    BriefNotReady { missing: Vec<String> },
}

impl PipelineError {
    /// Timeouts are reported separately from ordinary task failures.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::PhaseTimeout { .. })
    }
}

// ─── Job errors ─────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum JobError {
    #[error("job not found: {0}")]
    NotFound(String),

    #[error("job {job_id} cannot move from {from} to {to}")]
    InvalidTransition {
        job_id: String,
        from: String,
        to: String,
    },
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, LaunchError>;
