use anyhow::Result;
use futures_util::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use tracing::warn;

/// Receives coarse pipeline progress (0-100) with a human-readable note.
pub trait ProgressSink: Send + Sync {
    fn report<'a>(
        &'a self,
        progress: u8,
        note: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Deliver one progress point. Sink errors and panics are logged and
/// swallowed; reporting never affects the run.
pub async fn emit(sink: Option<&dyn ProgressSink>, progress: u8, note: &str) {
    let Some(sink) = sink else {
        return;
    };
    let Ok(report) = std::panic::catch_unwind(AssertUnwindSafe(|| sink.report(progress, note)))
    else {
        warn!(progress, note, "progress sink panicked");
        return;
    };
    match AssertUnwindSafe(report).catch_unwind().await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(progress, note, "progress sink failed: {e:#}"),
        Err(_) => warn!(progress, note, "progress sink panicked"),
    }
}
