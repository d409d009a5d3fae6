//! Where the orchestrator sends per-item results and error events.

use crate::error::PipelineError;
use crate::types::{ErrorSource, SaveRecord};

/// Receives pipeline events as they happen.
///
/// `record` is called from the orchestrator's task, `error` from the two
/// drain tasks, so implementations must tolerate concurrent calls.
pub trait ReportSink: Send + Sync {
    /// One terminal event per item that reached the saver.
    fn record(&self, record: &SaveRecord);

    /// One event per load or save failure.
    fn error(&self, source: ErrorSource, error: &PipelineError);
}

/// Reports everything through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn record(&self, record: &SaveRecord) {
        if record.is_saved() {
            tracing::info!("Saved {:?}", record.out_path);
        } else {
            tracing::warn!("Failed {:?}", record.out_path);
        }
    }

    fn error(&self, source: ErrorSource, error: &PipelineError) {
        tracing::error!("{} error: {}", source, error);
    }
}
