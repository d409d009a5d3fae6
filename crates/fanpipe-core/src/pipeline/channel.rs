//! Channels and the shared stage loop.
//!
//! Data channels are bounded, so a slow stage pushes back on the ones before
//! it. Error channels are unbounded so reporting never blocks a stage.

use std::future::Future;

use tokio::sync::mpsc;

use crate::config::PipelineConfig;
use crate::error::PipelineError;

/// Sending half of an error channel.
pub type ErrorSender = mpsc::UnboundedSender<PipelineError>;

/// Receiving half of an error channel.
pub type ErrorReceiver = mpsc::UnboundedReceiver<PipelineError>;

/// Create a bounded channel pair with the configured buffer size.
pub fn bounded_channel<T>(config: &PipelineConfig) -> (mpsc::Sender<T>, mpsc::Receiver<T>) {
    mpsc::channel(config.buffer_size.max(1))
}

/// Create an unbounded error channel.
pub fn error_channel() -> (ErrorSender, ErrorReceiver) {
    mpsc::unbounded_channel()
}

/// Create a channel pre-loaded with `items` and already closed for sending.
///
/// Lets a fixed input list feed a [`PipelineStage`] like any upstream stage.
pub fn source_channel<T>(items: Vec<T>) -> mpsc::Receiver<T> {
    let (tx, rx) = mpsc::channel(items.len().max(1));
    for item in items {
        // Capacity equals the item count, so this cannot fill up.
        let _ = tx.try_send(item);
    }
    rx
}

/// Item counts for one stage run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageStats {
    /// Items read from upstream
    pub received: usize,
    /// Items sent downstream
    pub emitted: usize,
    /// Items diverted to the error channel
    pub failed: usize,
}

/// A pipeline stage: pulls from an input channel, pushes to an output channel.
pub struct PipelineStage<I, O> {
    name: &'static str,
    input: mpsc::Receiver<I>,
    output: mpsc::Sender<O>,
}

impl<I, O> PipelineStage<I, O> {
    /// Create a new pipeline stage.
    pub fn new(name: &'static str, input: mpsc::Receiver<I>, output: mpsc::Sender<O>) -> Self {
        Self {
            name,
            input,
            output,
        }
    }

    /// Run a 1-to-1 map.
    ///
    /// An `Err` from `f` is fatal: the stage stops and returns it, which closes
    /// the output channel.
    pub async fn run<F, Fut>(self, mut f: F) -> Result<StageStats, PipelineError>
    where
        F: FnMut(I) -> Fut,
        Fut: Future<Output = Result<O, PipelineError>>,
    {
        self.run_expand(move |item| {
            let fut = f(item);
            async move { fut.await.map(|out| vec![out]) }
        })
        .await
    }

    /// Run a map whose failures are recoverable.
    ///
    /// `Ok` goes downstream; `Err` goes to `errors` and the stage moves on to
    /// the next item.
    pub async fn run_fallible<F, Fut>(
        mut self,
        errors: ErrorSender,
        mut f: F,
    ) -> Result<StageStats, PipelineError>
    where
        F: FnMut(I) -> Fut,
        Fut: Future<Output = Result<O, PipelineError>>,
    {
        let mut stats = StageStats::default();
        tracing::debug!("{} stage started", self.name);

        while let Some(item) = self.input.recv().await {
            stats.received += 1;
            match f(item).await {
                Ok(result) => {
                    if self.output.send(result).await.is_err() {
                        tracing::warn!("{} stage: downstream closed early", self.name);
                        break;
                    }
                    stats.emitted += 1;
                }
                Err(e) => {
                    stats.failed += 1;
                    report(&errors, self.name, e);
                }
            }
        }

        tracing::debug!("{} stage finished: {:?}", self.name, stats);
        Ok(stats)
    }

    /// Run a fan-out: every input yields zero or more outputs, sent in order
    /// before the next input is read.
    pub async fn run_expand<F, Fut>(mut self, mut f: F) -> Result<StageStats, PipelineError>
    where
        F: FnMut(I) -> Fut,
        Fut: Future<Output = Result<Vec<O>, PipelineError>>,
    {
        let mut stats = StageStats::default();
        tracing::debug!("{} stage started", self.name);

        'items: while let Some(item) = self.input.recv().await {
            stats.received += 1;
            for result in f(item).await? {
                if self.output.send(result).await.is_err() {
                    tracing::warn!("{} stage: downstream closed early", self.name);
                    break 'items;
                }
                stats.emitted += 1;
            }
        }

        tracing::debug!("{} stage finished: {:?}", self.name, stats);
        Ok(stats)
    }
}

/// Push an error onto an error channel.
///
/// The drain side outlives every stage, so a closed channel only happens when
/// the run itself is being torn down; the error is logged instead of lost.
pub fn report(errors: &ErrorSender, stage: &str, error: PipelineError) {
    tracing::debug!("{} stage: {}", stage, error);
    if let Err(mpsc::error::SendError(error)) = errors.send(error) {
        tracing::error!("{} stage: error channel closed, dropping: {}", stage, error);
    }
}

/// Run a closure on the blocking pool, mapping a panic to a fatal stage error.
pub async fn blocking<T, F>(stage: &'static str, f: F) -> Result<T, PipelineError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PipelineError::stage(stage, e))
}
