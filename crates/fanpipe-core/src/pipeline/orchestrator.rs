//! Pipeline orchestration - wires the stages together and drains their
//! result and error streams.
//!
//! ```text
//!            load errors ──────────────────────────────► drain task
//! paths ─► Loader ─► Resizer ─► Grayscale ─► Rotator ─► Saver ─► results (this task)
//!                                                         └─ save errors ─► drain task
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::{ConfigError, PipelineError};
use crate::types::{ErrorSource, RunSummary};

use super::channel::{ErrorReceiver, StageStats};
use super::codec::{Codec, FsCodec};
use super::loader::Loader;
use super::ops::{ImageOps, StandardOps};
use super::paths::PathRewrite;
use super::rotator::Rotator;
use super::saver::Saver;
use super::sink::ReportSink;
use super::transform::{GrayscaleConverter, Resizer};

type StageHandle = JoinHandle<Result<StageStats, PipelineError>>;

/// Builds and runs the load → resize → grayscale → rotate → save chain.
pub struct Orchestrator {
    loader: Loader,
    resizer: Resizer,
    grayscale: GrayscaleConverter,
    rotator: Rotator,
    saver: Saver,
}

impl Orchestrator {
    /// Create an orchestrator with the default filesystem codec and transforms.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let codec = Arc::new(FsCodec::new(config.limits.clone()));
        let ops = Arc::new(StandardOps::new(&config.resize)?);
        Self::with_collaborators(config, codec, ops)
    }

    /// Create an orchestrator with caller-supplied collaborators.
    pub fn with_collaborators(
        config: &Config,
        codec: Arc<dyn Codec>,
        ops: Arc<dyn ImageOps>,
    ) -> Result<Self, ConfigError> {
        let pipeline = config.pipeline.clone();
        let rewrite = PathRewrite::new(&pipeline.input_dir, &pipeline.output_dir);

        Ok(Self {
            loader: Loader::new(Arc::clone(&codec), rewrite, pipeline.clone()),
            resizer: Resizer::new(Arc::clone(&ops), pipeline.clone()),
            grayscale: GrayscaleConverter::new(Arc::clone(&ops), pipeline.clone()),
            rotator: Rotator::new(ops, pipeline.clone())?,
            saver: Saver::new(codec, pipeline),
        })
    }

    /// Number of outputs each loaded source turns into.
    pub fn fan_out(&self) -> usize {
        self.rotator.fan_out()
    }

    /// Run every path through the pipeline.
    ///
    /// Returns only after the result stream and both error streams have
    /// closed. Per-item failures are reported through `sink` and counted in
    /// the summary; an `Err` means a stage itself died.
    pub async fn run(
        &self,
        paths: Vec<PathBuf>,
        sink: Arc<dyn ReportSink>,
    ) -> Result<RunSummary, PipelineError> {
        let start = Instant::now();
        let requested = paths.len();
        tracing::debug!("Starting pipeline for {} source(s)", requested);

        let (jobs, load_errors, load_handle) = self.loader.spawn(paths);
        let (resized, resize_handle) = self.resizer.spawn(jobs);
        let (gray, gray_handle) = self.grayscale.spawn(resized);
        let (rotated, rotate_handle) = self.rotator.spawn(gray);
        let (mut results, save_errors, save_handle) = self.saver.spawn(rotated);

        let load_drain = tokio::spawn(drain_errors(
            load_errors,
            ErrorSource::Load,
            Arc::clone(&sink),
        ));
        let save_drain = tokio::spawn(drain_errors(
            save_errors,
            ErrorSource::Save,
            Arc::clone(&sink),
        ));

        let mut summary = RunSummary {
            requested,
            ..RunSummary::default()
        };
        while let Some(record) = results.recv().await {
            summary.save_attempts += 1;
            if record.is_saved() {
                summary.saved += 1;
            }
            sink.record(&record);
        }

        // Completion barrier: both drains must see their stream close.
        summary.load_failed = load_drain
            .await
            .map_err(|e| PipelineError::stage("load-error drain", e))?;
        summary.save_failed = save_drain
            .await
            .map_err(|e| PipelineError::stage("save-error drain", e))?;

        let mut fatal = None;
        for (name, handle) in [
            ("load", load_handle),
            ("resize", resize_handle),
            ("grayscale", gray_handle),
            ("rotate", rotate_handle),
            ("save", save_handle),
        ] {
            match join_stage(name, handle).await {
                Ok(stats) => {
                    if name == "load" {
                        summary.loaded = stats.emitted;
                    }
                }
                Err(e) => {
                    tracing::error!("{}", e);
                    if fatal.is_none() {
                        fatal = Some(e);
                    }
                }
            }
        }

        summary.total_seconds = start.elapsed().as_secs_f64();
        tracing::debug!("Pipeline finished: {:?}", summary);

        match fatal {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    }
}

/// Report every error on `errors` until the stream closes; returns the count.
async fn drain_errors(
    mut errors: ErrorReceiver,
    source: ErrorSource,
    sink: Arc<dyn ReportSink>,
) -> usize {
    let mut count = 0;
    while let Some(error) = errors.recv().await {
        count += 1;
        sink.error(source, &error);
    }
    count
}

async fn join_stage(name: &str, handle: StageHandle) -> Result<StageStats, PipelineError> {
    handle.await.map_err(|e| PipelineError::stage(name, e))?
}
