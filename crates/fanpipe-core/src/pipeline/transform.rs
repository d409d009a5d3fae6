//! Resize and grayscale stages: one job in, one job out.

use std::sync::Arc;
use std::time::Instant;

use image::DynamicImage;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::PipelineConfig;
use crate::error::PipelineError;

use super::channel::{blocking, bounded_channel, PipelineStage, StageStats};
use super::job::Job;
use super::ops::ImageOps;

type Transform = fn(&dyn ImageOps, DynamicImage) -> DynamicImage;

/// Spawn a stage that applies `transform` to every job's image.
fn spawn_transform(
    name: &'static str,
    ops: Arc<dyn ImageOps>,
    config: &PipelineConfig,
    input: mpsc::Receiver<Job>,
    transform: Transform,
) -> (mpsc::Receiver<Job>, JoinHandle<Result<StageStats, PipelineError>>) {
    let (tx, rx) = bounded_channel(config);
    let stage = PipelineStage::new(name, input, tx);

    let handle = tokio::spawn(stage.run(move |job: Job| {
        let ops = Arc::clone(&ops);
        async move {
            let start = Instant::now();
            let job = blocking(name, move || job.map_image(|img| transform(ops.as_ref(), img)))
                .await?;
            tracing::trace!("  {} {:?}: {:?}", name, job.input_path, start.elapsed());
            Ok(job)
        }
    }));

    (rx, handle)
}

/// Resizes every job's image.
pub struct Resizer {
    ops: Arc<dyn ImageOps>,
    config: PipelineConfig,
}

impl Resizer {
    pub fn new(ops: Arc<dyn ImageOps>, config: PipelineConfig) -> Self {
        Self { ops, config }
    }

    pub fn spawn(
        &self,
        input: mpsc::Receiver<Job>,
    ) -> (mpsc::Receiver<Job>, JoinHandle<Result<StageStats, PipelineError>>) {
        spawn_transform("resize", Arc::clone(&self.ops), &self.config, input, |ops, img| {
            ops.resize(img)
        })
    }
}

/// Converts every job's image to grayscale.
pub struct GrayscaleConverter {
    ops: Arc<dyn ImageOps>,
    config: PipelineConfig,
}

impl GrayscaleConverter {
    pub fn new(ops: Arc<dyn ImageOps>, config: PipelineConfig) -> Self {
        Self { ops, config }
    }

    pub fn spawn(
        &self,
        input: mpsc::Receiver<Job>,
    ) -> (mpsc::Receiver<Job>, JoinHandle<Result<StageStats, PipelineError>>) {
        spawn_transform(
            "grayscale",
            Arc::clone(&self.ops),
            &self.config,
            input,
            |ops, img| ops.grayscale(img),
        )
    }
}
