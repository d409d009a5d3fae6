//! Rotator stage: the fan-out point.
//!
//! Each incoming job is replaced by one derived job per rotation, emitted in
//! rotation order before the next job is read.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::PipelineConfig;
use crate::error::{ConfigError, PipelineError};

use super::channel::{blocking, bounded_channel, PipelineStage, StageStats};
use super::job::Job;
use super::ops::{ImageOps, Rotation};
use super::paths::derive_rotated;

/// Fans each job out into one rotated copy per configured angle.
pub struct Rotator {
    ops: Arc<dyn ImageOps>,
    rotations: Arc<[Rotation]>,
    config: PipelineConfig,
}

impl Rotator {
    /// Build a rotator for the configured angle set.
    pub fn new(ops: Arc<dyn ImageOps>, config: PipelineConfig) -> Result<Self, ConfigError> {
        let rotations = Rotation::from_angles(&config.rotation_angles)?;
        if rotations.is_empty() {
            return Err(ConfigError::ValidationError(
                "rotator needs at least one angle".into(),
            ));
        }
        Ok(Self {
            ops,
            rotations: rotations.into(),
            config,
        })
    }

    /// Number of jobs emitted per input job.
    pub fn fan_out(&self) -> usize {
        self.rotations.len()
    }

    pub fn spawn(
        &self,
        input: mpsc::Receiver<Job>,
    ) -> (mpsc::Receiver<Job>, JoinHandle<Result<StageStats, PipelineError>>) {
        let (tx, rx) = bounded_channel(&self.config);
        let stage = PipelineStage::new("rotate", input, tx);

        let ops = Arc::clone(&self.ops);
        let rotations = Arc::clone(&self.rotations);
        let handle = tokio::spawn(stage.run_expand(move |job: Job| {
            let ops = Arc::clone(&ops);
            let rotations = Arc::clone(&rotations);
            async move {
                let start = Instant::now();
                let derived = blocking("rotate", move || rotate_all(ops.as_ref(), &rotations, job))
                    .await?;
                tracing::trace!("  Rotate x{}: {:?}", derived.len(), start.elapsed());
                Ok(derived)
            }
        }));

        (rx, handle)
    }
}

/// Produce the derived jobs for one input. The input job is consumed.
fn rotate_all(ops: &dyn ImageOps, rotations: &[Rotation], job: Job) -> Vec<Job> {
    rotations
        .iter()
        .map(|&rotation| Job {
            input_path: job.input_path.clone(),
            image: ops.rotate(&job.image, rotation),
            out_path: derive_rotated(&job.out_path, rotation.degrees()),
            rotation: Some(rotation.degrees()),
        })
        .collect()
}
