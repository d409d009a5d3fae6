//! Saver stage: writes each job and emits exactly one record for it.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::types::{SaveRecord, SaveStatus};

use super::channel::{
    bounded_channel, error_channel, report, ErrorReceiver, PipelineStage, StageStats,
};
use super::codec::Codec;
use super::job::Job;

/// Persists jobs through the codec.
pub struct Saver {
    codec: Arc<dyn Codec>,
    config: PipelineConfig,
}

impl Saver {
    pub fn new(codec: Arc<dyn Codec>, config: PipelineConfig) -> Self {
        Self { codec, config }
    }

    /// Start saving jobs from `input`.
    ///
    /// Every job produces one [`SaveRecord`] on the result stream. A failed
    /// write additionally puts the wrapped error on the save-error stream.
    pub fn spawn(
        &self,
        input: mpsc::Receiver<Job>,
    ) -> (
        mpsc::Receiver<SaveRecord>,
        ErrorReceiver,
        JoinHandle<Result<StageStats, PipelineError>>,
    ) {
        let (result_tx, result_rx) = bounded_channel(&self.config);
        let (err_tx, err_rx) = error_channel();
        let stage = PipelineStage::new("save", input, result_tx);

        let codec = Arc::clone(&self.codec);
        let handle = tokio::spawn(stage.run(move |job: Job| {
            let codec = Arc::clone(&codec);
            let errors = err_tx.clone();
            async move {
                let Job {
                    input_path,
                    image,
                    out_path,
                    rotation,
                } = job;
                let start = Instant::now();

                let target = out_path.clone();
                let result = tokio::task::spawn_blocking(move || codec.encode(&image, &target))
                    .await
                    .unwrap_or_else(|e| {
                        Err(PipelineError::Encode {
                            path: out_path.clone(),
                            message: format!("Task join error: {}", e),
                        })
                    });

                let status = match result {
                    Ok(saved) => {
                        tracing::trace!("  Save {:?}: {:?}", out_path, start.elapsed());
                        SaveStatus::Saved {
                            bytes: saved.bytes,
                            content_hash: saved.content_hash,
                        }
                    }
                    Err(e) => {
                        let status = SaveStatus::Failed {
                            error: e.to_string(),
                        };
                        report(&errors, "save", e);
                        status
                    }
                };

                Ok(SaveRecord {
                    input_path,
                    out_path,
                    rotation,
                    status,
                })
            }
        }));

        (result_rx, err_rx, handle)
    }
}
