//! Loader stage: source paths in, decoded jobs out.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::PipelineConfig;
use crate::error::PipelineError;

use super::channel::{
    bounded_channel, error_channel, source_channel, ErrorReceiver, PipelineStage, StageStats,
};
use super::codec::Codec;
use super::job::Job;
use super::paths::PathRewrite;

/// Decodes source images and assigns their output paths.
pub struct Loader {
    codec: Arc<dyn Codec>,
    rewrite: PathRewrite,
    config: PipelineConfig,
}

impl Loader {
    pub fn new(codec: Arc<dyn Codec>, rewrite: PathRewrite, config: PipelineConfig) -> Self {
        Self {
            codec,
            rewrite,
            config,
        }
    }

    /// Start loading `paths` in order.
    ///
    /// Returns the job stream, the load-error stream and the stage handle.
    /// Both streams close once every path has been handled.
    pub fn spawn(
        &self,
        paths: Vec<PathBuf>,
    ) -> (
        mpsc::Receiver<Job>,
        ErrorReceiver,
        JoinHandle<Result<StageStats, PipelineError>>,
    ) {
        let (job_tx, job_rx) = bounded_channel(&self.config);
        let (err_tx, err_rx) = error_channel();
        let stage = PipelineStage::new("load", source_channel(paths), job_tx);

        let codec = Arc::clone(&self.codec);
        let rewrite = self.rewrite.clone();
        let handle = tokio::spawn(stage.run_fallible(err_tx, move |path: PathBuf| {
            let codec = Arc::clone(&codec);
            let out_path = rewrite.derive(&path);
            async move {
                let out_path = out_path?;
                let start = Instant::now();
                let decode_path = path.clone();
                let image = tokio::task::spawn_blocking(move || codec.decode(&decode_path))
                    .await
                    .map_err(|e| PipelineError::Decode {
                        path: path.clone(),
                        message: format!("Task join error: {}", e),
                    })??;
                tracing::trace!("  Load {:?}: {:?}", path, start.elapsed());
                Ok(Job::new(path, image, out_path))
            }
        }));

        (job_rx, err_rx, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::codec::SavedFile;
    use image::DynamicImage;
    use std::path::Path;

    struct NamedCodec;

    impl Codec for NamedCodec {
        fn decode(&self, path: &Path) -> Result<DynamicImage, PipelineError> {
            if path.to_string_lossy().contains("bad") {
                Err(PipelineError::Decode {
                    path: path.to_path_buf(),
                    message: "corrupt".to_string(),
                })
            } else {
                Ok(DynamicImage::new_rgb8(4, 4))
            }
        }

        fn encode(&self, _: &DynamicImage, _: &Path) -> Result<SavedFile, PipelineError> {
            unreachable!("loader never encodes")
        }
    }

    fn loader() -> Loader {
        Loader::new(
            Arc::new(NamedCodec),
            PathRewrite::new("images", "images/output"),
            PipelineConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_loader_splits_jobs_and_errors() {
        let paths = ["images/a.jpg", "images/bad.jpg", "images/c.jpg", "other/d.jpg"]
            .iter()
            .map(PathBuf::from)
            .collect();
        let (mut jobs, mut errors, handle) = loader().spawn(paths);

        let mut outs = Vec::new();
        while let Some(job) = jobs.recv().await {
            assert!(job.rotation.is_none());
            outs.push(job.out_path);
        }
        assert_eq!(
            outs,
            vec![
                PathBuf::from("images/output/a.jpg"),
                PathBuf::from("images/output/c.jpg")
            ]
        );

        let mut failed = Vec::new();
        while let Some(err) = errors.recv().await {
            failed.push(err);
        }
        assert_eq!(failed.len(), 2);
        assert_eq!(failed[0].path(), Some(Path::new("images/bad.jpg")));
        assert!(matches!(failed[1], PipelineError::OutsideInputDir { .. }));

        let stats = handle.await.unwrap().unwrap();
        assert_eq!(stats.received, 4);
        assert_eq!(stats.emitted, 2);
        assert_eq!(stats.failed, 2);
    }

    #[tokio::test]
    async fn test_loader_empty_input_closes_streams() {
        let (mut jobs, mut errors, handle) = loader().spawn(Vec::new());
        assert!(jobs.recv().await.is_none());
        assert!(errors.recv().await.is_none());
        assert_eq!(handle.await.unwrap().unwrap(), StageStats::default());
    }
}
