//! End-to-end runs of the full pipeline.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use fanpipe_core::pipeline::{Hasher, SavedFile};
use fanpipe_core::{
    Codec, Config, ErrorSource, FsCodec, ImageOps, Orchestrator, PipelineError, ReportSink,
    RunSummary, SaveRecord, SaveStatus, StandardOps,
};
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use tempfile::TempDir;

/// Collects every event for later inspection.
#[derive(Default)]
struct CollectingSink {
    records: Mutex<Vec<SaveRecord>>,
    errors: Mutex<Vec<(ErrorSource, PipelineError)>>,
}

impl ReportSink for CollectingSink {
    fn record(&self, record: &SaveRecord) {
        self.records.lock().unwrap().push(record.clone());
    }

    fn error(&self, source: ErrorSource, error: &PipelineError) {
        self.errors.lock().unwrap().push((source, error.clone()));
    }
}

impl CollectingSink {
    fn records(&self) -> Vec<SaveRecord> {
        self.records.lock().unwrap().clone()
    }

    fn errors(&self) -> Vec<(ErrorSource, PipelineError)> {
        self.errors.lock().unwrap().clone()
    }
}

fn small_config() -> Config {
    let mut config = Config::default();
    config.resize.width = 16;
    config.resize.height = 8;
    config.pipeline.buffer_size = 2;
    config
}

/// Create `<tmp>/images/` with a small gradient PNG per name.
fn write_sources(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    let images = dir.join("images");
    std::fs::create_dir_all(&images).unwrap();
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let path = images.join(name);
            let img = RgbImage::from_fn(40, 30, |x, y| {
                Rgb([(x * 6) as u8, (y * 8) as u8, (i * 50) as u8])
            });
            img.save(&path).unwrap();
            path
        })
        .collect()
}

fn write_garbage(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join("images").join(name);
    std::fs::write(&path, b"definitely not an image").unwrap();
    path
}

fn assert_accounting(summary: &RunSummary, fan_out: usize) {
    assert_eq!(summary.loaded + summary.load_failed, summary.requested);
    assert_eq!(summary.save_attempts, summary.loaded * fan_out);
    assert_eq!(summary.saved + summary.save_failed, summary.save_attempts);
}

#[tokio::test]
async fn test_scenario_one_bad_source_of_three() {
    let dir = TempDir::new().unwrap();
    let mut paths = write_sources(dir.path(), &["a.png"]);
    paths.push(write_garbage(dir.path(), "bad.png"));
    paths.extend(write_sources(dir.path(), &["c.png"]));

    let orchestrator = Orchestrator::new(&small_config()).unwrap();
    let sink = Arc::new(CollectingSink::default());
    let summary = orchestrator.run(paths, sink.clone()).await.unwrap();

    assert_eq!(summary.requested, 3);
    assert_eq!(summary.loaded, 2);
    assert_eq!(summary.load_failed, 1);
    assert_eq!(summary.save_attempts, 8);
    assert_eq!(summary.saved, 8);
    assert_accounting(&summary, orchestrator.fan_out());

    let errors = sink.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, ErrorSource::Load);
    assert_eq!(
        errors[0].1.path(),
        Some(dir.path().join("images/bad.png").as_path())
    );

    let output = dir.path().join("images/output");
    for name in ["a", "c"] {
        for angle in [90, 180, 270, 360] {
            let path = output.join(format!("{name}_{angle}.png"));
            let img = image::open(&path).unwrap();
            let expected = if angle % 180 == 90 { (8, 16) } else { (16, 8) };
            assert_eq!(img.dimensions(), expected, "{}", path.display());
        }
    }
    assert!(!output.join("bad_90.png").exists());
    assert_eq!(sink.records().len(), 8);
}

#[tokio::test]
async fn test_decode_failure_does_not_stop_neighbours() {
    let dir = TempDir::new().unwrap();
    let mut paths = write_sources(dir.path(), &["one.png"]);
    paths.push(write_garbage(dir.path(), "two.png"));
    paths.extend(write_sources(dir.path(), &["three.png", "four.png"]));

    let orchestrator = Orchestrator::new(&small_config()).unwrap();
    let sink = Arc::new(CollectingSink::default());
    let summary = orchestrator.run(paths, sink.clone()).await.unwrap();

    assert_eq!(summary.loaded, 3);
    assert_eq!(summary.load_failed, 1);
    assert_eq!(summary.saved, 12);
    assert_accounting(&summary, 4);

    let mut inputs: Vec<String> = sink
        .records()
        .iter()
        .map(|r| {
            r.input_path
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    inputs.dedup();
    assert_eq!(inputs, vec!["one.png", "three.png", "four.png"]);
}

#[tokio::test]
async fn test_second_run_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let paths = write_sources(dir.path(), &["a.png", "b.png"]);
    let orchestrator = Orchestrator::new(&small_config()).unwrap();

    let first = Arc::new(CollectingSink::default());
    orchestrator.run(paths.clone(), first.clone()).await.unwrap();
    let second = Arc::new(CollectingSink::default());
    orchestrator.run(paths, second.clone()).await.unwrap();

    let first = first.records();
    let second = second.records();
    assert_eq!(first.len(), 8);
    assert_eq!(first, second);
    for record in &first {
        match &record.status {
            SaveStatus::Saved { content_hash, .. } => {
                assert_eq!(content_hash.len(), 64);
                let on_disk = Hasher::content_hash(&record.out_path).unwrap();
                assert_eq!(&on_disk, content_hash);
            }
            other => panic!("Expected saved record, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_source_outside_input_dir_is_a_load_error() {
    let dir = TempDir::new().unwrap();
    let stray = dir.path().join("elsewhere.png");
    RgbImage::new(4, 4).save(&stray).unwrap();

    let orchestrator = Orchestrator::new(&small_config()).unwrap();
    let sink = Arc::new(CollectingSink::default());
    let summary = orchestrator.run(vec![stray.clone()], sink.clone()).await.unwrap();

    assert_eq!(summary.load_failed, 1);
    assert_eq!(summary.save_attempts, 0);
    assert!(matches!(
        sink.errors()[0].1,
        PipelineError::OutsideInputDir { .. }
    ));
    // The source must not have been overwritten.
    assert_eq!(image::open(&stray).unwrap().dimensions(), (4, 4));
}

/// Real decoder, but refuses to write any output whose name contains `marker`.
struct RefusingCodec {
    inner: FsCodec,
    marker: &'static str,
}

impl RefusingCodec {
    fn orchestrator(config: &Config, marker: &'static str) -> Orchestrator {
        let ops: Arc<dyn ImageOps> = Arc::new(StandardOps::new(&config.resize).unwrap());
        let codec: Arc<dyn Codec> = Arc::new(RefusingCodec {
            inner: FsCodec::new(config.limits.clone()),
            marker,
        });
        Orchestrator::with_collaborators(config, codec, ops).unwrap()
    }
}

impl Codec for RefusingCodec {
    fn decode(&self, path: &Path) -> Result<DynamicImage, PipelineError> {
        self.inner.decode(path)
    }

    fn encode(&self, image: &DynamicImage, path: &Path) -> Result<SavedFile, PipelineError> {
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        if name.contains(self.marker) {
            return Err(PipelineError::Encode {
                path: path.to_path_buf(),
                message: "read-only volume".to_string(),
            });
        }
        self.inner.encode(image, path)
    }
}

#[tokio::test]
async fn test_save_failures_are_counted_and_reported() {
    let dir = TempDir::new().unwrap();
    let paths = write_sources(dir.path(), &["a.png", "b.png"]);
    let orchestrator = RefusingCodec::orchestrator(&small_config(), "_180");

    let sink = Arc::new(CollectingSink::default());
    let summary = orchestrator.run(paths, sink.clone()).await.unwrap();

    assert_eq!(summary.save_attempts, 8);
    assert_eq!(summary.saved, 6);
    assert_eq!(summary.save_failed, 2);
    assert!(summary.has_failures());
    assert_accounting(&summary, 4);

    let failed: Vec<_> = sink
        .records()
        .into_iter()
        .filter(|r| !r.is_saved())
        .collect();
    assert_eq!(failed.len(), 2);
    assert!(failed.iter().all(|r| r.rotation == Some(180)));
    assert!(sink
        .errors()
        .iter()
        .all(|(source, _)| *source == ErrorSource::Save));
}

#[tokio::test]
async fn test_failure_of_final_save_is_reported_before_run_returns() {
    let dir = TempDir::new().unwrap();
    let paths = write_sources(dir.path(), &["a.png", "b.png"]);
    // b_360 is the very last item through the saver.
    let orchestrator = RefusingCodec::orchestrator(&small_config(), "b_360");

    let sink = Arc::new(CollectingSink::default());
    let summary = orchestrator.run(paths, sink.clone()).await.unwrap();

    assert_eq!(summary.saved, 7);
    assert_eq!(summary.save_failed, 1);
    assert_accounting(&summary, 4);

    let records = sink.records();
    let last = records.last().unwrap();
    assert!(last.out_path.ends_with("b_360.png"));
    assert!(!last.is_saved());

    let errors = sink.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, ErrorSource::Save);
    assert_eq!(
        errors[0].1.path(),
        Some(dir.path().join("images/output/b_360.png").as_path())
    );
}

#[tokio::test]
async fn test_custom_angles_change_fan_out() {
    let dir = TempDir::new().unwrap();
    let paths = write_sources(dir.path(), &["a.png"]);
    let mut config = small_config();
    config.pipeline.rotation_angles = vec![180];

    let orchestrator = Orchestrator::new(&config).unwrap();
    assert_eq!(orchestrator.fan_out(), 1);

    let sink = Arc::new(CollectingSink::default());
    let summary = orchestrator.run(paths, sink.clone()).await.unwrap();
    assert_eq!(summary.saved, 1);
    assert!(dir.path().join("images/output/a_180.png").exists());
}
