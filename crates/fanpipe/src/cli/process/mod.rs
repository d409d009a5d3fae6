//! The `fanpipe process` command.

mod console;
mod setup;
pub mod types;

pub use types::OutputFormat;

use clap::Args;
use fanpipe_core::{Config, Orchestrator, RunSummary};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use console::{create_progress_bar, print_summary, ConsoleSink};
use setup::{apply_overrides, collect_inputs, output_format};

/// Arguments for the `process` command.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Image files or directories to process
    #[arg(required = true)]
    pub input: Vec<PathBuf>,

    /// Write records to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (defaults to `[output] format` from the config)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Max jobs buffered between stages
    #[arg(short, long)]
    pub buffer_size: Option<usize>,

    /// Resize width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Resize height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Directory segment that marks source paths
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Directory segment written in place of the input segment
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Manual Default impl for constructing ProcessArgs outside of clap.
impl Default for ProcessArgs {
    fn default() -> Self {
        Self {
            input: Vec::new(),
            output: None,
            format: None,
            buffer_size: None,
            width: None,
            height: None,
            input_dir: None,
            output_dir: None,
            no_progress: false,
        }
    }
}

/// Execute the process command.
///
/// Per-item failures do not make this an `Err`; inspect the returned summary.
pub async fn execute(args: ProcessArgs, config: Config) -> anyhow::Result<RunSummary> {
    let config = apply_overrides(&args, config)?;
    let format = output_format(&args, &config);

    let paths = collect_inputs(&args, &config);
    if paths.is_empty() {
        tracing::warn!("Nothing to process");
    }

    let orchestrator = Orchestrator::new(&config)?;
    let fan_out = orchestrator.fan_out();
    tracing::info!(
        "Processing {} source(s) into {} output(s) each",
        paths.len(),
        fan_out
    );

    let writer: Box<dyn Write + Send> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout()),
    };
    let progress = create_progress_bar((paths.len() * fan_out) as u64, !args.no_progress);
    let sink = Arc::new(
        ConsoleSink::new(writer, format, config.output.pretty, progress).with_fan_out(fan_out),
    );

    let summary = orchestrator.run(paths, sink.clone()).await?;
    sink.finish(&summary)?;

    if let Some(path) = &args.output {
        tracing::info!("Output written to {:?}", path);
    }
    print_summary(&summary);

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn process_args_default_has_no_overrides() {
        let args = ProcessArgs::default();
        assert!(args.input.is_empty());
        assert!(args.output.is_none());
        assert!(args.format.is_none());
        assert!(args.buffer_size.is_none());
        assert!(!args.no_progress);
    }

    #[tokio::test]
    async fn test_execute_writes_outputs_and_jsonl_records() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("images");
        std::fs::create_dir_all(&images).unwrap();
        RgbImage::from_pixel(12, 6, Rgb([200, 10, 10]))
            .save(images.join("a.png"))
            .unwrap();
        std::fs::write(images.join("bad.png"), b"garbage").unwrap();

        let records = dir.path().join("records.jsonl");
        let args = ProcessArgs {
            input: vec![images.clone()],
            output: Some(records.clone()),
            format: Some(OutputFormat::Jsonl),
            width: Some(8),
            height: Some(8),
            no_progress: true,
            ..ProcessArgs::default()
        };

        let summary = execute(args, Config::default()).await.unwrap();
        assert_eq!(summary.requested, 2);
        assert_eq!(summary.saved, 4);
        assert_eq!(summary.load_failed, 1);
        assert!(summary.has_failures());

        for angle in [90, 180, 270, 360] {
            assert!(images.join(format!("output/a_{angle}.png")).exists());
        }

        let content = std::fs::read_to_string(&records).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        // 4 saved + 1 error + summary
        assert_eq!(lines.len(), 6);
        assert!(lines.last().unwrap().contains("\"type\":\"summary\""));
    }
}
