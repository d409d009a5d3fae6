//! Run setup: config overrides, output format and input collection.

use std::path::PathBuf;

use fanpipe_core::{Config, FileDiscovery, OutputFormat as CoreOutputFormat, PathRewrite};

use super::ProcessArgs;

/// Apply command-line overrides on top of the loaded config and re-validate.
pub fn apply_overrides(args: &ProcessArgs, mut config: Config) -> anyhow::Result<Config> {
    if let Some(buffer_size) = args.buffer_size {
        config.pipeline.buffer_size = buffer_size;
    }
    if let Some(width) = args.width {
        config.resize.width = width;
    }
    if let Some(height) = args.height {
        config.resize.height = height;
    }
    if let Some(ref dir) = args.input_dir {
        config.pipeline.input_dir = dir.clone();
    }
    if let Some(ref dir) = args.output_dir {
        config.pipeline.output_dir = dir.clone();
    }

    config.validate()?;
    Ok(config)
}

/// The `--format` flag wins over `[output] format`.
pub fn output_format(args: &ProcessArgs, config: &Config) -> CoreOutputFormat {
    match args.format {
        Some(format) => format.to_core(),
        // validate() already rejected unknown names
        None => CoreOutputFormat::parse(&config.output.format).unwrap_or(CoreOutputFormat::Text),
    }
}

/// Expand the command-line inputs into the ordered list of source paths.
///
/// Directories are walked; anything else is passed through unchanged so a
/// missing file surfaces as a load error for that item.
pub fn collect_inputs(args: &ProcessArgs, config: &Config) -> Vec<PathBuf> {
    let discovery = FileDiscovery::new(
        config.processing.clone(),
        PathRewrite::new(&config.pipeline.input_dir, &config.pipeline.output_dir),
    );

    let mut paths = Vec::new();
    for input in &args.input {
        if input.is_dir() {
            let files = discovery.discover(input);
            if files.is_empty() {
                tracing::warn!("No supported image files found in {:?}", input);
            } else {
                tracing::info!(
                    "Found {} image(s) in {:?} ({:.1} MB)",
                    files.len(),
                    input,
                    FileDiscovery::total_size(&files) as f64 / 1_000_000.0
                );
            }
            paths.extend(files.into_iter().map(|f| f.path));
        } else {
            paths.push(input.clone());
        }
    }
    paths
}
