//! Error types for the fanpipe image pipeline.
//!
//! Per-item failures (`PipelineError::Decode`, `PipelineError::Encode` and the
//! other load-stage variants) never abort a run: stages turn them into events
//! on an error channel. `PipelineError::Stage` is the one fatal variant.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for fanpipe operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline processing errors, organized by stage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Image could not be read or decoded
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Image could not be encoded or written
    #[error("Encode error for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// Source path does not live under the configured input directory
    #[error("Path {path} is outside the input directory {input_dir}")]
    OutsideInputDir { path: PathBuf, input_dir: PathBuf },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Unsupported image format
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// A stage task died. Fatal for the run.
    #[error("{stage} stage failed: {message}")]
    Stage { stage: String, message: String },
}

impl PipelineError {
    /// The path this error refers to, if it is a per-item error.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Decode { path, .. }
            | Self::Encode { path, .. }
            | Self::OutsideInputDir { path, .. }
            | Self::FileTooLarge { path, .. }
            | Self::ImageTooLarge { path, .. }
            | Self::UnsupportedFormat { path, .. } => Some(path),
            Self::FileNotFound(path) => Some(path),
            Self::Stage { .. } => None,
        }
    }

    /// Build a fatal stage error from a failed task join.
    pub(crate) fn stage(stage: &str, err: tokio::task::JoinError) -> Self {
        let message = if err.is_panic() {
            "task panicked".to_string()
        } else {
            err.to_string()
        };
        Self::Stage {
            stage: stage.to_string(),
            message,
        }
    }
}

/// Convenience type alias for fanpipe results.
pub type Result<T> = std::result::Result<T, Error>;
