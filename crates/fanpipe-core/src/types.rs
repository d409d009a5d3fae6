//! Result and report types produced by a pipeline run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::PipelineError;

/// Terminal event for one item that reached the saver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRecord {
    /// Source image the item came from
    pub input_path: PathBuf,

    /// Where the item was (or should have been) written
    pub out_path: PathBuf,

    /// Rotation applied, in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<u32>,

    /// Outcome of the write
    #[serde(flatten)]
    pub status: SaveStatus,
}

impl SaveRecord {
    pub fn is_saved(&self) -> bool {
        matches!(self.status, SaveStatus::Saved { .. })
    }
}

/// Outcome of a single save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SaveStatus {
    /// Written successfully
    Saved { bytes: u64, content_hash: String },
    /// Not written; detail went to the save-error stream
    Failed { error: String },
}

/// Which error stream an error event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSource {
    Load,
    Save,
}

impl std::fmt::Display for ErrorSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSource::Load => write!(f, "load"),
            ErrorSource::Save => write!(f, "save"),
        }
    }
}

/// Serializable form of an error event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub source: ErrorSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub message: String,
}

impl ErrorRecord {
    pub fn new(source: ErrorSource, error: &PipelineError) -> Self {
        Self {
            source,
            path: error.path().map(|p| p.to_path_buf()),
            message: error.to_string(),
        }
    }
}

/// Aggregate counters for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Source paths handed to the loader
    pub requested: usize,

    /// Sources decoded successfully
    pub loaded: usize,

    /// Sources reported on the load-error stream
    pub load_failed: usize,

    /// Items that reached the saver
    pub save_attempts: usize,

    /// Items written
    pub saved: usize,

    /// Items reported on the save-error stream
    pub save_failed: usize,

    /// Wall-clock time in seconds
    pub total_seconds: f64,
}

impl RunSummary {
    /// Total per-item failures across both error streams.
    pub fn failed(&self) -> usize {
        self.load_failed + self.save_failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }
}

/// Tagged union for structured output.
/// Internally tagged: `{"type":"saved",...}`, `{"type":"error",...}`,
/// `{"type":"summary",...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputRecord {
    Saved(SaveRecord),
    Error(ErrorRecord),
    Summary(RunSummary),
}
