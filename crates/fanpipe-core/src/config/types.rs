//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Rotation angles applied by the fan-out stage, in emission order.
pub const DEFAULT_ROTATION_ANGLES: [u32; 4] = [90, 180, 270, 360];

/// Pipeline wiring settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Max jobs buffered between two data stages (1 = single-item handoff)
    pub buffer_size: usize,

    /// Directory segment that marks a source path
    pub input_dir: PathBuf,

    /// Directory segment substituted for `input_dir` in output paths
    pub output_dir: PathBuf,

    /// Rotation angles in degrees (multiples of 90)
    pub rotation_angles: Vec<u32>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            buffer_size: 1,
            input_dir: PathBuf::from("images"),
            output_dir: PathBuf::from("images/output"),
            rotation_angles: DEFAULT_ROTATION_ANGLES.to_vec(),
        }
    }
}

/// Resize stage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeConfig {
    /// Target width in pixels
    pub width: u32,

    /// Target height in pixels
    pub height: u32,

    /// Resampling filter: nearest, triangle, catmullrom, gaussian, lanczos3
    pub filter: String,

    /// Fit within width x height instead of stretching to it
    pub preserve_aspect: bool,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            filter: "lanczos3".to_string(),
            preserve_aspect: false,
        }
    }
}

impl ResizeConfig {
    /// Map the configured filter name onto an `image` filter type.
    pub fn filter_type(&self) -> Option<image::imageops::FilterType> {
        use image::imageops::FilterType;

        match self.filter.to_lowercase().as_str() {
            "nearest" => Some(FilterType::Nearest),
            "triangle" => Some(FilterType::Triangle),
            "catmullrom" => Some(FilterType::CatmullRom),
            "gaussian" => Some(FilterType::Gaussian),
            "lanczos3" => Some(FilterType::Lanczos3),
            _ => None,
        }
    }
}

/// Resource limits applied while decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 10000,
        }
    }
}

/// Input discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Extensions picked up when walking a directory
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            supported_formats: ["jpg", "jpeg", "png", "webp", "gif", "bmp", "tiff"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Result format: "text", "json" or "jsonl"
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            pretty: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
