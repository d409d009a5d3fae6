//! Configuration validation with range checks.

use std::collections::HashSet;

use crate::error::ConfigError;
use crate::output::OutputFormat;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.buffer_size == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.buffer_size must be > 0".into(),
            ));
        }
        if self.pipeline.input_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "pipeline.input_dir must not be empty".into(),
            ));
        }
        if self.pipeline.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "pipeline.output_dir must not be empty".into(),
            ));
        }
        if self.pipeline.input_dir == self.pipeline.output_dir {
            return Err(ConfigError::ValidationError(
                "pipeline.output_dir must differ from pipeline.input_dir".into(),
            ));
        }
        if self.pipeline.rotation_angles.is_empty() {
            return Err(ConfigError::ValidationError(
                "pipeline.rotation_angles must not be empty".into(),
            ));
        }
        let mut seen = HashSet::new();
        for &angle in &self.pipeline.rotation_angles {
            if angle == 0 || angle > 360 || angle % 90 != 0 {
                return Err(ConfigError::ValidationError(format!(
                    "pipeline.rotation_angles: {angle} is not one of 90, 180, 270, 360"
                )));
            }
            if !seen.insert(angle) {
                return Err(ConfigError::ValidationError(format!(
                    "pipeline.rotation_angles: duplicate angle {angle}"
                )));
            }
        }
        if self.resize.width == 0 || self.resize.height == 0 {
            return Err(ConfigError::ValidationError(
                "resize.width and resize.height must be > 0".into(),
            ));
        }
        if self.resize.filter_type().is_none() {
            return Err(ConfigError::ValidationError(format!(
                "resize.filter: unknown filter {:?}",
                self.resize.filter
            )));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if OutputFormat::parse(&self.output.format).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "output.format: unknown format {:?}",
                self.output.format
            )));
        }
        Ok(())
    }
}
