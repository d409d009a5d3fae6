//! Configuration management for fanpipe.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default`, so a partial file is fine.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pipeline wiring settings
    pub pipeline: PipelineConfig,

    /// Resize stage settings
    pub resize: ResizeConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Input discovery settings
    pub processing: ProcessingConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(content)?;
        config.expand_dirs();
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.fanpipe.fanpipe/config.toml
    /// - Linux: ~/.config/fanpipe/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\fanpipe\config\config.toml
    ///
    /// Falls back to ~/.fanpipe/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "fanpipe", "fanpipe")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".fanpipe").join("config.toml")
            })
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    /// Resolve `~` in the configured directory segments.
    fn expand_dirs(&mut self) {
        self.pipeline.input_dir = expand_tilde(&self.pipeline.input_dir);
        self.pipeline.output_dir = expand_tilde(&self.pipeline.output_dir);
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.pipeline.buffer_size, 1);
        assert_eq!(config.pipeline.rotation_angles, vec![90, 180, 270, 360]);
        assert_eq!(config.pipeline.input_dir, PathBuf::from("images"));
        assert_eq!(config.pipeline.output_dir, PathBuf::from("images/output"));
        assert_eq!(config.resize.width, 500);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[pipeline]"));
        assert!(toml.contains("[resize]"));
        assert!(toml.contains("rotation_angles"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml("[resize]\nwidth = 64\n").unwrap();
        assert_eq!(config.resize.width, 64);
        assert_eq!(config.resize.height, 500);
        assert_eq!(config.pipeline.buffer_size, 1);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = Config::default();
        let parsed = Config::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed.pipeline.rotation_angles, config.pipeline.rotation_angles);
        assert_eq!(parsed.output.format, "text");
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let err = Config::from_toml("[pipeline\nbuffer_size = 1").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[pipeline]\nrotation_angles = [180]\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.pipeline.rotation_angles, vec![180]);
    }
}
