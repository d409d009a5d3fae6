//! Image decoding and encoding.
//!
//! Stages only see the [`Codec`] trait. [`FsCodec`] is the filesystem-backed
//! implementation built on the `image` crate.

use image::{DynamicImage, GenericImageView, ImageFormat};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

use super::hash::Hasher;

/// What the encoder wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedFile {
    /// Number of bytes written
    pub bytes: u64,
    /// BLAKE3 hash of the written bytes
    pub content_hash: String,
}

/// Reads and writes images. Called from blocking threads.
pub trait Codec: Send + Sync {
    /// Read and decode the image at `path`.
    fn decode(&self, path: &Path) -> Result<DynamicImage, PipelineError>;

    /// Encode `image` and write it to `path`.
    fn encode(&self, image: &DynamicImage, path: &Path) -> Result<SavedFile, PipelineError>;
}

/// Filesystem codec with size and dimension limits.
pub struct FsCodec {
    limits: LimitsConfig,
}

impl FsCodec {
    /// Create a new codec with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    fn read_checked(&self, path: &Path) -> Result<Vec<u8>, PipelineError> {
        let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PipelineError::FileNotFound(path.to_path_buf()),
            _ => PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot read metadata: {}", e),
            },
        })?;

        let max_bytes = self.limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if metadata.len() > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        std::fs::read(path).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot read file: {}", e),
        })
    }
}

impl Default for FsCodec {
    fn default() -> Self {
        Self::new(LimitsConfig::default())
    }
}

impl Codec for FsCodec {
    fn decode(&self, path: &Path) -> Result<DynamicImage, PipelineError> {
        let bytes = self.read_checked(path)?;
        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        if reader.format().is_none() {
            return Err(PipelineError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: extension_of(path),
            });
        }
        let image = reader.decode().map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let (width, height) = image.dimensions();
        if width > self.limits.max_image_dimension || height > self.limits.max_image_dimension {
            return Err(PipelineError::ImageTooLarge {
                path: path.to_path_buf(),
                width,
                height,
                max_dim: self.limits.max_image_dimension,
            });
        }
        Ok(image)
    }

    fn encode(&self, image: &DynamicImage, path: &Path) -> Result<SavedFile, PipelineError> {
        let format = ImageFormat::from_path(path).map_err(|_| PipelineError::Encode {
            path: path.to_path_buf(),
            message: format!("No encoder for extension {:?}", extension_of(path)),
        })?;

        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, format)
            .map_err(|e| PipelineError::Encode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let data = buffer.into_inner();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PipelineError::Encode {
                path: path.to_path_buf(),
                message: format!("Cannot create {}: {}", parent.display(), e),
            })?;
        }
        std::fs::write(path, &data).map_err(|e| PipelineError::Encode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(SavedFile {
            bytes: data.len() as u64,
            content_hash: Hasher::content_hash_from_bytes(&data),
        })
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("unknown")
        .to_string()
}
