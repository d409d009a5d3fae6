//! The unit of work flowing between stages.

use image::DynamicImage;
use std::path::PathBuf;

/// One image on its way through the pipeline.
///
/// A `Job` is moved from stage to stage over channels; no stage keeps a
/// reference to it after forwarding.
#[derive(Debug)]
pub struct Job {
    /// Source path, set by the loader
    pub input_path: PathBuf,
    /// Current raster
    pub image: DynamicImage,
    /// Destination path
    pub out_path: PathBuf,
    /// Rotation in degrees, set by the rotator
    pub rotation: Option<u32>,
}

impl Job {
    /// Create a job fresh from the loader.
    pub fn new(input_path: PathBuf, image: DynamicImage, out_path: PathBuf) -> Self {
        Self {
            input_path,
            image,
            out_path,
            rotation: None,
        }
    }

    /// Transform the raster, keeping paths and rotation.
    pub fn map_image<F>(self, f: F) -> Self
    where
        F: FnOnce(DynamicImage) -> DynamicImage,
    {
        Self {
            image: f(self.image),
            ..self
        }
    }
}
