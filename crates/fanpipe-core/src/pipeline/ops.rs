//! Pixel transforms used by the resize, grayscale and rotate stages.

use image::imageops::FilterType;
use image::DynamicImage;

use crate::config::ResizeConfig;
use crate::error::ConfigError;

/// A rotation by whole quarter turns.
///
/// `degrees` is kept as configured (360 stays 360) because it names the
/// output file; `quarter_turns` is what actually gets applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotation {
    degrees: u32,
}

impl Rotation {
    /// Accepts 90, 180, 270 and 360.
    pub fn from_degrees(degrees: u32) -> Option<Self> {
        (degrees > 0 && degrees <= 360 && degrees % 90 == 0).then_some(Self { degrees })
    }

    /// Validate a whole angle list.
    pub fn from_angles(angles: &[u32]) -> Result<Vec<Self>, ConfigError> {
        angles
            .iter()
            .map(|&a| {
                Self::from_degrees(a).ok_or_else(|| {
                    ConfigError::ValidationError(format!("unsupported rotation angle {a}"))
                })
            })
            .collect()
    }

    pub fn degrees(&self) -> u32 {
        self.degrees
    }

    pub fn quarter_turns(&self) -> u32 {
        (self.degrees / 90) % 4
    }
}

/// The pixel transforms. All of them are total.
pub trait ImageOps: Send + Sync {
    fn resize(&self, image: DynamicImage) -> DynamicImage;
    fn grayscale(&self, image: DynamicImage) -> DynamicImage;
    fn rotate(&self, image: &DynamicImage, rotation: Rotation) -> DynamicImage;
}

/// `image`-crate transforms driven by [`ResizeConfig`].
pub struct StandardOps {
    width: u32,
    height: u32,
    filter: FilterType,
    preserve_aspect: bool,
}

impl StandardOps {
    /// Build from a validated resize config.
    pub fn new(config: &ResizeConfig) -> Result<Self, ConfigError> {
        let filter = config.filter_type().ok_or_else(|| {
            ConfigError::ValidationError(format!("unknown resize filter {:?}", config.filter))
        })?;
        Ok(Self {
            width: config.width,
            height: config.height,
            filter,
            preserve_aspect: config.preserve_aspect,
        })
    }
}

impl ImageOps for StandardOps {
    fn resize(&self, image: DynamicImage) -> DynamicImage {
        if self.preserve_aspect {
            image.resize(self.width, self.height, self.filter)
        } else {
            image.resize_exact(self.width, self.height, self.filter)
        }
    }

    fn grayscale(&self, image: DynamicImage) -> DynamicImage {
        image.grayscale()
    }

    fn rotate(&self, image: &DynamicImage, rotation: Rotation) -> DynamicImage {
        match rotation.quarter_turns() {
            1 => image.rotate90(),
            2 => image.rotate180(),
            3 => image.rotate270(),
            _ => image.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    fn ops() -> StandardOps {
        StandardOps::new(&ResizeConfig {
            width: 8,
            height: 6,
            filter: "nearest".to_string(),
            preserve_aspect: false,
        })
        .unwrap()
    }

    #[test]
    fn test_rotation_from_degrees() {
        assert_eq!(Rotation::from_degrees(90).unwrap().quarter_turns(), 1);
        assert_eq!(Rotation::from_degrees(360).unwrap().quarter_turns(), 0);
        assert_eq!(Rotation::from_degrees(360).unwrap().degrees(), 360);
        assert!(Rotation::from_degrees(0).is_none());
        assert!(Rotation::from_degrees(45).is_none());
        assert!(Rotation::from_degrees(450).is_none());
    }

    #[test]
    fn test_from_angles_rejects_bad_entry() {
        assert!(Rotation::from_angles(&[90, 180]).is_ok());
        assert!(Rotation::from_angles(&[90, 100]).is_err());
    }

    #[test]
    fn test_resize_exact_and_fit() {
        let img = DynamicImage::new_rgb8(40, 10);
        assert_eq!(ops().resize(img.clone()).dimensions(), (8, 6));

        let fit = StandardOps::new(&ResizeConfig {
            width: 8,
            height: 6,
            filter: "triangle".to_string(),
            preserve_aspect: true,
        })
        .unwrap();
        assert_eq!(fit.resize(img).dimensions(), (8, 2));
    }

    #[test]
    fn test_grayscale_drops_color() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([200, 10, 10])));
        let gray = ops().grayscale(img);
        assert_eq!(gray.color(), image::ColorType::L8);
    }

    #[test]
    fn test_rotate_quarter_turns() {
        // Mark the top-left pixel so rotations are observable.
        let mut raw = RgbImage::new(3, 2);
        raw.put_pixel(0, 0, Rgb([255, 0, 0]));
        let img = DynamicImage::ImageRgb8(raw);
        let ops = ops();

        let r90 = ops.rotate(&img, Rotation::from_degrees(90).unwrap());
        assert_eq!(r90.dimensions(), (2, 3));
        assert_eq!(r90.to_rgb8().get_pixel(1, 0), &Rgb([255, 0, 0]));

        let r180 = ops.rotate(&img, Rotation::from_degrees(180).unwrap());
        assert_eq!(r180.to_rgb8().get_pixel(2, 1), &Rgb([255, 0, 0]));

        let r270 = ops.rotate(&img, Rotation::from_degrees(270).unwrap());
        assert_eq!(r270.to_rgb8().get_pixel(0, 2), &Rgb([255, 0, 0]));

        let r360 = ops.rotate(&img, Rotation::from_degrees(360).unwrap());
        assert_eq!(r360, img);
    }
}
