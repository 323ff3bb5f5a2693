use image::{imageops, RgbImage};
use std::path::Path;

use crate::error::{ProcessingError, Result};
use crate::imaging::CoverEstimator;
use crate::utils::constants::{DEFAULT_CLOUD_THRESHOLD, DEFAULT_TRIM_FRACTION};

/// Per-pixel red/blue ratios of a trimmed sky image
#[derive(Debug, Clone)]
pub struct RedBlueRatios {
    pub values: Vec<f32>,
}

/// Classifies a pixel as cloud when red/blue meets the threshold.
///
/// Clear sky scatters blue strongly (low ratio); cloud is close to grey (ratio near 1).
#[derive(Debug, Clone)]
pub struct RedBlueRatioEstimator {
    trim_fraction: f64,
    cloud_threshold: f64,
}

impl RedBlueRatioEstimator {
    pub fn new() -> Self {
        Self {
            trim_fraction: DEFAULT_TRIM_FRACTION,
            cloud_threshold: DEFAULT_CLOUD_THRESHOLD,
        }
    }

    pub fn with_trim_fraction(mut self, trim_fraction: f64) -> Self {
        self.trim_fraction = trim_fraction;
        self
    }

    pub fn with_cloud_threshold(mut self, cloud_threshold: f64) -> Self {
        self.cloud_threshold = cloud_threshold;
        self
    }

    /// Drop a border of `trim_fraction` on every side (camera housing, overlays)
    fn trim(&self, image: &RgbImage) -> Result<RgbImage> {
        let (width, height) = image.dimensions();
        let margin_x = (width as f64 * self.trim_fraction).round() as u32;
        let margin_y = (height as f64 * self.trim_fraction).round() as u32;

        let trimmed_width = width.saturating_sub(2 * margin_x);
        let trimmed_height = height.saturating_sub(2 * margin_y);
        if trimmed_width == 0 || trimmed_height == 0 {
            return Err(ProcessingError::InvalidFormat(format!(
                "Image of {}x{} is empty after trimming {}",
                width, height, self.trim_fraction
            )));
        }

        Ok(imageops::crop_imm(image, margin_x, margin_y, trimmed_width, trimmed_height).to_image())
    }
}

impl Default for RedBlueRatioEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl CoverEstimator for RedBlueRatioEstimator {
    type Image = RgbImage;
    type Ratio = RedBlueRatios;

    fn load_and_trim(&self, path: &Path) -> Result<RgbImage> {
        let image = image::open(path)?.to_rgb8();
        self.trim(&image)
    }

    fn channel_ratio(&self, image: &RgbImage) -> Result<RedBlueRatios> {
        let values = image
            .pixels()
            .map(|pixel| {
                let [red, _, blue] = pixel.0;
                red as f32 / blue.max(1) as f32
            })
            .collect();

        Ok(RedBlueRatios { values })
    }

    fn cover_percentage(&self, ratio: &RedBlueRatios) -> Result<f64> {
        if ratio.values.is_empty() {
            return Err(ProcessingError::InvalidFormat(
                "No pixels to classify".to_string(),
            ));
        }

        let cloudy = ratio
            .values
            .iter()
            .filter(|value| f64::from(**value) >= self.cloud_threshold)
            .count();

        Ok(cloudy as f64 * 100.0 / ratio.values.len() as f64)
    }
}
