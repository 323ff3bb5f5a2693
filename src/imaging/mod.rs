pub mod red_blue;

pub use red_blue::{RedBlueRatioEstimator, RedBlueRatios};

use crate::error::Result;
use std::path::Path;

/// Image-to-cloud-cover pipeline: load and trim, channel ratio, cover percentage.
///
/// Every stage may fail; callers only care whether the whole chain produced a value.
pub trait CoverEstimator {
    type Image;
    type Ratio;

    fn load_and_trim(&self, path: &Path) -> Result<Self::Image>;

    fn channel_ratio(&self, image: &Self::Image) -> Result<Self::Ratio>;

    fn cover_percentage(&self, ratio: &Self::Ratio) -> Result<f64>;

    fn estimate(&self, path: &Path) -> Result<f64> {
        let image = self.load_and_trim(path)?;
        let ratio = self.channel_ratio(&image)?;
        self.cover_percentage(&ratio)
    }
}
