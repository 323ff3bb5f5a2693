pub mod constants;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use filename::{is_image_file, parse_sky_image_filename, sky_image_filename, ArtifactLocator};
pub use progress::ProgressReporter;
