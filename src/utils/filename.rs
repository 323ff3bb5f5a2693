use crate::utils::constants::{IMAGE_SEQUENCE_SUFFIX, IMAGE_STEM_FORMAT};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Expected sky image filename for a capture instant: `YYYY-MM-DD-HH-MM-0.<ext>`
///
/// Must stay byte-identical to the acquisition program's naming rule, or
/// every lookup silently misses.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use skycover_dataset::utils::sky_image_filename;
///
/// let dt = NaiveDate::from_ymd_opt(2019, 5, 23).unwrap().and_hms_opt(9, 5, 0).unwrap();
/// assert_eq!(sky_image_filename(&dt, "jpg"), "2019-05-23-09-05-0.jpg");
/// ```
pub fn sky_image_filename(timestamp: &NaiveDateTime, extension: &str) -> String {
    format!(
        "{}{}.{}",
        timestamp.format(IMAGE_STEM_FORMAT),
        IMAGE_SEQUENCE_SUFFIX,
        extension
    )
}

/// Inverse of [`sky_image_filename`]; `None` for anything not following the convention
pub fn parse_sky_image_filename(file_name: &str, extension: &str) -> Option<NaiveDateTime> {
    let stem = strip_extension(file_name, extension)?;
    let stem = stem.strip_suffix(IMAGE_SEQUENCE_SUFFIX)?;
    NaiveDateTime::parse_from_str(stem, IMAGE_STEM_FORMAT).ok()
}

/// True when the name carries the image extension (case-insensitive)
pub fn is_image_file(file_name: &str, extension: &str) -> bool {
    strip_extension(file_name, extension).is_some()
}

fn strip_extension<'a>(file_name: &'a str, extension: &str) -> Option<&'a str> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    ext.eq_ignore_ascii_case(extension).then_some(stem)
}

/// Maps capture instants to artifact paths inside the image directory.
/// Performs no existence check.
#[derive(Debug, Clone)]
pub struct ArtifactLocator {
    image_dir: PathBuf,
    extension: String,
}

impl ArtifactLocator {
    pub fn new(image_dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            image_dir: image_dir.into(),
            extension: extension.into(),
        }
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn filename(&self, timestamp: &NaiveDateTime) -> String {
        sky_image_filename(timestamp, &self.extension)
    }

    pub fn path(&self, timestamp: &NaiveDateTime) -> PathBuf {
        self.image_dir.join(self.filename(timestamp))
    }
}
