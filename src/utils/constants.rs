/// First-cell keywords of the feed's metadata rows
pub const METADATA_LABELS: [&str; 3] = ["variable", "unit", "level"];

/// Column labels appended to metadata rows, in offset order
pub const COVER_COLUMN_LABELS: [&str; 3] = ["cloud_cover_t", "cloud_cover_t+5m", "cloud_cover_t+10m"];

/// Minute offsets from the observation timestamp at which cover is sampled
pub const MINUTE_OFFSETS: [i64; 3] = [0, 5, 10];

/// Feed timestamp layout (e.g. 20190523T0900)
pub const FEED_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M";
pub const FEED_TIMESTAMP_LEN: usize = 13;
pub const FEED_DATE_DIGITS: usize = 8;

/// Sky image filename layout, before the sequence suffix and extension
pub const IMAGE_STEM_FORMAT: &str = "%Y-%m-%d-%H-%M";
pub const IMAGE_SEQUENCE_SUFFIX: &str = "-0";

/// Date layout handed to the acquisition collaborator
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Observation time label layout in configuration
pub const OBSERVATION_TIME_FORMAT: &str = "%H:%M";

/// Processing defaults
pub const DEFAULT_START_DATE: &str = "2019-05-23";
pub const DEFAULT_END_DATE: &str = "2019-05-23";
pub const DEFAULT_FEED_PATH: &str = "Data/meteoblue_data.csv";
pub const DEFAULT_OUTPUT_PATH: &str = "training_data_with_cloud_cover.csv";
pub const DEFAULT_IMAGE_DIR: &str = "sky_camera_images";
pub const DEFAULT_IMAGE_EXTENSION: &str = "jpg";
pub const DEFAULT_FEED_ENCODING: &str = "utf-8";
pub const DEFAULT_OBSERVATION_TIMES: [&str; 7] = [
    "09:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00",
];
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Cover estimator defaults
pub const DEFAULT_TRIM_FRACTION: f64 = 0.1;
pub const DEFAULT_CLOUD_THRESHOLD: f64 = 0.6;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "SKYCOVER";

/// Environment variable carrying the target directory to the acquisition program
pub const ACQUIRE_DIR_ENV: &str = "SKY_IMAGE_DIR";
