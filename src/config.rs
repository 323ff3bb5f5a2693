use crate::acquisition::{AcquisitionPolicy, AcquisitionTrigger, CommandAcquirer, DisabledAcquirer, ImageAcquirer};
use crate::error::{ProcessingError, Result};
use crate::imaging::RedBlueRatioEstimator;
use crate::models::DateRange;
use crate::readers::resolve_encoding;
use crate::utils::constants::*;
use crate::utils::filename::ArtifactLocator;
use chrono::{NaiveDate, NaiveTime};
use config::{Config, Environment, File};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use validator::Validate;

/// Everything a run needs; layered from defaults, an optional TOML file,
/// `SKYCOVER_*` environment variables and finally CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PipelineConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    pub feed_path: PathBuf,
    pub output_path: PathBuf,
    pub image_dir: PathBuf,

    #[validate(length(min = 1))]
    pub image_extension: String,

    /// Times of day (`HH:MM`) whose observations are kept
    #[validate(length(min = 1))]
    #[serde(deserialize_with = "string_list")]
    pub observation_times: Vec<String>,

    #[validate(length(min = 1))]
    pub feed_encoding: String,

    pub acquire_command: Option<String>,
    #[serde(deserialize_with = "string_list")]
    pub acquire_args: Vec<String>,
    pub acquisition_policy: AcquisitionPolicy,

    #[validate(range(min = 0.0, max = 0.45))]
    pub trim_fraction: f64,

    #[validate(range(min = 0.0))]
    pub cloud_threshold: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let default_date = |s: &str| NaiveDate::parse_from_str(s, ISO_DATE_FORMAT).unwrap_or_default();

        Self {
            start_date: default_date(DEFAULT_START_DATE),
            end_date: default_date(DEFAULT_END_DATE),
            feed_path: PathBuf::from(DEFAULT_FEED_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
            image_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
            observation_times: DEFAULT_OBSERVATION_TIMES
                .iter()
                .map(|t| t.to_string())
                .collect(),
            feed_encoding: DEFAULT_FEED_ENCODING.to_string(),
            acquire_command: None,
            acquire_args: Vec::new(),
            acquisition_policy: AcquisitionPolicy::default(),
            trim_fraction: DEFAULT_TRIM_FRACTION,
            cloud_threshold: DEFAULT_CLOUD_THRESHOLD,
        }
    }
}

impl PipelineConfig {
    /// Load from an optional config file plus the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Check field ranges and that derived values can be built
    pub fn validated(self) -> Result<Self> {
        self.validate()?;
        self.date_range()?;
        self.observation_times()?;
        resolve_encoding(&self.feed_encoding)?;
        Ok(self)
    }

    pub fn date_range(&self) -> Result<DateRange> {
        DateRange::new(self.start_date, self.end_date)
    }

    /// Accepts `HH:MM` as well as the feed's own `HHMM`
    pub fn observation_times(&self) -> Result<BTreeSet<NaiveTime>> {
        self.observation_times
            .iter()
            .map(|label| {
                let label = label.trim();
                NaiveTime::parse_from_str(label, OBSERVATION_TIME_FORMAT)
                    .or_else(|_| NaiveTime::parse_from_str(label, "%H%M"))
                    .map_err(|_| {
                        ProcessingError::Config(format!("Invalid observation time: '{}'", label))
                    })
            })
            .collect()
    }

    pub fn locator(&self) -> ArtifactLocator {
        ArtifactLocator::new(&self.image_dir, &self.image_extension)
    }

    pub fn estimator(&self) -> RedBlueRatioEstimator {
        RedBlueRatioEstimator::new()
            .with_trim_fraction(self.trim_fraction)
            .with_cloud_threshold(self.cloud_threshold)
    }

    pub fn trigger(&self) -> AcquisitionTrigger {
        AcquisitionTrigger::new(&self.image_dir, &self.image_extension)
            .with_policy(self.acquisition_policy)
    }

    pub fn acquirer(&self) -> Box<dyn ImageAcquirer> {
        match &self.acquire_command {
            Some(program) if !program.trim().is_empty() => Box::new(
                CommandAcquirer::new(program.trim(), &self.image_dir)
                    .with_args(self.acquire_args.clone()),
            ),
            _ => Box::new(DisabledAcquirer),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringList {
    Items(Vec<String>),
    Joined(String),
}

/// Environment values arrive as one string; split those on commas, keep
/// everything else verbatim so `0900` is never read as a number
fn string_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringList::deserialize(deserializer)? {
        StringList::Items(items) => items,
        StringList::Joined(joined) => joined
            .split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
    })
}
