use crate::acquisition::{AcquisitionOutcome, ImageAcquirer};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::imaging::CoverEstimator;
use crate::models::DateRange;
use crate::processors::{FeatureComputer, MergeReport, RecordMerger};
use crate::readers::FeedReader;
use crate::utils::progress::ProgressReporter;
use crate::writers::TableWriter;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// What a complete run did
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub range: DateRange,
    pub acquisition: Option<AcquisitionOutcome>,
    pub merge: MergeReport,
    pub output_path: PathBuf,
}

/// Expand the range, top up the image directory, then merge the feed into the output table.
///
/// Pass `None` as the acquirer to leave the image directory untouched.
pub fn build_dataset<A, E>(
    config: &PipelineConfig,
    acquirer: Option<&A>,
    estimator: E,
    progress: Option<&ProgressReporter>,
) -> Result<RunSummary>
where
    A: ImageAcquirer,
    E: CoverEstimator,
{
    let range = config.date_range()?;
    let times = config.observation_times()?;
    info!(%range, days = range.len(), times = times.len(), "building training table");

    let acquisition = match acquirer {
        Some(acquirer) => Some(config.trigger().ensure_images(&range, acquirer)?),
        None => None,
    };

    let mut feed = FeedReader::open(&config.feed_path, &config.feed_encoding)?;
    let mut output = TableWriter::create(&config.output_path)?;

    let merger = RecordMerger::new(
        &range,
        times,
        config.locator(),
        FeatureComputer::new(estimator),
    );
    let merge = merger.merge(&mut feed, &mut output, progress)?;
    output.finish()?;

    info!(
        rows = merge.rows_written(),
        output = %config.output_path.display(),
        "training table written"
    );

    Ok(RunSummary {
        range,
        acquisition,
        merge,
        output_path: config.output_path.clone(),
    })
}
