use crate::error::Result;
use crate::imaging::CoverEstimator;
use crate::models::{parse_feed_timestamp, CoverValue, DateRange, MeteoRecord, RowKind};
use crate::processors::FeatureComputer;
use crate::readers::FeedReader;
use crate::utils::constants::MINUTE_OFFSETS;
use crate::utils::filename::ArtifactLocator;
use crate::utils::progress::ProgressReporter;
use crate::writers::TableWriter;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::{Read, Write};
use tracing::{debug, trace};

/// Row counts from one merge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub rows_read: u64,
    pub metadata_rows: u64,
    pub data_rows_written: u64,
    pub empty_rows_skipped: u64,
    pub unparseable_rows_dropped: u64,
    pub out_of_range_rows_dropped: u64,
    pub covers_computed: u64,
    pub covers_missing: u64,
}

impl MergeReport {
    pub fn rows_written(&self) -> u64 {
        self.metadata_rows + self.data_rows_written
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("Merge Summary:\n");
        summary.push_str(&format!("  Rows read: {}\n", self.rows_read));
        summary.push_str(&format!("  Metadata rows: {}\n", self.metadata_rows));
        summary.push_str(&format!("  Data rows written: {}\n", self.data_rows_written));
        summary.push_str(&format!(
            "  Dropped: {} unparseable, {} out of range, {} empty\n",
            self.unparseable_rows_dropped, self.out_of_range_rows_dropped, self.empty_rows_skipped
        ));

        let total_covers = self.covers_computed + self.covers_missing;
        if total_covers > 0 {
            summary.push_str(&format!(
                "  Cloud cover values: {} computed, {} missing ({:.1}% coverage)\n",
                self.covers_computed,
                self.covers_missing,
                self.covers_computed as f64 / total_covers as f64 * 100.0
            ));
        }

        summary
    }
}

/// Streams the feed, keeps in-range observations and appends the cover columns
pub struct RecordMerger<E> {
    dates: BTreeSet<NaiveDate>,
    times: BTreeSet<NaiveTime>,
    locator: ArtifactLocator,
    computer: FeatureComputer<E>,
}

impl<E: CoverEstimator> RecordMerger<E> {
    pub fn new(
        range: &DateRange,
        times: BTreeSet<NaiveTime>,
        locator: ArtifactLocator,
        computer: FeatureComputer<E>,
    ) -> Self {
        Self {
            dates: range.expand().into_iter().collect(),
            times,
            locator,
            computer,
        }
    }

    pub fn classify(&self, record: &MeteoRecord) -> RowKind {
        let Some(first) = record.first_cell() else {
            return RowKind::Empty;
        };

        if record.is_metadata() {
            return RowKind::Metadata;
        }

        match parse_feed_timestamp(first) {
            None => RowKind::Unparseable,
            Some(timestamp) if self.is_of_interest(&timestamp) => RowKind::InRange(timestamp),
            Some(timestamp) => RowKind::OutOfRange(timestamp),
        }
    }

    fn is_of_interest(&self, timestamp: &NaiveDateTime) -> bool {
        self.dates.contains(&timestamp.date()) && self.times.contains(&timestamp.time())
    }

    /// Cover values at t, t+5m and t+10m, computed in that order
    pub fn covers_for(&self, timestamp: &NaiveDateTime) -> Vec<CoverValue> {
        MINUTE_OFFSETS
            .iter()
            .map(|minutes| {
                let captured_at = *timestamp + Duration::minutes(*minutes);
                self.computer.compute(&self.locator.path(&captured_at))
            })
            .collect()
    }

    /// Merge every row of `feed` into `output`; only I/O failures abort
    pub fn merge<R: Read, W: Write>(
        &self,
        feed: &mut FeedReader<R>,
        output: &mut TableWriter<W>,
        progress: Option<&ProgressReporter>,
    ) -> Result<MergeReport> {
        let mut report = MergeReport::default();

        while let Some(record) = feed.next_record()? {
            report.rows_read += 1;
            if let Some(progress) = progress {
                progress.increment(1);
            }

            match self.classify(&record) {
                RowKind::Empty => {
                    report.empty_rows_skipped += 1;
                }
                RowKind::Metadata => {
                    output.write_record(&record.with_cover_labels())?;
                    report.metadata_rows += 1;
                }
                RowKind::Unparseable => {
                    trace!(row = report.rows_read, cell = ?record.first_cell(), "dropping unparseable row");
                    report.unparseable_rows_dropped += 1;
                }
                RowKind::OutOfRange(timestamp) => {
                    trace!(row = report.rows_read, %timestamp, "dropping row outside range");
                    report.out_of_range_rows_dropped += 1;
                }
                RowKind::InRange(timestamp) => {
                    let covers = self.covers_for(&timestamp);
                    let computed = covers.iter().filter(|cover| cover.is_some()).count() as u64;
                    report.covers_computed += computed;
                    report.covers_missing += covers.len() as u64 - computed;

                    debug!(%timestamp, ?covers, "merged observation");
                    output.write_record(&record.with_covers(&covers))?;
                    report.data_rows_written += 1;
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use tempfile::TempDir;

    /// Reports the capture minute as the cover value for any existing file
    struct MinuteEstimator;

    impl CoverEstimator for MinuteEstimator {
        type Image = f64;
        type Ratio = f64;

        fn load_and_trim(&self, path: &Path) -> Result<f64> {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            name.get(14..16)
                .and_then(|minute| minute.parse().ok())
                .ok_or_else(|| ProcessingError::InvalidFormat(name.to_string()))
        }

        fn channel_ratio(&self, image: &f64) -> Result<f64> {
            Ok(*image)
        }

        fn cover_percentage(&self, ratio: &f64) -> Result<f64> {
            Ok(*ratio)
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn merger(image_dir: &Path) -> RecordMerger<MinuteEstimator> {
        let range = DateRange::new(date(2019, 5, 23), date(2019, 5, 24)).unwrap();
        let times = ["09:00", "10:00"]
            .iter()
            .map(|t| NaiveTime::parse_from_str(t, "%H:%M").unwrap())
            .collect();
        RecordMerger::new(
            &range,
            times,
            ArtifactLocator::new(image_dir, "jpg"),
            FeatureComputer::new(MinuteEstimator),
        )
    }

    fn run(merger: &RecordMerger<MinuteEstimator>, feed: &str) -> (String, MergeReport) {
        let mut reader = FeedReader::from_reader(feed.as_bytes(), "utf-8").unwrap();
        let mut writer = TableWriter::from_writer(Vec::new());
        let report = merger.merge(&mut reader, &mut writer, None).unwrap();
        (String::from_utf8(writer.finish().unwrap()).unwrap(), report)
    }

    #[test]
    fn test_classify_rows() {
        let dir = TempDir::new().unwrap();
        let merger = merger(dir.path());
        let at = |d: u32, h: u32, m: u32| date(2019, 5, d).and_hms_opt(h, m, 0).unwrap();

        assert_eq!(merger.classify(&MeteoRecord::default()), RowKind::Empty);
        assert_eq!(
            merger.classify(&MeteoRecord::from(vec!["unit", "C"])),
            RowKind::Metadata
        );
        assert_eq!(
            merger.classify(&MeteoRecord::from(vec!["lat", "47.5"])),
            RowKind::Unparseable
        );
        assert_eq!(
            merger.classify(&MeteoRecord::from(vec!["20190523T0900", "1"])),
            RowKind::InRange(at(23, 9, 0))
        );
        assert_eq!(
            merger.classify(&MeteoRecord::from(vec!["20190523T0930", "1"])),
            RowKind::OutOfRange(at(23, 9, 30))
        );
        assert_eq!(
            merger.classify(&MeteoRecord::from(vec!["20190525T0900", "1"])),
            RowKind::OutOfRange(at(25, 9, 0))
        );
    }

    #[test]
    fn test_merge_appends_covers_in_offset_order() {
        let dir = TempDir::new().unwrap();
        for name in ["2019-05-23-09-00-0.jpg", "2019-05-23-09-10-0.jpg"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let feed = "variable,Temperature\nunit,C\nlevel,2 m\n20190523T0900,12.1\n";
        let (output, report) = run(&merger(dir.path()), feed);

        assert_eq!(
            output,
            "variable,Temperature,cloud_cover_t,cloud_cover_t+5m,cloud_cover_t+10m\r\n\
             unit,C,cloud_cover_t,cloud_cover_t+5m,cloud_cover_t+10m\r\n\
             level,2 m,cloud_cover_t,cloud_cover_t+5m,cloud_cover_t+10m\r\n\
             20190523T0900,12.1,0.000000,,10.000000\r\n"
        );
        assert_eq!(report.metadata_rows, 3);
        assert_eq!(report.data_rows_written, 1);
        assert_eq!(report.covers_computed, 2);
        assert_eq!(report.covers_missing, 1);
    }

    #[test]
    fn test_merge_drops_filtered_rows() {
        let dir = TempDir::new().unwrap();
        let feed = "lat,47.5\n\
                    20190522T0900,1\n\
                    20190523T0800,2\n\
                    20190523T1000,3\n\
                    20190524T0900,4\n\
                    20190525T0900,5\n";
        let (output, report) = run(&merger(dir.path()), feed);

        assert_eq!(output, "20190523T1000,3,,,\r\n20190524T0900,4,,,\r\n");
        assert_eq!(
            report,
            MergeReport {
                rows_read: 6,
                metadata_rows: 0,
                data_rows_written: 2,
                empty_rows_skipped: 0,
                unparseable_rows_dropped: 1,
                out_of_range_rows_dropped: 3,
                covers_computed: 0,
                covers_missing: 6,
            }
        );
        assert_eq!(report.rows_written(), 2);
    }

    #[test]
    fn test_summary_mentions_counts() {
        let report = MergeReport {
            rows_read: 10,
            data_rows_written: 4,
            covers_computed: 9,
            covers_missing: 3,
            ..MergeReport::default()
        };
        let summary = report.summary();
        assert!(summary.contains("Data rows written: 4"));
        assert!(summary.contains("9 computed, 3 missing (75.0% coverage)"));
    }
}
