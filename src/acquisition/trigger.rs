use crate::acquisition::{AcquisitionPolicy, ImageAcquirer, ImageInventory};
use crate::error::Result;
use crate::models::DateRange;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Result of one trigger run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AcquisitionOutcome {
    AlreadyPopulated,
    Acquired { requests: Vec<DateRange> },
    /// Images were missing but no acquirer is configured
    Unavailable { missing: Vec<DateRange> },
}

/// Decides from the local inventory whether to call the acquirer
pub struct AcquisitionTrigger {
    image_dir: PathBuf,
    extension: String,
    policy: AcquisitionPolicy,
}

impl AcquisitionTrigger {
    pub fn new(image_dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            image_dir: image_dir.into(),
            extension: extension.into(),
            policy: AcquisitionPolicy::AnyImage,
        }
    }

    pub fn with_policy(mut self, policy: AcquisitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Make sure the image directory exists and, if the policy says so, fill it
    pub fn ensure_images<A: ImageAcquirer>(
        &self,
        range: &DateRange,
        acquirer: &A,
    ) -> Result<AcquisitionOutcome> {
        std::fs::create_dir_all(&self.image_dir)?;
        let inventory = ImageInventory::scan(&self.image_dir, &self.extension)?;

        let requests = match self.policy {
            AcquisitionPolicy::AnyImage => {
                if inventory.has_any() {
                    Vec::new()
                } else {
                    vec![*range]
                }
            }
            AcquisitionPolicy::PerDate => range.missing_runs(&inventory.covered_dates()),
        };

        if requests.is_empty() {
            debug!(
                dir = %self.image_dir.display(),
                images = inventory.image_files,
                policy = %self.policy,
                "image directory already populated"
            );
            return Ok(AcquisitionOutcome::AlreadyPopulated);
        }

        if !acquirer.is_enabled() {
            warn!(
                dir = %self.image_dir.display(),
                runs = requests.len(),
                "images missing and no acquisition command configured"
            );
            return Ok(AcquisitionOutcome::Unavailable { missing: requests });
        }

        for request in &requests {
            info!(range = %request, dir = %self.image_dir.display(), "acquiring sky images");
            acquirer.acquire(request.start(), request.end())?;
        }

        Ok(AcquisitionOutcome::Acquired { requests })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::DisabledAcquirer;
    use crate::error::ProcessingError;
    use crate::utils::sky_image_filename;
    use chrono::NaiveDate;
    use std::cell::RefCell;
    use std::path::Path;
    use tempfile::TempDir;

    /// Records requests and drops one capture per requested date into the directory
    struct RecordingAcquirer {
        dir: PathBuf,
        calls: RefCell<Vec<(NaiveDate, NaiveDate)>>,
    }

    impl RecordingAcquirer {
        fn new(dir: &Path) -> Self {
            Self {
                dir: dir.to_path_buf(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl ImageAcquirer for RecordingAcquirer {
        fn acquire(&self, start: NaiveDate, end: NaiveDate) -> Result<()> {
            self.calls.borrow_mut().push((start, end));
            for date in DateRange::new(start, end)?.expand() {
                let captured = date.and_hms_opt(9, 0, 0).unwrap();
                std::fs::write(self.dir.join(sky_image_filename(&captured, "jpg")), b"")?;
            }
            Ok(())
        }
    }

    struct FailingAcquirer;

    impl ImageAcquirer for FailingAcquirer {
        fn acquire(&self, _start: NaiveDate, _end: NaiveDate) -> Result<()> {
            Err(ProcessingError::Acquisition("network down".to_string()))
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_creates_directory_and_acquires_whole_range() -> Result<()> {
        let root = TempDir::new()?;
        let image_dir = root.path().join("sky_camera_images");
        let range = DateRange::new(date(2019, 5, 23), date(2019, 5, 25))?;
        let acquirer = RecordingAcquirer::new(&image_dir);

        let outcome = AcquisitionTrigger::new(&image_dir, "jpg").ensure_images(&range, &acquirer)?;

        assert!(image_dir.is_dir());
        assert_eq!(outcome, AcquisitionOutcome::Acquired { requests: vec![range] });
        assert_eq!(
            *acquirer.calls.borrow(),
            vec![(date(2019, 5, 23), date(2019, 5, 25))]
        );
        Ok(())
    }

    #[test]
    fn test_second_run_does_not_acquire() -> Result<()> {
        let root = TempDir::new()?;
        let range = DateRange::single(date(2019, 5, 23));
        let acquirer = RecordingAcquirer::new(root.path());
        let trigger = AcquisitionTrigger::new(root.path(), "jpg");

        trigger.ensure_images(&range, &acquirer)?;
        let second = trigger.ensure_images(&range, &acquirer)?;

        assert_eq!(second, AcquisitionOutcome::AlreadyPopulated);
        assert_eq!(acquirer.calls.borrow().len(), 1);
        Ok(())
    }

    #[test]
    fn test_any_image_skips_partially_populated_directory() -> Result<()> {
        let root = TempDir::new()?;
        std::fs::write(root.path().join("unrelated.JPG"), b"")?;
        let range = DateRange::new(date(2019, 5, 23), date(2019, 5, 30))?;
        let acquirer = RecordingAcquirer::new(root.path());

        let outcome = AcquisitionTrigger::new(root.path(), "jpg").ensure_images(&range, &acquirer)?;

        assert_eq!(outcome, AcquisitionOutcome::AlreadyPopulated);
        assert!(acquirer.calls.borrow().is_empty());
        Ok(())
    }

    #[test]
    fn test_per_date_requests_only_missing_runs() -> Result<()> {
        let root = TempDir::new()?;
        for day in [2, 3, 6] {
            let captured = date(2019, 5, day).and_hms_opt(12, 0, 0).unwrap();
            std::fs::write(root.path().join(sky_image_filename(&captured, "jpg")), b"")?;
        }
        let range = DateRange::new(date(2019, 5, 1), date(2019, 5, 6))?;
        let acquirer = RecordingAcquirer::new(root.path());
        let trigger =
            AcquisitionTrigger::new(root.path(), "jpg").with_policy(AcquisitionPolicy::PerDate);

        trigger.ensure_images(&range, &acquirer)?;
        assert_eq!(
            *acquirer.calls.borrow(),
            vec![
                (date(2019, 5, 1), date(2019, 5, 1)),
                (date(2019, 5, 4), date(2019, 5, 5)),
            ]
        );

        assert_eq!(
            trigger.ensure_images(&range, &acquirer)?,
            AcquisitionOutcome::AlreadyPopulated
        );
        Ok(())
    }

    #[test]
    fn test_acquirer_failure_propagates() -> Result<()> {
        let root = TempDir::new()?;
        let range = DateRange::single(date(2019, 5, 23));
        let result = AcquisitionTrigger::new(root.path(), "jpg").ensure_images(&range, &FailingAcquirer);
        assert!(matches!(result, Err(ProcessingError::Acquisition(_))));
        Ok(())
    }

    #[test]
    fn test_disabled_acquirer_reports_missing_ranges() -> Result<()> {
        let root = TempDir::new()?;
        let range = DateRange::new(date(2019, 5, 23), date(2019, 5, 24))?;
        let trigger = AcquisitionTrigger::new(root.path(), "jpg");

        let outcome = trigger.ensure_images(&range, &DisabledAcquirer)?;
        assert_eq!(outcome, AcquisitionOutcome::Unavailable { missing: vec![range] });

        let boxed: Box<dyn ImageAcquirer> = Box::new(DisabledAcquirer);
        assert_eq!(
            trigger.ensure_images(&range, &boxed)?,
            AcquisitionOutcome::Unavailable { missing: vec![range] }
        );
        Ok(())
    }
}
