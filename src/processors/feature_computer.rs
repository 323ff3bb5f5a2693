use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tracing::{debug, warn};

use crate::imaging::CoverEstimator;
use crate::models::CoverValue;

/// Turns an artifact path into an optional cover value.
///
/// Every failure (missing file, decode error, estimator error or panic) becomes
/// `None` so that one bad image never stops the run.
pub struct FeatureComputer<E> {
    estimator: E,
}

impl<E: CoverEstimator> FeatureComputer<E> {
    pub fn new(estimator: E) -> Self {
        Self { estimator }
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    pub fn compute(&self, path: &Path) -> CoverValue {
        if !path.exists() {
            debug!(path = %path.display(), "sky image missing");
            return None;
        }

        match panic::catch_unwind(AssertUnwindSafe(|| self.estimator.estimate(path))) {
            Ok(Ok(value)) if value.is_finite() => Some(value),
            Ok(Ok(value)) => {
                warn!(path = %path.display(), value, "discarding non-finite cloud cover");
                None
            }
            Ok(Err(e)) => {
                warn!(path = %path.display(), error = %e, "cloud cover estimation failed");
                None
            }
            Err(_) => {
                warn!(path = %path.display(), "cloud cover estimator panicked");
                None
            }
        }
    }
}
