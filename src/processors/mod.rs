pub mod feature_computer;
pub mod record_merger;

pub use feature_computer::FeatureComputer;
pub use record_merger::{MergeReport, RecordMerger};
