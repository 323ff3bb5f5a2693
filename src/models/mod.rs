pub mod date_range;
pub mod record;
pub mod timestamp;

pub use date_range::DateRange;
pub use record::{format_cover, CoverValue, MeteoRecord, RowKind};
pub use timestamp::{format_feed_timestamp, parse_feed_timestamp};
