use chrono::NaiveDateTime;

use crate::utils::constants::{FEED_DATE_DIGITS, FEED_TIMESTAMP_FORMAT, FEED_TIMESTAMP_LEN};

/// Parse a feed timestamp cell such as `20190523T0900`.
///
/// Characters past the thirteenth are ignored. Returns `None` for anything
/// that is not a timestamp; the feed shares column 0 between data rows and
/// free-text metadata, so a miss means "skip this row", never an error.
///
/// # Examples
/// ```
/// use skycover_dataset::models::parse_feed_timestamp;
///
/// let dt = parse_feed_timestamp("20190523T0900").unwrap();
/// assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2019-05-23 09:00");
/// assert!(parse_feed_timestamp("variable").is_none());
/// ```
pub fn parse_feed_timestamp(cell: &str) -> Option<NaiveDateTime> {
    if cell.len() < FEED_TIMESTAMP_LEN {
        return None;
    }

    // Cheap pre-filter before the strict parse
    let date_part = cell.get(..FEED_DATE_DIGITS)?;
    if !date_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let head = cell.get(..FEED_TIMESTAMP_LEN)?;
    NaiveDateTime::parse_from_str(head, FEED_TIMESTAMP_FORMAT).ok()
}

/// Render a datetime back into the feed encoding
pub fn format_feed_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(FEED_TIMESTAMP_FORMAT).to_string()
}
