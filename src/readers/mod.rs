pub mod feed_reader;

pub use feed_reader::{resolve_encoding, FeedReader};
