use crate::error::{ProcessingError, Result};
use crate::models::MeteoRecord;
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use csv::{ByteRecord, Reader, ReaderBuilder};
use encoding_rs::Encoding;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Streams feed rows one at a time, decoding cells from the feed's encoding
pub struct FeedReader<R: Read> {
    reader: Reader<R>,
    encoding: &'static Encoding,
    record: ByteRecord,
    rows_read: u64,
}

impl FeedReader<BufReader<File>> {
    pub fn open(path: &Path, encoding_label: &str) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file), encoding_label)
    }
}

impl<R: Read> FeedReader<R> {
    pub fn from_reader(source: R, encoding_label: &str) -> Result<Self> {
        let encoding = resolve_encoding(encoding_label)?;
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(source);

        Ok(Self {
            reader,
            encoding,
            record: ByteRecord::new(),
            rows_read: 0,
        })
    }

    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Next row, or `None` at end of feed
    pub fn next_record(&mut self) -> Result<Option<MeteoRecord>> {
        if !self.reader.read_byte_record(&mut self.record)? {
            return Ok(None);
        }

        let first_row = self.rows_read == 0;
        self.rows_read += 1;

        let cells = self
            .record
            .iter()
            .enumerate()
            .map(|(index, bytes)| {
                let (text, had_errors) = if first_row && index == 0 {
                    self.encoding.decode_with_bom_removal(bytes)
                } else {
                    self.encoding.decode_without_bom_handling(bytes)
                };
                if had_errors {
                    debug!(row = self.rows_read, column = index, "replaced undecodable bytes");
                }
                text.into_owned()
            })
            .collect();

        Ok(Some(MeteoRecord::new(cells)))
    }
}

impl<R: Read> Iterator for FeedReader<R> {
    type Item = Result<MeteoRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Look up a WHATWG encoding label such as `utf-8` or `windows-1252`
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| ProcessingError::Encoding(label.to_string()))
}
