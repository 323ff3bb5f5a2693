use crate::error::Result;
use crate::models::MeteoRecord;
use csv::{Terminator, Writer, WriterBuilder};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes augmented feed rows; rows may differ in length and end in `\r\n`
pub struct TableWriter<W: Write> {
    writer: Writer<W>,
    rows_written: u64,
}

impl TableWriter<BufWriter<File>> {
    /// Create the output file, creating its parent directory if needed
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        Ok(Self::from_writer(BufWriter::new(file)))
    }
}

impl<W: Write> TableWriter<W> {
    pub fn from_writer(sink: W) -> Self {
        let writer = WriterBuilder::new()
            .flexible(true)
            .terminator(Terminator::CRLF)
            .from_writer(sink);
        Self {
            writer,
            rows_written: 0,
        }
    }

    pub fn write_record(&mut self, record: &MeteoRecord) -> Result<()> {
        self.writer.write_record(record.cells())?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Flush and hand back the underlying sink
    pub fn finish(self) -> Result<W> {
        let mut sink = self.writer.into_inner().map_err(|e| e.into_error())?;
        sink.flush()?;
        Ok(sink)
    }
}
