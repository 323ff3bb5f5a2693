use chrono::NaiveDateTime;

use crate::utils::constants::{COVER_COLUMN_LABELS, METADATA_LABELS};

/// Percentage cloud cover for one capture; `None` when it could not be computed
pub type CoverValue = Option<f64>;

/// One feed row as ordered string cells
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeteoRecord {
    cells: Vec<String>,
}

impl MeteoRecord {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<String> {
        self.cells
    }

    pub fn first_cell(&self) -> Option<&str> {
        self.cells.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Header rows are keyed by a fixed set of first-cell labels
    pub fn is_metadata(&self) -> bool {
        self.first_cell()
            .is_some_and(|cell| METADATA_LABELS.contains(&cell))
    }

    /// Metadata row plus the three cover column labels
    pub fn with_cover_labels(mut self) -> Self {
        self.cells
            .extend(COVER_COLUMN_LABELS.iter().map(|label| label.to_string()));
        self
    }

    /// Data row plus the three formatted cover cells, in offset order
    pub fn with_covers(mut self, covers: &[CoverValue]) -> Self {
        self.cells.extend(covers.iter().map(format_cover));
        self
    }
}

impl From<Vec<String>> for MeteoRecord {
    fn from(cells: Vec<String>) -> Self {
        Self::new(cells)
    }
}

impl<'a> From<Vec<&'a str>> for MeteoRecord {
    fn from(cells: Vec<&'a str>) -> Self {
        Self::new(cells.into_iter().map(str::to_string).collect())
    }
}

/// How the merger treats a single feed row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Empty,
    Metadata,
    Unparseable,
    OutOfRange(NaiveDateTime),
    InRange(NaiveDateTime),
}

/// Blank for an absent value, six fractional digits otherwise
pub fn format_cover(cover: &CoverValue) -> String {
    match cover {
        Some(value) => format!("{:.6}", value),
        None => String::new(),
    }
}
