use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::error::{ProcessingError, Result};

/// Inclusive range of calendar dates of interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ProcessingError::InvalidRange { start, end });
        }

        Ok(Self { start, end })
    }

    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Every date from start to end inclusive, in order
    pub fn expand(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take_while(|date| *date <= self.end)
            .collect()
    }

    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        *date >= self.start && *date <= self.end
    }

    /// Group the dates not in `covered` into contiguous inclusive sub-ranges
    pub fn missing_runs(&self, covered: &BTreeSet<NaiveDate>) -> Vec<DateRange> {
        let mut runs = Vec::new();
        let mut current: Option<DateRange> = None;

        for date in self.expand() {
            if covered.contains(&date) {
                if let Some(run) = current.take() {
                    runs.push(run);
                }
                continue;
            }

            current = Some(match current {
                Some(run) => DateRange {
                    start: run.start,
                    end: date,
                },
                None => DateRange::single(date),
            });
        }

        if let Some(run) = current {
            runs.push(run);
        }

        runs
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}
