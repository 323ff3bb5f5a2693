use crate::error::Result;
use crate::utils::filename::{is_image_file, parse_sky_image_filename};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::Path;

/// What the image directory currently holds
#[derive(Debug, Clone, Default)]
pub struct ImageInventory {
    /// Files carrying the image extension, whatever their name
    pub image_files: usize,
    /// Capture instants of files following the naming convention
    pub captures: BTreeSet<NaiveDateTime>,
}

impl ImageInventory {
    /// Scan a directory; a missing directory is an empty inventory
    pub fn scan(dir: &Path, extension: &str) -> Result<Self> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };

        let mut inventory = Self::default();
        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };

            if !is_image_file(name, extension) {
                continue;
            }

            inventory.image_files += 1;
            if let Some(captured_at) = parse_sky_image_filename(name, extension) {
                inventory.captures.insert(captured_at);
            }
        }

        Ok(inventory)
    }

    pub fn has_any(&self) -> bool {
        self.image_files > 0
    }

    pub fn covered_dates(&self) -> BTreeSet<NaiveDate> {
        self.captures.iter().map(|captured| captured.date()).collect()
    }

    pub fn captures_on(&self, date: NaiveDate) -> usize {
        self.captures
            .iter()
            .filter(|captured| captured.date() == date)
            .count()
    }
}
