pub mod inventory;
pub mod trigger;

pub use inventory::ImageInventory;
pub use trigger::{AcquisitionOutcome, AcquisitionTrigger};

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{ACQUIRE_DIR_ENV, ISO_DATE_FORMAT};
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Command;
use tracing::{info, warn};

/// Populates the image directory with captures for an inclusive date range
pub trait ImageAcquirer {
    fn acquire(&self, start: NaiveDate, end: NaiveDate) -> Result<()>;

    /// `false` when calling `acquire` cannot fetch anything
    fn is_enabled(&self) -> bool {
        true
    }
}

/// When the trigger should ask for images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AcquisitionPolicy {
    /// Acquire the whole range only if the directory holds no image at all
    #[default]
    AnyImage,
    /// Acquire each contiguous run of dates that has no capture
    PerDate,
}

impl std::fmt::Display for AcquisitionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AcquisitionPolicy::AnyImage => write!(f, "any-image"),
            AcquisitionPolicy::PerDate => write!(f, "per-date"),
        }
    }
}

/// Runs an external download program as `<program> [args..] <start> <end>`.
///
/// Dates are passed as `YYYY-MM-DD`; the target directory is exported in
/// `SKY_IMAGE_DIR`. A non-zero exit is an acquisition failure.
#[derive(Debug, Clone)]
pub struct CommandAcquirer {
    program: String,
    args: Vec<String>,
    target_dir: PathBuf,
}

impl CommandAcquirer {
    pub fn new(program: impl Into<String>, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            target_dir: target_dir.into(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    fn command(&self, start: NaiveDate, end: NaiveDate) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(start.format(ISO_DATE_FORMAT).to_string())
            .arg(end.format(ISO_DATE_FORMAT).to_string())
            .env(ACQUIRE_DIR_ENV, &self.target_dir);
        command
    }
}

impl ImageAcquirer for CommandAcquirer {
    fn acquire(&self, start: NaiveDate, end: NaiveDate) -> Result<()> {
        info!(program = %self.program, %start, %end, "running image acquisition");

        let status = self.command(start, end).status().map_err(|e| {
            ProcessingError::Acquisition(format!("could not run '{}': {}", self.program, e))
        })?;

        if !status.success() {
            return Err(ProcessingError::Acquisition(format!(
                "'{}' exited with {} for {} to {}",
                self.program, status, start, end
            )));
        }

        Ok(())
    }
}

/// Stand-in when no acquisition program is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledAcquirer;

impl ImageAcquirer for DisabledAcquirer {
    fn acquire(&self, start: NaiveDate, end: NaiveDate) -> Result<()> {
        warn!(%start, %end, "no acquisition command configured; continuing without new images");
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

impl<A: ImageAcquirer + ?Sized> ImageAcquirer for Box<A> {
    fn acquire(&self, start: NaiveDate, end: NaiveDate) -> Result<()> {
        (**self).acquire(start, end)
    }

    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }
}
