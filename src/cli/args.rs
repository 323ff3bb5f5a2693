use clap::{Args, Parser, Subcommand};
use chrono::NaiveDate;
use std::path::PathBuf;

use crate::acquisition::AcquisitionPolicy;
use crate::config::PipelineConfig;

#[derive(Parser)]
#[command(name = "skycover-dataset")]
#[command(about = "Align meteorological observations with sky-camera cloud cover")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(short, long, global = true, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Hide the progress spinner")]
    pub no_progress: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the training table: acquire images if needed, then merge the feed
    Build {
        #[command(flatten)]
        range: RangeArgs,

        #[arg(short, long, help = "Meteorological feed CSV")]
        feed: Option<PathBuf>,

        #[arg(short, long, help = "Output CSV path")]
        output: Option<PathBuf>,

        #[arg(long, help = "Feed text encoding (e.g. utf-8, windows-1252)")]
        encoding: Option<String>,

        #[arg(long, help = "Do not check or populate the image directory")]
        skip_acquisition: bool,

        #[arg(long, help = "Print the run summary as JSON")]
        summary_json: bool,
    },

    /// Populate the image directory for the date range if needed
    Acquire {
        #[command(flatten)]
        range: RangeArgs,
    },

    /// Report which dates in the range have sky images
    Inventory {
        #[command(flatten)]
        range: RangeArgs,
    },

    /// Show the sky image paths looked up for a feed timestamp
    Locate {
        #[arg(help = "Feed timestamp, e.g. 20190523T0900")]
        timestamp: String,

        #[arg(short, long)]
        image_dir: Option<PathBuf>,
    },
}

/// Flags shared by every command that works over a date range
#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    #[arg(short, long, help = "First date of interest (YYYY-MM-DD)")]
    pub start_date: Option<NaiveDate>,

    #[arg(short, long, help = "Last date of interest, inclusive (YYYY-MM-DD)")]
    pub end_date: Option<NaiveDate>,

    #[arg(short, long, help = "Sky image directory")]
    pub image_dir: Option<PathBuf>,

    #[arg(long, value_delimiter = ',', help = "Observation times to keep, e.g. 09:00,12:00")]
    pub times: Option<Vec<String>>,

    #[arg(long, value_enum, help = "When to acquire images")]
    pub policy: Option<AcquisitionPolicy>,

    #[arg(long, help = "Program run to acquire images for a date range")]
    pub acquire_command: Option<String>,
}

impl RangeArgs {
    /// CLI flags take precedence over file and environment settings
    pub fn apply_to(&self, config: &mut PipelineConfig) {
        if let Some(start) = self.start_date {
            config.start_date = start;
        }
        if let Some(end) = self.end_date {
            config.end_date = end;
        }
        if let Some(ref dir) = self.image_dir {
            config.image_dir = dir.clone();
        }
        if let Some(ref times) = self.times {
            config.observation_times = times.clone();
        }
        if let Some(policy) = self.policy {
            config.acquisition_policy = policy;
        }
        if let Some(ref command) = self.acquire_command {
            config.acquire_command = Some(command.clone());
        }
    }
}
