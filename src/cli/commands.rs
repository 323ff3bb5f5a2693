use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::acquisition::{AcquisitionOutcome, ImageInventory};
use crate::cli::args::{Cli, Commands};
use crate::config::PipelineConfig;
use crate::models::parse_feed_timestamp;
use crate::pipeline::build_dataset;
use crate::utils::constants::MINUTE_OFFSETS;
use crate::utils::filename::ArtifactLocator;
use crate::utils::progress::ProgressReporter;

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let mut config = PipelineConfig::load(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("failed to load configuration from {}", path.display()),
        None => "failed to load configuration".to_string(),
    })?;

    match cli.command {
        Commands::Build {
            range,
            feed,
            output,
            encoding,
            skip_acquisition,
            summary_json,
        } => {
            range.apply_to(&mut config);
            if let Some(feed) = feed {
                config.feed_path = feed;
            }
            if let Some(output) = output {
                config.output_path = output;
            }
            if let Some(encoding) = encoding {
                config.feed_encoding = encoding;
            }
            let config = config.validated().context("invalid configuration")?;

            println!("Building cloud cover training table...");
            println!("Feed: {}", config.feed_path.display());
            println!("Images: {}", config.image_dir.display());
            println!("Output: {}", config.output_path.display());

            let progress = ProgressReporter::new_spinner("Merging feed rows...", cli.no_progress);
            let acquirer = config.acquirer();
            let summary = build_dataset(
                &config,
                (!skip_acquisition).then_some(&acquirer),
                config.estimator(),
                Some(&progress),
            )
            .with_context(|| {
                format!(
                    "failed to build training table from {}",
                    config.feed_path.display()
                )
            })?;
            progress.finish_with_message(&format!(
                "Wrote {} rows",
                summary.merge.rows_written()
            ));

            if summary_json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("\n{}", summary.merge.summary());
                println!("Processing complete!");
            }
        }

        Commands::Acquire { range } => {
            range.apply_to(&mut config);
            let config = config.validated().context("invalid configuration")?;
            let date_range = config.date_range()?;

            let outcome = config
                .trigger()
                .ensure_images(&date_range, &config.acquirer())
                .with_context(|| format!("failed to acquire images for {}", date_range))?;

            match outcome {
                AcquisitionOutcome::AlreadyPopulated => {
                    println!(
                        "{} already holds images; nothing to acquire ({} policy)",
                        config.image_dir.display(),
                        config.acquisition_policy
                    );
                }
                AcquisitionOutcome::Acquired { requests } => {
                    for request in requests {
                        println!("Requested images for {}", request);
                    }
                }
                AcquisitionOutcome::Unavailable { missing } => {
                    println!("No acquisition command configured; set acquire_command to fetch:");
                    for run in missing {
                        println!("  Missing: {}", run);
                    }
                }
            }
        }

        Commands::Inventory { range } => {
            range.apply_to(&mut config);
            let config = config.validated().context("invalid configuration")?;
            let date_range = config.date_range()?;

            let inventory = ImageInventory::scan(&config.image_dir, &config.image_extension)
                .with_context(|| format!("failed to scan {}", config.image_dir.display()))?;

            println!("Image directory: {}", config.image_dir.display());
            println!(
                "{} image files, {} named captures",
                inventory.image_files,
                inventory.captures.len()
            );

            for date in date_range.expand() {
                let captures = inventory.captures_on(date);
                let marker = if captures == 0 { "missing" } else { "ok" };
                println!("  {}  {:>4} captures  {}", date, captures, marker);
            }

            let missing = date_range.missing_runs(&inventory.covered_dates());
            if missing.is_empty() {
                println!("All {} dates have captures", date_range.len());
            } else {
                for run in missing {
                    println!("Missing: {}", run);
                }
            }
        }

        Commands::Locate {
            timestamp,
            image_dir,
        } => {
            if let Some(dir) = image_dir {
                config.image_dir = dir;
            }
            for (minutes, path, present) in locate_captures(&config.locator(), &timestamp)? {
                let state = if present { "present" } else { "missing" };
                println!("t+{:<2}m  {}  {}", minutes, path.display(), state);
            }
        }
    }

    Ok(())
}

/// Image paths for a feed timestamp at each capture offset, with whether they exist
fn locate_captures(locator: &ArtifactLocator, timestamp: &str) -> Result<Vec<(i64, PathBuf, bool)>> {
    let parsed = parse_feed_timestamp(timestamp)
        .with_context(|| format!("'{}' is not a feed timestamp (YYYYMMDDTHHMM)", timestamp))?;

    Ok(MINUTE_OFFSETS
        .iter()
        .map(|minutes| {
            let path = locator.path(&(parsed + chrono::Duration::minutes(*minutes)));
            let present = path.exists();
            (*minutes, path, present)
        })
        .collect())
}

/// Install the tracing subscriber; `RUST_LOG` wins over `--verbose`
fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| anyhow::anyhow!("failed to install logger: {}", e))?;
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow::anyhow!("failed to install logger: {}", e))?;
        }
    }

    info!(verbose, "logging initialised");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_locate_captures_reports_each_offset() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("2019-05-23-09-05-0.jpg"), b"").unwrap();
        let locator = ArtifactLocator::new(dir.path(), "jpg");

        let found = locate_captures(&locator, "20190523T0900").unwrap();

        assert_eq!(
            found,
            vec![
                (0, dir.path().join("2019-05-23-09-00-0.jpg"), false),
                (5, dir.path().join("2019-05-23-09-05-0.jpg"), true),
                (10, dir.path().join("2019-05-23-09-10-0.jpg"), false),
            ]
        );
    }

    #[test]
    fn test_locate_rejects_malformed_timestamp() {
        let locator = ArtifactLocator::new("sky_camera_images", "jpg");
        let err = locate_captures(&locator, "2019-05-23 09:00").unwrap_err();
        assert!(err.to_string().contains("not a feed timestamp"));
    }
}
