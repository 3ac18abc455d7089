//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and loads configuration
//! - computes the quarter boundary
//! - runs the fetch/validate/write pipeline
//! - prints the created file names

use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use tracing::info;

use crate::cli::Cli;
use crate::config::RatesConfig;
use crate::data::TreasuryClient;
use crate::error::AppError;
use crate::quarter::compute_boundary;

pub mod pipeline;

/// Entry point for the `fxq` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    let mut config = RatesConfig::from_env()?;
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }

    let level = if cli.verbose { "debug" } else { config.log_level.as_str() };
    crate::logging::init(level);

    // Validate the date before any network traffic.
    let today = Local::now().date_naive();
    let boundary = compute_boundary(cli.since.as_deref(), today)?;
    info!(%boundary, output_dir = %config.output_dir.display(), "starting fetch");

    let client = TreasuryClient::from_config(&config)?;
    let run = pipeline::run_ingest(&client, &boundary, &config.output_dir, cli.verify)?;

    println!("{}", format_summary(&run.files, &run.boundary.to_string()));
    Ok(())
}

/// One-line result message listing created file names.
pub fn format_summary(files: &[PathBuf], boundary: &str) -> String {
    if files.is_empty() {
        return format!("No exchange rate records found since {boundary}.");
    }

    let names: Vec<String> = files
        .iter()
        .map(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string())
        })
        .collect();
    format!("Successfully created: {}.", names.join(", "))
}
