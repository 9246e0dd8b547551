//! Main application entry point (CLI binary).
//!
//! Thin wrapper around the `stack_compare` library: parses arguments,
//! initializes logging, runs the comparison and prints a summary.

use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use stack_compare::initialization::init_logger_with;
use stack_compare::{run_comparison, Config, Opt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from(Opt::parse());

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    match run_comparison(config).await {
        Ok(report) => {
            // stdout carries the live per-domain lines; the summary goes to stderr
            eprintln!(
                "Compared {} domain{} ({} clean, {} with failures, {} timed out) in {:.1}s",
                report.total,
                if report.total == 1 { "" } else { "s" },
                report.all_succeeded,
                report.with_failures,
                report.timed_out,
                report.elapsed_seconds
            );
            eprintln!("Results saved in {}", report.output_path.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("stack_compare error: {:#}", e);
            process::exit(1);
        }
    }
}
