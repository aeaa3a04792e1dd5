//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `origin_audit` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Report output
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use origin_audit::initialization::init_logger_with;
use origin_audit::{render_json, render_text, run_audit, Config, OutputFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format, &config.url)
        .context("Failed to initialize logger")?;

    let output = config.output;
    match run_audit(config).await {
        Ok(report) => {
            let rendered = match output {
                OutputFormat::Text => render_text(&report),
                OutputFormat::Json => render_json(&report)?,
            };
            println!("{rendered}");
            Ok(())
        }
        Err(e) => {
            eprintln!("origin_audit error: {:#}", e);
            process::exit(1);
        }
    }
}
