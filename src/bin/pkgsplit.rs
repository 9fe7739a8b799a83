//! pkgsplit CLI Binary
//!
//! Converts a flat package file into a per-package directory, verifies it,
//! and replaces the original on confirmation.

use clap::Parser;
use pkgsplit::cli::{build_config, map_error, Cli, OutputFormat, RunContext};
use pkgsplit::logging::init_logging;
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    // Configuration comes first: logging settings live in it
    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(Some(&config.logging)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("pkgsplit starting");

    let context = match RunContext::new(config, &cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };

    match context.execute() {
        Ok(output) => {
            info!("Run completed");
            match context.format() {
                OutputFormat::Text => println!("{}", output),
                // stdout already holds the JSON report
                OutputFormat::Json => eprintln!("{}", output),
            }
        }
        Err(e) => {
            error!("Run failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    }
}
