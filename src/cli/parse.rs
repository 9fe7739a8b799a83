//! CLI parse: clap types for pkgsplit. No behavior; definitions only.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// pkgsplit - split a flat package file into a per-package directory
#[derive(Debug, Parser)]
#[command(name = "pkgsplit", version)]
#[command(
    about = "Split a flat package configuration file into one file per package, verify it, and replace the original"
)]
pub struct Cli {
    /// Flat package file to convert (default: /etc/portage/package.use)
    pub source: Option<PathBuf>,

    /// Load, write and verify only; never prompt and never touch the original
    #[arg(long)]
    pub dry_run: bool,

    /// Directory for the staging directory and backup copy (default: source's parent)
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Configuration file path (TOML), layered over the global config
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Disable colored diff output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, short, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
