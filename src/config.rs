//! Configuration System
//!
//! Run configuration built once at the process boundary and passed into the
//! pipeline. Layered from built-in defaults, the global config file, an
//! optional explicit file, `PKGSPLIT_*` environment variables, and finally
//! CLI flags.

use crate::logging::LoggingConfig;
use crate::naming::FileNameCodec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Flat package file to convert
    #[serde(default = "default_source")]
    pub source: PathBuf,

    /// Where the staging directory and backup copy are written
    /// (defaults to the source file's parent)
    #[serde(default)]
    pub work_dir: Option<PathBuf>,

    /// Load, write and verify only; never prompt or commit
    #[serde(default)]
    pub dry_run: bool,

    /// Remove a previous run's staging directory and backup before starting
    #[serde(default = "default_true")]
    pub clean_stale: bool,

    /// Keep the backup copy after a successful commit
    #[serde(default = "default_true")]
    pub keep_backup: bool,

    /// File name encoding for package identifiers
    #[serde(default)]
    pub naming: FileNameCodec,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

pub(crate) fn default_source() -> PathBuf {
    PathBuf::from("/etc/portage/package.use")
}

fn default_true() -> bool {
    true
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            work_dir: None,
            dry_run: false,
            clean_stale: default_true(),
            keep_backup: default_true(),
            naming: FileNameCodec::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Source(String),
    Naming(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Source(msg) => write!(f, "Source: {}", msg),
            ValidationError::Naming(msg) => write!(f, "Naming: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl SplitConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.source.as_os_str().is_empty() {
            errors.push(ValidationError::Source("path cannot be empty".to_string()));
        } else if self.source.file_name().is_none() {
            errors.push(ValidationError::Source(format!(
                "'{}' does not name a file",
                self.source.display()
            )));
        }

        let FileNameCodec {
            separator,
            substitute,
        } = self.naming;
        if separator == substitute {
            errors.push(ValidationError::Naming(format!(
                "separator and substitute are both '{}'",
                separator
            )));
        }
        if separator.is_whitespace() || substitute.is_whitespace() {
            errors.push(ValidationError::Naming(
                "separator and substitute cannot be whitespace".to_string(),
            ));
        }
        if substitute == std::path::MAIN_SEPARATOR || substitute == '\0' {
            errors.push(ValidationError::Naming(format!(
                "'{}' cannot appear in a file name",
                substitute.escape_default()
            )));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
