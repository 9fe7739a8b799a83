//! Error types for the package file splitter.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fatal errors for a conversion run.
///
/// Malformed input lines are not represented here: they are recovered
/// locally by the loader (see [`crate::loader::MalformedLine`]).
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("Source file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid input {}: {reason}", path.display())]
    InvalidInput { path: PathBuf, reason: String },

    #[error("Failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Permission denied while trying to {action} {}: {source}", path.display())]
    PermissionDenied {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Target already exists: {}", .0.display())]
    TargetExists(PathBuf),

    #[error("Packages '{first}' and '{second}' both map to file name '{file_name}'")]
    NameCollision {
        file_name: String,
        first: String,
        second: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Failed to render report: {0}")]
    Render(#[from] serde_json::Error),
}

impl SplitError {
    /// Error mapper for a filesystem action on `path`.
    pub fn io(action: &'static str, path: &Path) -> impl FnOnce(io::Error) -> SplitError {
        let path = path.to_path_buf();
        move |source| SplitError::Io {
            action,
            path,
            source,
        }
    }

    /// Like [`SplitError::io`], but keeps permission failures distinguishable.
    /// Used on the destructive commit steps.
    pub fn destructive(action: &'static str, path: &Path) -> impl FnOnce(io::Error) -> SplitError {
        let path = path.to_path_buf();
        move |source| {
            if source.kind() == io::ErrorKind::PermissionDenied {
                SplitError::PermissionDenied {
                    action,
                    path,
                    source,
                }
            } else {
                SplitError::Io {
                    action,
                    path,
                    source,
                }
            }
        }
    }
}

impl From<config::ConfigError> for SplitError {
    fn from(err: config::ConfigError) -> Self {
        SplitError::Config(err.to_string())
    }
}
