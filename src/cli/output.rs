//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::SplitError;

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &SplitError) -> String {
    match e {
        SplitError::PermissionDenied { .. } => format!(
            "{}\nPlease run with appropriate permissions (e.g., using sudo) and try again.",
            e
        ),
        SplitError::TargetExists(_) => format!(
            "{}\nRemove it or enable clean_stale, then try again.",
            e
        ),
        _ => e.to_string(),
    }
}
