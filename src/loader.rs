//! Flat package file parsing.
//!
//! Each meaningful line is `<package> <flag> [<flag> ...]`. Blank lines and
//! lines starting with `#` are skipped. Repeated packages are consolidated by
//! set union.

use crate::error::SplitError;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Consolidated mapping of package identifier to flag set.
pub type PackageMap = BTreeMap<String, BTreeSet<String>>;

const COMMENT_MARKER: char = '#';

/// A line that has a package identifier but no flags. Skipped, never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    pub line_number: usize,
    pub content: String,
}

impl fmt::Display for MalformedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: '{}' has no flags, skipped",
            self.line_number, self.content
        )
    }
}

/// Result of loading a flat file.
#[derive(Debug, Clone, Default)]
pub struct LoadedPackages {
    pub packages: PackageMap,
    /// Trimmed, non-blank, non-comment lines in file order.
    pub lines: Vec<String>,
    pub malformed: Vec<MalformedLine>,
}

/// True for lines the converter ignores entirely.
pub fn is_ignored(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.starts_with(COMMENT_MARKER)
}

/// Split a trimmed line into its package identifier and flags.
/// Returns `None` when the line has fewer than two tokens.
pub fn parse_line(line: &str) -> Option<(&str, Vec<&str>)> {
    let mut tokens = line.split_whitespace();
    let key = tokens.next()?;
    let flags: Vec<&str> = tokens.collect();
    if flags.is_empty() {
        return None;
    }
    Some((key, flags))
}

/// Parse file contents into a consolidated package map.
pub fn parse_contents(contents: &str) -> LoadedPackages {
    let mut loaded = LoadedPackages::default();

    for (index, raw) in contents.lines().enumerate() {
        if is_ignored(raw) {
            continue;
        }
        let line = raw.trim();
        match parse_line(line) {
            Some((key, flags)) => {
                let entry = loaded.packages.entry(key.to_string()).or_default();
                if !entry.is_empty() {
                    debug!(package = %key, "Merging repeated package entry");
                }
                entry.extend(flags.into_iter().map(str::to_string));
                loaded.lines.push(line.to_string());
            }
            None => {
                let malformed = MalformedLine {
                    line_number: index + 1,
                    content: line.to_string(),
                };
                warn!(line = malformed.line_number, content = %malformed.content, "Skipping line without flags");
                loaded.malformed.push(malformed);
            }
        }
    }

    loaded
}

/// Make sure `path` exists and is a regular file.
pub fn check_source(path: &Path) -> Result<(), SplitError> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SplitError::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(SplitError::io("inspect", path)(e)),
    };
    if !metadata.is_file() {
        let reason = if metadata.is_dir() {
            "is a directory (already converted?)".to_string()
        } else {
            "is not a regular file".to_string()
        };
        return Err(SplitError::InvalidInput {
            path: path.to_path_buf(),
            reason,
        });
    }
    Ok(())
}

/// Load a flat package file from disk.
pub fn load_package_file(path: &Path) -> Result<LoadedPackages, SplitError> {
    check_source(path)?;
    let contents = fs::read_to_string(path).map_err(SplitError::io("read", path))?;
    let loaded = parse_contents(&contents);
    debug!(
        path = %path.display(),
        packages = loaded.packages.len(),
        lines = loaded.lines.len(),
        malformed = loaded.malformed.len(),
        "Loaded package file"
    );
    Ok(loaded)
}
