//! Round-trip verification of a generated package directory.
//!
//! The directory is read back into flat lines and compared with the filtered
//! lines of the original file. Verification is advisory: the report is shown
//! before the commit prompt but never blocks it.

use crate::error::SplitError;
use crate::loader::{is_ignored, parse_line, PackageMap};
use crate::naming::FileNameCodec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Flat lines recovered from a package directory.
#[derive(Debug, Clone, Default)]
pub struct Reconstruction {
    /// Trimmed content lines, sorted.
    pub lines: Vec<String>,
    /// Files whose name is not the encoding of the package they contain.
    pub name_mismatches: Vec<NameMismatch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameMismatch {
    pub file_name: String,
    pub package: String,
}

/// Overall verification outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyStatus {
    /// Filtered line sets are equal.
    Identical,
    /// Lines differ but every package has the same flag set on both sides.
    Consolidated,
    /// At least one package differs, or a file name does not match its package.
    Mismatch,
}

/// Flag differences for one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDiff {
    pub package: String,
    pub before: BTreeSet<String>,
    pub after: BTreeSet<String>,
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub status: VerifyStatus,
    pub packages_before: usize,
    pub packages_after: usize,
    pub diffs: Vec<PackageDiff>,
    pub name_mismatches: Vec<NameMismatch>,
}

impl VerificationReport {
    pub fn passed(&self) -> bool {
        self.status != VerifyStatus::Mismatch
    }
}

/// Rebuild flat lines from the files in `dir`.
pub fn reconstruct(dir: &Path, codec: &FileNameCodec) -> Result<Reconstruction, SplitError> {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .map_err(SplitError::io("read directory", dir))?
        .collect::<Result<_, _>>()
        .map_err(SplitError::io("read directory", dir))?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut out = Reconstruction::default();
    for entry in entries {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let contents = fs::read_to_string(&path).map_err(SplitError::io("read", &path))?;

        for line in contents.lines().filter(|l| !is_ignored(l)) {
            let line = line.trim();
            let package = line.split_whitespace().next().unwrap_or_default();
            if !codec.matches(&file_name, package) {
                warn!(
                    file = %file_name,
                    package = %package,
                    decoded = %codec.decode(&file_name),
                    "File name does not match its package"
                );
                out.name_mismatches.push(NameMismatch {
                    file_name: file_name.clone(),
                    package: package.to_string(),
                });
            }
            out.lines.push(line.to_string());
        }
    }
    out.lines.sort();
    Ok(out)
}

/// Per-package union of flags over a set of flat lines.
fn flag_map<'a, I: IntoIterator<Item = &'a String>>(lines: I) -> PackageMap {
    let mut map = PackageMap::new();
    for line in lines {
        let Some((key, flags)) = parse_line(line) else {
            continue;
        };
        map.entry(key.to_string())
            .or_default()
            .extend(flags.into_iter().map(str::to_string));
    }
    map
}

/// Per-package differences between `before` and `after`, omitting equal packages.
pub fn diff_packages(before: &PackageMap, after: &PackageMap) -> Vec<PackageDiff> {
    let empty = BTreeSet::new();
    let keys: BTreeSet<&String> = before.keys().chain(after.keys()).collect();

    keys.into_iter()
        .filter_map(|key| {
            let b = before.get(key).unwrap_or(&empty);
            let a = after.get(key).unwrap_or(&empty);
            if a == b {
                return None;
            }
            Some(PackageDiff {
                package: key.clone(),
                before: b.clone(),
                after: a.clone(),
                added: a.difference(b).cloned().collect(),
                removed: b.difference(a).cloned().collect(),
            })
        })
        .collect()
}

/// Compare the original filtered lines with a reconstruction.
pub fn compare(original_lines: &[String], reconstruction: &Reconstruction) -> VerificationReport {
    let mut original: Vec<String> = original_lines.to_vec();
    original.sort();

    let before = flag_map(&original);
    let after = flag_map(&reconstruction.lines);
    let diffs = diff_packages(&before, &after);

    let status = if !diffs.is_empty() || !reconstruction.name_mismatches.is_empty() {
        VerifyStatus::Mismatch
    } else if original == reconstruction.lines {
        VerifyStatus::Identical
    } else {
        VerifyStatus::Consolidated
    };
    debug!(?status, diffs = diffs.len(), "Verification complete");

    VerificationReport {
        status,
        packages_before: before.len(),
        packages_after: after.len(),
        diffs,
        name_mismatches: reconstruction.name_mismatches.clone(),
    }
}

/// Reconstruct `dir` and compare it with `original_lines`.
pub fn verify_dir(
    original_lines: &[String],
    dir: &Path,
    codec: &FileNameCodec,
) -> Result<VerificationReport, SplitError> {
    let reconstruction = reconstruct(dir, codec)?;
    Ok(compare(original_lines, &reconstruction))
}
