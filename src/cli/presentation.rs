//! CLI presentation: verification report, malformed-line warnings, and the
//! final outcome message. Pure formatting; nothing here touches the filesystem.

use crate::commit::CommitState;
use crate::error::SplitError;
use crate::loader::MalformedLine;
use crate::pipeline::{Prepared, RunOutcome, RunPaths};
use crate::verify::{PackageDiff, VerificationReport, VerifyStatus};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

fn mark_flags(
    flags: &BTreeSet<String>,
    marked: &BTreeSet<String>,
    prefix: char,
    paint: impl Fn(&str) -> String,
) -> String {
    flags
        .iter()
        .map(|flag| {
            if marked.contains(flag) {
                paint(&format!("{}{}", prefix, flag))
            } else {
                flag.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One report line: the original flags with removed ones marked `-`, then the
/// reconstructed flags with added ones marked `*`.
pub fn render_diff_line(diff: &PackageDiff, color: bool) -> String {
    let before = mark_flags(&diff.before, &diff.removed, '-', |s| {
        if color {
            s.red().to_string()
        } else {
            s.to_string()
        }
    });
    let after = mark_flags(&diff.after, &diff.added, '*', |s| {
        if color {
            s.green().to_string()
        } else {
            s.to_string()
        }
    });
    format!("{} {} -> {} {}", diff.package, before, diff.package, after)
        .trim_end()
        .to_string()
}

/// Human-readable verification report.
pub fn format_report_text(report: &VerificationReport, source: &Path, color: bool) -> String {
    let mut out = String::new();
    match report.status {
        VerifyStatus::Identical => {
            out.push_str(&format!(
                "Verification passed: the package directory matches {}.",
                source.display()
            ));
        }
        VerifyStatus::Consolidated => {
            out.push_str(&format!(
                "Verification passed: the package directory matches {} ({} packages, repeated entries merged).",
                source.display(),
                report.packages_after
            ));
        }
        VerifyStatus::Mismatch => {
            let headline = format!(
                "Verification failed: differences found between the package directory and {}.",
                source.display()
            );
            if color {
                out.push_str(&headline.yellow().to_string());
            } else {
                out.push_str(&headline);
            }
            if !report.diffs.is_empty() {
                out.push_str("\n\nOriginal -> Reconstructed\n");
                for diff in &report.diffs {
                    out.push_str(&render_diff_line(diff, color));
                    out.push('\n');
                }
            }
            if !report.name_mismatches.is_empty() {
                out.push_str("\nFiles whose name does not match their package:\n");
                for mismatch in &report.name_mismatches {
                    out.push_str(&format!(
                        "  {} holds {}\n",
                        mismatch.file_name, mismatch.package
                    ));
                }
            }
        }
    }
    out.trim_end().to_string()
}

/// Warning block for skipped lines, if any.
pub fn format_malformed_lines(malformed: &[MalformedLine]) -> Option<String> {
    if malformed.is_empty() {
        return None;
    }
    let mut out = format!("Skipped {} malformed line(s):", malformed.len());
    for line in malformed {
        out.push_str(&format!("\n  {}", line));
    }
    Some(out)
}

#[derive(Serialize)]
struct PreparedView<'a> {
    source: &'a Path,
    staging_dir: &'a Path,
    packages: usize,
    files: usize,
    malformed: Vec<String>,
    verification: &'a VerificationReport,
}

/// Machine-readable form of the pre-commit state.
pub fn format_prepared_json(prepared: &Prepared, paths: &RunPaths) -> Result<String, SplitError> {
    let view = PreparedView {
        source: &paths.source,
        staging_dir: &paths.staging_dir,
        packages: prepared.loaded.packages.len(),
        files: prepared.written.files.len(),
        malformed: prepared
            .loaded
            .malformed
            .iter()
            .map(ToString::to_string)
            .collect(),
        verification: &prepared.report,
    };
    Ok(serde_json::to_string_pretty(&view)?)
}

/// Final line printed after the run.
pub fn format_outcome(outcome: &RunOutcome, paths: &RunPaths) -> String {
    match outcome.state {
        CommitState::Committed => match &outcome.retained_backup {
            Some(backup) => format!(
                "Changes committed. {} is now a directory; the original file has been backed up as {}.",
                paths.target_dir.display(),
                backup.display()
            ),
            None => format!(
                "Changes committed. {} is now a directory.",
                paths.target_dir.display()
            ),
        },
        CommitState::Aborted if outcome.dry_run => format!(
            "Dry run complete: {} packages verified, {} left unchanged.",
            outcome.packages.len(),
            paths.source.display()
        ),
        CommitState::Aborted | CommitState::Pending => {
            "Changes were not committed. Generated files removed.".to_string()
        }
    }
}
