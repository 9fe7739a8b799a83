//! Commit confirmation and the destructive replace step.
//!
//! A run starts `Pending`. Only an affirmative answer moves it to
//! `Committed`: the original file is removed and the staging directory is
//! moved into its place. Anything else ends in `Aborted`, which removes the
//! generated artifacts and leaves the original untouched.
//!
//! The two commit steps are not atomic. A crash between removing the original
//! and moving the directory leaves neither in place; the backup copy is the
//! recovery path for that case.

use crate::error::SplitError;
use crate::pipeline::RunPaths;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Source of a yes/no decision before the destructive step.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool, SplitError>;
}

/// Interpret a typed answer. `None` means "ask again".
pub fn parse_answer(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" => Some(true),
        "no" | "n" => Some(false),
        _ => None,
    }
}

/// Keep asking until an answer parses. End of input counts as "no".
fn ask_until_answered<F>(mut next: F) -> Result<bool, SplitError>
where
    F: FnMut() -> Result<Option<String>, SplitError>,
{
    loop {
        let Some(answer) = next()? else {
            debug!("No more input, treating as refusal");
            return Ok(false);
        };
        match parse_answer(&answer) {
            Some(decision) => return Ok(decision),
            None => eprintln!("Invalid input. Please type 'yes/y' or 'no/n'."),
        }
    }
}

/// Interactive prompt on the controlling terminal; reads plain lines from
/// stdin when it is not a terminal.
#[derive(Debug, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool, SplitError> {
        if io::stdin().is_terminal() {
            ask_until_answered(|| {
                dialoguer::Input::<String>::new()
                    .with_prompt(prompt)
                    .allow_empty(true)
                    .interact_text()
                    .map(Some)
                    .map_err(|e| SplitError::Prompt(e.to_string()))
            })
        } else {
            let stdin = io::stdin();
            let mut lines = stdin.lock().lines();
            ask_until_answered(|| {
                eprint!("{}: ", prompt);
                io::stderr().flush().ok();
                lines
                    .next()
                    .transpose()
                    .map_err(|e| SplitError::Prompt(e.to_string()))
            })
        }
    }
}

/// Fixed decision, for dry runs driven programmatically and for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm(&mut self, _prompt: &str) -> Result<bool, SplitError> {
        Ok(self.0)
    }
}

/// Replays typed answers through the same parsing as the terminal prompt.
#[derive(Debug, Default)]
pub struct ScriptedConfirm {
    answers: VecDeque<String>,
    pub asked: usize,
}

impl ScriptedConfirm {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: 0,
        }
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&mut self, _prompt: &str) -> Result<bool, SplitError> {
        ask_until_answered(|| {
            self.asked += 1;
            Ok(self.answers.pop_front())
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitState {
    Pending,
    Committed,
    Aborted,
}

/// Owns the generated artifacts of one run and decides their fate.
#[derive(Debug)]
pub struct Committer<'a> {
    paths: &'a RunPaths,
    keep_backup: bool,
    state: CommitState,
    /// Staging directory existed before this run; never ours to delete.
    staging_preexisting: bool,
    /// The backup is the only remaining copy of the original content.
    backup_is_sole_copy: bool,
}

impl<'a> Committer<'a> {
    pub fn new(paths: &'a RunPaths, keep_backup: bool) -> Self {
        Self {
            paths,
            keep_backup,
            state: CommitState::Pending,
            staging_preexisting: paths.staging_dir.exists(),
            backup_is_sole_copy: false,
        }
    }

    pub fn state(&self) -> CommitState {
        self.state
    }

    /// Ask once (re-prompting on invalid input) and act on the answer.
    pub fn decide(
        &mut self,
        confirm: &mut dyn Confirm,
        prompt: &str,
    ) -> Result<CommitState, SplitError> {
        if self.state != CommitState::Pending {
            return Ok(self.state);
        }
        if confirm.confirm(prompt)? {
            self.commit()?;
        } else {
            self.abort();
        }
        Ok(self.state)
    }

    /// Replace the original file with the staging directory.
    pub fn commit(&mut self) -> Result<(), SplitError> {
        let source = &self.paths.source;
        info!(source = %source.display(), "Committing package directory");

        if source.exists() {
            fs::remove_file(source).map_err(SplitError::destructive("remove", source))?;
            self.backup_is_sole_copy = true;
        }

        if let Err(e) = move_dir(&self.paths.staging_dir, &self.paths.target_dir) {
            error!(error = %e, "Moving package directory failed");
            self.restore_original();
            return Err(e);
        }
        self.backup_is_sole_copy = false;
        self.state = CommitState::Committed;

        if !self.keep_backup {
            remove_file_if_present(&self.paths.backup_file);
        }
        Ok(())
    }

    /// Drop the generated artifacts and leave the original untouched.
    pub fn abort(&mut self) {
        info!("Changes were not committed");
        self.cleanup();
        self.state = CommitState::Aborted;
    }

    /// Remove whatever this run generated and has not been moved into place.
    pub fn cleanup(&self) {
        if !self.staging_preexisting && self.state != CommitState::Committed {
            remove_dir_if_present(&self.paths.staging_dir);
        }
        if self.backup_is_sole_copy {
            warn!(
                backup = %self.paths.backup_file.display(),
                "Original content only exists in the backup copy, keeping it"
            );
        } else if self.state != CommitState::Committed || !self.keep_backup {
            remove_file_if_present(&self.paths.backup_file);
        }
    }

    fn restore_original(&mut self) {
        if !self.backup_is_sole_copy {
            return;
        }
        match fs::copy(&self.paths.backup_file, &self.paths.source) {
            Ok(_) => {
                info!(source = %self.paths.source.display(), "Restored original file from backup");
                self.backup_is_sole_copy = false;
            }
            Err(e) => {
                error!(
                    error = %e,
                    backup = %self.paths.backup_file.display(),
                    "Could not restore original file"
                );
            }
        }
    }
}

/// Move a directory, copying when a plain rename is not possible.
pub fn move_dir(from: &Path, to: &Path) -> Result<(), SplitError> {
    if to.exists() {
        return Err(SplitError::TargetExists(to.to_path_buf()));
    }
    match fs::rename(from, to) {
        Ok(()) => return Ok(()),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            return Err(SplitError::destructive("move directory to", to)(e));
        }
        Err(e) => {
            debug!(error = %e, "Rename failed, falling back to copy");
        }
    }

    copy_then_remove(from, to)
}

/// Copy `from` to `to`, then remove `from`.
///
/// A failed copy removes the partial `to`. Once the copy is complete `to` is
/// the result; a failure to remove `from` afterwards only leaves it behind.
fn copy_then_remove(from: &Path, to: &Path) -> Result<(), SplitError> {
    if let Err(e) = copy_dir(from, to) {
        remove_dir_if_present(to);
        return Err(e);
    }
    if let Err(e) = fs::remove_dir_all(from) {
        warn!(
            path = %from.display(),
            error = %e,
            "Directory copied but the old copy could not be removed"
        );
    }
    Ok(())
}

fn copy_dir(from: &Path, to: &Path) -> Result<(), SplitError> {
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(|e| SplitError::Io {
            action: "walk",
            path: from.to_path_buf(),
            source: e.into(),
        })?;
        let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
        let dest = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).map_err(SplitError::destructive("create directory", &dest))?;
        } else {
            fs::copy(entry.path(), &dest).map_err(SplitError::destructive("copy to", &dest))?;
        }
    }
    Ok(())
}

fn remove_dir_if_present(path: &Path) {
    if !path.exists() {
        return;
    }
    match fs::remove_dir_all(path) {
        Ok(()) => debug!(path = %path.display(), "Removed generated directory"),
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove generated directory"),
    }
}

fn remove_file_if_present(path: &Path) {
    if !path.exists() {
        return;
    }
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed backup copy"),
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove backup copy"),
    }
}
