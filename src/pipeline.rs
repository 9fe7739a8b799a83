//! Conversion pipeline: backup, load, write, verify, then commit or abort.
//!
//! [`Pipeline::run`] is the single place where failures are turned into
//! cleanup. Individual steps only propagate errors.
//!
//! No locking is performed. Two runs against the same source at the same time
//! race on the staging directory and backup copy.

use crate::commit::{CommitState, Committer, Confirm};
use crate::config::SplitConfig;
use crate::error::SplitError;
use crate::loader::{self, LoadedPackages, MalformedLine, PackageMap};
use crate::naming::FileNameCodec;
use crate::verify::{self, VerificationReport};
use crate::writer::{self, WriteSummary};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

pub const COMMIT_PROMPT: &str = "Do you want to commit these changes? (yes/y or no/n)";

/// Filesystem locations used by one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    /// Flat file being converted.
    pub source: PathBuf,
    /// Directory holding the staging directory and backup copy.
    pub work_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub backup_file: PathBuf,
    /// Where the directory ends up on commit: the source path itself.
    pub target_dir: PathBuf,
}

impl RunPaths {
    pub fn new(source: PathBuf, work_dir: PathBuf) -> Self {
        let base = source
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("package"));
        let with_suffix = |suffix: &str| {
            let mut name = base.clone();
            name.push(suffix);
            work_dir.join(name)
        };
        Self {
            staging_dir: with_suffix(".staged"),
            backup_file: with_suffix(".backup"),
            target_dir: source.clone(),
            source,
            work_dir,
        }
    }

    /// Work directory defaults to the source file's parent.
    pub fn from_config(config: &SplitConfig) -> Self {
        let work_dir = config.work_dir.clone().unwrap_or_else(|| {
            config
                .source
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        });
        Self::new(config.source.clone(), work_dir)
    }
}

/// State after load, write and verify; shown to the operator before the prompt.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub loaded: LoadedPackages,
    pub written: WriteSummary,
    pub report: VerificationReport,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub state: CommitState,
    pub dry_run: bool,
    pub packages: PackageMap,
    pub malformed: Vec<MalformedLine>,
    pub report: VerificationReport,
    /// Backup copy left on disk after a commit.
    pub retained_backup: Option<PathBuf>,
}

pub struct Pipeline {
    config: SplitConfig,
    paths: RunPaths,
}

impl Pipeline {
    pub fn new(config: SplitConfig) -> Result<Self, SplitError> {
        config.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            SplitError::Config(messages.join("; "))
        })?;
        let paths = RunPaths::from_config(&config);
        Ok(Self { config, paths })
    }

    pub fn paths(&self) -> &RunPaths {
        &self.paths
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    fn codec(&self) -> &FileNameCodec {
        &self.config.naming
    }

    /// Run the whole conversion. `present` sees the verification result
    /// before `confirm` is asked; dry runs never ask. An error from `present`
    /// ends the run without asking.
    ///
    /// Any error removes the artifacts generated so far before it is returned.
    pub fn run<F>(&self, confirm: &mut dyn Confirm, present: F) -> Result<RunOutcome, SplitError>
    where
        F: FnOnce(&Prepared) -> Result<(), SplitError>,
    {
        loader::check_source(&self.paths.source)?;
        if self.config.clean_stale {
            self.clean_stale()?;
        }
        fs::create_dir_all(&self.paths.work_dir)
            .map_err(SplitError::io("create directory", &self.paths.work_dir))?;

        let mut committer = Committer::new(&self.paths, self.config.keep_backup);
        match self.execute(&mut committer, confirm, present) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!(error = %e, "Run failed, cleaning up generated files");
                committer.cleanup();
                Err(e)
            }
        }
    }

    fn execute<F>(
        &self,
        committer: &mut Committer<'_>,
        confirm: &mut dyn Confirm,
        present: F,
    ) -> Result<RunOutcome, SplitError>
    where
        F: FnOnce(&Prepared) -> Result<(), SplitError>,
    {
        let prepared = self.prepare()?;
        present(&prepared)?;

        let state = if self.config.dry_run {
            info!("Dry run, skipping commit");
            committer.abort();
            committer.state()
        } else {
            committer.decide(confirm, COMMIT_PROMPT)?
        };

        let retained_backup = (state == CommitState::Committed
            && self.config.keep_backup
            && self.paths.backup_file.exists())
        .then(|| self.paths.backup_file.clone());

        let Prepared { loaded, report, .. } = prepared;
        Ok(RunOutcome {
            state,
            dry_run: self.config.dry_run,
            packages: loaded.packages,
            malformed: loaded.malformed,
            report,
            retained_backup,
        })
    }

    /// Backup, load, write and verify. Leaves the staging directory and
    /// backup copy on disk.
    pub fn prepare(&self) -> Result<Prepared, SplitError> {
        let paths = &self.paths;
        fs::copy(&paths.source, &paths.backup_file)
            .map_err(SplitError::io("copy source to", &paths.backup_file))?;
        debug!(backup = %paths.backup_file.display(), "Backed up source file");

        let loaded = loader::load_package_file(&paths.backup_file)?;
        let written = writer::write_package_dir(
            &loaded.packages,
            &paths.source,
            &paths.staging_dir,
            self.codec(),
        )?;
        let report = verify::verify_dir(&loaded.lines, &paths.staging_dir, self.codec())?;
        info!(
            packages = loaded.packages.len(),
            status = ?report.status,
            "Verification finished"
        );

        Ok(Prepared {
            loaded,
            written,
            report,
        })
    }

    /// Remove the backup copy and staging directory a previous run left behind.
    fn clean_stale(&self) -> Result<(), SplitError> {
        let paths = &self.paths;
        if paths.backup_file.is_file() {
            debug!(path = %paths.backup_file.display(), "Removing previous backup copy");
            fs::remove_file(&paths.backup_file)
                .map_err(SplitError::io("remove", &paths.backup_file))?;
        }
        if paths.staging_dir.is_dir() {
            debug!(path = %paths.staging_dir.display(), "Removing previous staging directory");
            fs::remove_dir_all(&paths.staging_dir)
                .map_err(SplitError::io("remove directory", &paths.staging_dir))?;
        }
        Ok(())
    }
}
