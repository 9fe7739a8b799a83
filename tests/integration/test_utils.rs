//! Shared test utilities for integration tests
//!
//! Every test gets its own temp tree: the flat file lives under `etc/` and the
//! staging directory and backup copy under `work/`, so permissions on one
//! never affect the other.

use pkgsplit::commit::Confirm;
use pkgsplit::{SplitConfig, SplitError};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const SAMPLE: &str = "# note\ndev-lang/python X Y\ndev-lang/python Y Z\n";

pub struct Fixture {
    pub temp: TempDir,
    pub source: PathBuf,
    pub work_dir: PathBuf,
}

impl Fixture {
    pub fn new(contents: &str) -> Self {
        let temp = TempDir::new().unwrap();
        let etc = temp.path().join("etc");
        let work_dir = temp.path().join("work");
        fs::create_dir_all(&etc).unwrap();
        let source = etc.join("package.use");
        fs::write(&source, contents).unwrap();
        Self {
            temp,
            source,
            work_dir,
        }
    }

    pub fn config(&self) -> SplitConfig {
        SplitConfig {
            source: self.source.clone(),
            work_dir: Some(self.work_dir.clone()),
            ..SplitConfig::default()
        }
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.work_dir.join("package.use.staged")
    }

    pub fn backup_file(&self) -> PathBuf {
        self.work_dir.join("package.use.backup")
    }

    /// Isolated XDG/HOME layout for spawning the binary.
    pub fn env_dirs(&self) -> (PathBuf, PathBuf) {
        let config_home = self.temp.path().join("config");
        let home = self.temp.path().join("home");
        fs::create_dir_all(&config_home).unwrap();
        fs::create_dir_all(&home).unwrap();
        (config_home, home)
    }
}

/// Fails the test if the pipeline asks for confirmation.
pub struct NeverAsked;

impl Confirm for NeverAsked {
    fn confirm(&mut self, prompt: &str) -> Result<bool, SplitError> {
        panic!("unexpected prompt: {}", prompt);
    }
}
