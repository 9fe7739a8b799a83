//! pkgsplit: flat package file to per-package directory conversion
//!
//! Loads a flat `<package> <flag>...` file, writes one file per package into a
//! staging directory, verifies the directory reproduces the original flag
//! sets, and replaces the original file with the directory on confirmation.

pub mod cli;
pub mod commit;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod naming;
pub mod pipeline;
pub mod verify;
pub mod writer;

pub use commit::{CommitState, Confirm, FixedAnswer, ScriptedConfirm, TerminalConfirm};
pub use config::SplitConfig;
pub use error::SplitError;
pub use pipeline::{Pipeline, RunOutcome, RunPaths};
