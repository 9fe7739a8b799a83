//! CLI route: turn parsed flags into a configured run and execute it.

use crate::cli::parse::{Cli, OutputFormat};
use crate::cli::presentation::{
    format_malformed_lines, format_outcome, format_prepared_json, format_report_text,
};
use crate::commit::{Confirm, TerminalConfirm};
use crate::config::{ConfigLoader, SplitConfig};
use crate::error::SplitError;
use crate::pipeline::Pipeline;
use std::io::IsTerminal;
use tracing::debug;

/// Load layered configuration and apply CLI overrides on top.
pub fn build_config(cli: &Cli) -> Result<SplitConfig, SplitError> {
    let mut config = ConfigLoader::load(cli.config.as_deref())?;
    apply_overrides(cli, &mut config);
    Ok(config)
}

/// CLI flags win over every other configuration layer.
fn apply_overrides(cli: &Cli, config: &mut SplitConfig) {
    if let Some(ref source) = cli.source {
        config.source = source.clone();
    }
    if let Some(ref work_dir) = cli.work_dir {
        config.work_dir = Some(work_dir.clone());
    }
    if cli.dry_run {
        config.dry_run = true;
    }

    if cli.quiet {
        config.logging.enabled = false;
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
}

/// Everything a single invocation needs.
pub struct RunContext {
    pipeline: Pipeline,
    format: OutputFormat,
    color: bool,
}

impl RunContext {
    pub fn new(config: SplitConfig, cli: &Cli) -> Result<Self, SplitError> {
        let color = !cli.no_color && std::io::stdout().is_terminal();
        Ok(Self {
            pipeline: Pipeline::new(config)?,
            format: cli.format,
            color,
        })
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Run with the interactive terminal prompt.
    pub fn execute(&self) -> Result<String, SplitError> {
        self.execute_with(&mut TerminalConfirm)
    }

    /// Run the pipeline, printing the report before `confirm` is asked.
    /// Returns the final outcome message.
    ///
    /// In JSON mode stdout carries only the report document.
    pub fn execute_with(&self, confirm: &mut dyn Confirm) -> Result<String, SplitError> {
        let paths = self.pipeline.paths();
        debug!(
            source = %paths.source.display(),
            staging = %paths.staging_dir.display(),
            dry_run = self.pipeline.config().dry_run,
            "Starting conversion"
        );

        let outcome = self.pipeline.run(confirm, |prepared| match self.format {
            OutputFormat::Text => {
                if let Some(block) = format_malformed_lines(&prepared.loaded.malformed) {
                    eprintln!("{}", block);
                }
                println!(
                    "Wrote {} package files to {}",
                    prepared.written.files.len(),
                    prepared.written.dir.display()
                );
                println!(
                    "{}",
                    format_report_text(&prepared.report, &paths.source, self.color)
                );
                Ok(())
            }
            OutputFormat::Json => {
                println!("{}", format_prepared_json(prepared, paths)?);
                Ok(())
            }
        })?;

        Ok(format_outcome(&outcome, paths))
    }
}
