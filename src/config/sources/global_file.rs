//! Global config file source: $XDG_CONFIG_HOME/pkgsplit/config.toml

use config::builder::DefaultState;
use config::{ConfigBuilder, File, FileFormat};
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::debug;

/// Path to global config file.
fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "pkgsplit").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Add global config file source to builder if it exists.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    let Some(path) = global_config_path() else {
        return builder;
    };
    if !path.is_file() {
        debug!(config_path = %path.display(), "No global configuration file");
        return builder;
    }
    debug!(config_path = %path.display(), "Using global configuration file");
    builder.add_source(File::from(path).format(FileFormat::Toml).required(false))
}
