//! Merge rules: defaults, override order, conflict handling.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
/// Later sources override earlier ones key by key.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("source", "/etc/portage/package.use")?
        .set_default("dry_run", false)?
        .set_default("clean_stale", true)?
        .set_default("keep_backup", true)?
        .set_default("naming.separator", "/")?
        .set_default("naming.substitute", "_")
}
