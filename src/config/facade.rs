//! Config loading facade: assemble sources, deserialize, validate.

use super::merge::merge_policy;
use super::sources::{environment, explicit_file, global_file};
use super::SplitConfig;
use crate::error::SplitError;
use std::path::Path;
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from defaults, the global file, `explicit` (when
    /// given) and the environment.
    pub fn load(explicit: Option<&Path>) -> Result<SplitConfig, SplitError> {
        let mut builder = merge_policy::builder_with_defaults()?;
        builder = global_file::add_to_builder(builder);
        if let Some(path) = explicit {
            builder = explicit_file::add_to_builder(builder, path)?;
        }
        builder = environment::add_to_builder(builder);

        let config: SplitConfig = builder.build()?.try_deserialize()?;
        debug!(source = %config.source.display(), "Configuration loaded");
        Ok(config)
    }
}
