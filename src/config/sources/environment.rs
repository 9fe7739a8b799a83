//! Environment source: `PKGSPLIT_*`, with `__` separating nested keys
//! (`PKGSPLIT_NAMING__SUBSTITUTE=+`, `PKGSPLIT_LOGGING__LEVEL=debug`).

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment};

pub const ENV_PREFIX: &str = "PKGSPLIT";

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__"),
    )
}
