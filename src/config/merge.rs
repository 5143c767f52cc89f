//! Merge rules: defaults first, then the config file, then the environment.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Create a Config builder with the path defaults applied.
///
/// Remaining fields fall back to their serde defaults during deserialization.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("paths.curriculum", "web/src/data/curriculum.json")?
        .set_default("paths.descriptions", "web/src/data/topicDescriptions.js")?
        .set_default("paths.progress", "generator/progress.json")
}
