//! Config loader: resolves which file to read and layers the sources.

use super::merge::builder_with_defaults;
use super::sources::{environment, project_file, user_file};
use super::GeneratorConfig;
use crate::error::ConfigError;
use config::File;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Builds a [`GeneratorConfig`] from defaults, one config file and the environment.
///
/// File lookup order: the explicit path, `glossa.toml`/`glossa.json` in the working
/// directory, then `config.toml` in the user config directory. Relative paths in the
/// result are resolved against the directory of the file that was read.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    working_dir: PathBuf,
    explicit: Option<PathBuf>,
    user_config_dir: Option<PathBuf>,
    env_override: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            explicit: None,
            user_config_dir: user_file::config_dir(),
            env_override: None,
        }
    }

    /// Loader rooted at the process working directory
    pub fn from_current_dir() -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir()
            .map_err(|e| ConfigError::Invalid(format!("Cannot read working directory: {}", e)))?;
        Ok(Self::new(cwd))
    }

    pub fn with_file(mut self, path: Option<impl Into<PathBuf>>) -> Self {
        self.explicit = path.map(Into::into);
        self
    }

    pub fn with_user_config_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.user_config_dir = dir;
        self
    }

    /// Use this map instead of the process environment for `GLOSSA__*` overrides
    pub fn with_env(mut self, vars: HashMap<String, String>) -> Self {
        self.env_override = Some(vars);
        self
    }

    /// Config file that `load` will read, if any
    pub fn config_file(&self) -> Result<Option<PathBuf>, ConfigError> {
        if let Some(explicit) = &self.explicit {
            let path = if explicit.is_relative() {
                self.working_dir.join(explicit)
            } else {
                explicit.clone()
            };
            if !path.is_file() {
                return Err(ConfigError::NotFound(path));
            }
            return Ok(Some(path));
        }

        Ok(project_file::locate(&self.working_dir).or_else(|| {
            self.user_config_dir
                .as_deref()
                .and_then(user_file::locate)
        }))
    }

    pub fn load(&self) -> Result<GeneratorConfig, ConfigError> {
        let file = self.config_file()?;

        let mut builder = builder_with_defaults()?;
        if let Some(path) = &file {
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }
        let mut env = environment::source();
        if let Some(vars) = &self.env_override {
            env = env.source(Some(vars.clone()));
        }
        builder = builder.add_source(env);

        let mut config: GeneratorConfig = builder.build()?.try_deserialize()?;

        let base = file
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.working_dir.clone());
        config.resolve_paths(&base);

        debug!(
            config_file = ?file,
            curriculum = %config.paths.curriculum.display(),
            descriptions = %config.paths.descriptions.display(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load and validate; any validation problem is fatal.
    pub fn load_validated(&self) -> Result<GeneratorConfig, ConfigError> {
        let config = self.load()?;
        config.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ConfigError::Invalid(messages.join("\n"))
        })?;
        Ok(config)
    }
}
