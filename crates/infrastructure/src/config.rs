//! Run settings loader.
//!
//! Layers, lowest precedence first: built-in defaults, an optional YAML
//! file, then `SERVERTESTER_*` environment variables
//! (`SERVERTESTER_HOST`, `SERVERTESTER_PORT`, `SERVERTESTER_TIMEOUT_MS`, ...).

use std::collections::HashMap;
use std::path::PathBuf;

use config::{Config, Environment, File, FileFormat};
use servertester_domain::RunSettings;
use thiserror::Error;

/// Prefix of environment variables read by [`SettingsLoader`].
pub const ENV_PREFIX: &str = "SERVERTESTER";

/// Errors produced while loading run settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    /// Settings were read but make no sense.
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Builds [`RunSettings`] from a file and the environment.
#[derive(Debug, Clone, Default)]
pub struct SettingsLoader {
    file: Option<PathBuf>,
    env: Option<HashMap<String, String>>,
}

impl SettingsLoader {
    /// Creates a loader reading only the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a YAML settings file; it must exist.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Reads variables from `env` instead of the process environment.
    #[must_use]
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }

    /// Loads and validates the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed, a value has the
    /// wrong type, or the result fails validation.
    pub fn load(&self) -> Result<RunSettings, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = &self.file {
            tracing::debug!(path = %path.display(), "reading settings file");
            builder = builder.add_source(File::from(path.as_path()).format(FileFormat::Yaml));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(self.env.clone()),
        );

        let settings: RunSettings = builder.build()?.try_deserialize()?;
        validate(&settings)?;
        Ok(settings)
    }
}

fn validate(settings: &RunSettings) -> Result<(), ConfigError> {
    if settings.host.trim().is_empty() {
        return Err(ConfigError::Invalid("host must not be empty".into()));
    }
    if settings.port == 0 {
        return Err(ConfigError::Invalid("port must not be 0".into()));
    }
    if settings.timeout_ms == 0 {
        return Err(ConfigError::Invalid("timeout_ms must be positive".into()));
    }
    if settings.concurrency == 0 {
        return Err(ConfigError::Invalid("concurrency must be at least 1".into()));
    }
    Ok(())
}
