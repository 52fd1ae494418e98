//! Application configuration module
//!
//! Configuration is read from an optional TOML file overlaid by environment
//! variables with the `COLLAB_PROJECTS` prefix; nested values use `__`.
//!
//! # Example
//!
//! ```no_run
//! use collab_projects::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! let engine = config.review.engine();
//! ```

mod error;
mod logging;
mod outbox;
mod review;

pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use outbox::OutboxConfig;
pub use review::ReviewConfig;

use serde::Deserialize;
use std::path::Path;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "COLLAB_PROJECTS_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "collab-projects";
const ENV_PREFIX: &str = "COLLAB_PROJECTS";

/// Root application configuration
///
/// Every section is defaulted, so an empty environment yields a usable config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Consensuality algorithm and threshold
    #[serde(default)]
    pub review: ReviewConfig,

    /// Outbox relay polling
    #[serde(default)]
    pub outbox: OutboxConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from the default file location and the environment
    ///
    /// 1. Loads `.env` if present
    /// 2. Reads `$COLLAB_PROJECTS_CONFIG` if set, else `collab-projects.toml` if present
    /// 3. Overlays `COLLAB_PROJECTS__<SECTION>__<KEY>` environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be read or a value has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let file = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => config::File::from(Path::new(&path)).required(true),
            Err(_) => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        Self::build(file)
    }

    /// Load configuration from an explicit file, still overlaid by the environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or malformed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::build(config::File::from(path.as_ref()).required(true))
    }

    fn build<S>(file: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.review.validate()?;
        self.outbox.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
