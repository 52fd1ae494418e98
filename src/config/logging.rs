//! Logging configuration

use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::error::{ConfigError, ValidationError};

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info,collab_projects=debug`
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    pub fn env_filter(&self) -> Result<EnvFilter, ValidationError> {
        EnvFilter::try_new(&self.level)
            .map_err(|e| ValidationError::InvalidLogFilter(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.env_filter().map(|_| ())
    }

    /// Installs the global tracing subscriber for the embedding service.
    ///
    /// # Errors
    ///
    /// Fails if the filter is malformed or a global subscriber is already set.
    pub fn init(&self) -> Result<(), ConfigError> {
        let registry = tracing_subscriber::registry().with(self.env_filter()?);
        if self.json {
            registry.with(tracing_subscriber::fmt::layer().json()).try_init()?;
        } else {
            registry.with(tracing_subscriber::fmt::layer()).try_init()?;
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

fn default_level() -> String {
    "info,collab_projects=debug".to_string()
}
