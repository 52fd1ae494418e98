//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Tracing subscriber could not be installed: {0}")]
    TracingInit(#[from] tracing_subscriber::util::TryInitError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Consensual threshold must be within [0, 1], got {0}")]
    InvalidConsensualThreshold(f64),

    #[error("Outbox poll interval must be between 1 and 60000 ms, got {0}")]
    InvalidPollInterval(u64),

    #[error("Outbox batch size must be between 1 and 10000, got {0}")]
    InvalidBatchSize(u32),

    #[error("Invalid log filter directive: {0}")]
    InvalidLogFilter(String),
}
