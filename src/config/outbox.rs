//! Outbox relay configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::OutboxPublisherConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct OutboxConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
}

impl OutboxConfig {
    pub fn publisher_config(&self) -> OutboxPublisherConfig {
        OutboxPublisherConfig::default()
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
            .with_batch_size(self.batch_size)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=60_000).contains(&self.poll_interval_ms) {
            return Err(ValidationError::InvalidPollInterval(self.poll_interval_ms));
        }
        if !(1..=10_000).contains(&self.batch_size) {
            return Err(ValidationError::InvalidBatchSize(self.batch_size));
        }
        Ok(())
    }
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_batch_size() -> u32 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_publisher_defaults() {
        assert_eq!(
            OutboxConfig::default().publisher_config(),
            OutboxPublisherConfig::default()
        );
    }

    #[test]
    fn rejects_zero_values() {
        let config = OutboxConfig {
            poll_interval_ms: 0,
            ..OutboxConfig::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPollInterval(0)));

        let config = OutboxConfig {
            batch_size: 0,
            ..OutboxConfig::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidBatchSize(0)));
    }
}
