//! Peer review analysis configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::analysis::{
    ConsensualityAlgorithm, ReviewEngine, DEFAULT_CONSENSUAL_THRESHOLD,
};

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewConfig {
    /// Which dissent measure scores a review topic's consensuality
    #[serde(default)]
    pub consensuality_algorithm: ConsensualityAlgorithm,

    /// Consensuality a topic must exceed for manager review to be skipped
    #[serde(default = "default_consensual_threshold")]
    pub consensual_threshold: f64,
}

impl ReviewConfig {
    /// Build the engine injected into the peer review handlers
    pub fn engine(&self) -> ReviewEngine {
        ReviewEngine::with_algorithm(self.consensuality_algorithm, self.consensual_threshold)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.consensual_threshold) {
            return Err(ValidationError::InvalidConsensualThreshold(
                self.consensual_threshold,
            ));
        }
        Ok(())
    }
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            consensuality_algorithm: ConsensualityAlgorithm::default(),
            consensual_threshold: default_consensual_threshold(),
        }
    }
}

fn default_consensual_threshold() -> f64 {
    DEFAULT_CONSENSUAL_THRESHOLD
}
