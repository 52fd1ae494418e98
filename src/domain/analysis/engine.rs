//! The computers and threshold used when a review cycle finishes.

use std::fmt;
use std::sync::Arc;

use super::{
    ConsensualityAlgorithm, ConsensualityComputer, ContributionsComputer,
    MeanContributionsComputer,
};

/// Default threshold above which a topic counts as consensual.
pub const DEFAULT_CONSENSUAL_THRESHOLD: f64 = 0.8;

/// Injected into the operations that can finish peer review.
#[derive(Clone)]
pub struct ReviewEngine {
    contributions: Arc<dyn ContributionsComputer>,
    consensuality: Arc<dyn ConsensualityComputer>,
    consensual_threshold: f64,
}

impl ReviewEngine {
    pub fn new(
        contributions: Arc<dyn ContributionsComputer>,
        consensuality: Arc<dyn ConsensualityComputer>,
        consensual_threshold: f64,
    ) -> Self {
        Self {
            contributions,
            consensuality,
            consensual_threshold,
        }
    }

    /// Mean contributions with a built-in consensuality algorithm.
    pub fn with_algorithm(algorithm: ConsensualityAlgorithm, consensual_threshold: f64) -> Self {
        Self::new(
            Arc::new(MeanContributionsComputer),
            algorithm.computer(),
            consensual_threshold,
        )
    }

    pub fn contributions(&self) -> &dyn ContributionsComputer {
        self.contributions.as_ref()
    }

    pub fn consensuality(&self) -> &dyn ConsensualityComputer {
        self.consensuality.as_ref()
    }

    pub fn consensual_threshold(&self) -> f64 {
        self.consensual_threshold
    }
}

impl Default for ReviewEngine {
    fn default() -> Self {
        Self::with_algorithm(
            ConsensualityAlgorithm::default(),
            DEFAULT_CONSENSUAL_THRESHOLD,
        )
    }
}

impl fmt::Debug for ReviewEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReviewEngine")
            .field("contributions", &self.contributions.name())
            .field("consensuality", &self.consensuality.name())
            .field("consensual_threshold", &self.consensual_threshold)
            .finish()
    }
}
