//! Analysis Module - Pure services that turn peer reviews into results.
//!
//! # Components
//!
//! - `ScoreMatrix` - Normalised sender-by-receiver scores for one review topic
//! - `ContributionsComputer` - Contribution share per role
//! - `ConsensualityComputer` - Agreement score per topic (three algorithms)
//! - `ReviewEngine` - The injected pair of computers plus the consensual threshold
//!
//! Nothing here performs I/O; results are written back onto the project
//! through `apply_to`.

mod consensuality;
mod contributions;
mod engine;
mod errors;
mod score_matrix;

pub use consensuality::{
    ConsensualityAlgorithm, ConsensualityComputer, ConsensualityResult,
    MeanDeviationConsensualityComputer, PairwiseRelativeJudgementsConsensualityComputer,
    VarianceConsensualityComputer, EPSILON,
};
pub use contributions::{ContributionResult, ContributionsComputer, MeanContributionsComputer};
pub use engine::{ReviewEngine, DEFAULT_CONSENSUAL_THRESHOLD};
pub use errors::ComputationError;
pub use score_matrix::ScoreMatrix;
