//! Consensuality: how much peers agreed with each other.
//!
//! Every algorithm measures a raw dissent figure over the normalised score
//! matrix and divides it by the dissent of the cyclic reference distribution
//! of the same size, giving `consensuality = 1 - dissent / reference` in [0, 1].
//!
//! | algorithm | dissent |
//! |-----------|---------|
//! | mean deviation | sum over receivers of the mean absolute deviation of received scores |
//! | variance | sum over receivers of the variance of received scores |
//! | pairwise relative judgements | sum over ordered pairs (i, j) of the variance, across third-party judges k, of `s(k,i) / s(k,j)` |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::domain::foundation::ReviewTopicId;
use crate::domain::project::{PeerReview, Project, ProjectError};

use super::score_matrix::review_topic_of;
use super::{ComputationError, ScoreMatrix};

/// Smallest credit assumed for any peer; keeps ratios finite.
pub const EPSILON: f64 = 1e-6;

/// Derives a [0, 1] agreement score for one review topic.
pub trait ConsensualityComputer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Raw, unnormalised dissent of the matrix.
    fn dissent(&self, matrix: &ScoreMatrix) -> f64;

    /// Smallest number of peers the algorithm can judge.
    fn min_peers(&self) -> usize {
        3
    }

    fn consensuality(&self, matrix: &ScoreMatrix) -> Result<f64, ComputationError> {
        matrix.require_peers(self.min_peers())?;

        let reference = self.dissent(&ScoreMatrix::cyclic_reference(matrix.size(), EPSILON)?);
        if reference <= 0.0 {
            return Err(ComputationError::Malformed(format!(
                "reference dissent for {} peers is zero",
                matrix.size()
            )));
        }
        let dissent = self.dissent(matrix);
        Ok((1.0 - dissent / reference).clamp(0.0, 1.0))
    }

    fn compute(&self, peer_reviews: &[&PeerReview]) -> Result<ConsensualityResult, ComputationError> {
        let review_topic_id = review_topic_of(peer_reviews)?;
        let matrix = ScoreMatrix::from_peer_reviews(peer_reviews)?;
        Ok(ConsensualityResult {
            review_topic_id,
            consensuality: self.consensuality(&matrix)?,
        })
    }
}

/// Consensuality of one review topic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsensualityResult {
    review_topic_id: ReviewTopicId,
    consensuality: f64,
}

impl ConsensualityResult {
    pub fn review_topic_id(&self) -> ReviewTopicId {
        self.review_topic_id
    }

    pub fn consensuality(&self) -> f64 {
        self.consensuality
    }

    /// Stores the value on the project's review topic.
    pub fn apply_to(&self, project: &mut Project) -> Result<(), ProjectError> {
        project.apply_consensuality(self.review_topic_id, self.consensuality)
    }
}

// ───────────────────────────────────────────────────────────────
// Algorithms
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct MeanDeviationConsensualityComputer;

impl ConsensualityComputer for MeanDeviationConsensualityComputer {
    fn name(&self) -> &'static str {
        "mean_deviation"
    }

    fn dissent(&self, matrix: &ScoreMatrix) -> f64 {
        (0..matrix.size())
            .map(|receiver| mean_absolute_deviation(&matrix.received(receiver)))
            .sum()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VarianceConsensualityComputer;

impl ConsensualityComputer for VarianceConsensualityComputer {
    fn name(&self) -> &'static str {
        "variance"
    }

    fn dissent(&self, matrix: &ScoreMatrix) -> f64 {
        (0..matrix.size())
            .map(|receiver| variance(&matrix.received(receiver)))
            .sum()
    }
}

/// Compares how third parties rated each pair relative to one another.
///
/// Insensitive to how generous a judge is overall, only to how they rank.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairwiseRelativeJudgementsConsensualityComputer;

impl ConsensualityComputer for PairwiseRelativeJudgementsConsensualityComputer {
    fn name(&self) -> &'static str {
        "pairwise_relative_judgements"
    }

    fn dissent(&self, matrix: &ScoreMatrix) -> f64 {
        let n = matrix.size();
        let floored = |sender: usize, receiver: usize| matrix.score(sender, receiver).max(EPSILON);

        let mut dissent = 0.0;
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let ratios: Vec<f64> = (0..n)
                    .filter(|k| *k != i && *k != j)
                    .map(|k| floored(k, i) / floored(k, j))
                    .collect();
                dissent += variance(&ratios);
            }
        }
        dissent
    }
}

/// Selects one of the built-in consensuality algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensualityAlgorithm {
    MeanDeviation,
    Variance,
    #[default]
    PairwiseRelativeJudgements,
}

impl ConsensualityAlgorithm {
    pub fn computer(self) -> Arc<dyn ConsensualityComputer> {
        match self {
            ConsensualityAlgorithm::MeanDeviation => Arc::new(MeanDeviationConsensualityComputer),
            ConsensualityAlgorithm::Variance => Arc::new(VarianceConsensualityComputer),
            ConsensualityAlgorithm::PairwiseRelativeJudgements => {
                Arc::new(PairwiseRelativeJudgementsConsensualityComputer)
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsensualityAlgorithm::MeanDeviation => "mean_deviation",
            ConsensualityAlgorithm::Variance => "variance",
            ConsensualityAlgorithm::PairwiseRelativeJudgements => "pairwise_relative_judgements",
        }
    }
}

impl fmt::Display for ConsensualityAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ───────────────────────────────────────────────────────────────
// Statistics
// ───────────────────────────────────────────────────────────────

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn mean_absolute_deviation(values: &[f64]) -> f64 {
    let center = mean(values);
    mean(&values.iter().map(|v| (v - center).abs()).collect::<Vec<_>>())
}

/// Population variance.
fn variance(values: &[f64]) -> f64 {
    let center = mean(values);
    mean(&values.iter().map(|v| (v - center).powi(2)).collect::<Vec<_>>())
}

#[cfg(test)]
mod tests {
    use super::*;

    const O: f64 = EPSILON;
    const L: f64 = 1.0 - 3.0 * EPSILON;

    fn consensuality(computer: &dyn ConsensualityComputer, rows: Vec<Vec<f64>>) -> f64 {
        computer
            .consensuality(&ScoreMatrix::from_rows(rows).unwrap())
            .unwrap()
    }

    fn cycle() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, L, O, O],
            vec![O, 0.0, L, O],
            vec![O, O, 0.0, L],
            vec![L, O, O, 0.0],
        ]
    }

    fn clusters() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, L, O, O],
            vec![L, 0.0, O, O],
            vec![O, O, 0.0, L],
            vec![O, O, L, 0.0],
        ]
    }

    fn one_did_it_all() -> Vec<Vec<f64>> {
        let third = 1.0 / 3.0;
        vec![
            vec![0.0, O, O, L],
            vec![O, 0.0, O, L],
            vec![O, O, 0.0, L],
            vec![third, third, third, 0.0],
        ]
    }

    // ───────────────────────────────────────────────────────────────
    // Reference scenarios
    // ───────────────────────────────────────────────────────────────

    #[test]
    fn cycle_has_no_consensus() {
        assert!(consensuality(&MeanDeviationConsensualityComputer, cycle()) < 1e-3);
        assert!(consensuality(&VarianceConsensualityComputer, cycle()) < 1e-3);
        assert!(consensuality(&PairwiseRelativeJudgementsConsensualityComputer, cycle()) < 1e-3);
    }

    #[test]
    fn reciprocal_clusters_have_no_consensus() {
        assert!(consensuality(&MeanDeviationConsensualityComputer, clusters()) < 1e-3);
        assert!(
            consensuality(&PairwiseRelativeJudgementsConsensualityComputer, clusters()) < 1e-3
        );
    }

    #[test]
    fn one_did_it_all_mean_deviation() {
        let value = consensuality(&MeanDeviationConsensualityComputer, one_did_it_all());
        assert!((value - 0.75).abs() < 1e-3, "got {}", value);
    }

    #[test]
    fn one_did_it_all_variance() {
        let value = consensuality(&VarianceConsensualityComputer, one_did_it_all());
        assert!((value - 11.0 / 12.0).abs() < 1e-3, "got {}", value);
    }

    #[test]
    fn one_did_it_all_pairwise() {
        let value = consensuality(
            &PairwiseRelativeJudgementsConsensualityComputer,
            one_did_it_all(),
        );
        assert!((value - 1.0).abs() < 1e-6, "got {}", value);
    }

    // ───────────────────────────────────────────────────────────────
    // Edge cases
    // ───────────────────────────────────────────────────────────────

    #[test]
    fn uniform_slates_are_fully_consensual() {
        for algorithm in [
            ConsensualityAlgorithm::MeanDeviation,
            ConsensualityAlgorithm::Variance,
            ConsensualityAlgorithm::PairwiseRelativeJudgements,
        ] {
            let value = consensuality(algorithm.computer().as_ref(), vec![vec![1.0; 5]; 5]);
            assert_eq!(value, 1.0, "{}", algorithm);
        }
    }

    #[test]
    fn two_peers_are_rejected() {
        let matrix = ScoreMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
        assert_eq!(
            PairwiseRelativeJudgementsConsensualityComputer.consensuality(&matrix),
            Err(ComputationError::InsufficientPeers {
                required: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn zero_scores_are_floored_for_ratios() {
        let value = consensuality(
            &PairwiseRelativeJudgementsConsensualityComputer,
            vec![
                vec![0.0, 1.0, 0.0, 0.0],
                vec![0.0, 0.0, 1.0, 0.0],
                vec![0.0, 0.0, 0.0, 1.0],
                vec![1.0, 0.0, 0.0, 0.0],
            ],
        );
        assert!(value.is_finite());
        assert!((0.0..=1.0).contains(&value));
    }

    #[test]
    fn algorithm_names_match_serde() {
        for algorithm in [
            ConsensualityAlgorithm::MeanDeviation,
            ConsensualityAlgorithm::Variance,
            ConsensualityAlgorithm::PairwiseRelativeJudgements,
        ] {
            let json = serde_json::to_value(algorithm).unwrap();
            assert_eq!(json, algorithm.as_str());
            assert_eq!(algorithm.computer().name(), algorithm.as_str());
        }
    }

    #[test]
    fn statistics_helpers() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(variance(&[2.0, 4.0]), 1.0);
        assert_eq!(mean_absolute_deviation(&[1.0, 3.0]), 1.0);
    }
}
