//! Contribution shares derived from peer reviews.

use std::collections::BTreeMap;

use crate::domain::foundation::{ReviewTopicId, RoleId};
use crate::domain::project::{PeerReview, Project, ProjectError};

use super::score_matrix::review_topic_of;
use super::{ComputationError, ScoreMatrix};

/// Derives a normalised contribution share per role for one review topic.
pub trait ContributionsComputer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Share per matrix row index; shares sum to 1.
    fn shares(&self, matrix: &ScoreMatrix) -> Result<Vec<f64>, ComputationError>;

    fn compute(&self, peer_reviews: &[&PeerReview]) -> Result<ContributionResult, ComputationError> {
        let review_topic_id = review_topic_of(peer_reviews)?;
        let matrix = ScoreMatrix::from_peer_reviews(peer_reviews)?;
        let shares = self.shares(&matrix)?;
        Ok(ContributionResult {
            review_topic_id,
            shares: matrix.roles().iter().copied().zip(shares).collect(),
        })
    }
}

/// Contribution shares of one review topic.
#[derive(Debug, Clone, PartialEq)]
pub struct ContributionResult {
    review_topic_id: ReviewTopicId,
    shares: BTreeMap<RoleId, f64>,
}

impl ContributionResult {
    pub fn review_topic_id(&self) -> ReviewTopicId {
        self.review_topic_id
    }

    pub fn shares(&self) -> &BTreeMap<RoleId, f64> {
        &self.shares
    }

    pub fn share(&self, role_id: RoleId) -> Option<f64> {
        self.shares.get(&role_id).copied()
    }

    /// Writes the shares onto the project's roles.
    pub fn apply_to(&self, project: &mut Project) -> Result<(), ProjectError> {
        project.apply_contributions(self.review_topic_id, &self.shares)
    }
}

/// Mean of the normalised scores each role received, renormalised to sum to 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanContributionsComputer;

impl ContributionsComputer for MeanContributionsComputer {
    fn name(&self) -> &'static str {
        "mean"
    }

    fn shares(&self, matrix: &ScoreMatrix) -> Result<Vec<f64>, ComputationError> {
        matrix.require_peers(2)?;

        let means: Vec<f64> = (0..matrix.size())
            .map(|receiver| {
                let received = matrix.received(receiver);
                received.iter().sum::<f64>() / received.len() as f64
            })
            .collect();
        let total: f64 = means.iter().sum();
        if total <= 0.0 {
            return Err(ComputationError::Malformed(
                "no credit was distributed".to_string(),
            ));
        }
        Ok(means.into_iter().map(|mean| mean / total).collect())
    }
}
