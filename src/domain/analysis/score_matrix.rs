//! Normalised sender-by-receiver score matrix.
//!
//! Each sender's slate is read as a split of credit over the other roles,
//! so rows are normalised to sum to 1 before any computer looks at them.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::foundation::{ReviewTopicId, RoleId};
use crate::domain::project::PeerReview;

use super::ComputationError;

/// Score matrix for one review topic. `rows[sender][receiver]`, diagonal zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMatrix {
    roles: Vec<RoleId>,
    rows: Vec<Vec<f64>>,
}

impl ScoreMatrix {
    /// Builds the matrix from one topic's complete set of peer reviews.
    ///
    /// Every participant must have scored every other participant exactly once.
    pub fn from_peer_reviews(peer_reviews: &[&PeerReview]) -> Result<Self, ComputationError> {
        review_topic_of(peer_reviews)?;

        let roles: Vec<RoleId> = peer_reviews
            .iter()
            .flat_map(|review| [review.sender_role_id(), review.receiver_role_id()])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let index: BTreeMap<RoleId, usize> =
            roles.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let n = roles.len();
        let mut grid: Vec<Vec<Option<f64>>> = vec![vec![None; n]; n];
        for review in peer_reviews {
            let sender = index[&review.sender_role_id()];
            let receiver = index[&review.receiver_role_id()];
            let cell = &mut grid[sender][receiver];
            if cell.is_some() {
                return Err(ComputationError::DuplicateScore {
                    sender: review.sender_role_id(),
                    receiver: review.receiver_role_id(),
                });
            }
            *cell = Some(review.score().value());
        }

        let mut raw = vec![vec![0.0; n]; n];
        for sender in 0..n {
            for receiver in 0..n {
                if sender == receiver {
                    continue;
                }
                raw[sender][receiver] =
                    grid[sender][receiver].ok_or(ComputationError::IncompleteMatrix {
                        sender: roles[sender],
                        receiver: roles[receiver],
                    })?;
            }
        }

        Self::from_raw(roles, raw)
    }

    /// Builds a matrix from raw, unnormalised rows. Diagonal entries are ignored.
    pub fn from_raw(roles: Vec<RoleId>, raw: Vec<Vec<f64>>) -> Result<Self, ComputationError> {
        let n = roles.len();
        if n < 2 {
            return Err(ComputationError::InsufficientPeers {
                required: 2,
                actual: n,
            });
        }
        if raw.len() != n || raw.iter().any(|row| row.len() != n) {
            return Err(ComputationError::Malformed(format!(
                "expected a {0}x{0} matrix",
                n
            )));
        }

        let mut rows = raw;
        for (sender, row) in rows.iter_mut().enumerate() {
            row[sender] = 0.0;
            if row.iter().any(|score| !score.is_finite() || *score < 0.0) {
                return Err(ComputationError::Malformed(format!(
                    "row {} has a negative or non-finite score",
                    sender
                )));
            }
            let total: f64 = row.iter().sum();
            for (receiver, score) in row.iter_mut().enumerate() {
                if receiver == sender {
                    continue;
                }
                *score = if total > 0.0 {
                    *score / total
                } else {
                    1.0 / (n - 1) as f64
                };
            }
        }

        Ok(Self { roles, rows })
    }

    /// Builds a matrix with fresh role ids, mainly for reference distributions.
    pub fn from_rows(raw: Vec<Vec<f64>>) -> Result<Self, ComputationError> {
        let roles = (0..raw.len()).map(|_| RoleId::new()).collect();
        Self::from_raw(roles, raw)
    }

    /// The maximally disagreeing distribution over `size` peers.
    ///
    /// Peers form a directed cycle; each gives `1 - (size - 2) * epsilon`
    /// to the next peer and `epsilon` to every other one.
    pub fn cyclic_reference(size: usize, epsilon: f64) -> Result<Self, ComputationError> {
        let rows = (0..size)
            .map(|sender| {
                (0..size)
                    .map(|receiver| {
                        if receiver == sender {
                            0.0
                        } else if receiver == (sender + 1) % size {
                            1.0 - (size as f64 - 2.0) * epsilon
                        } else {
                            epsilon
                        }
                    })
                    .collect()
            })
            .collect();
        Self::from_rows(rows)
    }

    pub fn size(&self) -> usize {
        self.roles.len()
    }

    pub fn roles(&self) -> &[RoleId] {
        &self.roles
    }

    /// Normalised score `sender` gave `receiver`.
    pub fn score(&self, sender: usize, receiver: usize) -> f64 {
        self.rows[sender][receiver]
    }

    /// Scores received by `receiver` from every other peer.
    pub fn received(&self, receiver: usize) -> Vec<f64> {
        (0..self.size())
            .filter(|sender| *sender != receiver)
            .map(|sender| self.rows[sender][receiver])
            .collect()
    }

    pub fn require_peers(&self, required: usize) -> Result<(), ComputationError> {
        if self.size() < required {
            return Err(ComputationError::InsufficientPeers {
                required,
                actual: self.size(),
            });
        }
        Ok(())
    }
}

/// The single review topic shared by all `peer_reviews`.
pub(crate) fn review_topic_of(
    peer_reviews: &[&PeerReview],
) -> Result<ReviewTopicId, ComputationError> {
    let first = peer_reviews
        .first()
        .ok_or(ComputationError::EmptyInput)?
        .review_topic_id();
    if peer_reviews
        .iter()
        .any(|review| review.review_topic_id() != first)
    {
        return Err(ComputationError::MixedReviewTopics);
    }
    Ok(first)
}
