//! Errors raised while turning peer reviews into results.

use thiserror::Error;

use crate::domain::foundation::RoleId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComputationError {
    #[error("No peer reviews to compute from")]
    EmptyInput,

    #[error("Peer reviews span more than one review topic")]
    MixedReviewTopics,

    #[error("Role {sender} scored role {receiver} more than once")]
    DuplicateScore { sender: RoleId, receiver: RoleId },

    #[error("Role {sender} has no score for role {receiver}")]
    IncompleteMatrix { sender: RoleId, receiver: RoleId },

    #[error("At least {required} peers are required, got {actual}")]
    InsufficientPeers { required: usize, actual: usize },

    #[error("Score matrix is malformed: {0}")]
    Malformed(String),
}
