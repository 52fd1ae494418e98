//! Project-specific error types.

use thiserror::Error;

use crate::domain::analysis::ComputationError;
use crate::domain::foundation::{
    DomainError, ErrorCode, MilestoneId, PeerReviewId, ReviewTopicId, RoleId, UserId,
    ValidationError,
};

use super::{Operation, ProjectStatus};

/// Errors raised by the project aggregate.
///
/// A rejected operation never leaves the aggregate partially mutated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectError {
    // State violations
    #[error("Operation '{operation}' is not supported while the project is {state}")]
    OperationNotSupported {
        operation: Operation,
        state: ProjectStatus,
    },

    // Invariant violations
    #[error("At least {required} roles are required, project has {actual}")]
    InsufficientRoles { required: usize, actual: usize },

    #[error("{} role(s) have no assigned user", roles.len())]
    UnassignedRoles { roles: Vec<RoleId> },

    #[error("User {user_id} is already assigned to role {role_id}")]
    UserAlreadyAssigned { user_id: UserId, role_id: RoleId },

    #[error("Role {role_id} cannot review itself")]
    SelfPeerReview { role_id: RoleId },

    #[error("Role {role_id} has already submitted peer reviews for review topic {review_topic_id}")]
    PeerReviewsAlreadySubmitted {
        role_id: RoleId,
        review_topic_id: ReviewTopicId,
    },

    #[error(
        "Peer review receivers do not match the other roles (missing: {}, unexpected: {}, duplicated: {})",
        missing.len(),
        unexpected.len(),
        duplicated.len()
    )]
    PeerReviewSubmissionMismatch {
        missing: Vec<RoleId>,
        unexpected: Vec<RoleId>,
        duplicated: Vec<RoleId>,
    },

    #[error("Project has no review topics")]
    NoReviewTopics,

    #[error("Score {score} is not accepted by review topic {review_topic_id}")]
    ScoreRejected {
        review_topic_id: ReviewTopicId,
        score: f64,
    },

    #[error("{entity} {id} already exists")]
    DuplicateEntity { entity: &'static str, id: String },

    // Not found
    #[error("Role not found: {0}")]
    RoleNotFound(RoleId),

    #[error("Review topic not found: {0}")]
    ReviewTopicNotFound(ReviewTopicId),

    #[error("Peer review not found: {0}")]
    PeerReviewNotFound(PeerReviewId),

    #[error("Milestone not found: {0}")]
    MilestoneNotFound(MilestoneId),

    // Defects
    #[error("Peer review computation failed: {0}")]
    Computation(#[from] ComputationError),

    #[error("Unexpected: {0}")]
    Unexpected(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ProjectError {
    pub fn operation_not_supported(operation: Operation, state: ProjectStatus) -> Self {
        ProjectError::OperationNotSupported { operation, state }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        ProjectError::Unexpected(message.into())
    }

    pub fn duplicate(entity: &'static str, id: impl ToString) -> Self {
        ProjectError::DuplicateEntity {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns the stable error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ProjectError::OperationNotSupported { .. } => ErrorCode::OperationNotSupported,
            ProjectError::InsufficientRoles { .. } => ErrorCode::InsufficientRoles,
            ProjectError::UnassignedRoles { .. } => ErrorCode::UnassignedRoles,
            ProjectError::UserAlreadyAssigned { .. } => ErrorCode::UserAlreadyAssigned,
            ProjectError::SelfPeerReview { .. } => ErrorCode::SelfPeerReview,
            ProjectError::PeerReviewsAlreadySubmitted { .. } => {
                ErrorCode::PeerReviewsAlreadySubmitted
            }
            ProjectError::PeerReviewSubmissionMismatch { .. } => {
                ErrorCode::PeerReviewSubmissionMismatch
            }
            ProjectError::NoReviewTopics => ErrorCode::NoReviewTopics,
            ProjectError::ScoreRejected { .. } => ErrorCode::ScoreRejected,
            ProjectError::DuplicateEntity { .. } => ErrorCode::DuplicateEntity,
            ProjectError::RoleNotFound(_) => ErrorCode::RoleNotFound,
            ProjectError::ReviewTopicNotFound(_) => ErrorCode::ReviewTopicNotFound,
            ProjectError::PeerReviewNotFound(_) => ErrorCode::PeerReviewNotFound,
            ProjectError::MilestoneNotFound(_) => ErrorCode::MilestoneNotFound,
            ProjectError::Computation(_) | ProjectError::Unexpected(_) => {
                ErrorCode::InternalError
            }
            ProjectError::Validation(_) => ErrorCode::ValidationFailed,
        }
    }

    /// True for errors that indicate a defect rather than a rejected command.
    pub fn is_defect(&self) -> bool {
        matches!(
            self,
            ProjectError::Computation(_) | ProjectError::Unexpected(_)
        )
    }
}

impl From<ProjectError> for DomainError {
    fn from(err: ProjectError) -> Self {
        let domain_error = DomainError::new(err.code(), err.to_string());
        match &err {
            ProjectError::OperationNotSupported { operation, state } => domain_error
                .with_detail("operation", operation.to_string())
                .with_detail("state", state.to_string()),
            ProjectError::PeerReviewSubmissionMismatch {
                missing,
                unexpected,
                duplicated,
            } => domain_error
                .with_detail("missing", join_ids(missing))
                .with_detail("unexpected", join_ids(unexpected))
                .with_detail("duplicated", join_ids(duplicated)),
            ProjectError::UnassignedRoles { roles } => {
                domain_error.with_detail("roles", join_ids(roles))
            }
            _ => domain_error,
        }
    }
}

fn join_ids(ids: &[RoleId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_not_supported_maps_to_code_and_details() {
        let err = ProjectError::operation_not_supported(
            Operation::FinishFormation,
            ProjectStatus::PeerReview,
        );
        assert_eq!(err.code(), ErrorCode::OperationNotSupported);

        let domain: DomainError = err.into();
        assert_eq!(
            domain.details.get("operation").map(String::as_str),
            Some("finish_formation")
        );
        assert_eq!(
            domain.details.get("state").map(String::as_str),
            Some("peer_review")
        );
    }

    #[test]
    fn mismatch_lists_offending_ids() {
        let missing = RoleId::new();
        let err = ProjectError::PeerReviewSubmissionMismatch {
            missing: vec![missing],
            unexpected: vec![],
            duplicated: vec![],
        };

        let domain: DomainError = err.into();
        assert_eq!(domain.code, ErrorCode::PeerReviewSubmissionMismatch);
        assert_eq!(domain.details.get("missing"), Some(&missing.to_string()));
        assert_eq!(domain.details.get("unexpected"), Some(&String::new()));
    }

    #[test]
    fn validation_errors_convert_via_from() {
        let err: ProjectError = ValidationError::empty_field("title").into();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
        assert!(!err.is_defect());
    }

    #[test]
    fn unexpected_is_a_defect() {
        let err = ProjectError::unexpected("role without assignee");
        assert!(err.is_defect());
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
