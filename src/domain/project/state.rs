//! Project lifecycle state and the operation legality table.
//!
//! `ProjectState` carries per-state data; `ProjectStatus` is its copyable tag.
//! Every state-dependent operation is checked against `ProjectStatus::supports`
//! before the aggregate touches anything, so there is exactly one place that
//! decides what is legal where.
//!
//! ```text
//! Formation ──finish_formation──► PeerReview ──(final slate | complete)──► ManagerReview
//!     │                              │    └──────(skip policy)──────┐          │
//!     │                              │                              ▼          │
//!     └────────cancel────────────────┴──────► Cancelled          Finished ◄───┘ submit_manager_review
//!                                                  │                │
//!                                                  └────archive─────┴──► Archived
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{MilestoneId, StateMachine};

/// Current lifecycle state of a project with its per-state data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProjectState {
    Formation,
    PeerReview { milestone_id: MilestoneId },
    ManagerReview { milestone_id: MilestoneId },
    Finished,
    Cancelled,
    Archived,
}

impl ProjectState {
    /// Returns the tag of this state.
    pub fn status(&self) -> ProjectStatus {
        match self {
            ProjectState::Formation => ProjectStatus::Formation,
            ProjectState::PeerReview { .. } => ProjectStatus::PeerReview,
            ProjectState::ManagerReview { .. } => ProjectStatus::ManagerReview,
            ProjectState::Finished => ProjectStatus::Finished,
            ProjectState::Cancelled => ProjectStatus::Cancelled,
            ProjectState::Archived => ProjectStatus::Archived,
        }
    }

    /// Returns the milestone of the review cycle this state belongs to, if any.
    pub fn milestone_id(&self) -> Option<MilestoneId> {
        match self {
            ProjectState::PeerReview { milestone_id }
            | ProjectState::ManagerReview { milestone_id } => Some(*milestone_id),
            _ => None,
        }
    }
}

/// Tag of a project lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Formation,
    PeerReview,
    ManagerReview,
    Finished,
    Cancelled,
    Archived,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 6] = [
        ProjectStatus::Formation,
        ProjectStatus::PeerReview,
        ProjectStatus::ManagerReview,
        ProjectStatus::Finished,
        ProjectStatus::Cancelled,
        ProjectStatus::Archived,
    ];

    /// Returns true if `operation` may be invoked in this state.
    pub fn supports(self, operation: Operation) -> bool {
        use Operation::*;
        use ProjectStatus::*;

        match self {
            Formation => matches!(
                operation,
                UpdateDetails
                    | AddRole
                    | UpdateRole
                    | RemoveRole
                    | AssignUser
                    | UnassignRole
                    | AddReviewTopic
                    | UpdateReviewTopic
                    | RemoveReviewTopic
                    | FinishFormation
                    | Cancel
            ),
            PeerReview => matches!(operation, SubmitPeerReviews | CompletePeerReviews | Cancel),
            ManagerReview => matches!(operation, SubmitManagerReview | Cancel),
            Finished | Cancelled => matches!(operation, Archive),
            Archived => false,
        }
    }

    /// Returns true while the project can still be cancelled.
    pub fn is_cancellable(self) -> bool {
        self.supports(Operation::Cancel)
    }
}

impl StateMachine for ProjectStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ProjectStatus::*;
        match self {
            Formation => vec![PeerReview, Cancelled],
            PeerReview => vec![ManagerReview, Finished, Cancelled],
            ManagerReview => vec![Finished, Cancelled],
            Finished => vec![Archived],
            Cancelled => vec![Archived],
            Archived => vec![],
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProjectStatus::Formation => "formation",
            ProjectStatus::PeerReview => "peer_review",
            ProjectStatus::ManagerReview => "manager_review",
            ProjectStatus::Finished => "finished",
            ProjectStatus::Cancelled => "cancelled",
            ProjectStatus::Archived => "archived",
        };
        write!(f, "{}", s)
    }
}

/// Every externally invokable, state-dependent project operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    UpdateDetails,
    AddRole,
    UpdateRole,
    RemoveRole,
    AssignUser,
    UnassignRole,
    AddReviewTopic,
    UpdateReviewTopic,
    RemoveReviewTopic,
    FinishFormation,
    SubmitPeerReviews,
    CompletePeerReviews,
    SubmitManagerReview,
    Cancel,
    Archive,
}

impl Operation {
    pub const ALL: [Operation; 15] = [
        Operation::UpdateDetails,
        Operation::AddRole,
        Operation::UpdateRole,
        Operation::RemoveRole,
        Operation::AssignUser,
        Operation::UnassignRole,
        Operation::AddReviewTopic,
        Operation::UpdateReviewTopic,
        Operation::RemoveReviewTopic,
        Operation::FinishFormation,
        Operation::SubmitPeerReviews,
        Operation::CompletePeerReviews,
        Operation::SubmitManagerReview,
        Operation::Cancel,
        Operation::Archive,
    ];
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::UpdateDetails => "update_details",
            Operation::AddRole => "add_role",
            Operation::UpdateRole => "update_role",
            Operation::RemoveRole => "remove_role",
            Operation::AssignUser => "assign_user",
            Operation::UnassignRole => "unassign_role",
            Operation::AddReviewTopic => "add_review_topic",
            Operation::UpdateReviewTopic => "update_review_topic",
            Operation::RemoveReviewTopic => "remove_review_topic",
            Operation::FinishFormation => "finish_formation",
            Operation::SubmitPeerReviews => "submit_peer_reviews",
            Operation::CompletePeerReviews => "complete_peer_reviews",
            Operation::SubmitManagerReview => "submit_manager_review",
            Operation::Cancel => "cancel",
            Operation::Archive => "archive",
        };
        write!(f, "{}", s)
    }
}
