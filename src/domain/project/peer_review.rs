//! Peer reviews: immutable scored judgements from one role about another.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    MilestoneId, PeerReviewId, ReviewTopicId, RoleId, Timestamp, ValidationError,
};

use super::{Entity, EntityCollection, ProjectError};

/// A finite, non-negative score.
///
/// Scores from one sender are read as a relative split of credit across
/// the other roles, so only their proportions matter downstream.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct PeerReviewScore(f64);

impl PeerReviewScore {
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || value < 0.0 {
            return Err(ValidationError::out_of_range("score", 0.0, f64::MAX, value));
        }
        Ok(Self(value))
    }

    /// Maps anything invalid to zero.
    pub(crate) fn clamped(value: f64) -> Self {
        if value.is_finite() && value > 0.0 {
            Self(value)
        } else {
            Self(0.0)
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for PeerReviewScore {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PeerReviewScore> for f64 {
    fn from(score: PeerReviewScore) -> Self {
        score.0
    }
}

/// Marks reviews that were not submitted by the sender themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerReviewFlag {
    /// Filled in with a uniform slate because the sender never submitted.
    Absent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerReview {
    id: PeerReviewId,
    sender_role_id: RoleId,
    receiver_role_id: RoleId,
    review_topic_id: ReviewTopicId,
    milestone_id: MilestoneId,
    score: PeerReviewScore,
    flag: Option<PeerReviewFlag>,
    created_at: Timestamp,
}

impl PeerReview {
    /// Creates a peer review; a role can never review itself.
    pub fn new(
        sender_role_id: RoleId,
        receiver_role_id: RoleId,
        review_topic_id: ReviewTopicId,
        milestone_id: MilestoneId,
        score: PeerReviewScore,
        flag: Option<PeerReviewFlag>,
    ) -> Result<Self, ProjectError> {
        Self::reconstitute(
            PeerReviewId::new(),
            sender_role_id,
            receiver_role_id,
            review_topic_id,
            milestone_id,
            score,
            flag,
            Timestamp::now(),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: PeerReviewId,
        sender_role_id: RoleId,
        receiver_role_id: RoleId,
        review_topic_id: ReviewTopicId,
        milestone_id: MilestoneId,
        score: PeerReviewScore,
        flag: Option<PeerReviewFlag>,
        created_at: Timestamp,
    ) -> Result<Self, ProjectError> {
        if sender_role_id == receiver_role_id {
            return Err(ProjectError::SelfPeerReview {
                role_id: sender_role_id,
            });
        }
        Ok(Self {
            id,
            sender_role_id,
            receiver_role_id,
            review_topic_id,
            milestone_id,
            score,
            flag,
            created_at,
        })
    }

    pub fn id(&self) -> PeerReviewId {
        self.id
    }

    pub fn sender_role_id(&self) -> RoleId {
        self.sender_role_id
    }

    pub fn receiver_role_id(&self) -> RoleId {
        self.receiver_role_id
    }

    pub fn review_topic_id(&self) -> ReviewTopicId {
        self.review_topic_id
    }

    pub fn milestone_id(&self) -> MilestoneId {
        self.milestone_id
    }

    pub fn score(&self) -> PeerReviewScore {
        self.score
    }

    pub fn flag(&self) -> Option<PeerReviewFlag> {
        self.flag
    }

    pub fn is_absent(&self) -> bool {
        self.flag == Some(PeerReviewFlag::Absent)
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

impl Entity for PeerReview {
    type Id = PeerReviewId;
    const NAME: &'static str = "PeerReview";

    fn id(&self) -> PeerReviewId {
        self.id
    }

    fn not_found(id: PeerReviewId) -> ProjectError {
        ProjectError::PeerReviewNotFound(id)
    }
}

pub type PeerReviewCollection = EntityCollection<PeerReview>;

impl EntityCollection<PeerReview> {
    /// All reviews of one topic in one review cycle.
    pub fn for_topic(
        &self,
        review_topic_id: ReviewTopicId,
        milestone_id: MilestoneId,
    ) -> Vec<&PeerReview> {
        self.iter()
            .filter(|review| {
                review.review_topic_id == review_topic_id && review.milestone_id == milestone_id
            })
            .collect()
    }

    /// Returns true if `sender` has a slate for this topic in this cycle.
    pub fn has_submitted(
        &self,
        sender_role_id: RoleId,
        review_topic_id: ReviewTopicId,
        milestone_id: MilestoneId,
    ) -> bool {
        self.iter().any(|review| {
            review.sender_role_id == sender_role_id
                && review.review_topic_id == review_topic_id
                && review.milestone_id == milestone_id
        })
    }
}
