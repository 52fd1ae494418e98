//! Project domain events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainEvent, EventId, MilestoneId, ProjectId, ReviewTopicId, RoleId, Timestamp, UserId,
};

use super::ProjectStatus;

/// Events raised by the project aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProjectEvent {
    Created {
        creator_id: UserId,
        title: String,
    },

    DetailsUpdated {
        title: String,
    },

    RoleCreated {
        role_id: RoleId,
        title: String,
    },

    RoleUpdated {
        role_id: RoleId,
        title: String,
    },

    RoleDeleted {
        role_id: RoleId,
    },

    UserAssigned {
        role_id: RoleId,
        user_id: UserId,
    },

    UserUnassigned {
        role_id: RoleId,
        user_id: UserId,
    },

    ReviewTopicCreated {
        review_topic_id: ReviewTopicId,
        title: String,
    },

    ReviewTopicUpdated {
        review_topic_id: ReviewTopicId,
        title: String,
    },

    ReviewTopicDeleted {
        review_topic_id: ReviewTopicId,
    },

    FormationFinished,

    PeerReviewStarted {
        milestone_id: MilestoneId,
    },

    /// One sender submitted a full slate for one topic.
    PeerReviewsSubmitted {
        milestone_id: MilestoneId,
        sender_role_id: RoleId,
        review_topic_id: ReviewTopicId,
    },

    /// The slate that completed the review cycle.
    FinalPeerReviewSubmitted {
        milestone_id: MilestoneId,
    },

    PeerReviewFinished {
        milestone_id: MilestoneId,
    },

    ManagerReviewStarted {
        milestone_id: MilestoneId,
    },

    ManagerReviewSkipped {
        milestone_id: MilestoneId,
    },

    Finished {
        assignee_ids: Vec<UserId>,
    },

    Cancelled {
        previous_status: ProjectStatus,
    },

    Archived,
}

impl ProjectEvent {
    /// Versioned routing key for this event.
    pub fn event_type(&self) -> &'static str {
        match self {
            ProjectEvent::Created { .. } => "project.created.v1",
            ProjectEvent::DetailsUpdated { .. } => "project.details_updated.v1",
            ProjectEvent::RoleCreated { .. } => "project.role_created.v1",
            ProjectEvent::RoleUpdated { .. } => "project.role_updated.v1",
            ProjectEvent::RoleDeleted { .. } => "project.role_deleted.v1",
            ProjectEvent::UserAssigned { .. } => "project.user_assigned.v1",
            ProjectEvent::UserUnassigned { .. } => "project.user_unassigned.v1",
            ProjectEvent::ReviewTopicCreated { .. } => "project.review_topic_created.v1",
            ProjectEvent::ReviewTopicUpdated { .. } => "project.review_topic_updated.v1",
            ProjectEvent::ReviewTopicDeleted { .. } => "project.review_topic_deleted.v1",
            ProjectEvent::FormationFinished => "project.formation_finished.v1",
            ProjectEvent::PeerReviewStarted { .. } => "project.peer_review_started.v1",
            ProjectEvent::PeerReviewsSubmitted { .. } => "project.peer_reviews_submitted.v1",
            ProjectEvent::FinalPeerReviewSubmitted { .. } => {
                "project.final_peer_review_submitted.v1"
            }
            ProjectEvent::PeerReviewFinished { .. } => "project.peer_review_finished.v1",
            ProjectEvent::ManagerReviewStarted { .. } => "project.manager_review_started.v1",
            ProjectEvent::ManagerReviewSkipped { .. } => "project.manager_review_skipped.v1",
            ProjectEvent::Finished { .. } => "project.finished.v1",
            ProjectEvent::Cancelled { .. } => "project.cancelled.v1",
            ProjectEvent::Archived => "project.archived.v1",
        }
    }
}

/// Every routing key a project can emit, for subscribing to all of them.
pub const PROJECT_EVENT_TYPES: &[&str] = &[
    "project.created.v1",
    "project.details_updated.v1",
    "project.role_created.v1",
    "project.role_updated.v1",
    "project.role_deleted.v1",
    "project.user_assigned.v1",
    "project.user_unassigned.v1",
    "project.review_topic_created.v1",
    "project.review_topic_updated.v1",
    "project.review_topic_deleted.v1",
    "project.formation_finished.v1",
    "project.peer_review_started.v1",
    "project.peer_reviews_submitted.v1",
    "project.final_peer_review_submitted.v1",
    "project.peer_review_finished.v1",
    "project.manager_review_started.v1",
    "project.manager_review_skipped.v1",
    "project.finished.v1",
    "project.cancelled.v1",
    "project.archived.v1",
];

/// A `ProjectEvent` stamped with identity and time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDomainEvent {
    pub event_id: EventId,
    pub project_id: ProjectId,
    pub occurred_at: Timestamp,
    #[serde(flatten)]
    pub event: ProjectEvent,
}

impl ProjectDomainEvent {
    pub fn new(project_id: ProjectId, event: ProjectEvent) -> Self {
        Self {
            event_id: EventId::new(),
            project_id,
            occurred_at: Timestamp::now(),
            event,
        }
    }
}

impl DomainEvent for ProjectDomainEvent {
    fn event_type(&self) -> &'static str {
        self.event.event_type()
    }

    fn aggregate_id(&self) -> String {
        self.project_id.to_string()
    }

    fn aggregate_type(&self) -> &'static str {
        "Project"
    }

    fn occurred_at(&self) -> Timestamp {
        self.occurred_at
    }

    fn event_id(&self) -> EventId {
        self.event_id
    }
}
