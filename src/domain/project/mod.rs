//! Project module - The collaborative project aggregate and its children.
//!
//! # Lifecycle
//!
//! A project is formed (roles, assignments, review topics), peer reviewed
//! (every role scores every other role per topic), optionally manager
//! reviewed, and finished. It can be cancelled before it finishes and
//! archived afterwards.

mod aggregate;
mod collection;
mod details;
mod errors;
mod events;
mod milestone;
mod peer_review;
mod policies;
mod review_topic;
mod role;
mod state;

pub use aggregate::{PeerReviewOutcome, Project, ProjectChanges, SubmittedScore};
pub use collection::{Changeset, Entity, EntityCollection};
pub use details::{Description, Title, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH};
pub use errors::ProjectError;
pub use events::{ProjectDomainEvent, ProjectEvent, PROJECT_EVENT_TYPES};
pub use milestone::{Milestone, MilestoneCollection};
pub use peer_review::{PeerReview, PeerReviewCollection, PeerReviewFlag, PeerReviewScore};
pub use policies::{ContributionVisibility, ProjectPolicies, SkipManagerReview};
pub use review_topic::{
    DiscreteChoice, ReviewTopic, ReviewTopicCollection, ReviewTopicInput,
    DEFAULT_REVIEW_TOPIC_TITLE,
};
pub use role::{Role, RoleCollection, MIN_ROLES};
pub use state::{Operation, ProjectState, ProjectStatus};
