//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, event infrastructure and error types
//! that form the vocabulary of the project domain.

mod command;
mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;

pub use command::CommandMetadata;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{DomainEvent, EventEnvelope, EventId, EventMetadata};
pub use ids::{MilestoneId, PeerReviewId, ProjectId, ReviewTopicId, RoleId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
