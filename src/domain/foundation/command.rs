//! Command metadata carried through every project command.
//!
//! Handlers take a single `CommandMetadata` instead of separate correlation,
//! user and trace arguments, and stamp it onto every event they write.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{EventEnvelope, EventMetadata, UserId};

/// Context for one command execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    /// The user issuing the command.
    pub user_id: UserId,

    /// Links the events of a single request. Generated once per command when absent.
    correlation_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,

    /// Origin of the command (e.g. "api", "scheduler").
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

impl CommandMetadata {
    /// Creates metadata for `user_id` with a fresh correlation ID.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            correlation_id: Uuid::new_v4().to_string(),
            trace_id: None,
            source: None,
        }
    }

    /// Builder: use an upstream correlation ID.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = id.into();
        self
    }

    /// Builder: add trace ID for distributed tracing.
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    /// Builder: add source identifier.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Copies correlation, user and trace context onto an outgoing envelope.
    pub fn stamp(&self, envelope: EventEnvelope) -> EventEnvelope {
        envelope.with_metadata(EventMetadata {
            correlation_id: Some(self.correlation_id.clone()),
            user_id: Some(self.user_id.to_string()),
            trace_id: self.trace_id.clone(),
        })
    }
}

#[cfg(test)]
impl CommandMetadata {
    /// Creates a fixture with a fixed test user.
    pub fn test_fixture() -> Self {
        Self::new(UserId::new("test-user").unwrap()).with_source("test")
    }
}
