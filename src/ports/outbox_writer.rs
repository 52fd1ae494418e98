//! OutboxWriter port - Durable queue of events awaiting delivery.
//!
//! Command handlers write a project's drained events here right after the
//! project itself has been persisted. A durable adapter shares one database
//! transaction between that write and the repository write, so either both
//! the change and its events commit or neither does. The outbox publisher then relays
//! pending entries to the `EventPublisher` in insertion order, so events
//! reach subscribers strictly after the change that produced them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Delivery state of an outbox entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboxStatus {
    Pending,
    Published,
    /// Publishing failed; the entry stays eligible for retry.
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEntry {
    pub id: Uuid,
    pub event: EventEnvelope,
    pub status: OutboxStatus,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub attempts: u32,
    pub last_error: Option<String>,
    /// Ordering scope; the project id for project events.
    pub partition_key: String,
}

impl OutboxEntry {
    pub fn new(event: EventEnvelope, partition_key: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event,
            status: OutboxStatus::Pending,
            created_at: Utc::now(),
            processed_at: None,
            attempts: 0,
            last_error: None,
            partition_key: partition_key.into(),
        }
    }

    pub fn mark_published(&mut self) {
        self.status = OutboxStatus::Published;
        self.processed_at = Some(Utc::now());
        self.attempts += 1;
    }

    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.status = OutboxStatus::Failed;
        self.processed_at = Some(Utc::now());
        self.attempts += 1;
        self.last_error = Some(error.into());
    }

    /// True while the entry still needs delivering.
    pub fn is_deliverable(&self) -> bool {
        self.status != OutboxStatus::Published
    }
}

/// Port for the transactional outbox.
#[async_trait]
pub trait OutboxWriter: Send + Sync {
    /// Append events for one partition, all or nothing.
    ///
    /// Durable implementations must join the transaction opened by
    /// `ProjectRepository::save` or `ProjectRepository::update` for the same
    /// command; an error here must roll that write back.
    async fn write_batch(
        &self,
        events: &[EventEnvelope],
        partition_key: &str,
    ) -> Result<Vec<OutboxEntry>, DomainError>;

    /// Oldest undelivered entries first, at most `limit`.
    async fn get_pending(&self, limit: u32) -> Result<Vec<OutboxEntry>, DomainError>;

    async fn mark_published(&self, id: Uuid) -> Result<(), DomainError>;

    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<(), DomainError>;
}
