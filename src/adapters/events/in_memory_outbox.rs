//! In-memory outbox.
//!
//! Entries are kept in insertion order; published entries stay in place
//! so tests can inspect delivery history.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::{OutboxEntry, OutboxStatus, OutboxWriter};

#[derive(Default)]
pub struct InMemoryOutbox {
    entries: RwLock<Vec<OutboxEntry>>,
}

impl InMemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<OutboxEntry> {
        self.entries.read().await.clone()
    }

    pub async fn count_with_status(&self, status: OutboxStatus) -> usize {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| e.status == status)
            .count()
    }

    async fn update_entry(
        &self,
        id: Uuid,
        apply: impl FnOnce(&mut OutboxEntry),
    ) -> Result<(), DomainError> {
        let mut entries = self.entries.write().await;
        let entry = entries.iter_mut().find(|e| e.id == id).ok_or_else(|| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Outbox entry {} not found", id),
            )
        })?;
        apply(entry);
        Ok(())
    }
}

#[async_trait]
impl OutboxWriter for InMemoryOutbox {
    async fn write_batch(
        &self,
        events: &[EventEnvelope],
        partition_key: &str,
    ) -> Result<Vec<OutboxEntry>, DomainError> {
        let written: Vec<OutboxEntry> = events
            .iter()
            .map(|event| OutboxEntry::new(event.clone(), partition_key))
            .collect();
        self.entries.write().await.extend(written.iter().cloned());
        Ok(written)
    }

    async fn get_pending(&self, limit: u32) -> Result<Vec<OutboxEntry>, DomainError> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|e| e.is_deliverable())
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn mark_published(&self, id: Uuid) -> Result<(), DomainError> {
        self.update_entry(id, OutboxEntry::mark_published).await
    }

    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<(), DomainError> {
        self.update_entry(id, |entry| entry.mark_failed(error)).await
    }
}
