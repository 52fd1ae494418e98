//! OutboxPublisher - Relays committed project events to the event bus.
//!
//! Command handlers write events to the outbox after the project has been
//! persisted. This service polls the outbox and publishes pending entries
//! in insertion order, marking each one published or failed.
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `poll_interval` | 100ms | How often to check for pending events |
//! | `batch_size` | 100 | Max events to publish per poll cycle |
//!
//! When an entry fails, later entries of the same partition are held back
//! until the next cycle so a project's events never overtake each other.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use crate::domain::foundation::DomainError;
use crate::ports::{EventPublisher, OutboxWriter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxPublisherConfig {
    pub poll_interval: Duration,
    pub batch_size: u32,
}

impl Default for OutboxPublisherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            batch_size: 100,
        }
    }
}

impl OutboxPublisherConfig {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_batch_size(mut self, size: u32) -> Self {
        self.batch_size = size;
        self
    }
}

pub struct OutboxPublisher {
    outbox: Arc<dyn OutboxWriter>,
    event_publisher: Arc<dyn EventPublisher>,
    config: OutboxPublisherConfig,
}

impl OutboxPublisher {
    pub fn new(outbox: Arc<dyn OutboxWriter>, event_publisher: Arc<dyn EventPublisher>) -> Self {
        Self::with_config(outbox, event_publisher, OutboxPublisherConfig::default())
    }

    pub fn with_config(
        outbox: Arc<dyn OutboxWriter>,
        event_publisher: Arc<dyn EventPublisher>,
        config: OutboxPublisherConfig,
    ) -> Self {
        Self {
            outbox,
            event_publisher,
            config,
        }
    }

    /// Poll until `shutdown` flips to true, then drain one final batch.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), DomainError> {
        let mut interval = time::interval(self.config.poll_interval);
        tracing::info!(
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            batch_size = self.config.batch_size,
            "outbox publisher started"
        );

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    // A dropped sender also means shutdown.
                    if changed.is_err() || *shutdown.borrow() {
                        self.process_batch().await?;
                        tracing::info!("outbox publisher stopped");
                        return Ok(());
                    }
                }
                _ = interval.tick() => {
                    self.process_batch().await?;
                }
            }
        }
    }

    /// Publish one batch of pending entries, returning how many succeeded.
    pub async fn process_batch(&self) -> Result<usize, DomainError> {
        let entries = self.outbox.get_pending(self.config.batch_size).await?;
        if entries.is_empty() {
            return Ok(0);
        }
        tracing::debug!(pending = entries.len(), "publishing outbox batch");

        let mut blocked: HashSet<String> = HashSet::new();
        let mut published_count = 0;

        for entry in entries {
            if blocked.contains(&entry.partition_key) {
                continue;
            }

            match self.event_publisher.publish(entry.event.clone()).await {
                Ok(()) => {
                    self.outbox.mark_published(entry.id).await?;
                    published_count += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        event_id = %entry.event.event_id,
                        event_type = %entry.event.event_type,
                        partition = %entry.partition_key,
                        attempts = entry.attempts + 1,
                        error = %e,
                        "failed to publish outbox entry"
                    );
                    self.outbox.mark_failed(entry.id, &e.to_string()).await?;
                    blocked.insert(entry.partition_key);
                }
            }
        }

        Ok(published_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryEventBus, InMemoryOutbox};
    use crate::domain::foundation::{ErrorCode, EventEnvelope};
    use crate::ports::OutboxStatus;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    fn envelope(event_type: &str, aggregate_id: &str) -> EventEnvelope {
        EventEnvelope::new(event_type, aggregate_id, "Project", json!({}))
    }

    /// Fails every event of one type, records everything it accepts.
    struct SelectivePublisher {
        reject: &'static str,
        accepted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl EventPublisher for SelectivePublisher {
        async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
            if event.event_type == self.reject {
                return Err(DomainError::new(ErrorCode::InternalError, "broker down"));
            }
            self.accepted.lock().unwrap().push(event.event_type);
            Ok(())
        }
    }

    #[tokio::test]
    async fn process_batch_publishes_pending_events_in_order() {
        let outbox = Arc::new(InMemoryOutbox::new());
        let bus = Arc::new(InMemoryEventBus::new());
        outbox
            .write_batch(
                &[
                    envelope("project.created.v1", "p-1"),
                    envelope("project.role_created.v1", "p-1"),
                ],
                "p-1",
            )
            .await
            .unwrap();

        let publisher = OutboxPublisher::new(outbox.clone(), bus.clone());
        let count = publisher.process_batch().await.unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            bus.event_types(),
            vec!["project.created.v1", "project.role_created.v1"]
        );
        assert_eq!(outbox.count_with_status(OutboxStatus::Published).await, 2);
    }

    #[tokio::test]
    async fn process_batch_respects_batch_size() {
        let outbox = Arc::new(InMemoryOutbox::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let events: Vec<_> = (0..5)
            .map(|i| envelope(&format!("project.e{}.v1", i), "p-1"))
            .collect();
        outbox.write_batch(&events, "p-1").await.unwrap();

        let config = OutboxPublisherConfig::default().with_batch_size(2);
        let publisher = OutboxPublisher::with_config(outbox.clone(), bus.clone(), config);

        assert_eq!(publisher.process_batch().await.unwrap(), 2);
        assert_eq!(publisher.process_batch().await.unwrap(), 2);
        assert_eq!(publisher.process_batch().await.unwrap(), 1);
        assert_eq!(publisher.process_batch().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn failure_holds_back_rest_of_partition_only() {
        let outbox = Arc::new(InMemoryOutbox::new());
        outbox
            .write_batch(
                &[envelope("project.bad.v1", "p-1"), envelope("project.after.v1", "p-1")],
                "p-1",
            )
            .await
            .unwrap();
        outbox
            .write_batch(&[envelope("project.other.v1", "p-2")], "p-2")
            .await
            .unwrap();

        let sink = Arc::new(SelectivePublisher {
            reject: "project.bad.v1",
            accepted: Mutex::new(Vec::new()),
        });
        let publisher = OutboxPublisher::new(outbox.clone(), sink.clone());

        let count = publisher.process_batch().await.unwrap();

        assert_eq!(count, 1);
        assert_eq!(*sink.accepted.lock().unwrap(), vec!["project.other.v1"]);
        assert_eq!(outbox.count_with_status(OutboxStatus::Failed).await, 1);
        assert_eq!(outbox.count_with_status(OutboxStatus::Pending).await, 1);
    }

    #[tokio::test]
    async fn run_drains_and_stops_on_shutdown() {
        let outbox = Arc::new(InMemoryOutbox::new());
        let bus = Arc::new(InMemoryEventBus::new());
        outbox
            .write_batch(&[envelope("project.created.v1", "p-1")], "p-1")
            .await
            .unwrap();

        let config =
            OutboxPublisherConfig::default().with_poll_interval(Duration::from_millis(10));
        let publisher = OutboxPublisher::with_config(outbox.clone(), bus.clone(), config);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move { publisher.run(shutdown_rx).await });
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(true).unwrap();

        assert!(handle.await.unwrap().is_ok());
        assert_eq!(bus.event_count(), 1);
    }

    #[test]
    fn config_defaults() {
        let config = OutboxPublisherConfig::default();

        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert_eq!(config.batch_size, 100);
    }
}
