//! ProjectEventLogger - Writes every delivered project event to the log.
//!
//! Stands in for the notification and mail collaborators when a host wires
//! the bus without them.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::ports::EventHandler;

#[derive(Debug, Default, Clone, Copy)]
pub struct ProjectEventLogger;

#[async_trait]
impl EventHandler for ProjectEventLogger {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        tracing::info!(
            event_id = %event.event_id,
            event_type = %event.event_type,
            project_id = %event.aggregate_id,
            correlation_id = event.metadata.correlation_id.as_deref().unwrap_or("-"),
            "project event delivered"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ProjectEventLogger"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryEventBus;
    use crate::domain::project::PROJECT_EVENT_TYPES;
    use crate::ports::{EventPublisher, EventSubscriber};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn accepts_every_project_event() {
        let bus = InMemoryEventBus::new();
        bus.subscribe_all(PROJECT_EVENT_TYPES, Arc::new(ProjectEventLogger));

        for event_type in PROJECT_EVENT_TYPES {
            let envelope = EventEnvelope::new(*event_type, "p-1", "Project", json!({}));
            bus.publish(envelope).await.unwrap();
        }

        assert_eq!(bus.event_count(), PROJECT_EVENT_TYPES.len());
    }
}
