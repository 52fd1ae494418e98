//! EventSubscriber port - Registers handlers for project events.
//!
//! Notification and mail collaborators live behind `EventHandler`; they are
//! invoked after the events have been committed to the outbox and relayed.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Handler for processing domain events.
///
/// Handlers must be idempotent since delivery is at-least-once.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Port for subscribing to domain events by event type.
pub trait EventSubscriber: Send + Sync {
    /// Subscribe handler to a specific event type (e.g. "project.finished.v1").
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>);

    /// Subscribe the same handler to several event types.
    fn subscribe_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>);
}

/// An event bus both publishes and dispatches.
pub trait EventBus: super::EventPublisher + EventSubscriber {}

impl<T: super::EventPublisher + EventSubscriber> EventBus for T {}
