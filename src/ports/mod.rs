//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ProjectRepository` - Persistence of the project aggregate
//! - `OutboxWriter` - Durable queue of committed events
//! - `EventPublisher` / `EventSubscriber` - Delivery to downstream collaborators

mod event_publisher;
mod event_subscriber;
mod outbox_writer;
mod project_repository;

pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventBus, EventHandler, EventSubscriber};
pub use outbox_writer::{OutboxEntry, OutboxStatus, OutboxWriter};
pub use project_repository::ProjectRepository;
