//! Adapters - Implementations of port interfaces.
//!
//! - `events` - Event bus, outbox and outbox relay
//! - `storage` - Project persistence

pub mod events;
pub mod storage;

pub use events::{
    InMemoryEventBus, InMemoryOutbox, OutboxPublisher, OutboxPublisherConfig, ProjectEventLogger,
};
pub use storage::InMemoryProjectRepository;
