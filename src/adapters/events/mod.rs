//! Event adapters.
//!
//! - `InMemoryEventBus` - Synchronous, in-process bus
//! - `InMemoryOutbox` - Ordered outbox kept in memory
//! - `OutboxPublisher` - Background relay from outbox to bus
//! - `ProjectEventLogger` - Handler that logs delivered events

mod event_logger;
mod in_memory;
mod in_memory_outbox;
mod outbox_publisher;

pub use event_logger::ProjectEventLogger;
pub use in_memory::InMemoryEventBus;
pub use in_memory_outbox::InMemoryOutbox;
pub use outbox_publisher::{OutboxPublisher, OutboxPublisherConfig};
