//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, events, errors)
//! - `project` - Project aggregate, its child entities and lifecycle state
//! - `analysis` - Pure services computing contributions and consensuality

pub mod analysis;
pub mod foundation;
pub mod project;
