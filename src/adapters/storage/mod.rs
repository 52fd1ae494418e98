//! Storage Adapters
//!
//! - **InMemoryProjectRepository** - Keeps projects in memory (tests, embedded hosts)

mod in_memory_project_repository;

pub use in_memory_project_repository::InMemoryProjectRepository;
