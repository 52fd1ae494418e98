//! Project repository port.
//!
//! Adapters persist the aggregate using `Project::changes()` to issue
//! targeted inserts and deletes, and reject stale writes by version.
//!
//! Writes are not committed on their own: the command executor follows each
//! `save` or `update` with `OutboxWriter::write_batch`, and durable adapters
//! commit both in one transaction.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ProjectId};
use crate::domain::project::Project;

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Save a new project.
    ///
    /// Commits together with the outbox write that follows it.
    ///
    /// # Errors
    ///
    /// - `DuplicateEntity` if a project with the same id exists
    async fn save(&self, project: &Project) -> Result<(), DomainError>;

    /// Update an existing project.
    ///
    /// The stored version must equal `project.version()`; the stored copy
    /// then moves to the next version. Commits together with the outbox write
    /// that follows it.
    ///
    /// # Errors
    ///
    /// - `ProjectNotFound` if the project doesn't exist
    /// - `VersionConflict` if another writer committed first
    async fn update(&self, project: &Project) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, DomainError>;
}
