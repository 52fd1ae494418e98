//! ProjectCommandExecutor - Shared load/apply/persist/emit pipeline.
//!
//! Every project command follows the same steps:
//! 1. Load the project (or build it, for creation)
//! 2. Apply the domain operation; a rejection leaves storage untouched
//! 3. Serialize the recorded events, stamped with the command metadata
//! 4. Persist with the version the project was loaded at
//! 5. Write the serialized events to the outbox
//!
//! Steps 4 and 5 are two port calls. Durable adapters must run them in one
//! transaction; see `ProjectRepository::update` and `OutboxWriter::write_batch`.

use std::sync::Arc;

use crate::domain::foundation::{
    CommandMetadata, DomainError, ErrorCode, EventEnvelope, ProjectId,
};
use crate::domain::project::{Project, ProjectError};
use crate::ports::{OutboxWriter, ProjectRepository};

use super::ProjectCommandError;

#[derive(Clone)]
pub struct ProjectCommandExecutor {
    repository: Arc<dyn ProjectRepository>,
    outbox: Arc<dyn OutboxWriter>,
}

impl ProjectCommandExecutor {
    pub fn new(repository: Arc<dyn ProjectRepository>, outbox: Arc<dyn OutboxWriter>) -> Self {
        Self { repository, outbox }
    }

    /// Persists a freshly created project and emits its creation events.
    pub async fn create(
        &self,
        mut project: Project,
        metadata: &CommandMetadata,
    ) -> Result<Project, ProjectCommandError> {
        let envelopes = serialize_events(&project, metadata)?;
        self.repository.save(&project).await?;
        self.commit(&mut project, envelopes, metadata).await?;
        Ok(project)
    }

    /// Loads `project_id`, runs `operation` on it and commits the result.
    pub async fn execute<T, F>(
        &self,
        project_id: ProjectId,
        metadata: &CommandMetadata,
        operation: F,
    ) -> Result<(Project, T), ProjectCommandError>
    where
        F: FnOnce(&mut Project) -> Result<T, ProjectError>,
    {
        let mut project = self
            .repository
            .find_by_id(&project_id)
            .await?
            .ok_or(ProjectCommandError::ProjectNotFound(project_id))?;
        tracing::debug!(
            project_id = %project_id,
            status = %project.status(),
            version = project.version(),
            "project loaded"
        );

        let output = match operation(&mut project) {
            Ok(output) => output,
            Err(err) => {
                if err.is_defect() {
                    tracing::error!(project_id = %project_id, error = %err, "command hit a defect");
                } else {
                    tracing::warn!(project_id = %project_id, code = %err.code(), error = %err, "command rejected");
                }
                return Err(err.into());
            }
        };

        let envelopes = serialize_events(&project, metadata)?;
        self.repository.update(&project).await?;
        self.commit(&mut project, envelopes, metadata).await?;
        Ok((project, output))
    }

    async fn commit(
        &self,
        project: &mut Project,
        envelopes: Vec<EventEnvelope>,
        metadata: &CommandMetadata,
    ) -> Result<(), ProjectCommandError> {
        project.mark_persisted();
        project.take_events();

        if !envelopes.is_empty() {
            self.outbox
                .write_batch(&envelopes, &project.id().to_string())
                .await?;
        }

        tracing::info!(
            project_id = %project.id(),
            status = %project.status(),
            version = project.version(),
            events = envelopes.len(),
            correlation_id = metadata.correlation_id(),
            "project committed"
        );
        Ok(())
    }
}

/// Serializes the pending events before anything is written, so a payload
/// that cannot be encoded rejects the command instead of losing events.
fn serialize_events(
    project: &Project,
    metadata: &CommandMetadata,
) -> Result<Vec<EventEnvelope>, DomainError> {
    project
        .pending_events()
        .iter()
        .map(|event| {
            EventEnvelope::from_event(event)
                .map(|envelope| metadata.stamp(envelope))
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::InternalError,
                        format!("Failed to serialize project event: {}", e),
                    )
                })
        })
        .collect()
}
