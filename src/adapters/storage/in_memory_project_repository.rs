//! In-Memory Project Repository
//!
//! Keeps committed projects in a map. Stored copies never carry pending
//! events and always sit at the version they were committed as.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, ProjectId};
use crate::domain::project::Project;
use crate::ports::ProjectRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemoryProjectRepository {
    projects: Arc<RwLock<HashMap<ProjectId, Project>>>,
}

impl InMemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.projects.read().await.len()
    }

    fn committed_copy(project: &Project) -> Project {
        let mut stored = project.clone();
        stored.take_events();
        stored.mark_persisted();
        stored
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn save(&self, project: &Project) -> Result<(), DomainError> {
        let mut projects = self.projects.write().await;
        if projects.contains_key(&project.id()) {
            return Err(DomainError::new(
                ErrorCode::DuplicateEntity,
                format!("Project {} already exists", project.id()),
            ));
        }
        projects.insert(project.id(), Self::committed_copy(project));
        Ok(())
    }

    async fn update(&self, project: &Project) -> Result<(), DomainError> {
        let mut projects = self.projects.write().await;
        let stored = projects.get(&project.id()).ok_or_else(|| {
            DomainError::new(
                ErrorCode::ProjectNotFound,
                format!("Project {} not found", project.id()),
            )
        })?;

        if stored.version() != project.version() {
            return Err(DomainError::new(
                ErrorCode::VersionConflict,
                format!(
                    "Project {} was modified concurrently",
                    project.id()
                ),
            )
            .with_detail("expected", project.version().to_string())
            .with_detail("actual", stored.version().to_string()));
        }

        projects.insert(project.id(), Self::committed_copy(project));
        Ok(())
    }

    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, DomainError> {
        Ok(self.projects.read().await.get(id).cloned())
    }
}
