//! CreateProjectHandler - Command handler for starting a new project.
//!
//! The issuing user becomes the project's creator; the project starts in
//! formation with no roles and no review topics.

use crate::domain::foundation::CommandMetadata;
use crate::domain::project::{Project, ProjectPolicies};

use super::{ProjectCommandError, ProjectCommandExecutor};

/// Command to create a project.
#[derive(Debug, Clone)]
pub struct CreateProjectCommand {
    pub title: String,
    pub description: String,
    pub policies: ProjectPolicies,
}

pub struct CreateProjectHandler {
    executor: ProjectCommandExecutor,
}

impl CreateProjectHandler {
    pub fn new(executor: ProjectCommandExecutor) -> Self {
        Self { executor }
    }

    #[tracing::instrument(skip_all, fields(creator_id = %metadata.user_id))]
    pub async fn handle(
        &self,
        cmd: CreateProjectCommand,
        metadata: CommandMetadata,
    ) -> Result<Project, ProjectCommandError> {
        let project = Project::create(
            metadata.user_id.clone(),
            &cmd.title,
            &cmd.description,
            cmd.policies,
        )?;
        self.executor.create(project, &metadata).await
    }
}
