//! FinishFormationHandler - Closes formation and opens the first review cycle.

use crate::domain::foundation::{CommandMetadata, MilestoneId, ProjectId};
use crate::domain::project::Project;

use super::{ProjectCommandError, ProjectCommandExecutor};

#[derive(Debug, Clone)]
pub struct FinishFormationCommand {
    pub project_id: ProjectId,
}

#[derive(Debug, Clone)]
pub struct FinishFormationResult {
    pub project: Project,
    /// The review cycle that was opened.
    pub milestone_id: MilestoneId,
}

pub struct FinishFormationHandler {
    executor: ProjectCommandExecutor,
}

impl FinishFormationHandler {
    pub fn new(executor: ProjectCommandExecutor) -> Self {
        Self { executor }
    }

    #[tracing::instrument(skip_all, fields(project_id = %cmd.project_id))]
    pub async fn handle(
        &self,
        cmd: FinishFormationCommand,
        metadata: CommandMetadata,
    ) -> Result<FinishFormationResult, ProjectCommandError> {
        let (project, milestone_id) = self
            .executor
            .execute(cmd.project_id, &metadata, Project::finish_formation)
            .await?;

        tracing::info!(milestone_id = %milestone_id, "peer review started");
        Ok(FinishFormationResult {
            project,
            milestone_id,
        })
    }
}
