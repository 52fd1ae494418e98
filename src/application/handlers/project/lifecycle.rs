//! LifecycleHandler - Commands that move a project between phases.
//!
//! Manual completion of a review cycle, the manager's sign-off,
//! cancellation and archival.

use serde::{Deserialize, Serialize};

use crate::domain::analysis::ReviewEngine;
use crate::domain::foundation::{CommandMetadata, ProjectId};
use crate::domain::project::{PeerReviewOutcome, Project};

use super::{ProjectCommandError, ProjectCommandExecutor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    /// Fill every missing slate with a uniform one and finish the cycle.
    CompletePeerReviews,
    SubmitManagerReview,
    Cancel,
    Archive,
}

#[derive(Debug, Clone)]
pub struct LifecycleCommand {
    pub project_id: ProjectId,
    pub action: LifecycleAction,
}

#[derive(Debug, Clone)]
pub struct LifecycleResult {
    pub project: Project,
    /// Set only for `CompletePeerReviews`.
    pub peer_review_outcome: Option<PeerReviewOutcome>,
}

pub struct LifecycleHandler {
    executor: ProjectCommandExecutor,
    engine: ReviewEngine,
}

impl LifecycleHandler {
    pub fn new(executor: ProjectCommandExecutor, engine: ReviewEngine) -> Self {
        Self { executor, engine }
    }

    #[tracing::instrument(skip_all, fields(project_id = %cmd.project_id, action = ?cmd.action))]
    pub async fn handle(
        &self,
        cmd: LifecycleCommand,
        metadata: CommandMetadata,
    ) -> Result<LifecycleResult, ProjectCommandError> {
        let engine = &self.engine;
        let (project, peer_review_outcome) = self
            .executor
            .execute(cmd.project_id, &metadata, |project| match cmd.action {
                LifecycleAction::CompletePeerReviews => {
                    project.complete_peer_reviews(engine).map(Some)
                }
                LifecycleAction::SubmitManagerReview => {
                    project.submit_manager_review().map(|_| None)
                }
                LifecycleAction::Cancel => project.cancel().map(|_| None),
                LifecycleAction::Archive => project.archive().map(|_| None),
            })
            .await?;

        tracing::info!(status = %project.status(), "project lifecycle advanced");
        Ok(LifecycleResult {
            project,
            peer_review_outcome,
        })
    }
}
