//! SubmitPeerReviewsHandler - Records one member's slate for one review topic.
//!
//! The slate that completes the cycle also computes contributions and
//! consensuality and moves the project on, all in the same commit.

use crate::domain::analysis::ReviewEngine;
use crate::domain::foundation::{CommandMetadata, ProjectId, ReviewTopicId, RoleId};
use crate::domain::project::{PeerReviewOutcome, Project, SubmittedScore};

use super::{ProjectCommandError, ProjectCommandExecutor};

#[derive(Debug, Clone)]
pub struct SubmitPeerReviewsCommand {
    pub project_id: ProjectId,
    pub sender_role_id: RoleId,
    pub review_topic_id: ReviewTopicId,
    pub scores: Vec<SubmittedScore>,
}

#[derive(Debug, Clone)]
pub struct SubmitPeerReviewsResult {
    pub project: Project,
    pub outcome: PeerReviewOutcome,
}

pub struct SubmitPeerReviewsHandler {
    executor: ProjectCommandExecutor,
    engine: ReviewEngine,
}

impl SubmitPeerReviewsHandler {
    pub fn new(executor: ProjectCommandExecutor, engine: ReviewEngine) -> Self {
        Self { executor, engine }
    }

    #[tracing::instrument(
        skip_all,
        fields(
            project_id = %cmd.project_id,
            sender_role_id = %cmd.sender_role_id,
            review_topic_id = %cmd.review_topic_id,
        )
    )]
    pub async fn handle(
        &self,
        cmd: SubmitPeerReviewsCommand,
        metadata: CommandMetadata,
    ) -> Result<SubmitPeerReviewsResult, ProjectCommandError> {
        let engine = &self.engine;
        let (project, outcome) = self
            .executor
            .execute(cmd.project_id, &metadata, |project| {
                project.submit_peer_reviews(
                    cmd.sender_role_id,
                    cmd.review_topic_id,
                    &cmd.scores,
                    engine,
                )
            })
            .await?;

        if outcome != PeerReviewOutcome::AwaitingSubmissions {
            tracing::info!(
                ?outcome,
                consensuality = engine.consensuality().name(),
                "peer review finished"
            );
        }
        Ok(SubmitPeerReviewsResult { project, outcome })
    }
}
