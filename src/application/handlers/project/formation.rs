//! FormationHandler - Commands that shape a project before review starts.
//!
//! Covers details, roles, assignments and review topics. All of them are
//! only accepted while the project is in formation.

use crate::domain::foundation::{CommandMetadata, ProjectId, ReviewTopicId, RoleId, UserId};
use crate::domain::project::{Project, ReviewTopicInput};

use super::{ProjectCommandError, ProjectCommandExecutor};

/// A single formation change.
#[derive(Debug, Clone)]
pub enum FormationChange {
    UpdateDetails {
        title: String,
        description: String,
    },
    AddRole {
        title: String,
        description: String,
    },
    UpdateRole {
        role_id: RoleId,
        title: String,
        description: String,
    },
    RemoveRole {
        role_id: RoleId,
    },
    AssignUser {
        role_id: RoleId,
        user_id: UserId,
    },
    UnassignRole {
        role_id: RoleId,
    },
    AddReviewTopic {
        title: String,
        description: String,
        input: Option<ReviewTopicInput>,
    },
    UpdateReviewTopic {
        review_topic_id: ReviewTopicId,
        title: String,
        description: String,
        input: Option<ReviewTopicInput>,
    },
    RemoveReviewTopic {
        review_topic_id: ReviewTopicId,
    },
}

#[derive(Debug, Clone)]
pub struct FormationCommand {
    pub project_id: ProjectId,
    pub change: FormationChange,
}

/// What a formation change produced, beyond the updated project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormationOutcome {
    Updated,
    RoleAdded(RoleId),
    ReviewTopicAdded(ReviewTopicId),
}

#[derive(Debug, Clone)]
pub struct FormationResult {
    pub project: Project,
    pub outcome: FormationOutcome,
}

pub struct FormationHandler {
    executor: ProjectCommandExecutor,
}

impl FormationHandler {
    pub fn new(executor: ProjectCommandExecutor) -> Self {
        Self { executor }
    }

    #[tracing::instrument(skip_all, fields(project_id = %cmd.project_id))]
    pub async fn handle(
        &self,
        cmd: FormationCommand,
        metadata: CommandMetadata,
    ) -> Result<FormationResult, ProjectCommandError> {
        let (project, outcome) = self
            .executor
            .execute(cmd.project_id, &metadata, |project| match cmd.change {
                FormationChange::UpdateDetails { title, description } => project
                    .update_details(&title, &description)
                    .map(|_| FormationOutcome::Updated),
                FormationChange::AddRole { title, description } => project
                    .add_role(&title, &description)
                    .map(|role| FormationOutcome::RoleAdded(role.id())),
                FormationChange::UpdateRole {
                    role_id,
                    title,
                    description,
                } => project
                    .update_role(role_id, &title, &description)
                    .map(|_| FormationOutcome::Updated),
                FormationChange::RemoveRole { role_id } => project
                    .remove_role(role_id)
                    .map(|_| FormationOutcome::Updated),
                FormationChange::AssignUser { role_id, user_id } => project
                    .assign_user_to_role(user_id, role_id)
                    .map(|_| FormationOutcome::Updated),
                FormationChange::UnassignRole { role_id } => project
                    .unassign_role(role_id)
                    .map(|_| FormationOutcome::Updated),
                FormationChange::AddReviewTopic {
                    title,
                    description,
                    input,
                } => project
                    .add_review_topic(&title, &description, input)
                    .map(|topic| FormationOutcome::ReviewTopicAdded(topic.id())),
                FormationChange::UpdateReviewTopic {
                    review_topic_id,
                    title,
                    description,
                    input,
                } => project
                    .update_review_topic(review_topic_id, &title, &description, input)
                    .map(|_| FormationOutcome::Updated),
                FormationChange::RemoveReviewTopic { review_topic_id } => project
                    .remove_review_topic(review_topic_id)
                    .map(|_| FormationOutcome::Updated),
            })
            .await?;

        Ok(FormationResult { project, outcome })
    }
}
