//! Error returned by every project command handler.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ProjectId};
use crate::domain::project::ProjectError;

#[derive(Debug, Clone, Error)]
pub enum ProjectCommandError {
    #[error("Project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// The aggregate refused the command; nothing was persisted.
    #[error(transparent)]
    Rejected(#[from] ProjectError),

    /// A port failed (storage, outbox, serialization).
    #[error(transparent)]
    Infrastructure(#[from] DomainError),
}

impl ProjectCommandError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ProjectCommandError::ProjectNotFound(_) => ErrorCode::ProjectNotFound,
            ProjectCommandError::Rejected(err) => err.code(),
            ProjectCommandError::Infrastructure(err) => err.code,
        }
    }

    /// True when retrying the same command could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProjectCommandError::Infrastructure(err) if err.code == ErrorCode::VersionConflict
        )
    }
}

impl From<ProjectCommandError> for DomainError {
    fn from(err: ProjectCommandError) -> Self {
        match err {
            ProjectCommandError::ProjectNotFound(id) => DomainError::new(
                ErrorCode::ProjectNotFound,
                format!("Project not found: {}", id),
            ),
            ProjectCommandError::Rejected(err) => err.into(),
            ProjectCommandError::Infrastructure(err) => err,
        }
    }
}
