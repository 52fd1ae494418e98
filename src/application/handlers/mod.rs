//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod project;

pub use project::{
    CreateProjectCommand, CreateProjectHandler, FinishFormationCommand, FinishFormationHandler,
    FinishFormationResult, FormationChange, FormationCommand, FormationHandler, FormationOutcome,
    FormationResult, LifecycleAction, LifecycleCommand, LifecycleHandler, LifecycleResult,
    ProjectCommandError, ProjectCommandExecutor, SubmitPeerReviewsCommand,
    SubmitPeerReviewsHandler, SubmitPeerReviewsResult,
};
