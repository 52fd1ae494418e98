//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    CreateProjectCommand, CreateProjectHandler, FinishFormationCommand, FinishFormationHandler,
    FinishFormationResult, FormationChange, FormationCommand, FormationHandler, FormationOutcome,
    FormationResult, LifecycleAction, LifecycleCommand, LifecycleHandler, LifecycleResult,
    ProjectCommandError, ProjectCommandExecutor, SubmitPeerReviewsCommand,
    SubmitPeerReviewsHandler, SubmitPeerReviewsResult,
};
