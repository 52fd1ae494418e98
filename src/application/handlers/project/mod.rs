//! Project command handlers.
//!
//! Every handler delegates to `ProjectCommandExecutor`, which owns the
//! load, persist and emit steps shared by all project commands.

mod create_project;
mod error;
mod executor;
mod finish_formation;
mod formation;
mod lifecycle;
mod submit_peer_reviews;

pub use create_project::{CreateProjectCommand, CreateProjectHandler};
pub use error::ProjectCommandError;
pub use executor::ProjectCommandExecutor;
pub use finish_formation::{
    FinishFormationCommand, FinishFormationHandler, FinishFormationResult,
};
pub use formation::{
    FormationChange, FormationCommand, FormationHandler, FormationOutcome, FormationResult,
};
pub use lifecycle::{LifecycleAction, LifecycleCommand, LifecycleHandler, LifecycleResult};
pub use submit_peer_reviews::{
    SubmitPeerReviewsCommand, SubmitPeerReviewsHandler, SubmitPeerReviewsResult,
};
