//! Project-level policies chosen at creation.

use serde::{Deserialize, Serialize};

/// Decides whether a manager review follows peer review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipManagerReview {
    Yes,
    /// Skip only when every review topic exceeds the consensual threshold.
    #[default]
    IfConsensual,
    No,
}

impl SkipManagerReview {
    pub fn should_skip(
        self,
        consensualities: impl IntoIterator<Item = f64>,
        consensual_threshold: f64,
    ) -> bool {
        match self {
            SkipManagerReview::Yes => true,
            SkipManagerReview::No => false,
            SkipManagerReview::IfConsensual => consensualities
                .into_iter()
                .all(|consensuality| consensuality > consensual_threshold),
        }
    }
}

/// Who may see computed contribution shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionVisibility {
    /// Anyone.
    Public,
    /// Anyone holding a role in the project.
    #[default]
    Project,
    /// Each member sees only their own share.
    Private,
    /// Only the creator.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectPolicies {
    pub skip_manager_review: SkipManagerReview,
    pub contribution_visibility: ContributionVisibility,
}
