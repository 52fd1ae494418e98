//! Milestones: one peer-review cycle each.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MilestoneId, Timestamp};

use super::{Entity, EntityCollection, ProjectError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    id: MilestoneId,
    title: String,
    started_at: Timestamp,
    finished_at: Option<Timestamp>,
}

impl Milestone {
    /// Opens the `sequence`-th milestone of a project (1-based).
    pub fn open(sequence: usize) -> Self {
        Self {
            id: MilestoneId::new(),
            title: format!("Milestone {}", sequence),
            started_at: Timestamp::now(),
            finished_at: None,
        }
    }

    pub fn reconstitute(
        id: MilestoneId,
        title: String,
        started_at: Timestamp,
        finished_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            title,
            started_at,
            finished_at,
        }
    }

    pub fn id(&self) -> MilestoneId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<Timestamp> {
        self.finished_at
    }

    pub fn is_open(&self) -> bool {
        self.finished_at.is_none()
    }

    pub(super) fn close(&mut self) {
        if self.finished_at.is_none() {
            self.finished_at = Some(Timestamp::now());
        }
    }
}

impl Entity for Milestone {
    type Id = MilestoneId;
    const NAME: &'static str = "Milestone";

    fn id(&self) -> MilestoneId {
        self.id
    }

    fn not_found(id: MilestoneId) -> ProjectError {
        ProjectError::MilestoneNotFound(id)
    }
}

pub type MilestoneCollection = EntityCollection<Milestone>;

impl EntityCollection<Milestone> {
    /// The milestone currently open, if any.
    pub fn current(&self) -> Option<&Milestone> {
        self.iter().find(|milestone| milestone.is_open())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_milestone_is_numbered_and_open() {
        let milestone = Milestone::open(2);
        assert_eq!(milestone.title(), "Milestone 2");
        assert!(milestone.is_open());
    }

    #[test]
    fn close_is_idempotent() {
        let mut milestone = Milestone::open(1);
        milestone.close();
        let first = milestone.finished_at();
        milestone.close();
        assert!(first.is_some());
        assert_eq!(milestone.finished_at(), first);
    }

    #[test]
    fn current_returns_only_open_milestone() {
        let mut closed = Milestone::open(1);
        closed.close();
        let open = Milestone::open(2);
        let milestones =
            MilestoneCollection::from_persisted(vec![closed, open.clone()]).unwrap();

        assert_eq!(milestones.current().map(Milestone::id), Some(open.id()));
    }
}
