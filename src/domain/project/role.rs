//! Role entity and the role-set invariants used by the lifecycle.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{ProjectId, ReviewTopicId, RoleId, UserId};

use super::{Description, Entity, EntityCollection, ProjectError, Title};

/// Minimum number of roles before formation can finish.
pub const MIN_ROLES: usize = 4;

/// A member slot in a project, optionally held by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    project_id: ProjectId,
    assignee_id: Option<UserId>,
    title: Title,
    description: Description,
    /// Contribution share per review topic, absent until peer review finishes.
    contributions: BTreeMap<ReviewTopicId, f64>,
    has_submitted_peer_reviews: bool,
}

impl Role {
    pub fn new(project_id: ProjectId, title: Title, description: Description) -> Self {
        Self {
            id: RoleId::new(),
            project_id,
            assignee_id: None,
            title,
            description,
            contributions: BTreeMap::new(),
            has_submitted_peer_reviews: false,
        }
    }

    /// Rebuilds a role from persisted data.
    pub fn reconstitute(
        id: RoleId,
        project_id: ProjectId,
        assignee_id: Option<UserId>,
        title: Title,
        description: Description,
        contributions: BTreeMap<ReviewTopicId, f64>,
        has_submitted_peer_reviews: bool,
    ) -> Self {
        Self {
            id,
            project_id,
            assignee_id,
            title,
            description,
            contributions,
            has_submitted_peer_reviews,
        }
    }

    pub fn id(&self) -> RoleId {
        self.id
    }

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn assignee_id(&self) -> Option<&UserId> {
        self.assignee_id.as_ref()
    }

    pub fn is_assigned(&self) -> bool {
        self.assignee_id.is_some()
    }

    pub fn is_assigned_to(&self, user_id: &UserId) -> bool {
        self.assignee_id.as_ref() == Some(user_id)
    }

    pub fn title(&self) -> &Title {
        &self.title
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    /// Contribution share for a review topic, if computed.
    pub fn contribution(&self, review_topic_id: ReviewTopicId) -> Option<f64> {
        self.contributions.get(&review_topic_id).copied()
    }

    pub fn contributions(&self) -> &BTreeMap<ReviewTopicId, f64> {
        &self.contributions
    }

    pub fn has_submitted_peer_reviews(&self) -> bool {
        self.has_submitted_peer_reviews
    }

    pub(super) fn update(&mut self, title: Title, description: Description) {
        self.title = title;
        self.description = description;
    }

    /// Sets the assignee, returning the previous one.
    pub(super) fn assign(&mut self, user_id: UserId) -> Option<UserId> {
        self.assignee_id.replace(user_id)
    }

    pub(super) fn unassign(&mut self) -> Option<UserId> {
        self.assignee_id.take()
    }

    pub(super) fn set_contribution(&mut self, review_topic_id: ReviewTopicId, share: f64) {
        self.contributions.insert(review_topic_id, share);
    }

    pub(super) fn mark_peer_reviews_submitted(&mut self) {
        self.has_submitted_peer_reviews = true;
    }
}

impl Entity for Role {
    type Id = RoleId;
    const NAME: &'static str = "Role";

    fn id(&self) -> RoleId {
        self.id
    }

    fn not_found(id: RoleId) -> ProjectError {
        ProjectError::RoleNotFound(id)
    }
}

/// The roles of one project.
pub type RoleCollection = EntityCollection<Role>;

impl EntityCollection<Role> {
    /// Returns the role held by `user_id`, if any.
    pub fn find_by_assignee(&self, user_id: &UserId) -> Option<&Role> {
        self.iter().find(|role| role.is_assigned_to(user_id))
    }

    /// Fails if `user_id` already holds a role in this project.
    pub fn assert_single_assignment_per_user(&self, user_id: &UserId) -> Result<(), ProjectError> {
        match self.find_by_assignee(user_id) {
            Some(role) => Err(ProjectError::UserAlreadyAssigned {
                user_id: user_id.clone(),
                role_id: role.id(),
            }),
            None => Ok(()),
        }
    }

    pub fn assert_all_are_assigned(&self) -> Result<(), ProjectError> {
        let unassigned: Vec<RoleId> = self
            .iter()
            .filter(|role| !role.is_assigned())
            .map(Role::id)
            .collect();
        if unassigned.is_empty() {
            Ok(())
        } else {
            Err(ProjectError::UnassignedRoles { roles: unassigned })
        }
    }

    pub fn assert_sufficient_amount(&self) -> Result<(), ProjectError> {
        if self.len() < MIN_ROLES {
            return Err(ProjectError::InsufficientRoles {
                required: MIN_ROLES,
                actual: self.len(),
            });
        }
        Ok(())
    }

    pub fn all_have_submitted_peer_reviews(&self) -> bool {
        self.iter().all(Role::has_submitted_peer_reviews)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(title: &str) -> Role {
        Role::new(
            ProjectId::new(),
            Title::new(title).unwrap(),
            Description::default(),
        )
    }

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn collection_of(count: usize) -> RoleCollection {
        let roles = (0..count).map(|i| role(&format!("Role {}", i))).collect();
        RoleCollection::from_persisted(roles).unwrap()
    }

    // ───────────────────────────────────────────────────────────────
    // Role
    // ───────────────────────────────────────────────────────────────

    #[test]
    fn new_role_is_unassigned_without_contribution() {
        let role = role("Designer");
        assert!(!role.is_assigned());
        assert!(!role.has_submitted_peer_reviews());
        assert!(role.contributions().is_empty());
    }

    #[test]
    fn assign_returns_previous_assignee() {
        let mut role = role("Designer");
        assert_eq!(role.assign(user("alice")), None);
        assert_eq!(role.assign(user("bob")), Some(user("alice")));
        assert!(role.is_assigned_to(&user("bob")));
    }

    #[test]
    fn contribution_is_per_topic() {
        let mut role = role("Designer");
        let topic = ReviewTopicId::new();
        role.set_contribution(topic, 0.4);

        assert_eq!(role.contribution(topic), Some(0.4));
        assert_eq!(role.contribution(ReviewTopicId::new()), None);
    }

    // ───────────────────────────────────────────────────────────────
    // Collection invariants
    // ───────────────────────────────────────────────────────────────

    #[test]
    fn sufficient_amount_requires_four_roles() {
        assert!(matches!(
            collection_of(3).assert_sufficient_amount(),
            Err(ProjectError::InsufficientRoles { required: 4, actual: 3 })
        ));
        assert!(collection_of(4).assert_sufficient_amount().is_ok());
    }

    #[test]
    fn all_assigned_lists_unassigned_roles() {
        let mut roles = collection_of(2);
        let first = roles.ids().next().unwrap();
        roles.find_mut(first).unwrap().assign(user("alice"));

        match roles.assert_all_are_assigned() {
            Err(ProjectError::UnassignedRoles { roles: ids }) => {
                assert_eq!(ids.len(), 1);
                assert_ne!(ids[0], first);
            }
            other => panic!("Expected UnassignedRoles, got {:?}", other),
        }
    }

    #[test]
    fn single_assignment_rejects_second_role_for_user() {
        let mut roles = collection_of(2);
        let first = roles.ids().next().unwrap();
        roles.find_mut(first).unwrap().assign(user("alice"));

        assert!(matches!(
            roles.assert_single_assignment_per_user(&user("alice")),
            Err(ProjectError::UserAlreadyAssigned { role_id, .. }) if role_id == first
        ));
        assert!(roles.assert_single_assignment_per_user(&user("bob")).is_ok());
    }

    #[test]
    fn all_have_submitted_tracks_every_role() {
        let mut roles = collection_of(2);
        let ids: Vec<_> = roles.ids().collect();
        roles.find_mut(ids[0]).unwrap().mark_peer_reviews_submitted();
        assert!(!roles.all_have_submitted_peer_reviews());

        roles.find_mut(ids[1]).unwrap().mark_peer_reviews_submitted();
        assert!(roles.all_have_submitted_peer_reviews());
    }
}
