//! Project aggregate - The root entity for a collaborative project.
//!
//! A Project owns its roles, review topics, peer reviews and milestones and
//! walks them through formation, peer review and manager review. Every
//! operation is checked against the current state first and runs on a
//! draft copy, so a rejected command leaves the aggregate untouched.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::analysis::ReviewEngine;
use crate::domain::foundation::{
    MilestoneId, PeerReviewId, ProjectId, ReviewTopicId, RoleId, StateMachine, Timestamp, UserId,
};

use super::{
    Changeset, ContributionVisibility, Description, Milestone, MilestoneCollection, Operation,
    PeerReview, PeerReviewCollection, PeerReviewFlag, PeerReviewScore, ProjectDomainEvent,
    ProjectError, ProjectEvent, ProjectPolicies, ProjectState, ProjectStatus, ReviewTopic,
    ReviewTopicCollection, ReviewTopicInput, Role, RoleCollection, Title,
};

/// One entry of a submitted slate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubmittedScore {
    pub receiver_role_id: RoleId,
    pub score: PeerReviewScore,
}

impl SubmittedScore {
    pub fn new(receiver_role_id: RoleId, score: PeerReviewScore) -> Self {
        Self {
            receiver_role_id,
            score,
        }
    }
}

/// What a peer-review command led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerReviewOutcome {
    /// Other slates are still outstanding.
    AwaitingSubmissions,
    ManagerReviewStarted,
    /// Manager review was skipped and the project finished.
    Finished,
}

/// Per-collection changes since the last persist.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectChanges {
    pub roles: Changeset<RoleId>,
    pub review_topics: Changeset<ReviewTopicId>,
    pub peer_reviews: Changeset<PeerReviewId>,
    pub milestones: Changeset<MilestoneId>,
}

impl ProjectChanges {
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
            && self.review_topics.is_empty()
            && self.peer_reviews.is_empty()
            && self.milestones.is_empty()
    }
}

/// The Project aggregate root.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    id: ProjectId,
    creator_id: UserId,
    title: Title,
    description: Description,
    state: ProjectState,
    policies: ProjectPolicies,
    roles: RoleCollection,
    review_topics: ReviewTopicCollection,
    peer_reviews: PeerReviewCollection,
    milestones: MilestoneCollection,
    /// Optimistic concurrency token, bumped on every persist.
    version: u64,
    created_at: Timestamp,
    updated_at: Timestamp,
    domain_events: Vec<ProjectDomainEvent>,
}

impl Project {
    /// Creates a new project in formation.
    pub fn create(
        creator_id: UserId,
        title: &str,
        description: &str,
        policies: ProjectPolicies,
    ) -> Result<Self, ProjectError> {
        let now = Timestamp::now();
        let mut project = Self {
            id: ProjectId::new(),
            creator_id: creator_id.clone(),
            title: Title::new(title)?,
            description: Description::new(description)?,
            state: ProjectState::Formation,
            policies,
            roles: RoleCollection::new(),
            review_topics: ReviewTopicCollection::new(),
            peer_reviews: PeerReviewCollection::new(),
            milestones: MilestoneCollection::new(),
            version: 0,
            created_at: now,
            updated_at: now,
            domain_events: Vec::new(),
        };

        project.record_event(ProjectEvent::Created {
            creator_id,
            title: project.title.to_string(),
        });

        Ok(project)
    }

    /// Reconstitutes a project from persisted data.
    ///
    /// Bypasses event recording; the given collections become the change baseline.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: ProjectId,
        creator_id: UserId,
        title: Title,
        description: Description,
        state: ProjectState,
        policies: ProjectPolicies,
        roles: Vec<Role>,
        review_topics: Vec<ReviewTopic>,
        peer_reviews: Vec<PeerReview>,
        milestones: Vec<Milestone>,
        version: u64,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Result<Self, ProjectError> {
        let milestones = MilestoneCollection::from_persisted(milestones)?;
        if let Some(milestone_id) = state.milestone_id() {
            milestones.find(milestone_id)?;
        }

        Ok(Self {
            id,
            creator_id,
            title,
            description,
            state,
            policies,
            roles: RoleCollection::from_persisted(roles)?,
            review_topics: ReviewTopicCollection::from_persisted(review_topics)?,
            peer_reviews: PeerReviewCollection::from_persisted(peer_reviews)?,
            milestones,
            version,
            created_at,
            updated_at,
            domain_events: Vec::new(),
        })
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> ProjectId {
        self.id
    }

    pub fn creator_id(&self) -> &UserId {
        &self.creator_id
    }

    pub fn title(&self) -> &Title {
        &self.title
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    pub fn state(&self) -> ProjectState {
        self.state
    }

    pub fn status(&self) -> ProjectStatus {
        self.state.status()
    }

    pub fn policies(&self) -> ProjectPolicies {
        self.policies
    }

    pub fn roles(&self) -> &RoleCollection {
        &self.roles
    }

    pub fn review_topics(&self) -> &ReviewTopicCollection {
        &self.review_topics
    }

    pub fn peer_reviews(&self) -> &PeerReviewCollection {
        &self.peer_reviews
    }

    pub fn milestones(&self) -> &MilestoneCollection {
        &self.milestones
    }

    /// The open review cycle, if any.
    pub fn current_milestone(&self) -> Option<&Milestone> {
        self.milestones.current()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Events recorded but not yet drained.
    pub fn pending_events(&self) -> &[ProjectDomainEvent] {
        &self.domain_events
    }

    /// Takes and clears all recorded domain events.
    pub fn take_events(&mut self) -> Vec<ProjectDomainEvent> {
        std::mem::take(&mut self.domain_events)
    }

    /// Roles whose contribution shares `viewer` may see.
    pub fn contributions_visible_to(&self, viewer: &UserId) -> Vec<&Role> {
        if viewer == &self.creator_id {
            return self.roles.iter().collect();
        }
        match self.policies.contribution_visibility {
            ContributionVisibility::Public => self.roles.iter().collect(),
            ContributionVisibility::Project => {
                if self.roles.find_by_assignee(viewer).is_some() {
                    self.roles.iter().collect()
                } else {
                    Vec::new()
                }
            }
            ContributionVisibility::Private => {
                self.roles.find_by_assignee(viewer).into_iter().collect()
            }
            ContributionVisibility::None => Vec::new(),
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Persistence support
    // ───────────────────────────────────────────────────────────────

    pub fn changes(&self) -> ProjectChanges {
        ProjectChanges {
            roles: self.roles.changes(),
            review_topics: self.review_topics.changes(),
            peer_reviews: self.peer_reviews.changes(),
            milestones: self.milestones.changes(),
        }
    }

    /// Resets the change baseline and bumps the version after a commit.
    pub fn mark_persisted(&mut self) {
        self.roles.mark_persisted();
        self.review_topics.mark_persisted();
        self.peer_reviews.mark_persisted();
        self.milestones.mark_persisted();
        self.version += 1;
    }

    // ───────────────────────────────────────────────────────────────
    // Formation
    // ───────────────────────────────────────────────────────────────

    pub fn update_details(&mut self, title: &str, description: &str) -> Result<(), ProjectError> {
        self.transact(Operation::UpdateDetails, |project| {
            project.title = Title::new(title)?;
            project.description = Description::new(description)?;
            project.record_event(ProjectEvent::DetailsUpdated {
                title: project.title.to_string(),
            });
            Ok(())
        })
    }

    pub fn add_role(&mut self, title: &str, description: &str) -> Result<Role, ProjectError> {
        self.transact(Operation::AddRole, |project| {
            let role = Role::new(project.id, Title::new(title)?, Description::new(description)?);
            project.roles.add(role.clone())?;
            project.record_event(ProjectEvent::RoleCreated {
                role_id: role.id(),
                title: role.title().to_string(),
            });
            Ok(role)
        })
    }

    pub fn update_role(
        &mut self,
        role_id: RoleId,
        title: &str,
        description: &str,
    ) -> Result<(), ProjectError> {
        self.transact(Operation::UpdateRole, |project| {
            let title = Title::new(title)?;
            let description = Description::new(description)?;
            project.roles.find_mut(role_id)?.update(title.clone(), description);
            project.record_event(ProjectEvent::RoleUpdated {
                role_id,
                title: title.to_string(),
            });
            Ok(())
        })
    }

    pub fn remove_role(&mut self, role_id: RoleId) -> Result<Role, ProjectError> {
        self.transact(Operation::RemoveRole, |project| {
            let role = project.roles.remove(role_id)?;
            project.record_event(ProjectEvent::RoleDeleted { role_id });
            Ok(role)
        })
    }

    /// Assigns `user_id` to a role, replacing any previous assignee.
    pub fn assign_user_to_role(
        &mut self,
        user_id: UserId,
        role_id: RoleId,
    ) -> Result<(), ProjectError> {
        self.transact(Operation::AssignUser, |project| {
            project.roles.find(role_id)?;
            project.roles.assert_single_assignment_per_user(&user_id)?;

            let previous = project.roles.find_mut(role_id)?.assign(user_id.clone());
            if let Some(previous) = previous {
                project.record_event(ProjectEvent::UserUnassigned {
                    role_id,
                    user_id: previous,
                });
            }
            project.record_event(ProjectEvent::UserAssigned { role_id, user_id });
            Ok(())
        })
    }

    /// Clears the assignee of a role. Unassigned roles are left as they are.
    pub fn unassign_role(&mut self, role_id: RoleId) -> Result<(), ProjectError> {
        self.transact(Operation::UnassignRole, |project| {
            if let Some(user_id) = project.roles.find_mut(role_id)?.unassign() {
                project.record_event(ProjectEvent::UserUnassigned { role_id, user_id });
            }
            Ok(())
        })
    }

    pub fn add_review_topic(
        &mut self,
        title: &str,
        description: &str,
        input: Option<ReviewTopicInput>,
    ) -> Result<ReviewTopic, ProjectError> {
        self.transact(Operation::AddReviewTopic, |project| {
            if let Some(input) = &input {
                input.validate()?;
            }
            let topic = ReviewTopic::new(Title::new(title)?, Description::new(description)?, input);
            project.insert_review_topic(topic.clone())?;
            Ok(topic)
        })
    }

    pub fn update_review_topic(
        &mut self,
        review_topic_id: ReviewTopicId,
        title: &str,
        description: &str,
        input: Option<ReviewTopicInput>,
    ) -> Result<(), ProjectError> {
        self.transact(Operation::UpdateReviewTopic, |project| {
            if let Some(input) = &input {
                input.validate()?;
            }
            let title = Title::new(title)?;
            let description = Description::new(description)?;
            project
                .review_topics
                .find_mut(review_topic_id)?
                .update(title.clone(), description, input);
            project.record_event(ProjectEvent::ReviewTopicUpdated {
                review_topic_id,
                title: title.to_string(),
            });
            Ok(())
        })
    }

    pub fn remove_review_topic(
        &mut self,
        review_topic_id: ReviewTopicId,
    ) -> Result<ReviewTopic, ProjectError> {
        self.transact(Operation::RemoveReviewTopic, |project| {
            let topic = project.review_topics.remove(review_topic_id)?;
            project.record_event(ProjectEvent::ReviewTopicDeleted { review_topic_id });
            Ok(topic)
        })
    }

    /// Closes formation and opens the first review cycle.
    ///
    /// Adds the default "Contribution" topic when none was defined.
    pub fn finish_formation(&mut self) -> Result<MilestoneId, ProjectError> {
        self.transact(Operation::FinishFormation, |project| {
            project.roles.assert_sufficient_amount()?;
            project.roles.assert_all_are_assigned()?;

            if project.review_topics.is_empty() {
                project.insert_review_topic(ReviewTopic::default_contribution()?)?;
            }

            let milestone = Milestone::open(project.milestones.len() + 1);
            let milestone_id = milestone.id();
            project.milestones.add(milestone)?;
            project.transition(ProjectState::PeerReview { milestone_id })?;

            project.record_event(ProjectEvent::FormationFinished);
            project.record_event(ProjectEvent::PeerReviewStarted { milestone_id });
            Ok(milestone_id)
        })
    }

    // ───────────────────────────────────────────────────────────────
    // Peer review
    // ───────────────────────────────────────────────────────────────

    /// Records one sender's slate for one review topic.
    ///
    /// The slate must name every other role exactly once. When it is the
    /// last outstanding slate the review cycle finishes in the same call.
    pub fn submit_peer_reviews(
        &mut self,
        sender_role_id: RoleId,
        review_topic_id: ReviewTopicId,
        scores: &[SubmittedScore],
        engine: &ReviewEngine,
    ) -> Result<PeerReviewOutcome, ProjectError> {
        self.transact(Operation::SubmitPeerReviews, |project| {
            let milestone_id = project.active_milestone_id()?;
            project.roles.find(sender_role_id)?;
            let topic = project.review_topics.find(review_topic_id)?;

            if project
                .peer_reviews
                .has_submitted(sender_role_id, review_topic_id, milestone_id)
            {
                return Err(ProjectError::PeerReviewsAlreadySubmitted {
                    role_id: sender_role_id,
                    review_topic_id,
                });
            }
            project.assert_complete_slate(sender_role_id, scores)?;
            for entry in scores {
                topic.assert_accepts(entry.score)?;
            }

            let reviews = scores
                .iter()
                .map(|entry| {
                    PeerReview::new(
                        sender_role_id,
                        entry.receiver_role_id,
                        review_topic_id,
                        milestone_id,
                        entry.score,
                        None,
                    )
                })
                .collect::<Result<Vec<_>, _>>()?;
            project.peer_reviews.add_all(reviews)?;

            if project.has_submitted_every_topic(sender_role_id, milestone_id) {
                project
                    .roles
                    .find_mut(sender_role_id)?
                    .mark_peer_reviews_submitted();
            }
            project.record_event(ProjectEvent::PeerReviewsSubmitted {
                milestone_id,
                sender_role_id,
                review_topic_id,
            });

            if !project.roles.all_have_submitted_peer_reviews() {
                return Ok(PeerReviewOutcome::AwaitingSubmissions);
            }
            project.record_event(ProjectEvent::FinalPeerReviewSubmitted { milestone_id });
            project.finish_peer_review(engine)
        })
    }

    /// Ends the review cycle now, filling every outstanding slate with a
    /// uniform one flagged as absent.
    pub fn complete_peer_reviews(
        &mut self,
        engine: &ReviewEngine,
    ) -> Result<PeerReviewOutcome, ProjectError> {
        self.transact(Operation::CompletePeerReviews, |project| {
            let milestone_id = project.active_milestone_id()?;

            let mut substitutes = Vec::new();
            for sender in project.roles.iter() {
                for topic in project.review_topics.iter() {
                    if project
                        .peer_reviews
                        .has_submitted(sender.id(), topic.id(), milestone_id)
                    {
                        continue;
                    }
                    for receiver in project.roles.excluding(sender.id()) {
                        substitutes.push(PeerReview::new(
                            sender.id(),
                            receiver.id(),
                            topic.id(),
                            milestone_id,
                            topic.uniform_score(),
                            Some(PeerReviewFlag::Absent),
                        )?);
                    }
                }
            }
            project.peer_reviews.add_all(substitutes)?;

            let role_ids: Vec<RoleId> = project.roles.ids().collect();
            for role_id in role_ids {
                project.roles.find_mut(role_id)?.mark_peer_reviews_submitted();
            }

            project.finish_peer_review(engine)
        })
    }

    // ───────────────────────────────────────────────────────────────
    // Manager review and closing
    // ───────────────────────────────────────────────────────────────

    pub fn submit_manager_review(&mut self) -> Result<(), ProjectError> {
        self.transact(Operation::SubmitManagerReview, |project| project.finish())
    }

    pub fn cancel(&mut self) -> Result<(), ProjectError> {
        self.transact(Operation::Cancel, |project| {
            let previous_status = project.status();
            if let Some(milestone_id) = project.state.milestone_id() {
                project.milestones.find_mut(milestone_id)?.close();
            }
            project.transition(ProjectState::Cancelled)?;
            project.record_event(ProjectEvent::Cancelled { previous_status });
            Ok(())
        })
    }

    pub fn archive(&mut self) -> Result<(), ProjectError> {
        self.transact(Operation::Archive, |project| {
            project.transition(ProjectState::Archived)?;
            project.record_event(ProjectEvent::Archived);
            Ok(())
        })
    }

    // ───────────────────────────────────────────────────────────────
    // Analysis results
    // ───────────────────────────────────────────────────────────────

    /// Writes contribution shares for one topic onto the roles.
    pub(crate) fn apply_contributions(
        &mut self,
        review_topic_id: ReviewTopicId,
        shares: &BTreeMap<RoleId, f64>,
    ) -> Result<(), ProjectError> {
        self.review_topics.find(review_topic_id)?;
        for role_id in shares.keys() {
            self.roles.find(*role_id)?;
        }
        for (role_id, share) in shares {
            self.roles
                .find_mut(*role_id)?
                .set_contribution(review_topic_id, *share);
        }
        Ok(())
    }

    pub(crate) fn apply_consensuality(
        &mut self,
        review_topic_id: ReviewTopicId,
        consensuality: f64,
    ) -> Result<(), ProjectError> {
        self.review_topics
            .find_mut(review_topic_id)?
            .set_consensuality(consensuality);
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────
    // Internals
    // ───────────────────────────────────────────────────────────────

    /// Runs `apply` on a draft copy and commits it only on success.
    fn transact<T>(
        &mut self,
        operation: Operation,
        apply: impl FnOnce(&mut Project) -> Result<T, ProjectError>,
    ) -> Result<T, ProjectError> {
        let status = self.status();
        if !status.supports(operation) {
            return Err(ProjectError::operation_not_supported(operation, status));
        }

        let mut draft = self.clone();
        let output = apply(&mut draft)?;
        draft.updated_at = Timestamp::now();
        *self = draft;
        Ok(output)
    }

    fn transition(&mut self, next: ProjectState) -> Result<(), ProjectError> {
        self.status()
            .transition_to(next.status())
            .map_err(|err| ProjectError::unexpected(err.to_string()))?;
        self.state = next;
        Ok(())
    }

    fn active_milestone_id(&self) -> Result<MilestoneId, ProjectError> {
        self.state.milestone_id().ok_or_else(|| {
            ProjectError::unexpected(format!("no review cycle in state {}", self.status()))
        })
    }

    fn insert_review_topic(&mut self, topic: ReviewTopic) -> Result<(), ProjectError> {
        let event = ProjectEvent::ReviewTopicCreated {
            review_topic_id: topic.id(),
            title: topic.title().to_string(),
        };
        self.review_topics.add(topic)?;
        self.record_event(event);
        Ok(())
    }

    /// Every other role must appear exactly once and nobody else may.
    fn assert_complete_slate(
        &self,
        sender_role_id: RoleId,
        scores: &[SubmittedScore],
    ) -> Result<(), ProjectError> {
        let mut counts: BTreeMap<RoleId, usize> = BTreeMap::new();
        for entry in scores {
            if entry.receiver_role_id == sender_role_id {
                return Err(ProjectError::SelfPeerReview {
                    role_id: sender_role_id,
                });
            }
            *counts.entry(entry.receiver_role_id).or_insert(0) += 1;
        }

        let expected: BTreeSet<RoleId> =
            self.roles.excluding(sender_role_id).map(Role::id).collect();
        let missing: Vec<RoleId> = expected
            .iter()
            .filter(|id| !counts.contains_key(id))
            .copied()
            .collect();
        let unexpected: Vec<RoleId> = counts
            .keys()
            .filter(|id| !expected.contains(id))
            .copied()
            .collect();
        let duplicated: Vec<RoleId> = counts
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(id, _)| *id)
            .collect();

        if missing.is_empty() && unexpected.is_empty() && duplicated.is_empty() {
            Ok(())
        } else {
            Err(ProjectError::PeerReviewSubmissionMismatch {
                missing,
                unexpected,
                duplicated,
            })
        }
    }

    fn has_submitted_every_topic(&self, role_id: RoleId, milestone_id: MilestoneId) -> bool {
        self.review_topics
            .ids()
            .all(|topic_id| self.peer_reviews.has_submitted(role_id, topic_id, milestone_id))
    }

    /// Computes contributions and consensuality for every topic, closes the
    /// cycle and applies the skip-manager-review policy.
    fn finish_peer_review(
        &mut self,
        engine: &ReviewEngine,
    ) -> Result<PeerReviewOutcome, ProjectError> {
        let milestone_id = self.active_milestone_id()?;
        // Only reachable for reconstituted data; formation always leaves a topic.
        if self.review_topics.is_empty() {
            return Err(ProjectError::NoReviewTopics);
        }

        let topic_ids: Vec<ReviewTopicId> = self.review_topics.ids().collect();
        for review_topic_id in topic_ids {
            let reviews = self.peer_reviews.for_topic(review_topic_id, milestone_id);
            let contributions = engine.contributions().compute(&reviews)?;
            let consensuality = engine.consensuality().compute(&reviews)?;
            contributions.apply_to(self)?;
            consensuality.apply_to(self)?;
        }

        self.milestones.find_mut(milestone_id)?.close();
        self.record_event(ProjectEvent::PeerReviewFinished { milestone_id });

        let skip = self.policies.skip_manager_review.should_skip(
            self.review_topics.iter().filter_map(ReviewTopic::consensuality),
            engine.consensual_threshold(),
        );
        if skip {
            self.record_event(ProjectEvent::ManagerReviewSkipped { milestone_id });
            self.finish()?;
            Ok(PeerReviewOutcome::Finished)
        } else {
            self.transition(ProjectState::ManagerReview { milestone_id })?;
            self.record_event(ProjectEvent::ManagerReviewStarted { milestone_id });
            Ok(PeerReviewOutcome::ManagerReviewStarted)
        }
    }

    fn finish(&mut self) -> Result<(), ProjectError> {
        let assignee_ids = self
            .roles
            .iter()
            .map(|role| {
                role.assignee_id().cloned().ok_or_else(|| {
                    ProjectError::unexpected(format!(
                        "role {} has no assignee while finishing",
                        role.id()
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.transition(ProjectState::Finished)?;
        self.record_event(ProjectEvent::Finished { assignee_ids });
        Ok(())
    }

    fn record_event(&mut self, event: ProjectEvent) {
        self.domain_events
            .push(ProjectDomainEvent::new(self.id, event));
    }
}
