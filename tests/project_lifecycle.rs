//! Integration tests for the project command pipeline.
//!
//! These tests drive projects through every phase using the public
//! handlers and in-memory adapters:
//! 1. Handlers mutate and persist the project, writing events to the outbox
//! 2. OutboxPublisher relays committed events to the event bus
//! 3. Subscribed handlers observe them in commit order

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use collab_projects::adapters::{
    InMemoryEventBus, InMemoryOutbox, InMemoryProjectRepository, OutboxPublisher,
    ProjectEventLogger,
};
use collab_projects::application::{
    CreateProjectCommand, CreateProjectHandler, FinishFormationCommand, FinishFormationHandler,
    FormationChange, FormationCommand, FormationHandler, FormationOutcome, LifecycleAction,
    LifecycleCommand, LifecycleHandler, ProjectCommandError, ProjectCommandExecutor,
    SubmitPeerReviewsCommand, SubmitPeerReviewsHandler,
};
use collab_projects::domain::analysis::{ConsensualityAlgorithm, ReviewEngine};
use collab_projects::domain::foundation::{
    CommandMetadata, DomainError, ErrorCode, EventEnvelope, ProjectId, ReviewTopicId, RoleId,
    UserId,
};
use collab_projects::domain::project::{
    DiscreteChoice, PeerReviewOutcome, PeerReviewScore, ProjectPolicies, ProjectStatus,
    ReviewTopicInput, SkipManagerReview, SubmittedScore, PROJECT_EVENT_TYPES,
};
use collab_projects::ports::{EventHandler, EventSubscriber, OutboxStatus, ProjectRepository};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Records the event types it receives, in order.
#[derive(Default)]
struct RecordingHandler {
    seen: Mutex<Vec<EventEnvelope>>,
}

impl RecordingHandler {
    fn event_types(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type.clone())
            .collect()
    }
}

#[async_trait]
impl EventHandler for RecordingHandler {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        self.seen.lock().unwrap().push(event);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "RecordingHandler"
    }
}

struct App {
    repository: Arc<InMemoryProjectRepository>,
    outbox: Arc<InMemoryOutbox>,
    recorder: Arc<RecordingHandler>,
    relay: OutboxPublisher,
    create: CreateProjectHandler,
    formation: FormationHandler,
    finish_formation: FinishFormationHandler,
    submit: SubmitPeerReviewsHandler,
    lifecycle: LifecycleHandler,
}

impl App {
    fn new(engine: ReviewEngine) -> Self {
        let repository = Arc::new(InMemoryProjectRepository::new());
        let outbox = Arc::new(InMemoryOutbox::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let recorder = Arc::new(RecordingHandler::default());
        bus.subscribe_all(PROJECT_EVENT_TYPES, recorder.clone());
        bus.subscribe_all(PROJECT_EVENT_TYPES, Arc::new(ProjectEventLogger));

        let executor = ProjectCommandExecutor::new(repository.clone(), outbox.clone());
        Self {
            relay: OutboxPublisher::new(outbox.clone(), bus),
            create: CreateProjectHandler::new(executor.clone()),
            formation: FormationHandler::new(executor.clone()),
            finish_formation: FinishFormationHandler::new(executor.clone()),
            submit: SubmitPeerReviewsHandler::new(executor.clone(), engine.clone()),
            lifecycle: LifecycleHandler::new(executor, engine),
            repository,
            outbox,
            recorder,
        }
    }

    async fn create_project(&self, policies: ProjectPolicies) -> ProjectId {
        self.create
            .handle(
                CreateProjectCommand {
                    title: "Website relaunch".to_string(),
                    description: "Rebuild the marketing site".to_string(),
                    policies,
                },
                manager(),
            )
            .await
            .unwrap()
            .id()
    }

    async fn form(&self, project_id: ProjectId, change: FormationChange) -> FormationOutcome {
        self.formation
            .handle(FormationCommand { project_id, change }, manager())
            .await
            .unwrap()
            .outcome
    }

    async fn add_member(&self, project_id: ProjectId, title: &str, user: &str) -> RoleId {
        let FormationOutcome::RoleAdded(role_id) = self
            .form(
                project_id,
                FormationChange::AddRole {
                    title: title.to_string(),
                    description: String::new(),
                },
            )
            .await
        else {
            panic!("role was not added");
        };
        self.form(
            project_id,
            FormationChange::AssignUser {
                role_id,
                user_id: UserId::new(user).unwrap(),
            },
        )
        .await;
        role_id
    }

    async fn submit(
        &self,
        project_id: ProjectId,
        sender_role_id: RoleId,
        review_topic_id: ReviewTopicId,
        scores: Vec<SubmittedScore>,
    ) -> Result<PeerReviewOutcome, ProjectCommandError> {
        self.submit
            .handle(
                SubmitPeerReviewsCommand {
                    project_id,
                    sender_role_id,
                    review_topic_id,
                    scores,
                },
                member(),
            )
            .await
            .map(|result| result.outcome)
    }

    async fn lifecycle(&self, project_id: ProjectId, action: LifecycleAction) {
        self.lifecycle
            .handle(LifecycleCommand { project_id, action }, manager())
            .await
            .unwrap();
    }
}

fn manager() -> CommandMetadata {
    CommandMetadata::new(UserId::new("manager").unwrap()).with_correlation_id("corr-manager")
}

fn member() -> CommandMetadata {
    CommandMetadata::new(UserId::new("member").unwrap())
}

fn score(value: f64) -> PeerReviewScore {
    PeerReviewScore::new(value).unwrap()
}

/// Sender `i` gives everything to role `i + 1` and nothing to the rest.
fn cyclic_slate(roles: &[RoleId], sender: usize) -> Vec<SubmittedScore> {
    let favourite = (sender + 1) % roles.len();
    roles
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != sender)
        .map(|(i, id)| SubmittedScore::new(*id, score(if i == favourite { 100.0 } else { 0.0 })))
        .collect()
}

fn uniform_slate(roles: &[RoleId], sender: usize, value: f64) -> Vec<SubmittedScore> {
    roles
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != sender)
        .map(|(_, id)| SubmittedScore::new(*id, score(value)))
        .collect()
}

async fn four_members(app: &App, project_id: ProjectId) -> Vec<RoleId> {
    let mut roles = Vec::new();
    for (title, user) in [
        ("Lead", "ana"),
        ("Designer", "ben"),
        ("Engineer", "cleo"),
        ("Writer", "dev"),
    ] {
        roles.push(app.add_member(project_id, title, user).await);
    }
    roles
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn disagreeing_reviews_go_through_manager_review() {
    let app = App::new(ReviewEngine::default());
    let project_id = app.create_project(ProjectPolicies::default()).await;
    let roles = four_members(&app, project_id).await;

    let formed = app
        .finish_formation
        .handle(FinishFormationCommand { project_id }, manager())
        .await
        .unwrap();
    let topic_id = formed.project.review_topics().ids().next().unwrap();

    for sender in 0..roles.len() {
        let outcome = app
            .submit(project_id, roles[sender], topic_id, cyclic_slate(&roles, sender))
            .await
            .unwrap();
        let expected = if sender + 1 == roles.len() {
            PeerReviewOutcome::ManagerReviewStarted
        } else {
            PeerReviewOutcome::AwaitingSubmissions
        };
        assert_eq!(outcome, expected);
    }

    let project = app.repository.find_by_id(&project_id).await.unwrap().unwrap();
    assert_eq!(project.status(), ProjectStatus::ManagerReview);
    let consensuality = project
        .review_topics()
        .find(topic_id)
        .unwrap()
        .consensuality()
        .unwrap();
    assert!(consensuality < 0.01, "cyclic reviews scored {}", consensuality);
    for role in project.roles().iter() {
        assert!((role.contribution(topic_id).unwrap() - 0.25).abs() < 1e-9);
    }

    app.lifecycle(project_id, LifecycleAction::SubmitManagerReview).await;
    app.lifecycle(project_id, LifecycleAction::Archive).await;

    let relayed = app.relay.process_batch().await.unwrap();
    assert_eq!(relayed, app.outbox.entries().await.len());
    assert_eq!(app.outbox.count_with_status(OutboxStatus::Pending).await, 0);

    let types = app.recorder.event_types();
    assert_eq!(types.first().map(String::as_str), Some("project.created.v1"));
    assert!(types.ends_with(&[
        "project.peer_reviews_submitted.v1".to_string(),
        "project.final_peer_review_submitted.v1".to_string(),
        "project.peer_review_finished.v1".to_string(),
        "project.manager_review_started.v1".to_string(),
        "project.finished.v1".to_string(),
        "project.archived.v1".to_string(),
    ]));
}

#[tokio::test]
async fn every_topic_must_be_reviewed_before_the_cycle_closes() {
    let app = App::new(ReviewEngine::default());
    let project_id = app
        .create_project(ProjectPolicies {
            skip_manager_review: SkipManagerReview::Yes,
            ..ProjectPolicies::default()
        })
        .await;
    let roles = four_members(&app, project_id).await;
    let FormationOutcome::ReviewTopicAdded(effort) = app
        .form(
            project_id,
            FormationChange::AddReviewTopic {
                title: "Effort".to_string(),
                description: String::new(),
                input: None,
            },
        )
        .await
    else {
        panic!("topic was not added");
    };
    let FormationOutcome::ReviewTopicAdded(quality) = app
        .form(
            project_id,
            FormationChange::AddReviewTopic {
                title: "Quality".to_string(),
                description: String::new(),
                input: Some(
                    ReviewTopicInput::discrete(vec![
                        DiscreteChoice {
                            label: "meh".to_string(),
                            value: 1.0,
                        },
                        DiscreteChoice {
                            label: "great".to_string(),
                            value: 2.0,
                        },
                    ])
                    .unwrap(),
                ),
            },
        )
        .await
    else {
        panic!("topic was not added");
    };
    app.finish_formation
        .handle(FinishFormationCommand { project_id }, manager())
        .await
        .unwrap();

    // Scores outside the discrete choices are refused.
    let rejected = app
        .submit(project_id, roles[0], quality, uniform_slate(&roles, 0, 1.5))
        .await;
    assert!(matches!(rejected, Err(ref e) if e.code() == ErrorCode::ScoreRejected));

    for sender in 0..roles.len() {
        let outcome = app
            .submit(project_id, roles[sender], effort, uniform_slate(&roles, sender, 3.0))
            .await
            .unwrap();
        assert_eq!(outcome, PeerReviewOutcome::AwaitingSubmissions);
    }
    let project = app.repository.find_by_id(&project_id).await.unwrap().unwrap();
    assert!(project.roles().iter().all(|r| !r.has_submitted_peer_reviews()));

    let mut last = None;
    for sender in 0..roles.len() {
        last = Some(
            app.submit(project_id, roles[sender], quality, uniform_slate(&roles, sender, 2.0))
                .await
                .unwrap(),
        );
    }
    assert_eq!(last, Some(PeerReviewOutcome::Finished));

    let project = app.repository.find_by_id(&project_id).await.unwrap().unwrap();
    assert_eq!(project.status(), ProjectStatus::Finished);
    assert_eq!(project.milestones().len(), 1);
    assert!(project.current_milestone().is_none());
    for topic in [effort, quality] {
        assert_eq!(
            project.review_topics().find(topic).unwrap().consensuality(),
            Some(1.0)
        );
    }
}

#[tokio::test]
async fn resubmitting_a_slate_is_rejected() {
    let app = App::new(ReviewEngine::with_algorithm(
        ConsensualityAlgorithm::Variance,
        0.8,
    ));
    let project_id = app.create_project(ProjectPolicies::default()).await;
    let roles = four_members(&app, project_id).await;
    let formed = app
        .finish_formation
        .handle(FinishFormationCommand { project_id }, manager())
        .await
        .unwrap();

    let topic_id = formed.project.review_topics().ids().next().unwrap();

    app.submit(project_id, roles[0], topic_id, uniform_slate(&roles, 0, 1.0))
        .await
        .unwrap();
    let again = app
        .submit(project_id, roles[0], topic_id, uniform_slate(&roles, 0, 1.0))
        .await;

    assert!(matches!(again, Err(ref e) if e.code() == ErrorCode::PeerReviewsAlreadySubmitted));
}

#[tokio::test]
async fn relayed_events_carry_command_correlation() {
    let app = App::new(ReviewEngine::default());
    let project_id = app.create_project(ProjectPolicies::default()).await;
    app.lifecycle(project_id, LifecycleAction::Cancel).await;

    app.relay.process_batch().await.unwrap();

    let seen = app.recorder.seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|e| e.aggregate_id == project_id.to_string()));
    assert!(seen
        .iter()
        .all(|e| e.metadata.correlation_id.as_deref() == Some("corr-manager")));
    assert_eq!(seen[1].payload["previous_status"], "formation");
}

#[tokio::test]
async fn stale_writer_loses_to_concurrent_commit() {
    let app = App::new(ReviewEngine::default());
    let project_id = app.create_project(ProjectPolicies::default()).await;

    let mut stale = app.repository.find_by_id(&project_id).await.unwrap().unwrap();
    app.form(
        project_id,
        FormationChange::UpdateDetails {
            title: "Renamed".to_string(),
            description: String::new(),
        },
    )
    .await;

    stale.cancel().unwrap();
    let err = app.repository.update(&stale).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::VersionConflict);
    let stored = app.repository.find_by_id(&project_id).await.unwrap().unwrap();
    assert_eq!(stored.status(), ProjectStatus::Formation);
    assert_eq!(stored.title().as_str(), "Renamed");
}
