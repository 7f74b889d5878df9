//! Integration tests for a complete Socratic dialogue.
//!
//! These tests drive the full flow through the public API:
//! 1. A signed-in learner creates a session from a free-form request
//! 2. The dialogue controller asks the opening question
//! 3. Five answers are submitted, each followed by feedback and a question
//! 4. The fifth answer triggers the evaluation and its rewards
//! 5. Deleting the session removes its transcript
//!
//! Uses in-memory adapters and the mock AI provider, so no network or
//! database is required. The second test routes the tutor through the HTTP
//! endpoint on a local port.

use std::sync::Arc;
use std::time::Duration;

use socratix::adapters::ai::MockAIProvider;
use socratix::adapters::auth::StaticIdentityProvider;
use socratix::adapters::http::{tutor_router, TutorAppState};
use socratix::adapters::rewards::KeyValueRewardLedger;
use socratix::adapters::storage::{
    InMemoryKeyValueStore, InMemoryMessageStore, InMemorySessionRepository,
};
use socratix::adapters::tutor::{HttpTutorClient, LlmTutorClient};
use socratix::application::{
    CreateSessionCommand, CreateSessionHandler, DeleteSessionCommand, DeleteSessionHandler,
    DialogueController, EvaluationGate, GetSessionTurnsHandler, GetSessionTurnsQuery,
    SubmitOutcome,
};
use socratix::config::TutorConfig;
use socratix::domain::conversation::{DialogueState, Sender, TurnKind};
use socratix::domain::foundation::{AuthenticatedUser, ConfidenceScore, UserId};
use socratix::domain::rewards::{AchievementId, BadgeId, RewardEvent};
use socratix::ports::{IdentityProvider, MessageStore, RewardLedger, SessionRepository, TutorClient};

// =============================================================================
// Test Infrastructure
// =============================================================================

const EVALUATION: &str = r#"{"completed": true, "confidenceScore": 85, "summary": "Understands how light becomes chemical energy", "feedback": "Look into the Calvin cycle"}"#;

const ANSWERS: [&str; 5] = [
    "Plants need sunlight, water and air",
    "The leaves capture the light",
    "Chlorophyll makes them green and absorbs light",
    "They turn carbon dioxide and water into sugar",
    "Oxygen is released as a by-product",
];

fn scripted_provider() -> MockAIProvider {
    MockAIProvider::new()
        .with_response("Photosynthesis")
        .with_response("What do plants need to make their own food?")
        .with_responses((1..=4).map(|n| {
            format!(
                "FEEDBACK: Good observation number {n}.\n\nQUESTION: Follow-up question {n}?"
            )
        }))
        .with_response(EVALUATION)
}

/// Everything a learner-facing app wires together.
struct App {
    identity: Arc<StaticIdentityProvider>,
    sessions: Arc<InMemorySessionRepository>,
    store: Arc<InMemoryMessageStore>,
    ledger: Arc<KeyValueRewardLedger>,
    controller: DialogueController,
    create: CreateSessionHandler,
}

impl App {
    fn new(tutor: Arc<dyn TutorClient>) -> Self {
        let identity = Arc::new(StaticIdentityProvider::signed_in("learner-1").unwrap());
        let sessions = Arc::new(InMemorySessionRepository::new());
        let store = Arc::new(InMemoryMessageStore::new());
        let ledger = Arc::new(KeyValueRewardLedger::new(Arc::new(InMemoryKeyValueStore::new())));
        let gate = Arc::new(EvaluationGate::new(sessions.clone(), ledger.clone()));

        Self {
            controller: DialogueController::new(
                sessions.clone(),
                store.clone(),
                tutor.clone(),
                gate,
            ),
            create: CreateSessionHandler::new(
                identity.clone(),
                sessions.clone(),
                tutor,
                ledger.clone(),
            ),
            identity,
            sessions,
            store,
            ledger,
        }
    }

    async fn learner(&self) -> AuthenticatedUser {
        self.identity.require_user().await.unwrap()
    }
}

async fn run_full_dialogue(app: &App) -> socratix::domain::foundation::SessionId {
    let created = app
        .create
        .handle(CreateSessionCommand {
            prompt: "I want to learn about photosynthesis".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(created.session.topic(), "Photosynthesis");
    assert!(created.first_session);

    let session_id = *created.session.id();
    let learner = app.learner().await;
    let opened = app.controller.open(&learner, session_id).await.unwrap();
    assert_eq!(opened.state, DialogueState::Uninitialized);

    let first = app.controller.start(&session_id).await.unwrap();
    assert_eq!(first.content(), "What do plants need to make their own food?");

    for answer in &ANSWERS[..4] {
        let outcome = app
            .controller
            .submit(&session_id, answer, Duration::from_secs(20))
            .await
            .unwrap();
        let SubmitOutcome::Continued { turns, .. } = outcome else {
            panic!("expected the dialogue to continue");
        };
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].kind(), TurnKind::Feedback);
        assert_eq!(turns[1].kind(), TurnKind::Question);
    }

    let outcome = app
        .controller
        .submit(&session_id, ANSWERS[4], Duration::from_secs(20))
        .await
        .unwrap();
    let SubmitOutcome::Evaluated {
        evaluation,
        turn,
        rewards,
    } = outcome
    else {
        panic!("expected the fifth answer to evaluate the dialogue");
    };
    assert!(evaluation.completed);
    assert_eq!(evaluation.confidence_score, ConfidenceScore::new(85));
    assert_eq!(turn.unwrap().kind(), TurnKind::Evaluation);
    assert!(rewards.contains(&RewardEvent::badge(BadgeId::DeepLearner)));
    assert!(rewards.contains(&RewardEvent::achievement(
        AchievementId::TopicMastery,
        "Photosynthesis"
    )));
    assert!(rewards.contains(&RewardEvent::points(18)));

    session_id
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn full_dialogue_is_evaluated_and_rewarded() {
    let app = App::new(Arc::new(LlmTutorClient::new(Arc::new(scripted_provider()))));

    let session_id = run_full_dialogue(&app).await;

    // Transcript: question, then (answer, feedback, question) x4, answer, evaluation
    let turns = app.store.list(&session_id).await.unwrap();
    assert_eq!(turns.len(), 15);
    let sequences: Vec<u32> = turns.iter().map(|t| t.sequence()).collect();
    assert_eq!(sequences, (1..=15).collect::<Vec<u32>>());
    assert_eq!(turns.iter().filter(|t| t.sender() == Sender::User).count(), 5);
    assert_eq!(turns[2].content(), "Good observation number 1.");
    assert_eq!(turns[14].kind(), TurnKind::Evaluation);

    // Session carries the evaluation
    let session = app.sessions.find_by_id(&session_id).await.unwrap().unwrap();
    assert!(session.is_completed());
    assert_eq!(session.confidence_score(), Some(ConfidenceScore::new(85)));
    assert_eq!(session.feedback(), Some("Look into the Calvin cycle"));

    // Rewards were applied to the ledger
    let learner = UserId::new("learner-1").unwrap();
    let badges: Vec<_> = app
        .ledger
        .badges(&learner)
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.id)
        .collect();
    assert!(badges.contains(&"first_session"));
    assert!(badges.contains(&"deep_learner"));
    assert_eq!(app.ledger.points(&learner).await.unwrap(), 18);

    // Dialogue is read-only now
    let snapshot = app.controller.snapshot(&session_id).unwrap();
    assert_eq!(snapshot.state, DialogueState::Evaluated);
    assert!(app
        .controller
        .submit(&session_id, "One more thought", Duration::from_secs(5))
        .await
        .is_err());
}

#[tokio::test]
async fn deleting_a_session_removes_its_transcript() {
    let app = App::new(Arc::new(LlmTutorClient::new(Arc::new(scripted_provider()))));
    let session_id = run_full_dialogue(&app).await;

    let turns =
        GetSessionTurnsHandler::new(app.identity.clone(), app.sessions.clone(), app.store.clone());
    assert_eq!(
        turns
            .handle(GetSessionTurnsQuery { session_id })
            .await
            .unwrap()
            .len(),
        15
    );

    DeleteSessionHandler::new(app.identity.clone(), app.sessions.clone(), app.store.clone())
        .handle(DeleteSessionCommand { session_id })
        .await
        .unwrap();

    assert!(app.sessions.find_by_id(&session_id).await.unwrap().is_none());
    assert!(app.store.list(&session_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn dialogue_runs_through_the_http_tutor_endpoint() {
    let tutor = Arc::new(LlmTutorClient::new(Arc::new(scripted_provider())));
    let router = tutor_router(TutorAppState::new(tutor, TutorConfig::default()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let client = HttpTutorClient::new(
        format!("http://{}/socratic-tutor", addr),
        Duration::from_secs(5),
    )
    .unwrap();
    let app = App::new(Arc::new(client));

    let session_id = run_full_dialogue(&app).await;

    let session = app.sessions.find_by_id(&session_id).await.unwrap().unwrap();
    assert!(session.is_evaluated());
    assert_eq!(app.store.list(&session_id).await.unwrap().len(), 15);
}
