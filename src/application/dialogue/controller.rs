//! DialogueController - Drives one Socratic dialogue per open session.
//!
//! The controller keeps an in-memory view of every open session: the
//! session record, its ordered turns, the dialogue state and the learner
//! profile. The view is only touched under a short synchronous lock; all
//! awaited work happens on a copy while the dialogue sits in one of the
//! in-flight states, which rejects concurrent starts and submits.
//!
//! # Example
//!
//! ```ignore
//! let controller = DialogueController::new(sessions, store, tutor, gate);
//! controller.open(&user, session_id).await?;
//! controller.start(&session_id).await?;
//! let outcome = controller.submit(&session_id, "Plants use light", elapsed).await?;
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::application::EvaluationGate;
use crate::domain::conversation::{
    next_sequence, parse_continuation, DialogueState, LearnerProfile, Sender, Turn, TurnDraft,
    TurnKind, TutorReply,
};
use crate::domain::foundation::{AuthenticatedUser, SessionId, StateMachine};
use crate::domain::rewards::{should_evaluate, RewardEvent};
use crate::domain::session::{Evaluation, LearningSession, SessionError};
use crate::ports::{
    ContinueRequest, EvaluateRequest, Message, MessageStore, SessionRepository, StoreError,
    TutorClient,
};

use super::DialogueError;

type OpenDialogues = Mutex<HashMap<SessionId, DialogueSnapshot>>;

/// Point-in-time view of an open dialogue.
#[derive(Debug, Clone)]
pub struct DialogueSnapshot {
    pub session: LearningSession,
    pub turns: Vec<Turn>,
    pub state: DialogueState,
    pub profile: LearnerProfile,
}

/// Result of a successful submit.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// The tutor replied with feedback and/or the next question.
    Continued {
        turns: Vec<Turn>,
        profile: LearnerProfile,
    },
    /// The answer completed the dialogue and it has been evaluated.
    ///
    /// `turn` is `None` when the evaluation was recorded on the session but
    /// its transcript turn could not be stored.
    Evaluated {
        evaluation: Evaluation,
        turn: Option<Turn>,
        rewards: Vec<RewardEvent>,
    },
}

/// Orchestrates start, submit and evaluation for open sessions.
pub struct DialogueController {
    sessions: Arc<dyn SessionRepository>,
    store: Arc<dyn MessageStore>,
    tutor: Arc<dyn TutorClient>,
    gate: Arc<EvaluationGate>,
    open: OpenDialogues,
}

impl DialogueController {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        store: Arc<dyn MessageStore>,
        tutor: Arc<dyn TutorClient>,
        gate: Arc<EvaluationGate>,
    ) -> Self {
        Self {
            sessions,
            store,
            tutor,
            gate,
            open: Mutex::new(HashMap::new()),
        }
    }

    /// Loads a session the user owns and derives its dialogue state.
    ///
    /// Re-opening an idle dialogue reloads it from storage and keeps the
    /// learner profile.
    ///
    /// # Errors
    ///
    /// - `Session(NotFound)` if the session does not exist
    /// - `Session(Forbidden)` if the user does not own it
    /// - `InFlight` if the dialogue is waiting for the tutor
    pub async fn open(
        &self,
        user: &AuthenticatedUser,
        session_id: SessionId,
    ) -> Result<DialogueSnapshot, DialogueError> {
        self.ensure_idle(&session_id)?;

        let session = self
            .sessions
            .find_by_id(&session_id)
            .await?
            .ok_or_else(|| SessionError::not_found(session_id))?;
        session.authorize(&user.id)?;

        let turns = self.store.list(&session_id).await?;
        let state = derive_state(&session, &turns);

        let mut open = lock(&self.open);
        if open.get(&session_id).is_some_and(|d| d.state.is_busy()) {
            return Err(DialogueError::InFlight(session_id));
        }
        let profile = open
            .get(&session_id)
            .map(|d| d.profile)
            .unwrap_or_default();
        let snapshot = DialogueSnapshot {
            session,
            turns,
            state,
            profile,
        };
        open.insert(session_id, snapshot.clone());
        Ok(snapshot)
    }

    /// Requests the opening question and stores it as the first turn.
    ///
    /// On failure the dialogue returns to `Uninitialized` and can be
    /// started again.
    pub async fn start(&self, session_id: &SessionId) -> Result<Turn, DialogueError> {
        let (dialogue, guard) =
            self.begin(session_id, "start", DialogueState::AwaitingFirstQuestion)?;

        let question = self
            .tutor
            .start(dialogue.session.topic())
            .await
            .map_err(|err| {
                tracing::warn!(session_id = %session_id, error = %err, "Tutor failed to start dialogue");
                err
            })?;

        let sequence = next_sequence(&dialogue.turns);
        let turn = self
            .store
            .append(TurnDraft::ai_question(*session_id, sequence, question))
            .await?;

        guard.push(turn.clone());
        guard.finish(DialogueState::AwaitingUserTurn);

        tracing::info!(session_id = %session_id, topic = dialogue.session.topic(), "Dialogue started");
        Ok(turn)
    }

    /// Stores the learner's answer and advances the dialogue.
    ///
    /// The answer is persisted before the tutor is asked; if the tutor or a
    /// later write fails the answer stays recorded and the dialogue accepts
    /// input again.
    pub async fn submit(
        &self,
        session_id: &SessionId,
        text: &str,
        response_time: Duration,
    ) -> Result<SubmitOutcome, DialogueError> {
        let answer = text.trim();
        if answer.is_empty() {
            return Err(DialogueError::EmptyAnswer);
        }

        let (dialogue, guard) = self.begin(session_id, "submit", DialogueState::AwaitingAiTurn)?;
        let mut turns = dialogue.turns;

        let user_sequence = next_sequence(&turns);
        let user_turn = self
            .store
            .append(TurnDraft::user_answer(*session_id, user_sequence, answer))
            .await?;
        turns.push(user_turn.clone());
        guard.push(user_turn);

        let mut profile = dialogue.profile;
        let analysis = profile.observe(answer, response_time);
        tracing::debug!(
            session_id = %session_id,
            words = analysis.metrics.words,
            candidate = %analysis.candidate,
            level = %profile.level,
            timing = %profile.timing,
            "Analyzed answer"
        );
        guard.set_profile(profile);

        let history = conversation_history(&turns);
        let ai_sequence = user_sequence + 1;

        if should_evaluate(&turns) {
            self.conclude(dialogue.session, history, profile, ai_sequence, guard)
                .await
        } else {
            let raw = self
                .tutor
                .continue_dialogue(ContinueRequest {
                    user_response: answer.to_string(),
                    history,
                    level: Some(profile.level),
                    timing: Some(profile.timing),
                })
                .await
                .map_err(|err| {
                    tracing::warn!(session_id = %session_id, error = %err, "Tutor failed to continue dialogue");
                    err
                })?;

            let stored = self.store_reply(&guard, *session_id, ai_sequence, &raw).await?;
            guard.finish(DialogueState::AwaitingUserTurn);
            Ok(SubmitOutcome::Continued {
                turns: stored,
                profile,
            })
        }
    }

    /// Current view of an open dialogue.
    pub fn snapshot(&self, session_id: &SessionId) -> Option<DialogueSnapshot> {
        lock(&self.open).get(session_id).cloned()
    }

    /// Forgets an open dialogue. Returns false if it was not open.
    pub fn close(&self, session_id: &SessionId) -> bool {
        lock(&self.open).remove(session_id).is_some()
    }

    async fn conclude(
        &self,
        mut session: LearningSession,
        history: Vec<Message>,
        profile: LearnerProfile,
        sequence: u32,
        guard: InFlightGuard<'_>,
    ) -> Result<SubmitOutcome, DialogueError> {
        let session_id = *session.id();
        let evaluation = self
            .tutor
            .evaluate(EvaluateRequest {
                topic: session.topic().to_string(),
                history,
                level: Some(profile.level),
                timing: Some(profile.timing),
            })
            .await
            .map_err(|err| {
                tracing::warn!(session_id = %session_id, error = %err, "Tutor failed to evaluate dialogue");
                err
            })?;

        self.gate.record(&mut session, &evaluation).await?;

        let turn = match self
            .store
            .append(TurnDraft::ai_evaluation(
                session_id,
                sequence,
                evaluation.to_turn_content(),
            ))
            .await
        {
            Ok(turn) => {
                guard.push(turn.clone());
                Some(turn)
            }
            Err(err) => {
                tracing::warn!(session_id = %session_id, error = %err, "Failed to store evaluation turn");
                None
            }
        };

        guard.set_session(session.clone());
        guard.finish(DialogueState::Evaluated);

        let rewards = self.gate.award(&session, &evaluation).await;
        Ok(SubmitOutcome::Evaluated {
            evaluation,
            turn,
            rewards,
        })
    }

    /// Stores a continuation reply as feedback + question turns, or as one
    /// raw question turn when the reply is unlabelled or its feedback cannot
    /// be stored. Once feedback is stored, only the parsed question follows it.
    async fn store_reply(
        &self,
        guard: &InFlightGuard<'_>,
        session_id: SessionId,
        sequence: u32,
        raw: &str,
    ) -> Result<Vec<Turn>, StoreError> {
        let reply = parse_continuation(raw);
        let mut stored = Vec::new();
        let mut next = sequence;
        let mut question = raw;

        if let TutorReply::Structured { feedback, .. } = &reply {
            match self
                .store
                .append(TurnDraft::ai_feedback(session_id, next, feedback.as_str()))
                .await
            {
                Ok(turn) => {
                    guard.push(turn.clone());
                    stored.push(turn);
                    next += 1;
                    question = reply.question();
                    match self
                        .store
                        .append(TurnDraft::ai_question(session_id, next, question))
                        .await
                    {
                        Ok(turn) => {
                            guard.push(turn.clone());
                            stored.push(turn);
                            return Ok(stored);
                        }
                        Err(err) => {
                            tracing::warn!(session_id = %session_id, error = %err, "Failed to store question, retrying");
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(session_id = %session_id, error = %err, "Failed to store feedback, saving raw reply");
                }
            }
        }

        let turn = self
            .store
            .append(TurnDraft::ai_question(session_id, next, question))
            .await?;
        guard.push(turn.clone());
        stored.push(turn);
        Ok(stored)
    }

    fn ensure_idle(&self, session_id: &SessionId) -> Result<(), DialogueError> {
        let busy = lock(&self.open)
            .get(session_id)
            .is_some_and(|d| d.state.is_busy());
        if busy {
            return Err(DialogueError::InFlight(*session_id));
        }
        Ok(())
    }

    /// Moves an open dialogue into an in-flight state and returns a copy of
    /// it together with the guard that settles or rolls back the state.
    fn begin(
        &self,
        session_id: &SessionId,
        action: &'static str,
        target: DialogueState,
    ) -> Result<(DialogueSnapshot, InFlightGuard<'_>), DialogueError> {
        let mut open = lock(&self.open);
        let dialogue = open
            .get_mut(session_id)
            .ok_or(DialogueError::NotOpen(*session_id))?;

        let current = dialogue.state;
        if current.is_busy() {
            return Err(DialogueError::InFlight(*session_id));
        }
        dialogue.state = current
            .transition_to(target)
            .map_err(|_| DialogueError::InvalidState {
                action,
                state: current,
            })?;

        let copy = dialogue.clone();
        Ok((
            copy,
            InFlightGuard {
                open: &self.open,
                session_id: *session_id,
                rollback: current,
                settled: false,
            },
        ))
    }
}

/// Restores the pre-flight state unless the operation settles it.
///
/// Dropping the guard early (an error, or the caller's future being
/// cancelled) makes the dialogue accept the same operation again.
struct InFlightGuard<'a> {
    open: &'a OpenDialogues,
    session_id: SessionId,
    rollback: DialogueState,
    settled: bool,
}

impl InFlightGuard<'_> {
    fn with_dialogue(&self, f: impl FnOnce(&mut DialogueSnapshot)) {
        if let Some(dialogue) = lock(self.open).get_mut(&self.session_id) {
            f(dialogue);
        }
    }

    fn push(&self, turn: Turn) {
        self.with_dialogue(|d| d.turns.push(turn));
    }

    fn set_profile(&self, profile: LearnerProfile) {
        self.with_dialogue(|d| d.profile = profile);
    }

    fn set_session(&self, session: LearningSession) {
        self.with_dialogue(|d| d.session = session);
    }

    fn finish(mut self, state: DialogueState) {
        self.with_dialogue(|d| d.state = state);
        self.settled = true;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let rollback = self.rollback;
            self.with_dialogue(|d| d.state = rollback);
        }
    }
}

fn lock(open: &OpenDialogues) -> MutexGuard<'_, HashMap<SessionId, DialogueSnapshot>> {
    open.lock().unwrap_or_else(PoisonError::into_inner)
}

fn derive_state(session: &LearningSession, turns: &[Turn]) -> DialogueState {
    if session.is_evaluated() || turns.iter().any(|t| t.kind() == TurnKind::Evaluation) {
        DialogueState::Evaluated
    } else if turns.is_empty() {
        DialogueState::Uninitialized
    } else {
        DialogueState::AwaitingUserTurn
    }
}

/// Maps turns to tutor messages in turn order: ai to assistant, user to user.
pub fn conversation_history(turns: &[Turn]) -> Vec<Message> {
    turns
        .iter()
        .map(|turn| match turn.sender() {
            Sender::Ai => Message::assistant(turn.content()),
            Sender::User => Message::user(turn.content()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::adapters::rewards::KeyValueRewardLedger;
    use crate::adapters::storage::{
        InMemoryKeyValueStore, InMemoryMessageStore, InMemorySessionRepository,
    };
    use crate::adapters::tutor::LlmTutorClient;
    use crate::domain::conversation::LearnerLevel;
    use crate::domain::foundation::{ConfidenceScore, UserId};
    use crate::domain::rewards::BadgeId;
    use crate::ports::{MessageRole, TutorError};
    use async_trait::async_trait;
    use std::collections::HashSet;

    const EVALUATION_JSON: &str = r#"Here is my assessment:
{"completed": true, "confidenceScore": 85, "summary": "Solid grasp of light reactions", "feedback": "Explore the Calvin cycle next"}"#;

    /// Message store that refuses to append selected kinds of turns.
    #[derive(Default)]
    struct FlakyStore {
        inner: InMemoryMessageStore,
        failing: Mutex<HashSet<TurnKind>>,
        failing_once: Mutex<HashSet<TurnKind>>,
    }

    impl FlakyStore {
        fn fail(&self, kind: TurnKind) {
            self.failing.lock().unwrap().insert(kind);
        }

        fn fail_once(&self, kind: TurnKind) {
            self.failing_once.lock().unwrap().insert(kind);
        }

        fn heal(&self) {
            self.failing.lock().unwrap().clear();
        }
    }

    #[async_trait]
    impl MessageStore for FlakyStore {
        async fn append(&self, draft: TurnDraft) -> Result<Turn, StoreError> {
            if self.failing.lock().unwrap().contains(&draft.kind)
                || self.failing_once.lock().unwrap().remove(&draft.kind)
            {
                return Err(StoreError::backend("simulated outage"));
            }
            self.inner.append(draft).await
        }

        async fn list(&self, session_id: &SessionId) -> Result<Vec<Turn>, StoreError> {
            self.inner.list(session_id).await
        }

        async fn delete_for_session(&self, session_id: &SessionId) -> Result<(), StoreError> {
            self.inner.delete_for_session(session_id).await
        }
    }

    struct Harness {
        controller: DialogueController,
        provider: MockAIProvider,
        store: Arc<FlakyStore>,
        sessions: InMemorySessionRepository,
        user: AuthenticatedUser,
        session_id: SessionId,
    }

    async fn harness(provider: MockAIProvider) -> Harness {
        let sessions = InMemorySessionRepository::new();
        let store = Arc::new(FlakyStore::default());
        let ledger = Arc::new(KeyValueRewardLedger::new(Arc::new(InMemoryKeyValueStore::new())));
        let gate = Arc::new(EvaluationGate::new(Arc::new(sessions.clone()), ledger));
        let tutor = Arc::new(LlmTutorClient::new(Arc::new(provider.clone())));

        let user = AuthenticatedUser::new(UserId::new("learner-1").unwrap(), None);
        let session = LearningSession::new(SessionId::new(), user.id.clone(), "Photosynthesis").unwrap();
        sessions.save(&session).await.unwrap();

        Harness {
            controller: DialogueController::new(
                Arc::new(sessions.clone()),
                store.clone(),
                tutor,
                gate,
            ),
            provider,
            store,
            sessions,
            user,
            session_id: *session.id(),
        }
    }

    async fn opened_and_started(provider: MockAIProvider) -> Harness {
        let h = harness(provider).await;
        h.controller.open(&h.user, h.session_id).await.unwrap();
        h.controller.start(&h.session_id).await.unwrap();
        h
    }

    fn state(h: &Harness) -> DialogueState {
        h.controller.snapshot(&h.session_id).unwrap().state
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[tokio::test]
    async fn open_fresh_session_is_uninitialized() {
        let h = harness(MockAIProvider::new()).await;
        let snapshot = h.controller.open(&h.user, h.session_id).await.unwrap();
        assert_eq!(snapshot.state, DialogueState::Uninitialized);
        assert!(snapshot.turns.is_empty());
    }

    #[tokio::test]
    async fn open_rejects_other_users() {
        let h = harness(MockAIProvider::new()).await;
        let stranger = AuthenticatedUser::new(UserId::new("someone-else").unwrap(), None);
        let err = h.controller.open(&stranger, h.session_id).await.unwrap_err();
        assert!(matches!(err, DialogueError::Session(SessionError::Forbidden)));
    }

    #[tokio::test]
    async fn open_unknown_session_is_not_found() {
        let h = harness(MockAIProvider::new()).await;
        let err = h.controller.open(&h.user, SessionId::new()).await.unwrap_err();
        assert!(matches!(err, DialogueError::Session(SessionError::NotFound(_))));
    }

    #[tokio::test]
    async fn reopening_resumes_awaiting_user_turn() {
        let h = opened_and_started(MockAIProvider::new().with_response("Why do plants need light?")).await;
        assert!(h.controller.close(&h.session_id));

        let snapshot = h.controller.open(&h.user, h.session_id).await.unwrap();
        assert_eq!(snapshot.state, DialogueState::AwaitingUserTurn);
        assert_eq!(snapshot.turns.len(), 1);
    }

    #[tokio::test]
    async fn start_stores_first_question_at_sequence_one() {
        let h = harness(MockAIProvider::new().with_response("What do plants need to grow?")).await;
        h.controller.open(&h.user, h.session_id).await.unwrap();

        let turn = h.controller.start(&h.session_id).await.unwrap();

        assert_eq!(turn.sequence(), 1);
        assert_eq!(turn.sender(), Sender::Ai);
        assert_eq!(turn.kind(), TurnKind::Question);
        assert_eq!(turn.content(), "What do plants need to grow?");
        assert_eq!(state(&h), DialogueState::AwaitingUserTurn);
    }

    #[tokio::test]
    async fn failed_start_can_be_retried() {
        let provider = MockAIProvider::new()
            .with_error(MockError::Unavailable {
                message: "overloaded".to_string(),
            })
            .with_response("What is light?");
        let h = harness(provider).await;
        h.controller.open(&h.user, h.session_id).await.unwrap();

        let err = h.controller.start(&h.session_id).await.unwrap_err();
        assert!(matches!(err, DialogueError::Tutor(TutorError::Unavailable(_))));
        assert_eq!(state(&h), DialogueState::Uninitialized);

        let turn = h.controller.start(&h.session_id).await.unwrap();
        assert_eq!(turn.sequence(), 1);
    }

    #[tokio::test]
    async fn concurrent_start_produces_one_question() {
        let provider = MockAIProvider::new()
            .with_response("First question?")
            .with_delay(Duration::from_millis(20));
        let h = harness(provider).await;
        h.controller.open(&h.user, h.session_id).await.unwrap();

        let (first, second) = tokio::join!(
            h.controller.start(&h.session_id),
            h.controller.start(&h.session_id)
        );

        assert!(first.is_ok());
        assert!(matches!(second, Err(DialogueError::InFlight(_))));
        assert_eq!(h.provider.call_count(), 1);
        assert_eq!(h.store.list(&h.session_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_submit_produces_one_answer() {
        let provider = MockAIProvider::new()
            .with_response("What do plants need?")
            .with_response("FEEDBACK: Right.\n\nQUESTION: Where does it go?")
            .with_delay(Duration::from_millis(20));
        let h = opened_and_started(provider).await;
        let calls = h.provider.call_count();

        let (first, second) = tokio::join!(
            h.controller.submit(&h.session_id, "Sunlight", secs(10)),
            h.controller.submit(&h.session_id, "Water", secs(10))
        );

        let rejected = [&first, &second]
            .iter()
            .filter(|r| matches!(r, Err(DialogueError::InFlight(_))))
            .count();
        assert_eq!(rejected, 1);
        assert!(first.is_ok() || second.is_ok());
        assert_eq!(h.provider.call_count(), calls + 1);

        let stored = h.store.list(&h.session_id).await.unwrap();
        assert_eq!(stored.iter().filter(|t| t.kind() == TurnKind::Answer).count(), 1);
        assert_eq!(state(&h), DialogueState::AwaitingUserTurn);
    }

    #[tokio::test]
    async fn start_twice_is_invalid() {
        let h = opened_and_started(MockAIProvider::new()).await;
        let err = h.controller.start(&h.session_id).await.unwrap_err();
        assert!(matches!(
            err,
            DialogueError::InvalidState {
                action: "start",
                state: DialogueState::AwaitingUserTurn
            }
        ));
    }

    #[tokio::test]
    async fn operations_require_open_session() {
        let h = harness(MockAIProvider::new()).await;
        assert!(matches!(
            h.controller.start(&h.session_id).await,
            Err(DialogueError::NotOpen(_))
        ));
        assert!(h.controller.snapshot(&h.session_id).is_none());
    }

    #[tokio::test]
    async fn blank_answer_is_rejected_before_any_io() {
        let h = opened_and_started(MockAIProvider::new()).await;
        let calls = h.provider.call_count();

        let err = h.controller.submit(&h.session_id, "   \n", secs(5)).await.unwrap_err();

        assert!(matches!(err, DialogueError::EmptyAnswer));
        assert_eq!(h.provider.call_count(), calls);
        assert_eq!(h.store.list(&h.session_id).await.unwrap().len(), 1);
        assert_eq!(state(&h), DialogueState::AwaitingUserTurn);
    }

    #[tokio::test]
    async fn submit_before_start_is_invalid() {
        let h = harness(MockAIProvider::new()).await;
        h.controller.open(&h.user, h.session_id).await.unwrap();
        let err = h.controller.submit(&h.session_id, "Light", secs(5)).await.unwrap_err();
        assert!(matches!(err, DialogueError::InvalidState { action: "submit", .. }));
    }

    #[tokio::test]
    async fn structured_reply_stores_feedback_then_question() {
        let provider = MockAIProvider::new()
            .with_response("What do plants need?")
            .with_response("FEEDBACK: Good thinking.\n\nQUESTION: Where does the energy go?");
        let h = opened_and_started(provider).await;

        let outcome = h
            .controller
            .submit(&h.session_id, "  They need sunlight  ", secs(20))
            .await
            .unwrap();

        let SubmitOutcome::Continued { turns, .. } = outcome else {
            panic!("expected continuation");
        };
        assert_eq!(turns.len(), 2);
        assert_eq!((turns[0].sequence(), turns[0].kind()), (3, TurnKind::Feedback));
        assert_eq!(turns[0].content(), "Good thinking.");
        assert_eq!((turns[1].sequence(), turns[1].kind()), (4, TurnKind::Question));
        assert_eq!(turns[1].content(), "Where does the energy go?");

        let stored = h.store.list(&h.session_id).await.unwrap();
        assert_eq!(stored[1].content(), "They need sunlight");
        assert_eq!(stored[1].kind(), TurnKind::Answer);
        assert_eq!(state(&h), DialogueState::AwaitingUserTurn);
    }

    #[tokio::test]
    async fn plain_reply_is_one_question_turn() {
        let provider = MockAIProvider::new()
            .with_response("What do plants need?")
            .with_response("Interesting. What else might they need?");
        let h = opened_and_started(provider).await;

        let outcome = h.controller.submit(&h.session_id, "Water", secs(20)).await.unwrap();

        let SubmitOutcome::Continued { turns, .. } = outcome else {
            panic!("expected continuation");
        };
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].kind(), TurnKind::Question);
        assert_eq!(turns[0].sequence(), 3);
        assert_eq!(turns[0].content(), "Interesting. What else might they need?");
    }

    #[tokio::test]
    async fn unstorable_feedback_falls_back_to_raw_question() {
        let raw = "FEEDBACK: Nice.\n\nQUESTION: Why green?";
        let provider = MockAIProvider::new()
            .with_response("What do plants need?")
            .with_response(raw);
        let h = opened_and_started(provider).await;
        h.store.fail(TurnKind::Feedback);

        let outcome = h.controller.submit(&h.session_id, "Chlorophyll", secs(20)).await.unwrap();

        let SubmitOutcome::Continued { turns, .. } = outcome else {
            panic!("expected continuation");
        };
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].kind(), TurnKind::Question);
        assert_eq!(turns[0].content(), raw);
        assert_eq!(turns[0].sequence(), 3);
    }

    #[tokio::test]
    async fn unstorable_question_after_feedback_keeps_only_the_question() {
        let provider = MockAIProvider::new()
            .with_response("What do plants need?")
            .with_response("FEEDBACK: Nice.\n\nQUESTION: Why green?");
        let h = opened_and_started(provider).await;
        h.store.fail_once(TurnKind::Question);

        let outcome = h.controller.submit(&h.session_id, "Chlorophyll", secs(20)).await.unwrap();

        let SubmitOutcome::Continued { turns, .. } = outcome else {
            panic!("expected continuation");
        };
        assert_eq!(turns.len(), 2);
        assert_eq!((turns[0].sequence(), turns[0].kind()), (3, TurnKind::Feedback));
        assert_eq!(turns[0].content(), "Nice.");
        assert_eq!((turns[1].sequence(), turns[1].kind()), (4, TurnKind::Question));
        assert_eq!(turns[1].content(), "Why green?");

        let stored = h.store.list(&h.session_id).await.unwrap();
        let contents: Vec<&str> = stored.iter().map(|t| t.content()).collect();
        assert_eq!(contents, ["What do plants need?", "Chlorophyll", "Nice.", "Why green?"]);
    }

    #[tokio::test]
    async fn failed_answer_write_aborts_before_tutor() {
        let h = opened_and_started(MockAIProvider::new()).await;
        let calls = h.provider.call_count();
        h.store.fail(TurnKind::Answer);

        let err = h.controller.submit(&h.session_id, "Light", secs(5)).await.unwrap_err();

        assert!(matches!(err, DialogueError::Storage(_)));
        assert_eq!(h.provider.call_count(), calls);
        assert_eq!(state(&h), DialogueState::AwaitingUserTurn);

        h.store.heal();
        assert!(h.controller.submit(&h.session_id, "Light", secs(5)).await.is_ok());
    }

    #[tokio::test]
    async fn tutor_failure_keeps_the_answer() {
        let provider = MockAIProvider::new()
            .with_response("What do plants need?")
            .with_error(MockError::RateLimited { retry_after_secs: 3 });
        let h = opened_and_started(provider).await;

        let err = h.controller.submit(&h.session_id, "Light", secs(5)).await.unwrap_err();

        assert!(matches!(
            err,
            DialogueError::Tutor(TutorError::RateLimited { retry_after_secs: 3 })
        ));
        let snapshot = h.controller.snapshot(&h.session_id).unwrap();
        assert_eq!(snapshot.state, DialogueState::AwaitingUserTurn);
        assert_eq!(snapshot.turns.len(), 2);
        assert_eq!(h.store.list(&h.session_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn history_maps_senders_to_roles_in_order() {
        let provider = MockAIProvider::new()
            .with_response("What do plants need?")
            .with_response("QUESTION only reply");
        let h = opened_and_started(provider).await;

        h.controller.submit(&h.session_id, "Sunlight", secs(5)).await.unwrap();

        let call = h.provider.last_call().unwrap();
        let dialogue: Vec<_> = call
            .messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(|m| (m.role, m.content.as_str()))
            .collect();
        assert_eq!(
            dialogue,
            vec![
                (MessageRole::Assistant, "What do plants need?"),
                (MessageRole::User, "Sunlight"),
            ]
        );
    }

    #[tokio::test]
    async fn profile_level_ratchets_across_answers() {
        let advanced = "Photosynthesis fundamentally transforms electromagnetic radiation into \
            chemical energy, therefore sustaining practically every terrestrial ecosystem; \
            however, the underlying biochemical mechanisms remain surprisingly intricate.";
        let h = opened_and_started(MockAIProvider::new()).await;

        let first = h.controller.submit(&h.session_id, advanced, secs(60)).await.unwrap();
        let second = h.controller.submit(&h.session_id, "ok", secs(3)).await.unwrap();

        let (SubmitOutcome::Continued { profile: p1, .. }, SubmitOutcome::Continued { profile: p2, .. }) =
            (first, second)
        else {
            panic!("expected continuations");
        };
        assert_eq!(p1.level, LearnerLevel::Advanced);
        assert_eq!(p2.level, LearnerLevel::Advanced);
        assert_eq!(p2.timing, crate::domain::conversation::ResponseTiming::Fast);
    }

    #[tokio::test]
    async fn fifth_answer_evaluates_the_dialogue() {
        let provider = MockAIProvider::new()
            .with_response("Q1?")
            .with_responses(["Q2?", "Q3?", "Q4?", "Q5?"])
            .with_response(EVALUATION_JSON);
        let h = opened_and_started(provider).await;

        for answer in ["Light", "Water", "Carbon dioxide", "Glucose"] {
            let outcome = h.controller.submit(&h.session_id, answer, secs(15)).await.unwrap();
            assert!(matches!(outcome, SubmitOutcome::Continued { .. }));
        }
        let outcome = h.controller.submit(&h.session_id, "Oxygen", secs(15)).await.unwrap();

        let SubmitOutcome::Evaluated {
            evaluation,
            turn,
            rewards,
        } = outcome
        else {
            panic!("expected evaluation");
        };
        assert_eq!(evaluation.confidence_score, ConfidenceScore::new(85));
        let turn = turn.unwrap();
        assert_eq!(turn.kind(), TurnKind::Evaluation);
        assert_eq!(turn.sequence(), 11);
        assert!(rewards.contains(&RewardEvent::badge(BadgeId::DeepLearner)));
        assert_eq!(state(&h), DialogueState::Evaluated);

        let stored = h.sessions.find_by_id(&h.session_id).await.unwrap().unwrap();
        assert!(stored.is_completed());
        assert_eq!(stored.summary(), Some("Solid grasp of light reactions"));

        let err = h.controller.submit(&h.session_id, "More", secs(5)).await.unwrap_err();
        assert!(matches!(err, DialogueError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn unparseable_evaluation_is_an_error() {
        let provider = MockAIProvider::new()
            .with_response("Q1?")
            .with_responses(["Q2?", "Q3?", "Q4?", "Q5?"])
            .with_response("You did great!");
        let h = opened_and_started(provider).await;
        for answer in ["a", "b", "c", "d"] {
            h.controller.submit(&h.session_id, answer, secs(15)).await.unwrap();
        }

        let err = h.controller.submit(&h.session_id, "e", secs(15)).await.unwrap_err();

        assert!(matches!(err, DialogueError::Tutor(TutorError::MalformedOutput { .. })));
        assert_eq!(state(&h), DialogueState::AwaitingUserTurn);
        let stored = h.sessions.find_by_id(&h.session_id).await.unwrap().unwrap();
        assert!(!stored.is_evaluated());
    }

    #[tokio::test]
    async fn evaluated_session_reopens_as_evaluated() {
        let provider = MockAIProvider::new()
            .with_response("Q1?")
            .with_responses(["Q2?", "Q3?", "Q4?", "Q5?"])
            .with_response(EVALUATION_JSON);
        let h = opened_and_started(provider).await;
        for answer in ["a", "b", "c", "d", "e"] {
            h.controller.submit(&h.session_id, answer, secs(15)).await.unwrap();
        }
        h.controller.close(&h.session_id);

        let snapshot = h.controller.open(&h.user, h.session_id).await.unwrap();
        assert_eq!(snapshot.state, DialogueState::Evaluated);
    }

    #[test]
    fn conversation_history_keeps_turn_order() {
        let session = SessionId::new();
        let turns = vec![
            Turn::from_draft(TurnDraft::ai_question(session, 1, "Q?")).unwrap(),
            Turn::from_draft(TurnDraft::user_answer(session, 2, "A")).unwrap(),
            Turn::from_draft(TurnDraft::ai_feedback(session, 3, "Nice")).unwrap(),
        ];
        let history = conversation_history(&turns);
        let roles: Vec<_> = history.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![MessageRole::Assistant, MessageRole::User, MessageRole::Assistant]
        );
    }
}
