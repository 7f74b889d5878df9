//! EvaluationGate - Applies a finished evaluation to the learner's records.
//!
//! Persisting the evaluation onto the session is the only step that can fail
//! the dialogue. Progress and reward updates are applied best-effort: each
//! failure is logged and the remaining rewards are still dispatched.

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::rewards::{quiz_reward_events, reward_events, RewardEvent, TopicProgress};
use crate::domain::session::{Evaluation, LearningSession};
use crate::ports::{RewardError, RewardLedger, SessionRepository};

/// Service that records evaluations and grants the rewards they earn.
pub struct EvaluationGate {
    sessions: Arc<dyn SessionRepository>,
    ledger: Arc<dyn RewardLedger>,
}

impl EvaluationGate {
    pub fn new(sessions: Arc<dyn SessionRepository>, ledger: Arc<dyn RewardLedger>) -> Self {
        Self { sessions, ledger }
    }

    /// Records the evaluation and grants its rewards.
    pub async fn apply(
        &self,
        session: &mut LearningSession,
        evaluation: &Evaluation,
    ) -> Result<Vec<RewardEvent>, DomainError> {
        self.record(session, evaluation).await?;
        Ok(self.award(session, evaluation).await)
    }

    /// Copies the evaluation onto the session and persists it.
    pub async fn record(
        &self,
        session: &mut LearningSession,
        evaluation: &Evaluation,
    ) -> Result<(), DomainError> {
        session.record_evaluation(evaluation);
        self.sessions.update(session).await
    }

    /// Updates topic progress and dispatches the earned rewards.
    ///
    /// Returns every event the policy produced, including ones the ledger
    /// failed to apply.
    pub async fn award(&self, session: &LearningSession, evaluation: &Evaluation) -> Vec<RewardEvent> {
        let user_id = session.user_id();
        let topic = session.topic();

        if let Err(err) = self.record_progress(user_id, topic, evaluation).await {
            tracing::warn!(user_id = %user_id, topic, error = %err, "Failed to update topic progress");
        }

        let completed = self.completed_topics(session, evaluation).await;
        let events = reward_events(evaluation, topic, &completed);

        for event in &events {
            if let Err(err) = self.dispatch(user_id, event).await {
                tracing::warn!(user_id = %user_id, ?event, error = %err, "Failed to apply reward");
            }
        }

        tracing::info!(
            session_id = %session.id(),
            confidence = evaluation.confidence_score.value(),
            completed = evaluation.completed,
            rewards = events.len(),
            "Session evaluated"
        );

        events
    }

    /// Grants the rewards for a finished challenge quiz.
    ///
    /// Like [`Self::award`], ledger failures are logged and the full event
    /// list is still returned.
    pub async fn award_quiz(&self, user_id: &UserId, correct: u32, total: u32) -> Vec<RewardEvent> {
        let events = quiz_reward_events(correct, total);

        for event in &events {
            if let Err(err) = self.dispatch(user_id, event).await {
                tracing::warn!(user_id = %user_id, ?event, error = %err, "Failed to apply quiz reward");
            }
        }

        tracing::info!(user_id = %user_id, correct, total, rewards = events.len(), "Quiz completed");
        events
    }

    /// Distinct topics of the learner's completed sessions, this one included.
    async fn completed_topics(
        &self,
        session: &LearningSession,
        evaluation: &Evaluation,
    ) -> HashSet<String> {
        let mut topics: HashSet<String> = match self.sessions.completed_topics(session.user_id()).await {
            Ok(topics) => topics.into_iter().collect(),
            Err(err) => {
                tracing::warn!(user_id = %session.user_id(), error = %err, "Failed to load completed topics");
                HashSet::new()
            }
        };
        if evaluation.completed {
            topics.insert(session.topic().to_string());
        }
        topics
    }

    async fn record_progress(
        &self,
        user_id: &UserId,
        topic: &str,
        evaluation: &Evaluation,
    ) -> Result<(), RewardError> {
        let mut progress = self
            .ledger
            .topic_progress(user_id, topic)
            .await?
            .unwrap_or_else(|| TopicProgress::new(topic));
        progress.record(evaluation.completed, evaluation.confidence_score);
        self.ledger.save_topic_progress(user_id, &progress).await
    }

    async fn dispatch(&self, user_id: &UserId, event: &RewardEvent) -> Result<(), RewardError> {
        match event {
            RewardEvent::AwardBadge { badge } => {
                self.ledger.award_badge(user_id, *badge).await?;
            }
            RewardEvent::AwardAchievement { achievement, topic } => {
                self.ledger
                    .award_achievement(user_id, *achievement, topic)
                    .await?;
            }
            RewardEvent::AwardPoints { points } => {
                self.ledger.add_points(user_id, *points).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::rewards::KeyValueRewardLedger;
    use crate::adapters::storage::{InMemoryKeyValueStore, InMemorySessionRepository};
    use crate::domain::foundation::{ConfidenceScore, ErrorCode, SessionId};
    use crate::domain::rewards::{AchievementId, BadgeId};
    use crate::ports::KeyValueError;
    use async_trait::async_trait;

    fn user() -> UserId {
        UserId::new("learner-1").unwrap()
    }

    fn evaluation(completed: bool, score: u8) -> Evaluation {
        Evaluation {
            completed,
            confidence_score: ConfidenceScore::new(score),
            summary: "Understands the basics".to_string(),
            feedback: Some("Review the light reactions".to_string()),
        }
    }

    async fn saved_session(repo: &InMemorySessionRepository, topic: &str) -> LearningSession {
        let session = LearningSession::new(SessionId::new(), user(), topic).unwrap();
        repo.save(&session).await.unwrap();
        session
    }

    fn build_gate(
        repo: &InMemorySessionRepository,
    ) -> (EvaluationGate, Arc<KeyValueRewardLedger>) {
        let ledger = Arc::new(KeyValueRewardLedger::new(Arc::new(InMemoryKeyValueStore::new())));
        (EvaluationGate::new(Arc::new(repo.clone()), ledger.clone()), ledger)
    }

    #[tokio::test]
    async fn apply_persists_evaluation_fields() {
        let repo = InMemorySessionRepository::new();
        let (gate, _) = build_gate(&repo);
        let mut session = saved_session(&repo, "Photosynthesis").await;

        gate.apply(&mut session, &evaluation(true, 72)).await.unwrap();

        let stored = repo.find_by_id(session.id()).await.unwrap().unwrap();
        assert!(stored.is_completed());
        assert_eq!(stored.confidence_score(), Some(ConfidenceScore::new(72)));
        assert_eq!(stored.summary(), Some("Understands the basics"));
        assert_eq!(stored.feedback(), Some("Review the light reactions"));
    }

    #[tokio::test]
    async fn high_score_awards_mastery_and_points() {
        let repo = InMemorySessionRepository::new();
        let (gate, ledger) = build_gate(&repo);
        let mut session = saved_session(&repo, "Photosynthesis").await;

        let events = gate.apply(&mut session, &evaluation(true, 85)).await.unwrap();

        assert!(events.contains(&RewardEvent::badge(BadgeId::DeepLearner)));
        let badges = ledger.badges(&user()).await.unwrap();
        assert_eq!(badges.len(), 1);
        assert_eq!(badges[0].id, "deep_learner");
        let achievements = ledger.achievements(&user()).await.unwrap();
        assert_eq!(achievements[0].achievement.id, AchievementId::TopicMastery.as_str());
        assert_eq!(achievements[0].topic, "Photosynthesis");
        assert_eq!(ledger.points(&user()).await.unwrap(), 18);
    }

    #[tokio::test]
    async fn third_completed_topic_awards_knowledge_seeker() {
        let repo = InMemorySessionRepository::new();
        let (gate, ledger) = build_gate(&repo);

        for topic in ["Optics", "Gravity"] {
            let mut session = saved_session(&repo, topic).await;
            gate.apply(&mut session, &evaluation(true, 50)).await.unwrap();
        }
        let badges = ledger.badges(&user()).await.unwrap();
        assert!(badges.iter().all(|b| b.id != "knowledge_seeker"));

        let mut third = saved_session(&repo, "Magnetism").await;
        let events = gate.apply(&mut third, &evaluation(true, 50)).await.unwrap();
        assert!(events.contains(&RewardEvent::badge(BadgeId::KnowledgeSeeker)));
    }

    #[tokio::test]
    async fn repeated_mastery_does_not_duplicate_badges() {
        let repo = InMemorySessionRepository::new();
        let (gate, ledger) = build_gate(&repo);

        for _ in 0..2 {
            let mut session = saved_session(&repo, "Optics").await;
            gate.apply(&mut session, &evaluation(true, 90)).await.unwrap();
        }

        assert_eq!(ledger.badges(&user()).await.unwrap().len(), 1);
        assert_eq!(ledger.achievements(&user()).await.unwrap().len(), 1);
        assert_eq!(ledger.points(&user()).await.unwrap(), 38);
    }

    #[tokio::test]
    async fn progress_tracks_best_score() {
        let repo = InMemorySessionRepository::new();
        let (gate, ledger) = build_gate(&repo);

        for (completed, score) in [(false, 40), (true, 75)] {
            let mut session = saved_session(&repo, "Optics").await;
            gate.apply(&mut session, &evaluation(completed, score)).await.unwrap();
        }

        let progress = ledger.topic_progress(&user(), "Optics").await.unwrap().unwrap();
        assert_eq!(progress.sessions_evaluated, 2);
        assert_eq!(progress.sessions_completed, 1);
        assert_eq!(progress.best_score, Some(ConfidenceScore::new(75)));
    }

    #[tokio::test]
    async fn unknown_session_fails_before_rewards() {
        let repo = InMemorySessionRepository::new();
        let (gate, ledger) = build_gate(&repo);
        let mut session = LearningSession::new(SessionId::new(), user(), "Optics").unwrap();

        let err = gate.apply(&mut session, &evaluation(true, 95)).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::SessionNotFound);
        assert!(ledger.badges(&user()).await.unwrap().is_empty());
        assert_eq!(ledger.points(&user()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_quiz_awards_nothing() {
        let repo = InMemorySessionRepository::new();
        let (gate, ledger) = build_gate(&repo);

        let events = gate.award_quiz(&user(), 0, 0).await;

        assert!(events.is_empty());
        assert_eq!(ledger.points(&user()).await.unwrap(), 0);
        assert!(ledger.badges(&user()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ninety_percent_quiz_awards_points_and_quiz_master() {
        let repo = InMemorySessionRepository::new();
        let (gate, ledger) = build_gate(&repo);

        let events = gate.award_quiz(&user(), 9, 10).await;

        assert!(events.contains(&RewardEvent::badge(BadgeId::QuizMaster)));
        assert_eq!(ledger.points(&user()).await.unwrap(), 90);
        let badges = ledger.badges(&user()).await.unwrap();
        assert_eq!(badges.len(), 1);
        assert_eq!(badges[0].id, "quiz_master");
    }

    #[tokio::test]
    async fn eighty_nine_percent_quiz_awards_points_only() {
        let repo = InMemorySessionRepository::new();
        let (gate, ledger) = build_gate(&repo);

        let events = gate.award_quiz(&user(), 89, 100).await;

        assert_eq!(events, vec![RewardEvent::points(89)]);
        assert_eq!(ledger.points(&user()).await.unwrap(), 89);
        assert!(ledger.badges(&user()).await.unwrap().is_empty());
    }

    fn disk_full() -> RewardError {
        KeyValueError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk full")).into()
    }

    struct BrokenLedger;

    #[async_trait]
    impl RewardLedger for BrokenLedger {
        async fn award_badge(&self, _: &UserId, _: BadgeId) -> Result<bool, RewardError> {
            Err(disk_full())
        }
        async fn award_achievement(
            &self,
            _: &UserId,
            _: AchievementId,
            _: &str,
        ) -> Result<bool, RewardError> {
            Err(disk_full())
        }
        async fn add_points(&self, _: &UserId, _: u32) -> Result<u32, RewardError> {
            Err(disk_full())
        }
        async fn badges(&self, _: &UserId) -> Result<Vec<crate::domain::rewards::Badge>, RewardError> {
            Ok(Vec::new())
        }
        async fn achievements(
            &self,
            _: &UserId,
        ) -> Result<Vec<crate::domain::rewards::EarnedAchievement>, RewardError> {
            Ok(Vec::new())
        }
        async fn points(&self, _: &UserId) -> Result<u32, RewardError> {
            Ok(0)
        }
        async fn topic_progress(
            &self,
            _: &UserId,
            _: &str,
        ) -> Result<Option<TopicProgress>, RewardError> {
            Err(disk_full())
        }
        async fn save_topic_progress(&self, _: &UserId, _: &TopicProgress) -> Result<(), RewardError> {
            Err(disk_full())
        }
    }

    #[tokio::test]
    async fn reward_failures_do_not_fail_the_evaluation() {
        let repo = InMemorySessionRepository::new();
        let gate = EvaluationGate::new(Arc::new(repo.clone()), Arc::new(BrokenLedger));
        let mut session = saved_session(&repo, "Optics").await;

        let events = gate.apply(&mut session, &evaluation(true, 85)).await.unwrap();

        assert_eq!(events.len(), 3);
        assert!(repo.find_by_id(session.id()).await.unwrap().unwrap().is_evaluated());
    }

    #[tokio::test]
    async fn quiz_reward_failures_still_return_events() {
        let repo = InMemorySessionRepository::new();
        let gate = EvaluationGate::new(Arc::new(repo), Arc::new(BrokenLedger));

        let events = gate.award_quiz(&user(), 10, 10).await;

        assert_eq!(events.len(), 2);
    }
}
