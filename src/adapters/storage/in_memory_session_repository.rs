//! In-Memory Session Repository Adapter

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, SessionId, UserId};
use crate::domain::session::LearningSession;
use crate::ports::SessionRepository;

/// In-memory storage for learning sessions
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<SessionId, LearningSession>>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn not_found(id: &SessionId) -> DomainError {
        DomainError::new(ErrorCode::SessionNotFound, format!("Session not found: {}", id))
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn save(&self, session: &LearningSession) -> Result<(), DomainError> {
        self.sessions
            .write()
            .await
            .insert(*session.id(), session.clone());
        Ok(())
    }

    async fn update(&self, session: &LearningSession) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session.id()) {
            Some(existing) => {
                *existing = session.clone();
                Ok(())
            }
            None => Err(Self::not_found(session.id())),
        }
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<LearningSession>, DomainError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<LearningSession>, DomainError> {
        let mut sessions: Vec<_> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.user_id() == user_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created_at().cmp(a.created_at()));
        Ok(sessions)
    }

    async fn count_by_user(&self, user_id: &UserId) -> Result<u32, DomainError> {
        let count = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.user_id() == user_id)
            .count();
        Ok(count as u32)
    }

    async fn completed_topics(&self, user_id: &UserId) -> Result<Vec<String>, DomainError> {
        let topics: BTreeSet<String> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.user_id() == user_id && s.is_completed())
            .map(|s| s.topic().to_string())
            .collect();
        Ok(topics.into_iter().collect())
    }

    async fn delete(&self, id: &SessionId) -> Result<(), DomainError> {
        self.sessions
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ConfidenceScore;
    use crate::domain::session::Evaluation;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn session(owner: &str, topic: &str) -> LearningSession {
        LearningSession::new(SessionId::new(), user(owner), topic).unwrap()
    }

    fn completed(mut session: LearningSession) -> LearningSession {
        session.record_evaluation(&Evaluation {
            completed: true,
            confidence_score: ConfidenceScore::new(90),
            summary: "ok".to_string(),
            feedback: None,
        });
        session
    }

    #[tokio::test]
    async fn save_then_find() {
        let repo = InMemorySessionRepository::new();
        let s = session("u1", "Optics");
        repo.save(&s).await.unwrap();
        assert_eq!(repo.find_by_id(s.id()).await.unwrap(), Some(s));
    }

    #[tokio::test]
    async fn update_unknown_session_fails() {
        let repo = InMemorySessionRepository::new();
        let err = repo.update(&session("u1", "Optics")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionNotFound);
    }

    #[tokio::test]
    async fn find_by_user_is_scoped_and_newest_first() {
        let repo = InMemorySessionRepository::new();
        let first = session("u1", "A");
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = session("u1", "B");
        repo.save(&first).await.unwrap();
        repo.save(&second).await.unwrap();
        repo.save(&session("u2", "C")).await.unwrap();

        let topics: Vec<_> = repo
            .find_by_user_id(&user("u1"))
            .await
            .unwrap()
            .iter()
            .map(|s| s.topic().to_string())
            .collect();
        assert_eq!(topics, vec!["B", "A"]);
        assert_eq!(repo.count_by_user(&user("u1")).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn completed_topics_are_distinct() {
        let repo = InMemorySessionRepository::new();
        repo.save(&completed(session("u1", "Optics"))).await.unwrap();
        repo.save(&completed(session("u1", "Optics"))).await.unwrap();
        repo.save(&completed(session("u1", "Genetics"))).await.unwrap();
        repo.save(&session("u1", "Algebra")).await.unwrap();

        let topics = repo.completed_topics(&user("u1")).await.unwrap();
        assert_eq!(topics, vec!["Genetics".to_string(), "Optics".to_string()]);
    }

    #[tokio::test]
    async fn delete_removes_session() {
        let repo = InMemorySessionRepository::new();
        let s = session("u1", "Optics");
        repo.save(&s).await.unwrap();
        repo.delete(s.id()).await.unwrap();
        assert_eq!(repo.find_by_id(s.id()).await.unwrap(), None);
        assert!(repo.delete(s.id()).await.is_err());
    }
}
