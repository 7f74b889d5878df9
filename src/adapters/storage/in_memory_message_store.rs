//! In-Memory Message Store Adapter
//!
//! Keeps each session's turns in a map keyed by sequence, so listing is
//! naturally ordered and duplicate sequences are detected on insert.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::{Turn, TurnDraft};
use crate::domain::foundation::SessionId;
use crate::ports::{MessageStore, StoreError};

/// In-memory turn log
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageStore {
    sessions: Arc<RwLock<HashMap<SessionId, BTreeMap<u32, Turn>>>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored turns across all sessions
    pub async fn turn_count(&self) -> usize {
        self.sessions.read().await.values().map(BTreeMap::len).sum()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(&self, draft: TurnDraft) -> Result<Turn, StoreError> {
        let turn = Turn::from_draft(draft)?;
        let mut sessions = self.sessions.write().await;
        let log = sessions.entry(*turn.session_id()).or_default();
        if log.contains_key(&turn.sequence()) {
            return Err(StoreError::Conflict {
                session_id: *turn.session_id(),
                sequence: turn.sequence(),
            });
        }
        log.insert(turn.sequence(), turn.clone());
        Ok(turn)
    }

    async fn list(&self, session_id: &SessionId) -> Result<Vec<Turn>, StoreError> {
        Ok(self
            .sessions
            .read()
            .await
            .get(session_id)
            .map(|log| log.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn delete_for_session(&self, session_id: &SessionId) -> Result<(), StoreError> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn list_is_ordered_by_sequence_regardless_of_insert_order() {
        let store = InMemoryMessageStore::new();
        let session = SessionId::new();

        store.append(TurnDraft::user_answer(session, 2, "Light")).await.unwrap();
        store.append(TurnDraft::ai_question(session, 1, "Why?")).await.unwrap();
        store.append(TurnDraft::ai_question(session, 3, "And?")).await.unwrap();

        let sequences: Vec<u32> = store
            .list(&session)
            .await
            .unwrap()
            .iter()
            .map(Turn::sequence)
            .collect();
        assert_eq!(sequences, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn duplicate_sequence_is_a_conflict() {
        let store = InMemoryMessageStore::new();
        let session = SessionId::new();

        store.append(TurnDraft::ai_question(session, 1, "Why?")).await.unwrap();
        let err = store
            .append(TurnDraft::ai_question(session, 1, "Again?"))
            .await
            .unwrap_err();

        assert_eq!(err, StoreError::Conflict { session_id: session, sequence: 1 });
        assert_eq!(store.list(&session).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn same_sequence_in_other_session_is_fine() {
        let store = InMemoryMessageStore::new();
        store.append(TurnDraft::ai_question(SessionId::new(), 1, "A")).await.unwrap();
        store.append(TurnDraft::ai_question(SessionId::new(), 1, "B")).await.unwrap();
        assert_eq!(store.turn_count().await, 2);
    }

    #[tokio::test]
    async fn invalid_draft_is_rejected() {
        let store = InMemoryMessageStore::new();
        let err = store
            .append(TurnDraft::user_answer(SessionId::new(), 1, "   "))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }

    #[tokio::test]
    async fn delete_for_session_empties_the_log() {
        let store = InMemoryMessageStore::new();
        let session = SessionId::new();
        let other = SessionId::new();
        store.append(TurnDraft::ai_question(session, 1, "Why?")).await.unwrap();
        store.append(TurnDraft::user_answer(session, 2, "Light")).await.unwrap();
        store.append(TurnDraft::ai_question(other, 1, "Kept")).await.unwrap();

        store.delete_for_session(&session).await.unwrap();

        assert!(store.list(&session).await.unwrap().is_empty());
        assert_eq!(store.list(&other).await.unwrap().len(), 1);
    }
}
