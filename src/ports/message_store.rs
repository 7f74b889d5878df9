//! Message store port.
//!
//! Append-only log of dialogue turns per session. Sequence numbers are chosen
//! by the caller; the store only guarantees they stay unique per session and
//! that listing returns them in ascending order.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::conversation::{Turn, TurnDraft};
use crate::domain::foundation::{SessionId, ValidationError};

/// Message store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A turn with this sequence already exists for the session.
    #[error("turn {sequence} already exists for session {session_id}")]
    Conflict { session_id: SessionId, sequence: u32 },

    /// The draft failed validation.
    #[error("invalid turn: {0}")]
    Invalid(#[from] ValidationError),

    /// Storage backend failure.
    #[error("storage error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        StoreError::Backend(message.into())
    }
}

/// Port for persisting dialogue turns.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persists one turn.
    ///
    /// # Errors
    ///
    /// - `Conflict` if `(session, sequence)` is already taken
    /// - `Invalid` for a zero sequence or blank content
    /// - `Backend` on persistence failure
    async fn append(&self, draft: TurnDraft) -> Result<Turn, StoreError>;

    /// All turns of a session, ascending by sequence. Unknown sessions yield
    /// an empty list.
    async fn list(&self, session_id: &SessionId) -> Result<Vec<Turn>, StoreError>;

    /// Removes every turn of a session.
    async fn delete_for_session(&self, session_id: &SessionId) -> Result<(), StoreError>;
}
