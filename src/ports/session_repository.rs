//! Session repository port.
//!
//! Defines the contract for persisting and retrieving learning sessions.

use crate::domain::foundation::{DomainError, SessionId, UserId};
use crate::domain::session::LearningSession;
use async_trait::async_trait;

/// Repository port for learning session persistence.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Save a new session.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn save(&self, session: &LearningSession) -> Result<(), DomainError>;

    /// Update an existing session.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if session doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, session: &LearningSession) -> Result<(), DomainError>;

    /// Find a session by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<LearningSession>, DomainError>;

    /// Find all sessions owned by a user, newest first.
    async fn find_by_user_id(&self, user_id: &UserId)
        -> Result<Vec<LearningSession>, DomainError>;

    /// Count sessions owned by a user.
    async fn count_by_user(&self, user_id: &UserId) -> Result<u32, DomainError>;

    /// Distinct topics of the user's completed sessions.
    async fn completed_topics(&self, user_id: &UserId) -> Result<Vec<String>, DomainError>;

    /// Delete a session.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if session doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn delete(&self, id: &SessionId) -> Result<(), DomainError>;
}
