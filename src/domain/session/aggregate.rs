//! Learning session aggregate.
//!
//! A session is one learning episode about a single topic. It is created when a
//! learner picks a topic and is mutated only when the dialogue is evaluated.
//! Turns are stored separately and referenced by session id.

use crate::domain::foundation::{
    ConfidenceScore, DomainError, ErrorCode, SessionId, Timestamp, UserId,
};
use serde::{Deserialize, Serialize};

use super::Evaluation;

/// Maximum length for a session topic.
pub const MAX_TOPIC_LENGTH: usize = 200;

/// Learning session aggregate.
///
/// # Invariants
///
/// - `id` is globally unique
/// - `topic` is 1-200 characters, non-empty
/// - evaluation fields are only set through `record_evaluation`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningSession {
    id: SessionId,
    user_id: UserId,
    topic: String,
    completed: bool,
    confidence_score: Option<ConfidenceScore>,
    summary: Option<String>,
    feedback: Option<String>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl LearningSession {
    /// Create a new, not yet evaluated session.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if topic is empty or too long
    pub fn new(id: SessionId, user_id: UserId, topic: impl Into<String>) -> Result<Self, DomainError> {
        let topic = topic.into().trim().to_string();
        Self::validate_topic(&topic)?;

        let now = Timestamp::now();
        Ok(Self {
            id,
            user_id,
            topic,
            completed: false,
            confidence_score: None,
            summary: None,
            feedback: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstitute a session from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: SessionId,
        user_id: UserId,
        topic: String,
        completed: bool,
        confidence_score: Option<ConfidenceScore>,
        summary: Option<String>,
        feedback: Option<String>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            topic,
            completed,
            confidence_score,
            summary,
            feedback,
            created_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn confidence_score(&self) -> Option<ConfidenceScore> {
        self.confidence_score
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    /// Returns true once an evaluation has been recorded.
    pub fn is_evaluated(&self) -> bool {
        self.confidence_score.is_some()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authorization
    // ─────────────────────────────────────────────────────────────────────────

    /// Checks if the given user owns this session.
    pub fn is_owner(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// Validates that the user can access this session.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if user is not the owner
    pub fn authorize(&self, user_id: &UserId) -> Result<(), DomainError> {
        if self.is_owner(user_id) {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                "User is not authorized to access this session",
            ))
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Copy the evaluation result onto the session.
    pub fn record_evaluation(&mut self, evaluation: &Evaluation) {
        self.completed = evaluation.completed;
        self.confidence_score = Some(evaluation.confidence_score);
        self.summary = Some(evaluation.summary.clone());
        self.feedback = evaluation.feedback.clone();
        self.updated_at = Timestamp::now();
    }

    fn validate_topic(topic: &str) -> Result<(), DomainError> {
        if topic.is_empty() {
            return Err(DomainError::validation("topic", "Topic cannot be empty"));
        }
        if topic.chars().count() > MAX_TOPIC_LENGTH {
            return Err(DomainError::validation(
                "topic",
                format!("Topic must be {} characters or less", MAX_TOPIC_LENGTH),
            ));
        }
        Ok(())
    }
}
