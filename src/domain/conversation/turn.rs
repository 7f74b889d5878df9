//! Turn entity for Socratic dialogues.
//!
//! A turn is one immutable entry in a session's ordered dialogue log. The
//! `sequence` is chosen by the caller (single writer per session); turns
//! ordered by sequence reconstruct the dialogue exactly as it was shown.

use crate::domain::foundation::{SessionId, Timestamp, TurnId, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Ai => "ai",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Sender::User),
            "ai" => Ok(Sender::Ai),
            other => Err(ValidationError::invalid_format(
                "sender",
                format!("unknown sender '{}'", other),
            )),
        }
    }
}

/// What a turn represents in the dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    Question,
    Answer,
    Evaluation,
    Feedback,
}

impl TurnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnKind::Question => "question",
            TurnKind::Answer => "answer",
            TurnKind::Evaluation => "evaluation",
            TurnKind::Feedback => "feedback",
        }
    }
}

impl fmt::Display for TurnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TurnKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "question" => Ok(TurnKind::Question),
            "answer" => Ok(TurnKind::Answer),
            "evaluation" => Ok(TurnKind::Evaluation),
            "feedback" => Ok(TurnKind::Feedback),
            other => Err(ValidationError::invalid_format(
                "message_type",
                format!("unknown turn kind '{}'", other),
            )),
        }
    }
}

/// A turn that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnDraft {
    pub session_id: SessionId,
    pub sequence: u32,
    pub content: String,
    pub sender: Sender,
    pub kind: TurnKind,
}

impl TurnDraft {
    pub fn new(
        session_id: SessionId,
        sequence: u32,
        content: impl Into<String>,
        sender: Sender,
        kind: TurnKind,
    ) -> Self {
        Self {
            session_id,
            sequence,
            content: content.into(),
            sender,
            kind,
        }
    }

    pub fn user_answer(session_id: SessionId, sequence: u32, content: impl Into<String>) -> Self {
        Self::new(session_id, sequence, content, Sender::User, TurnKind::Answer)
    }

    pub fn ai_question(session_id: SessionId, sequence: u32, content: impl Into<String>) -> Self {
        Self::new(session_id, sequence, content, Sender::Ai, TurnKind::Question)
    }

    pub fn ai_feedback(session_id: SessionId, sequence: u32, content: impl Into<String>) -> Self {
        Self::new(session_id, sequence, content, Sender::Ai, TurnKind::Feedback)
    }

    pub fn ai_evaluation(session_id: SessionId, sequence: u32, content: impl Into<String>) -> Self {
        Self::new(session_id, sequence, content, Sender::Ai, TurnKind::Evaluation)
    }
}

/// An immutable, persisted dialogue turn.
///
/// # Invariants
///
/// - `sequence` is at least 1
/// - `content` is non-empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    id: TurnId,
    session_id: SessionId,
    content: String,
    sender: Sender,
    kind: TurnKind,
    sequence: u32,
    created_at: Timestamp,
}

impl Turn {
    /// Materialises a draft into a turn with a fresh id and timestamp.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` if the sequence is zero
    /// - `EmptyField` if the content is blank
    pub fn from_draft(draft: TurnDraft) -> Result<Self, ValidationError> {
        if draft.sequence == 0 {
            return Err(ValidationError::out_of_range("sequence", 1, i64::from(u32::MAX), 0));
        }
        if draft.content.trim().is_empty() {
            return Err(ValidationError::empty_field("content"));
        }
        Ok(Self {
            id: TurnId::new(),
            session_id: draft.session_id,
            content: draft.content,
            sender: draft.sender,
            kind: draft.kind,
            sequence: draft.sequence,
            created_at: Timestamp::now(),
        })
    }

    /// Reconstitute a turn from persistence (no validation).
    pub fn reconstitute(
        id: TurnId,
        session_id: SessionId,
        content: String,
        sender: Sender,
        kind: TurnKind,
        sequence: u32,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            session_id,
            content,
            sender,
            kind,
            sequence,
            created_at,
        }
    }

    pub fn id(&self) -> &TurnId {
        &self.id
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn kind(&self) -> TurnKind {
        self.kind
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn is_from_user(&self) -> bool {
        self.sender == Sender::User
    }
}

/// Number of turns sent by the learner.
pub fn user_turn_count(turns: &[Turn]) -> usize {
    turns.iter().filter(|t| t.is_from_user()).count()
}

/// Sequence number for the next turn appended after `turns`.
///
/// Equals `turns.len() + 1` for a gapless log and never reuses a number
/// when the log has gaps.
pub fn next_sequence(turns: &[Turn]) -> u32 {
    let highest = turns.iter().map(Turn::sequence).max().unwrap_or(0);
    highest.max(turns.len() as u32) + 1
}
