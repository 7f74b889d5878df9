//! Tutor client port - the boundary to the question and evaluation generator.
//!
//! Every call may fail with a transient or permanent [`TutorError`]. Results
//! are typed per action so callers never inspect the shape of a reply.
//!
//! # Fallback policy
//!
//! Dialogue actions (`start`, `continue_dialogue`, `evaluate`) surface
//! malformed generator output as [`TutorError::MalformedOutput`]. The
//! auxiliary generators (`extract_topic`, `generate_summary`,
//! `generate_flashcards`, `generate_challenge_quiz`) substitute a generic
//! payload instead.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::conversation::{LearnerLevel, ResponseTiming};
use crate::domain::session::Evaluation;

use super::{AIError, Message};

/// Number of options every quiz question carries.
pub const QUIZ_OPTION_COUNT: usize = 4;

/// The generator actions understood by the tutor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TutorAction {
    Start,
    Continue,
    Evaluate,
    Challenge,
    ExtractTopic,
    GenerateFlashcards,
    GenerateSummary,
}

impl TutorAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TutorAction::Start => "start",
            TutorAction::Continue => "continue",
            TutorAction::Evaluate => "evaluate",
            TutorAction::Challenge => "challenge",
            TutorAction::ExtractTopic => "extract_topic",
            TutorAction::GenerateFlashcards => "generate_flashcards",
            TutorAction::GenerateSummary => "generate_summary",
        }
    }

    /// Dialogue actions have no fallback payload.
    pub fn is_dialogue(&self) -> bool {
        matches!(
            self,
            TutorAction::Start | TutorAction::Continue | TutorAction::Evaluate
        )
    }
}

impl fmt::Display for TutorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TutorAction {
    type Err = TutorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(TutorAction::Start),
            "continue" => Ok(TutorAction::Continue),
            "evaluate" => Ok(TutorAction::Evaluate),
            "challenge" => Ok(TutorAction::Challenge),
            "extract_topic" => Ok(TutorAction::ExtractTopic),
            "generate_flashcards" => Ok(TutorAction::GenerateFlashcards),
            "generate_summary" => Ok(TutorAction::GenerateSummary),
            other => Err(TutorError::invalid_request(format!(
                "Invalid action specified: {}",
                other
            ))),
        }
    }
}

/// Input for a dialogue continuation.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinueRequest {
    /// The learner's latest answer.
    pub user_response: String,
    /// Full dialogue so far, oldest first.
    pub history: Vec<Message>,
    pub level: Option<LearnerLevel>,
    pub timing: Option<ResponseTiming>,
}

/// Input for a final evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluateRequest {
    pub topic: String,
    /// Full dialogue so far, oldest first.
    pub history: Vec<Message>,
    pub level: Option<LearnerLevel>,
    pub timing: Option<ResponseTiming>,
}

/// A study flashcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    #[serde(rename = "correctAnswer", alias = "correct_answer_index")]
    pub correct_answer_index: usize,
}

impl QuizQuestion {
    pub fn is_well_formed(&self) -> bool {
        !self.question.trim().is_empty()
            && self.options.len() == QUIZ_OPTION_COUNT
            && self.correct_answer_index < self.options.len()
    }
}

/// A timed multiple-choice quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeQuiz {
    pub questions: Vec<QuizQuestion>,
    #[serde(rename = "timeLimit", alias = "time_limit_seconds")]
    pub time_limit_seconds: u32,
}

impl ChallengeQuiz {
    /// At least one question, each with four options and a valid answer index.
    pub fn is_well_formed(&self) -> bool {
        !self.questions.is_empty() && self.questions.iter().all(QuizQuestion::is_well_formed)
    }
}

/// Tutor client errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TutorError {
    /// The generator rate limited the request.
    #[error("rate limit reached, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    /// The generator rejected our credentials.
    #[error("API key configuration issue")]
    Authentication,

    /// The generator could not be reached or failed.
    #[error("tutor unavailable: {0}")]
    Unavailable(String),

    /// The generator replied, but not in the expected shape.
    #[error("malformed {action} output: {message}")]
    MalformedOutput { action: TutorAction, message: String },

    /// The request itself was invalid.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TutorError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        TutorError::Unavailable(message.into())
    }

    pub fn malformed(action: TutorAction, message: impl Into<String>) -> Self {
        TutorError::MalformedOutput {
            action,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        TutorError::InvalidRequest(message.into())
    }

    /// Returns true if retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TutorError::RateLimited { .. }
                | TutorError::Unavailable(_)
                | TutorError::MalformedOutput { .. }
        )
    }
}

impl From<AIError> for TutorError {
    fn from(err: AIError) -> Self {
        match err {
            AIError::RateLimited { retry_after_secs } => TutorError::RateLimited { retry_after_secs },
            AIError::AuthenticationFailed => TutorError::Authentication,
            AIError::InvalidRequest(message) => TutorError::InvalidRequest(message),
            AIError::ContextTooLong { .. } => TutorError::InvalidRequest(err.to_string()),
            other => TutorError::Unavailable(other.to_string()),
        }
    }
}

/// Port for the Socratic question, evaluation and study-material generator.
#[async_trait]
pub trait TutorClient: Send + Sync {
    /// The opening question for a topic.
    async fn start(&self, topic: &str) -> Result<String, TutorError>;

    /// Raw continuation text, optionally using the FEEDBACK/QUESTION labels.
    async fn continue_dialogue(&self, request: ContinueRequest) -> Result<String, TutorError>;

    /// Final assessment of the dialogue.
    async fn evaluate(&self, request: EvaluateRequest) -> Result<Evaluation, TutorError>;

    /// Short topic label from free-form input such as "I want to learn about X".
    async fn extract_topic(&self, prompt: &str) -> Result<String, TutorError>;

    /// Bullet-formatted study notes.
    async fn generate_summary(&self, topic: &str) -> Result<String, TutorError>;

    /// Ordered question/answer cards.
    async fn generate_flashcards(&self, topic: &str, count: u32)
        -> Result<Vec<Flashcard>, TutorError>;

    /// A timed multiple-choice quiz.
    async fn generate_challenge_quiz(
        &self,
        topic: &str,
        count: u32,
    ) -> Result<ChallengeQuiz, TutorError>;
}
