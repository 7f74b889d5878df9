//! Study material generation settings

use serde::Deserialize;

use super::error::ValidationError;

const MAX_FLASHCARDS: u32 = 30;
const MAX_QUIZ_QUESTIONS: u32 = 20;

/// Defaults applied when a request does not say how much to generate
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TutorConfig {
    /// Flashcards per deck
    #[serde(default = "default_flashcard_count")]
    pub flashcard_count: u32,

    /// Questions per challenge quiz
    #[serde(default = "default_quiz_question_count")]
    pub quiz_question_count: u32,
}

impl TutorConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.flashcard_count == 0 || self.flashcard_count > MAX_FLASHCARDS {
            return Err(ValidationError::CountOutOfRange {
                field: "flashcard_count",
                max: MAX_FLASHCARDS,
            });
        }
        if self.quiz_question_count == 0 || self.quiz_question_count > MAX_QUIZ_QUESTIONS {
            return Err(ValidationError::CountOutOfRange {
                field: "quiz_question_count",
                max: MAX_QUIZ_QUESTIONS,
            });
        }
        Ok(())
    }
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            flashcard_count: default_flashcard_count(),
            quiz_question_count: default_quiz_question_count(),
        }
    }
}

fn default_flashcard_count() -> u32 {
    8
}

fn default_quiz_question_count() -> u32 {
    5
}
