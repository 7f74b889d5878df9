//! Generic payloads substituted when study-material generation fails.

use crate::ports::{ChallengeQuiz, Flashcard, QuizQuestion, TutorAction, TutorError};

/// Longest topic label kept when extraction falls back to the raw prompt.
pub const MAX_FALLBACK_TOPIC_CHARS: usize = 50;

/// Time limit of the canned quiz.
const FALLBACK_QUIZ_SECONDS: u32 = 60;

pub(super) fn warn_fallback(action: TutorAction, reason: &TutorError) {
    tracing::warn!(action = %action, error = %reason, "using fallback payload");
}

/// Raw prompt cut to a short label.
pub fn fallback_topic(prompt: &str) -> String {
    prompt
        .trim()
        .chars()
        .take(MAX_FALLBACK_TOPIC_CHARS)
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Generic study notes for `topic`.
pub fn fallback_summary(topic: &str) -> String {
    [
        format!("Here are your summarized notes on {topic}:"),
        format!("• {topic} is a fascinating subject with many applications"),
        format!("• Learning about {topic} involves understanding key concepts and principles"),
        format!("• The foundations of {topic} were established through rigorous research and study"),
        format!("• Modern applications of {topic} include technological advancements and practical implementations"),
        format!("• Several theories exist to explain the foundational mechanisms of {topic}"),
        format!("• Understanding {topic} requires both theoretical knowledge and practical application"),
        format!("• Recent developments in {topic} have opened new avenues for exploration and discovery"),
    ]
    .join("\n\n")
}

/// Two generic cards for `topic`.
pub fn fallback_flashcards(topic: &str) -> Vec<Flashcard> {
    vec![
        Flashcard {
            question: format!("What is {topic}?"),
            answer: format!("{topic} is an important subject with key concepts and principles."),
        },
        Flashcard {
            question: format!("Why is {topic} important?"),
            answer: format!("{topic} has significant applications in many fields."),
        },
    ]
}

/// A one-question quiz for `topic`.
pub fn fallback_quiz(topic: &str) -> ChallengeQuiz {
    ChallengeQuiz {
        questions: vec![QuizQuestion {
            question: format!("What is a key concept in {topic}?"),
            options: ["Option A", "Option B", "Option C", "Option D"]
                .iter()
                .map(|o| o.to_string())
                .collect(),
            correct_answer_index: 0,
        }],
        time_limit_seconds: FALLBACK_QUIZ_SECONDS,
    }
}
