//! Text conventions shared with the tutor model.
//!
//! A continuation reply may carry two labelled sections:
//!
//! ```text
//! FEEDBACK: <comment on the learner's answer>
//!
//! QUESTION: <next Socratic question>
//! ```
//!
//! Replies without both labels are used verbatim as the next question.
//! Structured payloads (evaluations, flashcards, quizzes) arrive embedded in
//! free-form text and are located with [`extract_json_block`].

use once_cell::sync::Lazy;
use regex::Regex;

static FEEDBACK_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)FEEDBACK:(.*?)(?:QUESTION:|\z)").expect("valid feedback regex")
});

static QUESTION_SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)QUESTION:(.*)\z").expect("valid question regex"));

static JSON_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("valid object regex"));

static JSON_ARRAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\[.*\]").expect("valid array regex"));

/// A continuation reply from the tutor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TutorReply {
    /// Feedback on the last answer followed by the next question.
    Structured { feedback: String, question: String },
    /// Unlabelled text, shown as the next question unchanged.
    Plain(String),
}

impl TutorReply {
    /// Text of the question turn: the labelled question, or the whole plain reply.
    pub fn question(&self) -> &str {
        match self {
            TutorReply::Structured { question, .. } => question,
            TutorReply::Plain(text) => text,
        }
    }
}

/// Splits a continuation reply into its feedback and question sections.
pub fn parse_continuation(raw: &str) -> TutorReply {
    let feedback = FEEDBACK_SECTION
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim());
    let question = QUESTION_SECTION
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim());

    match (feedback, question) {
        (Some(feedback), Some(question)) if !feedback.is_empty() && !question.is_empty() => {
            TutorReply::Structured {
                feedback: feedback.to_string(),
                question: question.to_string(),
            }
        }
        _ => TutorReply::Plain(raw.to_string()),
    }
}

/// Returns the widest `{...}` span in `text`, or the widest `[...]` span,
/// or the whole text when neither is present.
pub fn extract_json_block(text: &str) -> &str {
    JSON_OBJECT
        .find(text)
        .or_else(|| JSON_ARRAY.find(text))
        .map(|m| m.as_str())
        .unwrap_or(text)
}

/// Like [`extract_json_block`] but prefers arrays, for list payloads.
pub fn extract_json_array(text: &str) -> &str {
    JSON_ARRAY
        .find(text)
        .or_else(|| JSON_OBJECT.find(text))
        .map(|m| m.as_str())
        .unwrap_or(text)
}
