//! Terminal assessment of a learning session.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ConfidenceScore;

/// Structured assessment produced when a dialogue is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Whether the learner demonstrated a good understanding.
    pub completed: bool,

    /// 0-100 estimate of how well the topic was grasped.
    #[serde(alias = "confidenceScore")]
    pub confidence_score: ConfidenceScore,

    /// Short description of what the learner appears to understand.
    pub summary: String,

    /// Optional personalised advice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl Evaluation {
    /// Serializes the evaluation as the text stored in an evaluation turn.
    pub fn to_turn_content(&self) -> String {
        // Serializing plain strings, bools and integers cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| self.summary.clone())
    }
}
