//! Per-topic study progress.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConfidenceScore, Timestamp};

/// What a learner has achieved on one topic across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicProgress {
    pub topic: String,
    pub sessions_evaluated: u32,
    pub sessions_completed: u32,
    pub best_score: Option<ConfidenceScore>,
    pub last_studied_at: Timestamp,
}

impl TopicProgress {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            sessions_evaluated: 0,
            sessions_completed: 0,
            best_score: None,
            last_studied_at: Timestamp::now(),
        }
    }

    /// Folds one evaluated session into the progress record.
    pub fn record(&mut self, completed: bool, score: ConfidenceScore) {
        self.sessions_evaluated += 1;
        if completed {
            self.sessions_completed += 1;
        }
        self.best_score = Some(self.best_score.map_or(score, |best| best.max(score)));
        self.last_studied_at = Timestamp::now();
    }
}
