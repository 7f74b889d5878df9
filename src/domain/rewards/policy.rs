//! Evaluation gate policy.
//!
//! Decides when a dialogue is ready to be evaluated and which rewards an
//! evaluation earns. Both functions are pure; applying the rewards is the
//! job of the application layer.

use std::collections::HashSet;

use crate::domain::conversation::{user_turn_count, Turn};
use crate::domain::session::Evaluation;

use super::{AchievementId, BadgeId, RewardEvent};

/// Learner answers required before the dialogue is evaluated.
pub const EVALUATION_THRESHOLD: usize = 5;

/// Minimum confidence that earns mastery rewards.
pub const MASTERY_SCORE: u8 = 80;

/// Distinct completed topics that earn the knowledge seeker badge.
pub const KNOWLEDGE_SEEKER_TOPICS: usize = 3;

/// Points every evaluated session earns before the confidence bonus.
pub const BASE_SESSION_POINTS: u32 = 10;

/// Minimum challenge quiz score, in percent, that earns the quiz master badge.
pub const QUIZ_MASTER_SCORE: u32 = 90;

/// True once the learner has answered at least [`EVALUATION_THRESHOLD`] times.
pub fn should_evaluate(turns: &[Turn]) -> bool {
    user_turn_count(turns) >= EVALUATION_THRESHOLD
}

/// Points awarded for one evaluation: base plus one per full ten of confidence.
pub fn session_points(evaluation: &Evaluation) -> u32 {
    BASE_SESSION_POINTS + evaluation.confidence_score.tens()
}

/// Rewards earned by `evaluation` on `topic`.
///
/// `completed_topics` is the learner's set of topics with a completed
/// session, already including this one when it completed.
pub fn reward_events(
    evaluation: &Evaluation,
    topic: &str,
    completed_topics: &HashSet<String>,
) -> Vec<RewardEvent> {
    let mut events = Vec::new();

    if evaluation.confidence_score.value() >= MASTERY_SCORE {
        events.push(RewardEvent::badge(BadgeId::DeepLearner));
        events.push(RewardEvent::achievement(AchievementId::TopicMastery, topic));
    }

    if completed_topics.len() >= KNOWLEDGE_SEEKER_TOPICS {
        events.push(RewardEvent::badge(BadgeId::KnowledgeSeeker));
    }

    events.push(RewardEvent::points(session_points(evaluation)));
    events
}

/// Quiz score as a whole percentage, rounded half up. `None` for an empty quiz.
pub fn quiz_score_percent(correct: u32, total: u32) -> Option<u32> {
    if total == 0 {
        return None;
    }
    let correct = u64::from(correct.min(total));
    let total = u64::from(total);
    Some(((correct * 200 + total) / (total * 2)) as u32)
}

/// Rewards earned by finishing a challenge quiz.
///
/// The score percentage is awarded as points; a score of at least
/// [`QUIZ_MASTER_SCORE`] also earns the quiz master badge.
pub fn quiz_reward_events(correct: u32, total: u32) -> Vec<RewardEvent> {
    let Some(percent) = quiz_score_percent(correct, total) else {
        return Vec::new();
    };

    let mut events = vec![RewardEvent::points(percent)];
    if percent >= QUIZ_MASTER_SCORE {
        events.push(RewardEvent::badge(BadgeId::QuizMaster));
    }
    events
}
