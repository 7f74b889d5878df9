//! Rewards domain module.
//!
//! Badge and achievement catalog, reward events and the policy that turns an
//! evaluation into rewards.

mod catalog;
mod events;
mod policy;
mod progress;

pub use catalog::{
    achievement, badge, Achievement, AchievementId, Badge, BadgeId, EarnedAchievement,
    ACHIEVEMENTS, BADGES,
};
pub use events::RewardEvent;
pub use policy::{
    quiz_reward_events, quiz_score_percent, reward_events, session_points, should_evaluate,
    BASE_SESSION_POINTS, EVALUATION_THRESHOLD, KNOWLEDGE_SEEKER_TOPICS, MASTERY_SCORE,
    QUIZ_MASTER_SCORE,
};
pub use progress::TopicProgress;
