//! Reward ledger port.
//!
//! Records badges, achievements, points and per-topic progress for a learner.
//! Awarding something the learner already holds is a no-op.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::UserId;
use crate::domain::rewards::{AchievementId, Badge, BadgeId, EarnedAchievement, TopicProgress};

use super::KeyValueError;

/// Reward ledger errors.
#[derive(Debug, Error)]
pub enum RewardError {
    #[error("reward storage failed: {0}")]
    Storage(#[from] KeyValueError),

    #[error("corrupt reward record under '{key}': {message}")]
    Corrupt { key: String, message: String },
}

/// Port for applying and reading rewards.
#[async_trait]
pub trait RewardLedger: Send + Sync {
    /// Awards a badge. Returns `false` if the learner already held it.
    async fn award_badge(&self, user_id: &UserId, badge: BadgeId) -> Result<bool, RewardError>;

    /// Awards an achievement for a topic. Returns `false` if the learner
    /// already held an achievement with this id.
    async fn award_achievement(
        &self,
        user_id: &UserId,
        achievement: AchievementId,
        topic: &str,
    ) -> Result<bool, RewardError>;

    /// Adds points and returns the new total.
    async fn add_points(&self, user_id: &UserId, points: u32) -> Result<u32, RewardError>;

    /// Badges held by the learner, in award order.
    async fn badges(&self, user_id: &UserId) -> Result<Vec<Badge>, RewardError>;

    /// Achievements held by the learner, in award order.
    async fn achievements(&self, user_id: &UserId) -> Result<Vec<EarnedAchievement>, RewardError>;

    /// Total points.
    async fn points(&self, user_id: &UserId) -> Result<u32, RewardError>;

    /// Progress on one topic, if any was recorded.
    async fn topic_progress(
        &self,
        user_id: &UserId,
        topic: &str,
    ) -> Result<Option<TopicProgress>, RewardError>;

    /// Stores progress on one topic.
    async fn save_topic_progress(
        &self,
        user_id: &UserId,
        progress: &TopicProgress,
    ) -> Result<(), RewardError>;
}
