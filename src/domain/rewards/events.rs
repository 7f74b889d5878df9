//! Reward side effects emitted by the evaluation policy.

use serde::{Deserialize, Serialize};

use super::{AchievementId, BadgeId};

/// A single reward to apply to a learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RewardEvent {
    AwardBadge { badge: BadgeId },
    AwardAchievement { achievement: AchievementId, topic: String },
    AwardPoints { points: u32 },
}

impl RewardEvent {
    pub fn badge(badge: BadgeId) -> Self {
        RewardEvent::AwardBadge { badge }
    }

    pub fn achievement(achievement: AchievementId, topic: impl Into<String>) -> Self {
        RewardEvent::AwardAchievement {
            achievement,
            topic: topic.into(),
        }
    }

    pub fn points(points: u32) -> Self {
        RewardEvent::AwardPoints { points }
    }
}
