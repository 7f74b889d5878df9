//! Reward ledger over a [`KeyValueStore`].
//!
//! Keys per learner:
//!
//! | key | value |
//! |-----|-------|
//! | `user_badges_{user}` | `["first_session", ...]` |
//! | `user_achievements_{user}` | `[{"id": "topic_mastery", "topic": "..."}]` |
//! | `user_points_{user}` | `120` |
//! | `topic_progress_{user}_{topic}` | [`TopicProgress`] |
//!
//! Read-modify-write sequences are serialized through one lock so awards
//! from the same process never lose updates.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::foundation::UserId;
use crate::domain::rewards::{
    achievement, badge, AchievementId, Badge, BadgeId, EarnedAchievement, TopicProgress,
};
use crate::ports::{KeyValueStore, RewardError, RewardLedger};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct AchievementRecord {
    id: String,
    topic: String,
}

pub struct KeyValueRewardLedger {
    store: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl KeyValueRewardLedger {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    fn badges_key(user_id: &UserId) -> String {
        format!("user_badges_{}", user_id)
    }

    fn achievements_key(user_id: &UserId) -> String {
        format!("user_achievements_{}", user_id)
    }

    fn points_key(user_id: &UserId) -> String {
        format!("user_points_{}", user_id)
    }

    fn progress_key(user_id: &UserId, topic: &str) -> String {
        format!("topic_progress_{}_{}", user_id, topic)
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, RewardError> {
        match self.store.get(key).await? {
            None => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| RewardError::Corrupt {
                    key: key.to_string(),
                    message: e.to_string(),
                }),
        }
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), RewardError> {
        let value = serde_json::to_value(value).map_err(crate::ports::KeyValueError::from)?;
        self.store.set(key, value).await?;
        Ok(())
    }

    async fn badge_ids(&self, user_id: &UserId) -> Result<Vec<String>, RewardError> {
        Ok(self
            .read::<Vec<String>>(&Self::badges_key(user_id))
            .await?
            .unwrap_or_default())
    }

    async fn achievement_records(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<AchievementRecord>, RewardError> {
        Ok(self
            .read::<Vec<AchievementRecord>>(&Self::achievements_key(user_id))
            .await?
            .unwrap_or_default())
    }
}

#[async_trait]
impl RewardLedger for KeyValueRewardLedger {
    async fn award_badge(&self, user_id: &UserId, badge_id: BadgeId) -> Result<bool, RewardError> {
        let _guard = self.write_lock.lock().await;
        let mut ids = self.badge_ids(user_id).await?;
        if ids.iter().any(|id| id == badge_id.as_str()) {
            return Ok(false);
        }
        ids.push(badge_id.as_str().to_string());
        self.write(&Self::badges_key(user_id), &ids).await?;
        tracing::info!(user_id = %user_id, badge = badge_id.as_str(), "badge awarded");
        Ok(true)
    }

    async fn award_achievement(
        &self,
        user_id: &UserId,
        achievement_id: AchievementId,
        topic: &str,
    ) -> Result<bool, RewardError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.achievement_records(user_id).await?;
        if records.iter().any(|r| r.id == achievement_id.as_str()) {
            return Ok(false);
        }
        records.push(AchievementRecord {
            id: achievement_id.as_str().to_string(),
            topic: topic.to_string(),
        });
        self.write(&Self::achievements_key(user_id), &records).await?;
        tracing::info!(
            user_id = %user_id,
            achievement = achievement_id.as_str(),
            topic,
            "achievement awarded"
        );
        Ok(true)
    }

    async fn add_points(&self, user_id: &UserId, points: u32) -> Result<u32, RewardError> {
        let _guard = self.write_lock.lock().await;
        let key = Self::points_key(user_id);
        let total = self
            .read::<u32>(&key)
            .await?
            .unwrap_or(0)
            .saturating_add(points);
        self.write(&key, &total).await?;
        Ok(total)
    }

    async fn badges(&self, user_id: &UserId) -> Result<Vec<Badge>, RewardError> {
        Ok(self
            .badge_ids(user_id)
            .await?
            .iter()
            .filter_map(|id| badge(id).cloned())
            .collect())
    }

    async fn achievements(&self, user_id: &UserId) -> Result<Vec<EarnedAchievement>, RewardError> {
        Ok(self
            .achievement_records(user_id)
            .await?
            .into_iter()
            .filter_map(|record| {
                achievement(&record.id).map(|a| EarnedAchievement {
                    achievement: a.clone(),
                    topic: record.topic,
                })
            })
            .collect())
    }

    async fn points(&self, user_id: &UserId) -> Result<u32, RewardError> {
        Ok(self
            .read::<u32>(&Self::points_key(user_id))
            .await?
            .unwrap_or(0))
    }

    async fn topic_progress(
        &self,
        user_id: &UserId,
        topic: &str,
    ) -> Result<Option<TopicProgress>, RewardError> {
        self.read(&Self::progress_key(user_id, topic)).await
    }

    async fn save_topic_progress(
        &self,
        user_id: &UserId,
        progress: &TopicProgress,
    ) -> Result<(), RewardError> {
        self.write(&Self::progress_key(user_id, &progress.topic), progress)
            .await
    }
}
