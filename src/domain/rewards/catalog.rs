//! Fixed catalog of badges and achievements.

use serde::{Deserialize, Serialize};

/// A badge a learner can earn once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub image: &'static str,
    pub criteria: &'static str,
}

/// An achievement earned once and tied to the topic that earned it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub image: &'static str,
    pub share_title: &'static str,
    pub share_description: &'static str,
}

/// An achievement together with the topic it was earned on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EarnedAchievement {
    pub achievement: Achievement,
    pub topic: String,
}

/// Badge identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeId {
    FirstSession,
    DeepLearner,
    QuickStudy,
    CuriousMind,
    KnowledgeSeeker,
    QuizMaster,
}

impl BadgeId {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeId::FirstSession => "first_session",
            BadgeId::DeepLearner => "deep_learner",
            BadgeId::QuickStudy => "quick_study",
            BadgeId::CuriousMind => "curious_mind",
            BadgeId::KnowledgeSeeker => "knowledge_seeker",
            BadgeId::QuizMaster => "quiz_master",
        }
    }
}

/// Achievement identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    TopicMastery,
    ConsistentLearner,
}

impl AchievementId {
    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementId::TopicMastery => "topic_mastery",
            AchievementId::ConsistentLearner => "consistent_learner",
        }
    }
}

pub static BADGES: [Badge; 6] = [
    Badge {
        id: "first_session",
        name: "First Steps",
        description: "Started your first learning session",
        image: "🔰",
        criteria: "Complete 1 learning session",
    },
    Badge {
        id: "deep_learner",
        name: "Deep Learner",
        description: "Achieved a high understanding score",
        image: "🧠",
        criteria: "Get 80% or higher on a learning evaluation",
    },
    Badge {
        id: "quick_study",
        name: "Quick Study",
        description: "Completed a session in record time",
        image: "⚡",
        criteria: "Complete a session in under 5 minutes",
    },
    Badge {
        id: "curious_mind",
        name: "Curious Mind",
        description: "Asked a lot of great questions",
        image: "❓",
        criteria: "Send 10+ messages in a single session",
    },
    Badge {
        id: "knowledge_seeker",
        name: "Knowledge Seeker",
        description: "Explored multiple topics",
        image: "🔍",
        criteria: "Study 3 different topics",
    },
    Badge {
        id: "quiz_master",
        name: "Quiz Master",
        description: "Aced a challenge quiz",
        image: "🎯",
        criteria: "Score 90% or higher on a challenge quiz",
    },
];

pub static ACHIEVEMENTS: [Achievement; 2] = [
    Achievement {
        id: "topic_mastery",
        name: "Topic Mastery",
        description: "Achieved complete understanding of a topic",
        image: "🏆",
        share_title: "Achieved Topic Mastery on Socratix",
        share_description:
            "Demonstrated comprehensive understanding of a complex topic through Socratic dialogue.",
    },
    Achievement {
        id: "consistent_learner",
        name: "Consistent Learner",
        description: "Completed learning sessions on 5 consecutive days",
        image: "📚",
        share_title: "Consistent Learner Achievement on Socratix",
        share_description:
            "Demonstrated dedication to continuous learning through daily study sessions.",
    },
];

/// Looks up a badge by id. Unknown ids resolve to `None`.
pub fn badge(id: &str) -> Option<&'static Badge> {
    BADGES.iter().find(|b| b.id == id)
}

/// Looks up an achievement by id. Unknown ids resolve to `None`.
pub fn achievement(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}
