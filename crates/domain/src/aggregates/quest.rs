//! Quest aggregate - a repeatable or one-off goal with rewards

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{
    Description, DifficultyLevel, QuestName, QuestRepeatability, Reward,
};
use crate::QuestId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    id: QuestId,
    name: QuestName,
    #[serde(default)]
    description: Description,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    difficulty: DifficultyLevel,
    #[serde(default)]
    repeatability: QuestRepeatability,
    #[serde(default)]
    rewards: Vec<Reward>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Quest {
    pub fn new(name: QuestName, difficulty: DifficultyLevel, now: DateTime<Utc>) -> Self {
        Self {
            id: QuestId::new(),
            name,
            description: Description::empty(),
            icon: None,
            difficulty,
            repeatability: QuestRepeatability::default(),
            rewards: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: QuestId) -> Self {
        self.id = id;
        self
    }

    pub fn with_description(mut self, description: Description) -> Self {
        self.description = description;
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_repeatability(mut self, repeatability: QuestRepeatability) -> Self {
        self.repeatability = repeatability;
        self
    }

    pub fn with_rewards(mut self, rewards: Vec<Reward>) -> Self {
        self.rewards = rewards;
        self
    }

    #[inline]
    pub fn id(&self) -> QuestId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &QuestName {
        &self.name
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn difficulty(&self) -> DifficultyLevel {
        self.difficulty
    }

    pub fn repeatability(&self) -> QuestRepeatability {
        self.repeatability
    }

    /// Configured rewards only.
    pub fn rewards(&self) -> &[Reward] {
        &self.rewards
    }

    /// Configured rewards, or the difficulty's default payout if none are set.
    pub fn rewards_or_default(&self) -> Vec<Reward> {
        if self.rewards.is_empty() {
            Reward::default_for(self.difficulty)
        } else {
            self.rewards.clone()
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn rename(&mut self, name: QuestName) {
        self.name = name;
    }

    pub fn set_description(&mut self, description: Description) {
        self.description = description;
    }

    pub fn set_icon(&mut self, icon: Option<String>) {
        self.icon = icon;
    }

    pub fn set_difficulty(&mut self, difficulty: DifficultyLevel) {
        self.difficulty = difficulty;
    }

    pub fn set_repeatability(&mut self, repeatability: QuestRepeatability) {
        self.repeatability = repeatability;
    }

    pub fn set_rewards(&mut self, rewards: Vec<Reward>) {
        self.rewards = rewards;
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}
