//! Quest rewards and difficulty-based defaults

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Class that default experience rewards are credited to.
pub const GENERAL_CLASS: &str = "General";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RewardType {
    Experience,
    Currency,
    /// Not backed by an inventory yet; applying it is a no-op.
    Item,
    /// Not backed by an achievement system yet; applying it is a no-op.
    Badge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DifficultyLevel {
    Trivial,
    #[default]
    Easy,
    Medium,
    Hard,
    CrazyHard,
}

impl DifficultyLevel {
    /// Default (experience, gold) payout for a quest of this difficulty.
    pub fn default_payout(self) -> (i64, i64) {
        match self {
            Self::Trivial => (10, 5),
            Self::Easy => (25, 15),
            Self::Medium => (50, 30),
            Self::Hard => (100, 60),
            Self::CrazyHard => (200, 120),
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Trivial => "Trivial",
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::CrazyHard => "CrazyHard",
        };
        f.write_str(s)
    }
}

impl FromStr for DifficultyLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trivial" => Ok(Self::Trivial),
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            "crazyhard" | "crazy_hard" => Ok(Self::CrazyHard),
            _ => Err(DomainError::parse(format!("Unknown difficulty: {}", s))),
        }
    }
}

/// A single reward granted when a quest run completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    reward_type: RewardType,
    /// Class name for experience, currency name for currency.
    reward_class: String,
    amount: i64,
    #[serde(default)]
    icon: Option<String>,
}

impl Reward {
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a negative amount or an empty class.
    pub fn new(
        reward_type: RewardType,
        reward_class: impl Into<String>,
        amount: i64,
    ) -> Result<Self, DomainError> {
        let reward_class = reward_class.into().trim().to_string();
        if amount < 0 {
            return Err(DomainError::validation("Reward amount cannot be negative"));
        }
        if reward_class.is_empty() {
            return Err(DomainError::validation("Reward class cannot be empty"));
        }
        Ok(Self {
            reward_type,
            reward_class,
            amount,
            icon: None,
        })
    }

    pub fn experience(class: impl Into<String>, amount: i64) -> Result<Self, DomainError> {
        Self::new(RewardType::Experience, class, amount)
    }

    pub fn currency(currency: impl Into<String>, amount: i64) -> Result<Self, DomainError> {
        Self::new(RewardType::Currency, currency, amount)
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// The rewards a quest grants when it has none configured.
    pub fn default_for(difficulty: DifficultyLevel) -> Vec<Reward> {
        let (xp, gold) = difficulty.default_payout();
        vec![
            Self {
                reward_type: RewardType::Experience,
                reward_class: GENERAL_CLASS.to_string(),
                amount: xp,
                icon: None,
            },
            Self {
                reward_type: RewardType::Currency,
                reward_class: "Gold".to_string(),
                amount: gold,
                icon: None,
            },
        ]
    }

    pub fn reward_type(&self) -> RewardType {
        self.reward_type
    }

    pub fn reward_class(&self) -> &str {
        &self.reward_class
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }
}
