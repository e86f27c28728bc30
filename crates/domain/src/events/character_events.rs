//! Character-related domain events
//!
//! These enums communicate what happened when character state was modified,
//! allowing callers to report it back to the player.

use crate::value_objects::{CurrencyType, RewardType, StatModifiers};

/// Outcome of crediting experience to a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperienceOutcome {
    pub class_name: String,
    /// Amount actually credited, after XP gain modifiers.
    pub gained: i64,
    pub level_before: u32,
    pub level_after: u32,
}

impl ExperienceOutcome {
    pub fn leveled_up(&self) -> bool {
        self.level_after > self.level_before
    }
}

/// Outcome of applying one reward to a character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewardOutcome {
    Currency {
        currency: CurrencyType,
        amount: i64,
        balance: i64,
    },
    Experience(ExperienceOutcome),
    /// Reward kind with no backing system yet (items, badges).
    Unsupported { reward_type: RewardType },
}

impl RewardOutcome {
    /// Short player-facing line, e.g. `+15 Gold` or `+25 General XP`.
    pub fn describe(&self) -> Option<String> {
        match self {
            Self::Currency {
                currency, amount, ..
            } => Some(format!("+{} {}", amount, currency)),
            Self::Experience(xp) => Some(format!("+{} {} XP", xp.gained, xp.class_name)),
            Self::Unsupported { .. } => None,
        }
    }
}

/// Outcome of replacing the character's aggregate buff modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModifiersChange {
    Changed {
        from: StatModifiers,
        to: StatModifiers,
    },
    Unchanged,
}
