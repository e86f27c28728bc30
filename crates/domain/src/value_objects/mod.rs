//! Value objects - immutable, validated, compared by value

mod categories;
mod currency;
mod lifecycle;
mod names;
mod repeatability;
mod reward;
mod stats;

pub use categories::{ActionCategory, BuffTrigger};
pub use currency::CurrencyType;
pub use lifecycle::{BuffInstanceStatus, QuestRunStatus};
pub use names::{ActionName, BuffName, CharacterName, Description, QuestName};
pub use repeatability::QuestRepeatability;
pub use reward::{DifficultyLevel, Reward, RewardType, GENERAL_CLASS};
pub use stats::{BaseStats, EffectiveStats, StatModifiers};
