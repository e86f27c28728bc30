//! LifeForge domain
//!
//! Pure business rules for a single-player life-gamification backend: the
//! character, the buffs that modify it, quests and the rewards they pay, and
//! actions that grant buffs. No I/O and no async; the engine crate supplies
//! storage, time and scheduling.

pub mod aggregates;
pub mod aggregation;
pub mod entities;
pub mod error;
pub mod events;
pub mod ids;
pub mod life_event;
pub mod value_objects;

pub use aggregates::{
    Action, Buff, BuffInstance, Character, Quest, QuestRun, DEFAULT_BUFF_DURATION_DAYS,
    DEFAULT_HERO_NAME, MAX_BUFF_DURATION_DAYS,
};
pub use aggregation::{aggregate_modifiers, Aggregation};
pub use entities::{ClassProfile, LevelProgress};
pub use error::DomainError;
pub use events::{
    BuffTransition, CooldownStatus, ExperienceOutcome, ModifiersChange, QuestRunTransition,
    RewardOutcome, StackOutcome,
};
pub use ids::{ActionId, BuffId, BuffInstanceId, CharacterId, QuestId, QuestRunId};
pub use life_event::LifeEvent;
pub use value_objects::{
    ActionCategory, ActionName, BaseStats, BuffInstanceStatus, BuffName, BuffTrigger,
    CharacterName, CurrencyType, Description, DifficultyLevel, EffectiveStats, QuestName,
    QuestRepeatability, QuestRunStatus, Reward, RewardType, StatModifiers, GENERAL_CLASS,
};
