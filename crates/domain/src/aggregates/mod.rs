//! Aggregate roots - domain objects that own their related data
//!
//! Each aggregate:
//! - Has a unique identity
//! - Owns all its constituent parts (enforced by Rust ownership)
//! - Exposes behavior through methods, not public fields
//! - Returns domain events from mutations
//!
//! Time is always passed in (`now`), never read from the system clock, so
//! the engine's injected clock decides what "now" means.

pub mod action;
pub mod buff;
pub mod buff_instance;
pub mod character;
pub mod quest;
pub mod quest_run;

pub use action::Action;
pub use buff::{Buff, DEFAULT_BUFF_DURATION_DAYS, MAX_BUFF_DURATION_DAYS};
pub use buff_instance::BuffInstance;
pub use character::{Character, DEFAULT_HERO_NAME};
pub use quest::Quest;
pub use quest_run::QuestRun;
