//! Domain entities - objects with identity that live inside an aggregate

mod class_profile;

pub use class_profile::{ClassProfile, LevelProgress, DEFAULT_BASE_XP, DEFAULT_XP_MULTIPLIER};
