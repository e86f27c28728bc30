//! Use cases - User story orchestration.
//!
//! Each module contains the use cases for one area of the app. Use cases
//! hold the port traits they need directly and coordinate domain aggregates.

pub mod actions;
pub mod aggregation;
pub mod buff_instances;
pub mod buff_processing;
pub mod buffs;
pub mod characters;
pub mod quest_runs;
pub mod quests;
pub mod rewards;

pub use actions::Actions;
pub use aggregation::BuffAggregation;
pub use buff_instances::BuffInstances;
pub use buff_processing::{BuffProcessing, ProcessingReport};
pub use buffs::BuffCatalog;
pub use characters::Characters;
pub use quest_runs::QuestRuns;
pub use quests::QuestCatalog;
pub use rewards::QuestRewards;
