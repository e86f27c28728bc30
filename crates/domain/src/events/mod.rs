//! Domain Events
//!
//! Return types from aggregate mutations, communicating what happened when
//! state was modified. Use cases turn them into log lines and results.

pub mod buff_events;
pub mod character_events;
pub mod quest_events;

pub use buff_events::*;
pub use character_events::*;
pub use quest_events::*;
