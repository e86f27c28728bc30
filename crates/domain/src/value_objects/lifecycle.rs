//! Lifecycle state enums for buff instances and quest runs
//!
//! Each enum owns its transition table; aggregates ask the enum whether a
//! move is legal instead of comparing states inline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a buff applied to a character.
///
/// # State Transitions
///
/// ```text
/// Pending -> Active     (start time reached)
/// Pending -> Expired    (end time passed before it ever started)
/// Active  -> Expired    (end time reached)
/// Pending | Active -> Cancelled  (removed by the player)
/// Expired, Cancelled: terminal
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BuffInstanceStatus {
    #[default]
    Pending,
    Active,
    Expired,
    Cancelled,
}

impl BuffInstanceStatus {
    /// Pending or Active: the instance still occupies its buff slot.
    #[inline]
    pub fn is_live(self) -> bool {
        matches!(self, Self::Pending | Self::Active)
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        !self.is_live()
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        use BuffInstanceStatus::*;
        matches!(
            (self, next),
            (Pending, Active) | (Pending, Expired) | (Pending, Cancelled)
                | (Active, Expired) | (Active, Cancelled)
        )
    }
}

impl fmt::Display for BuffInstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "Pending",
            Self::Active => "Active",
            Self::Expired => "Expired",
            Self::Cancelled => "Cancelled",
        };
        f.write_str(s)
    }
}

/// Lifecycle of a single attempt at a quest.
///
/// ```text
/// NotStarted -> InProgress -> Completed
///                          -> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QuestRunStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

impl QuestRunStatus {
    pub fn can_transition_to(self, next: Self) -> bool {
        use QuestRunStatus::*;
        matches!(
            (self, next),
            (NotStarted, InProgress) | (InProgress, Completed) | (InProgress, Failed)
        )
    }

    #[inline]
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for QuestRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotStarted => "NotStarted",
            Self::InProgress => "InProgress",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        };
        f.write_str(s)
    }
}
