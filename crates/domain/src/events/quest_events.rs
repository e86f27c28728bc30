//! Quest run and action events

use chrono::{DateTime, Utc};

use crate::value_objects::QuestRunStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestRunTransition {
    pub from: QuestRunStatus,
    pub to: QuestRunStatus,
}

/// Whether an action may be performed right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownStatus {
    Ready,
    CoolingDown { ready_at: DateTime<Utc> },
}
