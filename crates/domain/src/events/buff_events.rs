//! Buff instance events

use crate::value_objects::BuffInstanceStatus;

/// Outcome of trying to add a stack to a live buff instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackOutcome {
    Stacked { stacks: u32 },
    AtMaximum { max_stacks: u32 },
}

/// A status change performed on a buff instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuffTransition {
    pub from: BuffInstanceStatus,
    pub to: BuffInstanceStatus,
}
