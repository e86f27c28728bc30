//! Small classification enums for actions and buffs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Life area an action belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ActionCategory {
    Social,
    Health,
    Recreation,
    Work,
    #[default]
    Other,
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Social => "Social",
            Self::Health => "Health",
            Self::Recreation => "Recreation",
            Self::Work => "Work",
            Self::Other => "Other",
        };
        f.write_str(s)
    }
}

impl FromStr for ActionCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "social" => Ok(Self::Social),
            "health" => Ok(Self::Health),
            "recreation" => Ok(Self::Recreation),
            "work" => Ok(Self::Work),
            "other" => Ok(Self::Other),
            _ => Err(DomainError::parse(format!("Unknown action category: {}", s))),
        }
    }
}

/// How a buff gets applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BuffTrigger {
    /// Applied as a side effect of performing an action.
    Action,
    /// Applied directly by the player.
    #[default]
    Manual,
}
