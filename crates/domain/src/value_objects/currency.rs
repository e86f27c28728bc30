//! Currencies a character can hold

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CurrencyType {
    Gold,
    Karma,
    DesignWorkslot,
}

impl CurrencyType {
    pub const ALL: [CurrencyType; 3] = [Self::Gold, Self::Karma, Self::DesignWorkslot];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gold => "Gold",
            Self::Karma => "Karma",
            Self::DesignWorkslot => "DesignWorkslot",
        }
    }
}

impl fmt::Display for CurrencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive, so reward configs may say `gold` or `Gold`.
impl FromStr for CurrencyType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::parse(format!("Unknown currency: {}", s)))
    }
}
