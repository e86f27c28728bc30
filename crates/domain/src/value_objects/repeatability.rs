//! How often a quest may be completed

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QuestRepeatability {
    #[default]
    OneTime,
    Unlimited,
    /// Once per UTC calendar day.
    Daily,
    /// Once per ISO week.
    Weekly,
    /// Once per calendar month.
    Monthly,
}

impl QuestRepeatability {
    /// Whether a new run may start given when earlier runs were completed.
    pub fn allows_new_run(self, completed_at: &[DateTime<Utc>], now: DateTime<Utc>) -> bool {
        match self {
            Self::Unlimited => true,
            Self::OneTime => completed_at.is_empty(),
            Self::Daily => !completed_at
                .iter()
                .any(|t| t.date_naive() == now.date_naive()),
            Self::Weekly => !completed_at.iter().any(|t| t.iso_week() == now.iso_week()),
            Self::Monthly => !completed_at
                .iter()
                .any(|t| t.year() == now.year() && t.month() == now.month()),
        }
    }
}
