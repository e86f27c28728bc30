//! Action aggregate - an everyday activity that grants buffs when performed

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::events::CooldownStatus;
use crate::value_objects::{ActionCategory, ActionName, Description};
use crate::{ActionId, BuffId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    id: ActionId,
    name: ActionName,
    #[serde(default)]
    description: Description,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    category: ActionCategory,
    #[serde(default)]
    buff_ids: Vec<BuffId>,
    #[serde(default)]
    cooldown_hours: u32,
    #[serde(default)]
    last_performed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Action {
    pub fn new(name: ActionName, category: ActionCategory, now: DateTime<Utc>) -> Self {
        Self {
            id: ActionId::new(),
            name,
            description: Description::empty(),
            icon: None,
            category,
            buff_ids: Vec::new(),
            cooldown_hours: 0,
            last_performed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: ActionId) -> Self {
        self.id = id;
        self
    }

    pub fn with_description(mut self, description: Description) -> Self {
        self.description = description;
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_buffs(mut self, buff_ids: Vec<BuffId>) -> Self {
        self.set_buffs(buff_ids);
        self
    }

    pub fn with_cooldown_hours(mut self, hours: u32) -> Self {
        self.cooldown_hours = hours;
        self
    }

    #[inline]
    pub fn id(&self) -> ActionId {
        self.id
    }

    pub fn name(&self) -> &ActionName {
        &self.name
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn category(&self) -> ActionCategory {
        self.category
    }

    pub fn buff_ids(&self) -> &[BuffId] {
        &self.buff_ids
    }

    pub fn cooldown_hours(&self) -> u32 {
        self.cooldown_hours
    }

    pub fn last_performed_at(&self) -> Option<DateTime<Utc>> {
        self.last_performed_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn check_cooldown(&self, now: DateTime<Utc>) -> CooldownStatus {
        match self.last_performed_at {
            Some(last) if self.cooldown_hours > 0 => {
                // Past the calendar's end the action simply never cools down.
                let ready_at = last
                    .checked_add_signed(Duration::hours(i64::from(self.cooldown_hours)))
                    .unwrap_or(DateTime::<Utc>::MAX_UTC);
                if now < ready_at {
                    CooldownStatus::CoolingDown { ready_at }
                } else {
                    CooldownStatus::Ready
                }
            }
            _ => CooldownStatus::Ready,
        }
    }

    pub fn record_performed(&mut self, now: DateTime<Utc>) {
        self.last_performed_at = Some(now);
        self.updated_at = now;
    }

    pub fn rename(&mut self, name: ActionName) {
        self.name = name;
    }

    pub fn set_description(&mut self, description: Description) {
        self.description = description;
    }

    pub fn set_icon(&mut self, icon: Option<String>) {
        self.icon = icon;
    }

    pub fn set_category(&mut self, category: ActionCategory) {
        self.category = category;
    }

    /// Replace the granted buffs, dropping duplicates but keeping order.
    pub fn set_buffs(&mut self, buff_ids: Vec<BuffId>) {
        let mut unique = Vec::with_capacity(buff_ids.len());
        for id in buff_ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        self.buff_ids = unique;
    }

    pub fn set_cooldown_hours(&mut self, hours: u32) {
        self.cooldown_hours = hours;
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    fn walk() -> Action {
        Action::new(ActionName::new("Walk").unwrap(), ActionCategory::Health, t(0))
    }

    #[test]
    fn never_performed_is_ready() {
        assert_eq!(walk().with_cooldown_hours(4).check_cooldown(t(1)), CooldownStatus::Ready);
    }

    #[test]
    fn cooldown_blocks_until_elapsed() {
        let mut action = walk().with_cooldown_hours(4);
        action.record_performed(t(8));
        assert_eq!(
            action.check_cooldown(t(11)),
            CooldownStatus::CoolingDown { ready_at: t(12) }
        );
        assert_eq!(action.check_cooldown(t(12)), CooldownStatus::Ready);
    }

    #[test]
    fn cooldown_beyond_the_calendar_never_ends() {
        let mut action = walk().with_cooldown_hours(u32::MAX);
        action.record_performed(t(8));
        assert_eq!(
            action.check_cooldown(t(9)),
            CooldownStatus::CoolingDown {
                ready_at: DateTime::<Utc>::MAX_UTC
            }
        );
    }

    #[test]
    fn zero_cooldown_is_always_ready() {
        let mut action = walk();
        action.record_performed(t(8));
        assert_eq!(action.check_cooldown(t(8)), CooldownStatus::Ready);
    }

    #[test]
    fn duplicate_buffs_are_dropped() {
        let a = BuffId::new();
        let b = BuffId::new();
        let action = walk().with_buffs(vec![a, b, a]);
        assert_eq!(action.buff_ids(), &[a, b]);
    }
}
