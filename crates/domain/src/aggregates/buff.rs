//! Buff aggregate - a reusable definition of a timed stat modifier
//!
//! A `Buff` is the catalogue entry ("Well Rested", "Hungover"). Applying it to
//! the character creates a [`BuffInstance`](super::BuffInstance) that carries
//! its own copy of the modifiers and its own clock.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::value_objects::{BuffName, BuffTrigger, Description, StatModifiers};
use crate::{BuffId, DomainError};

/// Lifetime of a buff when the definition doesn't say otherwise.
pub const DEFAULT_BUFF_DURATION_DAYS: u32 = 7;

/// Longest lifetime a buff may declare (a hundred years).
pub const MAX_BUFF_DURATION_DAYS: u32 = 36_500;

/// A buff or debuff definition
///
/// # Invariants
///
/// - `max_stacks >= 1`
/// - `1 <= duration_days <= MAX_BUFF_DURATION_DAYS` (stored zeros from older
///   records load as 7)
#[derive(Debug, Clone, PartialEq)]
pub struct Buff {
    id: BuffId,
    name: BuffName,
    description: Description,
    icon: Option<String>,
    is_debuff: bool,
    trigger: BuffTrigger,
    max_stacks: u32,
    duration_days: u32,
    modifiers: StatModifiers,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Buff {
    /// A single-stack, week-long, manually triggered buff.
    pub fn new(name: BuffName, modifiers: StatModifiers, now: DateTime<Utc>) -> Self {
        Self {
            id: BuffId::new(),
            name,
            description: Description::empty(),
            icon: None,
            is_debuff: false,
            trigger: BuffTrigger::default(),
            max_stacks: 1,
            duration_days: DEFAULT_BUFF_DURATION_DAYS,
            modifiers,
            created_at: now,
            updated_at: now,
        }
    }

    // =========================================================================
    // Builders
    // =========================================================================

    pub fn with_id(mut self, id: BuffId) -> Self {
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

    pub fn as_debuff(mut self) -> Self {
        self.is_debuff = true;
        self
    }

    pub fn with_trigger(mut self, trigger: BuffTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn with_max_stacks(mut self, max_stacks: u32) -> Result<Self, DomainError> {
        self.set_max_stacks(max_stacks)?;
        Ok(self)
    }

    pub fn with_duration_days(mut self, days: u32) -> Result<Self, DomainError> {
        self.set_duration_days(days)?;
        Ok(self)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> BuffId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &BuffName {
        &self.name
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    #[inline]
    pub fn is_debuff(&self) -> bool {
        self.is_debuff
    }

    pub fn trigger(&self) -> BuffTrigger {
        self.trigger
    }

    #[inline]
    pub fn max_stacks(&self) -> u32 {
        self.max_stacks
    }

    pub fn duration_days(&self) -> u32 {
        self.duration_days
    }

    pub fn duration(&self) -> Duration {
        Duration::days(i64::from(self.duration_days))
    }

    #[inline]
    pub fn modifiers(&self) -> &StatModifiers {
        &self.modifiers
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn rename(&mut self, name: BuffName) {
        self.name = name;
    }

    pub fn set_description(&mut self, description: Description) {
        self.description = description;
    }

    pub fn set_icon(&mut self, icon: Option<String>) {
        self.icon = icon;
    }

    pub fn set_debuff(&mut self, is_debuff: bool) {
        self.is_debuff = is_debuff;
    }

    pub fn set_trigger(&mut self, trigger: BuffTrigger) {
        self.trigger = trigger;
    }

    pub fn set_modifiers(&mut self, modifiers: StatModifiers) {
        self.modifiers = modifiers;
    }

    pub fn set_max_stacks(&mut self, max_stacks: u32) -> Result<(), DomainError> {
        if max_stacks == 0 {
            return Err(DomainError::validation("Max stacks must be at least 1"));
        }
        self.max_stacks = max_stacks;
        Ok(())
    }

    pub fn set_duration_days(&mut self, days: u32) -> Result<(), DomainError> {
        if days == 0 {
            return Err(DomainError::validation("Duration must be at least 1 day"));
        }
        if days > MAX_BUFF_DURATION_DAYS {
            return Err(DomainError::validation(format!(
                "Duration cannot exceed {MAX_BUFF_DURATION_DAYS} days"
            )));
        }
        self.duration_days = days;
        Ok(())
    }

    /// Record that the definition was edited.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

// ============================================================================
// Serde Implementation
// ============================================================================

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuffWireFormat {
    id: BuffId,
    name: BuffName,
    #[serde(default)]
    description: Description,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    is_debuff: bool,
    #[serde(default)]
    trigger: BuffTrigger,
    #[serde(default)]
    max_stacks: u32,
    #[serde(default)]
    duration_days: u32,
    #[serde(default)]
    modifiers: StatModifiers,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Serialize for Buff {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        BuffWireFormat {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            icon: self.icon.clone(),
            is_debuff: self.is_debuff,
            trigger: self.trigger,
            max_stacks: self.max_stacks,
            duration_days: self.duration_days,
            modifiers: self.modifiers,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Buff {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = BuffWireFormat::deserialize(deserializer)?;
        // Older records stored 0 for "unset"
        let duration_days = match wire.duration_days {
            0 => DEFAULT_BUFF_DURATION_DAYS,
            d if d > MAX_BUFF_DURATION_DAYS => {
                return Err(serde::de::Error::custom(format!(
                    "durationDays {d} exceeds {MAX_BUFF_DURATION_DAYS}"
                )))
            }
            d => d,
        };
        Ok(Self {
            id: wire.id,
            name: wire.name,
            description: wire.description,
            icon: wire.icon,
            is_debuff: wire.is_debuff,
            trigger: wire.trigger,
            max_stacks: wire.max_stacks.max(1),
            duration_days,
            modifiers: wire.modifiers,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
        })
    }
}
