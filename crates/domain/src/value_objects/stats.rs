//! Character stats and the modifiers buffs apply to them
//!
//! Buffs never touch a character's base stats. The character keeps one
//! aggregate [`StatModifiers`] (the sum over every active buff), and the
//! numbers shown to the player are derived on demand by
//! [`EffectiveStats::compute`]:
//!
//! ```text
//! max     = (base_max + flat_max) * (100 + max_percent) / 100
//! current = clamp((base + flat) * (100 + percent) / 100, 0, max)
//! ```
//!
//! Flat deltas are applied before percentages. A percent below -100 is
//! treated as -100 so a stat can be zeroed but never flipped negative.

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::error::DomainError;

/// Signed stat deltas carried by a buff (and summed into the aggregate).
///
/// Plain data: every combination of values is valid, so the fields are public.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatModifiers {
    pub hp: i32,
    pub hp_max: i32,
    pub hp_percent: i32,
    pub hp_max_percent: i32,
    pub mp: i32,
    pub mp_max: i32,
    pub mp_percent: i32,
    pub mp_max_percent: i32,
    pub xp_gains_percent: i32,
}

impl StatModifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hp(mut self, flat: i32, percent: i32) -> Self {
        self.hp = flat;
        self.hp_percent = percent;
        self
    }

    pub fn with_hp_max(mut self, flat: i32, percent: i32) -> Self {
        self.hp_max = flat;
        self.hp_max_percent = percent;
        self
    }

    pub fn with_mp(mut self, flat: i32, percent: i32) -> Self {
        self.mp = flat;
        self.mp_percent = percent;
        self
    }

    pub fn with_mp_max(mut self, flat: i32, percent: i32) -> Self {
        self.mp_max = flat;
        self.mp_max_percent = percent;
        self
    }

    pub fn with_xp_gains_percent(mut self, percent: i32) -> Self {
        self.xp_gains_percent = percent;
        self
    }

    fn fields(&self) -> [i32; 9] {
        [
            self.hp,
            self.hp_max,
            self.hp_percent,
            self.hp_max_percent,
            self.mp,
            self.mp_max,
            self.mp_percent,
            self.mp_max_percent,
            self.xp_gains_percent,
        ]
    }

    fn zip_with(self, other: Self, f: impl Fn(i32, i32) -> i32) -> Self {
        Self {
            hp: f(self.hp, other.hp),
            hp_max: f(self.hp_max, other.hp_max),
            hp_percent: f(self.hp_percent, other.hp_percent),
            hp_max_percent: f(self.hp_max_percent, other.hp_max_percent),
            mp: f(self.mp, other.mp),
            mp_max: f(self.mp_max, other.mp_max),
            mp_percent: f(self.mp_percent, other.mp_percent),
            mp_max_percent: f(self.mp_max_percent, other.mp_max_percent),
            xp_gains_percent: f(self.xp_gains_percent, other.xp_gains_percent),
        }
    }

    /// Add another modifier set field-wise.
    pub fn apply(&mut self, other: &StatModifiers) {
        *self += *other;
    }

    /// Subtract another modifier set field-wise.
    pub fn remove(&mut self, other: &StatModifiers) {
        *self -= *other;
    }

    /// The modifiers multiplied by a stack count.
    pub fn scaled(&self, stacks: u32) -> Self {
        let n = i32::try_from(stacks).unwrap_or(i32::MAX);
        self.zip_with(Self::default(), |v, _| v.saturating_mul(n))
    }

    /// True when every field is zero.
    pub fn is_neutral(&self) -> bool {
        self.fields().iter().all(|v| *v == 0)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Labelled non-zero entries, in display order.
    pub fn summary(&self) -> Vec<(&'static str, i32)> {
        const LABELS: [&str; 9] = [
            "HP",
            "HP Max",
            "HP %",
            "HP Max %",
            "MP",
            "MP Max",
            "MP %",
            "MP Max %",
            "XP Gains %",
        ];
        LABELS
            .iter()
            .zip(self.fields())
            .filter(|(_, v)| *v != 0)
            .map(|(label, v)| (*label, v))
            .collect()
    }

    /// Boost an experience amount by `xp_gains_percent`, rounding down.
    ///
    /// The result is never negative, even for debuffs below -100%.
    pub fn boost_xp(&self, amount: i64) -> i64 {
        let amount = i128::from(amount);
        let bonus = (amount * i128::from(self.xp_gains_percent)).div_euclid(100);
        i64::try_from((amount + bonus).max(0)).unwrap_or(i64::MAX)
    }
}

impl Add for StatModifiers {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.zip_with(rhs, i32::saturating_add)
    }
}

impl Sub for StatModifiers {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.zip_with(rhs, i32::saturating_sub)
    }
}

impl AddAssign for StatModifiers {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for StatModifiers {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Sum for StatModifiers {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

// ============================================================================
// Base and effective stats
// ============================================================================

/// A character's stored stats, before any buff is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseStats {
    hp: i32,
    hp_max: i32,
    mp: i32,
    mp_max: i32,
    strength: i32,
    discipline: i32,
    focus: i32,
}

impl BaseStats {
    /// Build validated base stats.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when any value is negative or a
    /// current value exceeds its maximum.
    pub fn new(
        hp: i32,
        hp_max: i32,
        mp: i32,
        mp_max: i32,
        strength: i32,
        discipline: i32,
        focus: i32,
    ) -> Result<Self, DomainError> {
        let named = [
            ("hp", hp),
            ("hpMax", hp_max),
            ("mp", mp),
            ("mpMax", mp_max),
            ("strength", strength),
            ("discipline", discipline),
            ("focus", focus),
        ];
        if let Some((name, value)) = named.iter().find(|(_, v)| *v < 0) {
            return Err(DomainError::validation(format!(
                "{} cannot be negative (got {})",
                name, value
            )));
        }
        if hp > hp_max {
            return Err(DomainError::validation(format!(
                "hp ({}) cannot exceed hpMax ({})",
                hp, hp_max
            )));
        }
        if mp > mp_max {
            return Err(DomainError::validation(format!(
                "mp ({}) cannot exceed mpMax ({})",
                mp, mp_max
            )));
        }
        Ok(Self {
            hp,
            hp_max,
            mp,
            mp_max,
            strength,
            discipline,
            focus,
        })
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn hp_max(&self) -> i32 {
        self.hp_max
    }

    pub fn mp(&self) -> i32 {
        self.mp
    }

    pub fn mp_max(&self) -> i32 {
        self.mp_max
    }

    pub fn strength(&self) -> i32 {
        self.strength
    }

    pub fn discipline(&self) -> i32 {
        self.discipline
    }

    pub fn focus(&self) -> i32 {
        self.focus
    }
}

impl Default for BaseStats {
    /// Starting stats of a fresh hero.
    fn default() -> Self {
        Self {
            hp: 100,
            hp_max: 100,
            mp: 100,
            mp_max: 100,
            strength: 10,
            discipline: 10,
            focus: 10,
        }
    }
}

/// Stats after the aggregate buff modifiers have been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveStats {
    pub hp: i32,
    pub hp_max: i32,
    pub mp: i32,
    pub mp_max: i32,
    pub strength: i32,
    pub discipline: i32,
    pub focus: i32,
}

impl EffectiveStats {
    pub fn compute(base: &BaseStats, modifiers: &StatModifiers) -> Self {
        let hp_max = percent_of(
            i64::from(base.hp_max) + i64::from(modifiers.hp_max),
            modifiers.hp_max_percent,
        )
        .max(0);
        let hp = percent_of(
            i64::from(base.hp) + i64::from(modifiers.hp),
            modifiers.hp_percent,
        )
        .clamp(0, hp_max);

        let mp_max = percent_of(
            i64::from(base.mp_max) + i64::from(modifiers.mp_max),
            modifiers.mp_max_percent,
        )
        .max(0);
        let mp = percent_of(
            i64::from(base.mp) + i64::from(modifiers.mp),
            modifiers.mp_percent,
        )
        .clamp(0, mp_max);

        Self {
            hp: saturate(hp),
            hp_max: saturate(hp_max),
            mp: saturate(mp),
            mp_max: saturate(mp_max),
            strength: base.strength,
            discipline: base.discipline,
            focus: base.focus,
        }
    }
}

fn percent_of(value: i64, percent: i32) -> i64 {
    let factor = (100 + i128::from(percent)).max(0);
    let scaled = i128::from(value) * factor / 100;
    i64::try_from(scaled).unwrap_or(if scaled < 0 { i64::MIN } else { i64::MAX })
}

fn saturate(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}
