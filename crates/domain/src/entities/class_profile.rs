//! Per-class leveling state of a character
//!
//! A character can level several classes independently ("General",
//! "Fitness", "Writing", ...). Each class levels on a geometric curve:
//! `xp_to_next_level = floor(base_xp * multiplier^(level - 1))`.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

pub const DEFAULT_BASE_XP: u32 = 100;
pub const DEFAULT_XP_MULTIPLIER: f64 = 1.1;

/// Outcome of crediting experience to one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelProgress {
    pub level_before: u32,
    pub level_after: u32,
    pub current_xp: i64,
}

impl LevelProgress {
    pub fn levels_gained(&self) -> u32 {
        self.level_after - self.level_before
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassProfile {
    class_name: String,
    level: u32,
    current_xp: i64,
    #[serde(default = "default_base_xp")]
    base_xp: u32,
    #[serde(default = "default_multiplier")]
    xp_multiplier: f64,
}

fn default_base_xp() -> u32 {
    DEFAULT_BASE_XP
}

fn default_multiplier() -> f64 {
    DEFAULT_XP_MULTIPLIER
}

impl ClassProfile {
    /// A fresh level-1 class with the default curve.
    pub fn new(class_name: impl Into<String>) -> Result<Self, DomainError> {
        let class_name = class_name.into().trim().to_string();
        if class_name.is_empty() {
            return Err(DomainError::validation("Class name cannot be empty"));
        }
        Ok(Self {
            class_name,
            level: 1,
            current_xp: 0,
            base_xp: DEFAULT_BASE_XP,
            xp_multiplier: DEFAULT_XP_MULTIPLIER,
        })
    }

    pub fn with_curve(mut self, base_xp: u32, xp_multiplier: f64) -> Result<Self, DomainError> {
        if base_xp == 0 {
            return Err(DomainError::validation("Base XP must be at least 1"));
        }
        if !(xp_multiplier.is_finite() && xp_multiplier >= 1.0) {
            return Err(DomainError::validation("XP multiplier must be >= 1.0"));
        }
        self.base_xp = base_xp;
        self.xp_multiplier = xp_multiplier;
        Ok(self)
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn current_xp(&self) -> i64 {
        self.current_xp
    }

    pub fn xp_to_next_level(&self) -> i64 {
        let exponent = i32::try_from(self.level.saturating_sub(1)).unwrap_or(i32::MAX);
        let needed = f64::from(self.base_xp) * self.xp_multiplier.powi(exponent);
        if needed >= i64::MAX as f64 {
            i64::MAX
        } else {
            (needed.floor() as i64).max(1)
        }
    }

    /// Add experience and level up as many times as it pays for.
    ///
    /// Surplus XP carries over into the next level.
    pub fn gain_xp(&mut self, amount: i64) -> Result<LevelProgress, DomainError> {
        if amount < 0 {
            return Err(DomainError::validation("Experience amount cannot be negative"));
        }
        let level_before = self.level;
        self.current_xp = self.current_xp.saturating_add(amount);
        loop {
            let needed = self.xp_to_next_level();
            if self.current_xp < needed {
                break;
            }
            self.current_xp -= needed;
            self.level += 1;
        }
        Ok(LevelProgress {
            level_before,
            level_after: self.level,
            current_xp: self.current_xp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_is_geometric() {
        let mut profile = ClassProfile::new("General").unwrap();
        assert_eq!(profile.xp_to_next_level(), 100);
        profile.gain_xp(100).unwrap();
        assert_eq!(profile.level(), 2);
        assert_eq!(profile.xp_to_next_level(), 110);
        profile.gain_xp(110).unwrap();
        // 100 * 1.1^2 = 121.00000000000001
        assert_eq!(profile.xp_to_next_level(), 121);
    }

    #[test]
    fn surplus_carries_across_several_levels() {
        let mut profile = ClassProfile::new("Fitness").unwrap();
        // 100 + 110 = 210 for two levels, 15 left over
        let progress = profile.gain_xp(225).unwrap();
        assert_eq!(progress.level_before, 1);
        assert_eq!(progress.level_after, 3);
        assert_eq!(progress.levels_gained(), 2);
        assert_eq!(profile.current_xp(), 15);
    }

    #[test]
    fn negative_xp_is_rejected() {
        let mut profile = ClassProfile::new("General").unwrap();
        assert!(profile.gain_xp(-1).is_err());
        assert_eq!(profile.current_xp(), 0);
    }

    #[test]
    fn custom_curve_is_validated() {
        let profile = ClassProfile::new("Writing").unwrap();
        assert!(profile.clone().with_curve(0, 1.5).is_err());
        assert!(profile.clone().with_curve(50, 0.5).is_err());
        let custom = profile.with_curve(50, 2.0).unwrap();
        assert_eq!(custom.xp_to_next_level(), 50);
    }

    #[test]
    fn legacy_records_get_default_curve() {
        let profile: ClassProfile =
            serde_json::from_str(r#"{"className":"General","level":3,"currentXp":7}"#).unwrap();
        assert_eq!(profile.xp_to_next_level(), 121);
    }
}
