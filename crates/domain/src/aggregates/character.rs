//! Character aggregate - the single hero the player levels up
//!
//! # Rustic DDD Design
//!
//! - **Private fields**: All fields are encapsulated
//! - **Newtypes**: `CharacterName` for the validated name, `BaseStats` for stats
//! - **Derived view**: buffs never mutate base stats; `effective_stats()` folds
//!   the stored aggregate modifier over them
//! - **Domain events**: Mutations return outcome types (`RewardOutcome`, etc.)

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::ClassProfile;
use crate::events::{ExperienceOutcome, ModifiersChange, RewardOutcome};
use crate::value_objects::{
    BaseStats, CharacterName, CurrencyType, EffectiveStats, Reward, RewardType, StatModifiers,
};
use crate::{CharacterId, DomainError};

/// Name given to the character created on first use.
pub const DEFAULT_HERO_NAME: &str = "Hero of LifeForge";

/// The player's character
///
/// # Invariants
///
/// - Base stats are non-negative and current values never exceed maximums
///   (enforced by `BaseStats`)
/// - Currency balances only grow through `add_currency` with non-negative amounts
/// - `active_buff_modifiers` is the sum over the character's active buff
///   instances, as last recomputed by the aggregation use case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    id: CharacterId,
    name: CharacterName,
    stats: BaseStats,
    #[serde(default)]
    currencies: BTreeMap<CurrencyType, i64>,
    #[serde(default)]
    class_profiles: BTreeMap<String, ClassProfile>,
    #[serde(default)]
    active_buff_modifiers: StatModifiers,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Character {
    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn new(name: CharacterName, now: DateTime<Utc>) -> Self {
        Self {
            id: CharacterId::new(),
            name,
            stats: BaseStats::default(),
            currencies: CurrencyType::ALL.into_iter().map(|c| (c, 0)).collect(),
            class_profiles: BTreeMap::new(),
            active_buff_modifiers: StatModifiers::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The character created automatically when none exists yet.
    pub fn default_hero(now: DateTime<Utc>) -> Result<Self, DomainError> {
        Ok(Self::new(CharacterName::new(DEFAULT_HERO_NAME)?, now))
    }

    pub fn with_id(mut self, id: CharacterId) -> Self {
        self.id = id;
        self
    }

    pub fn with_stats(mut self, stats: BaseStats) -> Self {
        self.stats = stats;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> CharacterId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &CharacterName {
        &self.name
    }

    #[inline]
    pub fn base_stats(&self) -> &BaseStats {
        &self.stats
    }

    pub fn currencies(&self) -> &BTreeMap<CurrencyType, i64> {
        &self.currencies
    }

    pub fn currency(&self, currency: CurrencyType) -> i64 {
        self.currencies.get(&currency).copied().unwrap_or(0)
    }

    pub fn class_profiles(&self) -> &BTreeMap<String, ClassProfile> {
        &self.class_profiles
    }

    pub fn class_profile(&self, class_name: &str) -> Option<&ClassProfile> {
        self.class_profiles.get(class_name)
    }

    #[inline]
    pub fn active_buff_modifiers(&self) -> &StatModifiers {
        &self.active_buff_modifiers
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Stats with the aggregate buff modifier applied.
    pub fn effective_stats(&self) -> EffectiveStats {
        EffectiveStats::compute(&self.stats, &self.active_buff_modifiers)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn update_profile(&mut self, name: CharacterName, stats: BaseStats, now: DateTime<Utc>) {
        self.name = name;
        self.stats = stats;
        self.updated_at = now;
    }

    /// Credit currency and return the new balance.
    pub fn add_currency(
        &mut self,
        currency: CurrencyType,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<i64, DomainError> {
        if amount < 0 {
            return Err(DomainError::validation("Currency amount cannot be negative"));
        }
        let balance = self.currencies.entry(currency).or_insert(0);
        *balance = balance.saturating_add(amount);
        let balance = *balance;
        self.updated_at = now;
        Ok(balance)
    }

    /// Credit raw experience to a class, creating the class at level 1 if needed.
    ///
    /// XP gain modifiers are not applied here; see [`Character::apply_reward`].
    pub fn add_experience(
        &mut self,
        class_name: &str,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<ExperienceOutcome, DomainError> {
        if amount < 0 {
            return Err(DomainError::validation("Experience amount cannot be negative"));
        }
        let key = class_name.trim();
        if !self.class_profiles.contains_key(key) {
            let profile = ClassProfile::new(key)?;
            self.class_profiles.insert(key.to_string(), profile);
        }
        let profile = self
            .class_profiles
            .get_mut(key)
            .ok_or_else(|| DomainError::not_found("ClassProfile", key))?;
        let progress = profile.gain_xp(amount)?;
        let outcome = ExperienceOutcome {
            class_name: profile.class_name().to_string(),
            gained: amount,
            level_before: progress.level_before,
            level_after: progress.level_after,
        };
        self.updated_at = now;
        Ok(outcome)
    }

    /// Apply a quest reward.
    ///
    /// Experience is boosted by the aggregate `xp_gains_percent`. Items and
    /// badges are accepted but change nothing.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Parse` if a currency reward names an unknown currency.
    pub fn apply_reward(
        &mut self,
        reward: &Reward,
        now: DateTime<Utc>,
    ) -> Result<RewardOutcome, DomainError> {
        match reward.reward_type() {
            RewardType::Currency => {
                let currency: CurrencyType = reward.reward_class().parse()?;
                let balance = self.add_currency(currency, reward.amount(), now)?;
                Ok(RewardOutcome::Currency {
                    currency,
                    amount: reward.amount(),
                    balance,
                })
            }
            RewardType::Experience => {
                let boosted = self.active_buff_modifiers.boost_xp(reward.amount());
                let outcome = self.add_experience(reward.reward_class(), boosted, now)?;
                Ok(RewardOutcome::Experience(outcome))
            }
            other => Ok(RewardOutcome::Unsupported { reward_type: other }),
        }
    }

    /// Replace the stored aggregate buff modifier.
    pub fn set_active_buff_modifiers(
        &mut self,
        modifiers: StatModifiers,
        now: DateTime<Utc>,
    ) -> ModifiersChange {
        if self.active_buff_modifiers == modifiers {
            return ModifiersChange::Unchanged;
        }
        let from = std::mem::replace(&mut self.active_buff_modifiers, modifiers);
        self.updated_at = now;
        ModifiersChange::Changed {
            from,
            to: modifiers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn hero() -> Character {
        Character::default_hero(now()).unwrap()
    }

    mod creation {
        use super::*;

        #[test]
        fn default_hero_has_starting_stats_and_empty_wallet() {
            let c = hero();
            assert_eq!(c.name().as_str(), DEFAULT_HERO_NAME);
            assert_eq!(c.base_stats(), &BaseStats::default());
            assert_eq!(c.currencies().len(), 3);
            assert!(c.currencies().values().all(|v| *v == 0));
            assert!(c.class_profiles().is_empty());
            assert!(c.active_buff_modifiers().is_neutral());
        }
    }

    mod currency {
        use super::*;

        #[test]
        fn add_currency_accumulates() {
            let mut c = hero();
            assert_eq!(c.add_currency(CurrencyType::Gold, 15, now()).unwrap(), 15);
            assert_eq!(c.add_currency(CurrencyType::Gold, 5, now()).unwrap(), 20);
            assert_eq!(c.currency(CurrencyType::Karma), 0);
        }

        #[test]
        fn negative_currency_is_rejected() {
            let mut c = hero();
            assert!(c.add_currency(CurrencyType::Gold, -5, now()).is_err());
            assert_eq!(c.currency(CurrencyType::Gold), 0);
        }
    }

    mod experience {
        use super::*;

        #[test]
        fn new_class_starts_at_level_one_and_can_level_immediately() {
            let mut c = hero();
            let outcome = c.add_experience("Fitness", 150, now()).unwrap();
            assert_eq!(outcome.level_before, 1);
            assert_eq!(outcome.level_after, 2);
            assert!(outcome.leveled_up());
            let profile = c.class_profile("Fitness").unwrap();
            assert_eq!(profile.current_xp(), 50);
        }

        #[test]
        fn negative_experience_is_rejected() {
            let mut c = hero();
            assert!(c.add_experience("General", -1, now()).is_err());
            assert!(c.class_profile("General").is_none());
        }

        #[test]
        fn class_name_is_trimmed() {
            let mut c = hero();
            c.add_experience(" General ", 10, now()).unwrap();
            c.add_experience("General", 10, now()).unwrap();
            assert_eq!(c.class_profiles().len(), 1);
            assert_eq!(c.class_profile("General").unwrap().current_xp(), 20);
        }
    }

    mod rewards {
        use super::*;

        #[test]
        fn currency_reward_credits_balance() {
            let mut c = hero();
            let outcome = c
                .apply_reward(&Reward::currency("gold", 30).unwrap(), now())
                .unwrap();
            assert_eq!(
                outcome,
                RewardOutcome::Currency {
                    currency: CurrencyType::Gold,
                    amount: 30,
                    balance: 30
                }
            );
            assert_eq!(outcome.describe().unwrap(), "+30 Gold");
        }

        #[test]
        fn experience_reward_is_boosted_by_active_buffs() {
            let mut c = hero();
            c.set_active_buff_modifiers(StatModifiers::new().with_xp_gains_percent(20), now());
            let outcome = c
                .apply_reward(&Reward::experience("General", 50).unwrap(), now())
                .unwrap();
            assert_eq!(outcome.describe().unwrap(), "+60 General XP");
            assert_eq!(c.class_profile("General").unwrap().current_xp(), 60);
        }

        #[test]
        fn huge_boosted_experience_saturates() {
            let mut c = hero();
            c.set_active_buff_modifiers(StatModifiers::new().with_xp_gains_percent(20), now());
            let outcome = c
                .apply_reward(&Reward::experience("General", i64::MAX).unwrap(), now())
                .unwrap();
            let RewardOutcome::Experience(gain) = outcome else {
                panic!("expected an experience outcome");
            };
            assert_eq!(gain.gained, i64::MAX);
            assert!(gain.level_after > gain.level_before);
        }

        #[test]
        fn unknown_currency_fails_without_side_effects() {
            let mut c = hero();
            let err = c
                .apply_reward(&Reward::currency("Gems", 30).unwrap(), now())
                .unwrap_err();
            assert!(matches!(err, DomainError::Parse(_)));
            assert!(c.currencies().values().all(|v| *v == 0));
        }

        #[test]
        fn badge_reward_is_unsupported() {
            let mut c = hero();
            let badge = Reward::new(RewardType::Badge, "Early Bird", 1).unwrap();
            let outcome = c.apply_reward(&badge, now()).unwrap();
            assert_eq!(
                outcome,
                RewardOutcome::Unsupported {
                    reward_type: RewardType::Badge
                }
            );
            assert!(outcome.describe().is_none());
        }
    }

    mod buff_modifiers {
        use super::*;

        #[test]
        fn effective_stats_follow_aggregate() {
            let mut c = hero();
            let change =
                c.set_active_buff_modifiers(StatModifiers::new().with_hp_max(20, 0), now());
            assert!(matches!(change, ModifiersChange::Changed { .. }));
            assert_eq!(c.effective_stats().hp_max, 120);
            assert_eq!(c.base_stats().hp_max(), 100);
        }

        #[test]
        fn setting_same_modifiers_is_unchanged() {
            let mut c = hero();
            let m = StatModifiers::new().with_mp(5, 0);
            c.set_active_buff_modifiers(m, now());
            assert_eq!(
                c.set_active_buff_modifiers(m, now()),
                ModifiersChange::Unchanged
            );
        }
    }

    mod serde {
        use super::*;

        #[test]
        fn serialize_deserialize_roundtrip() {
            let mut c = hero();
            c.add_currency(CurrencyType::Karma, 3, now()).unwrap();
            c.add_experience("General", 42, now()).unwrap();

            let json = serde_json::to_string(&c).unwrap();
            let back: Character = serde_json::from_str(&json).unwrap();
            assert_eq!(back, c);
        }
    }
}
