//! BuffInstance aggregate - one application of a buff to the character
//!
//! The instance snapshots the buff's name, debuff flag and modifiers when it
//! is created. Editing the definition later doesn't change what a running
//! instance contributes, and removing it subtracts exactly what was added.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::Buff;
use crate::events::{BuffTransition, StackOutcome};
use crate::value_objects::{BuffInstanceStatus, BuffName, StatModifiers};
use crate::{BuffId, BuffInstanceId, CharacterId, DomainError};

/// A buff applied to a character
///
/// # Invariants
///
/// - `end_time = start_time + buff duration`
/// - `stacks >= 1`
/// - `status` only moves along [`BuffInstanceStatus::can_transition_to`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuffInstance {
    id: BuffInstanceId,
    buff_id: BuffId,
    character_id: CharacterId,
    buff_name: BuffName,
    is_debuff: bool,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    stacks: u32,
    status: BuffInstanceStatus,
    #[serde(default)]
    modifiers: StatModifiers,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BuffInstance {
    fn from_buff(
        buff: &Buff,
        character_id: CharacterId,
        start_time: DateTime<Utc>,
        status: BuffInstanceStatus,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let end_time = start_time
            .checked_add_signed(buff.duration())
            .ok_or_else(|| {
                DomainError::validation("Buff would end past the supported date range")
            })?;
        Ok(Self {
            id: BuffInstanceId::new(),
            buff_id: buff.id(),
            character_id,
            buff_name: buff.name().clone(),
            is_debuff: buff.is_debuff(),
            start_time,
            end_time,
            stacks: 1,
            status,
            modifiers: *buff.modifiers(),
            created_at: now,
            updated_at: now,
        })
    }

    /// An instance that takes effect immediately.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the end time is out of range.
    pub fn activate_now(
        buff: &Buff,
        character_id: CharacterId,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        Self::from_buff(buff, character_id, now, BuffInstanceStatus::Active, now)
    }

    /// A pending instance that the nightly job activates once `start_time` passes.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `start_time` is not in the future,
    /// or if the end time is out of range.
    pub fn schedule(
        buff: &Buff,
        character_id: CharacterId,
        start_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if start_time <= now {
            return Err(DomainError::validation(
                "Scheduled start time must be in the future",
            ));
        }
        Self::from_buff(
            buff,
            character_id,
            start_time,
            BuffInstanceStatus::Pending,
            now,
        )
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> BuffInstanceId {
        self.id
    }

    #[inline]
    pub fn buff_id(&self) -> BuffId {
        self.buff_id
    }

    #[inline]
    pub fn character_id(&self) -> CharacterId {
        self.character_id
    }

    pub fn buff_name(&self) -> &BuffName {
        &self.buff_name
    }

    pub fn is_debuff(&self) -> bool {
        self.is_debuff
    }

    #[inline]
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    #[inline]
    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    #[inline]
    pub fn stacks(&self) -> u32 {
        self.stacks
    }

    #[inline]
    pub fn status(&self) -> BuffInstanceStatus {
        self.status
    }

    /// Modifiers of a single stack.
    pub fn modifiers(&self) -> &StatModifiers {
        &self.modifiers
    }

    /// Modifiers of all stacks together.
    pub fn effective_modifiers(&self) -> StatModifiers {
        self.modifiers.scaled(self.stacks)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn is_active(&self) -> bool {
        self.status == BuffInstanceStatus::Active
    }

    /// Pending and its start time has come.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == BuffInstanceStatus::Pending && self.start_time <= now
    }

    /// Still live but its end time has passed.
    pub fn is_over(&self, now: DateTime<Utc>) -> bool {
        self.status.is_live() && self.end_time <= now
    }

    /// When the instance stopped counting: its end time, or the moment it
    /// was cancelled if that came first.
    pub fn retired_at(&self) -> Option<DateTime<Utc>> {
        self.status
            .is_terminal()
            .then(|| self.end_time.min(self.updated_at))
    }

    /// Terminal for longer than `retention`.
    pub fn is_purgeable(&self, now: DateTime<Utc>, retention: Duration) -> bool {
        self.retired_at()
            .and_then(|at| at.checked_add_signed(retention))
            .is_some_and(|cutoff| cutoff <= now)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one stack if the buff allows it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStateTransition` on an expired or cancelled instance.
    pub fn add_stack(
        &mut self,
        max_stacks: u32,
        now: DateTime<Utc>,
    ) -> Result<StackOutcome, DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::invalid_state_transition(format!(
                "Cannot stack a buff instance that is {}",
                self.status
            )));
        }
        if self.stacks >= max_stacks {
            return Ok(StackOutcome::AtMaximum { max_stacks });
        }
        self.stacks += 1;
        self.updated_at = now;
        Ok(StackOutcome::Stacked {
            stacks: self.stacks,
        })
    }

    fn transition(
        &mut self,
        to: BuffInstanceStatus,
        now: DateTime<Utc>,
    ) -> Result<BuffTransition, DomainError> {
        let from = self.status;
        if !from.can_transition_to(to) {
            return Err(DomainError::invalid_state_transition(format!(
                "Buff instance '{}' cannot go from {} to {}",
                self.buff_name, from, to
            )));
        }
        self.status = to;
        self.updated_at = now;
        Ok(BuffTransition { from, to })
    }

    /// Pending -> Active, once the start time has been reached.
    pub fn activate(&mut self, now: DateTime<Utc>) -> Result<BuffTransition, DomainError> {
        if self.start_time > now {
            return Err(DomainError::invalid_state_transition(format!(
                "Buff instance '{}' does not start until {}",
                self.buff_name, self.start_time
            )));
        }
        self.transition(BuffInstanceStatus::Active, now)
    }

    /// Pending/Active -> Expired, once the end time has been reached.
    pub fn expire(&mut self, now: DateTime<Utc>) -> Result<BuffTransition, DomainError> {
        if self.end_time > now {
            return Err(DomainError::invalid_state_transition(format!(
                "Buff instance '{}' runs until {}",
                self.buff_name, self.end_time
            )));
        }
        self.transition(BuffInstanceStatus::Expired, now)
    }

    /// Pending/Active -> Cancelled.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<BuffTransition, DomainError> {
        self.transition(BuffInstanceStatus::Cancelled, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_BUFF_DURATION_DAYS;
    use chrono::TimeZone;

    fn t(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    fn buff(max_stacks: u32, days: u32) -> Buff {
        Buff::new(
            BuffName::new("Focused").unwrap(),
            StatModifiers::new().with_mp(5, 10),
            t(1, 0),
        )
        .with_max_stacks(max_stacks)
        .unwrap()
        .with_duration_days(days)
        .unwrap()
    }

    mod creation {
        use super::*;

        #[test]
        fn activate_now_snapshots_the_buff() {
            let b = buff(2, 3);
            let inst = BuffInstance::activate_now(&b, CharacterId::new(), t(1, 8)).unwrap();
            assert_eq!(inst.status(), BuffInstanceStatus::Active);
            assert_eq!(inst.buff_id(), b.id());
            assert_eq!(inst.end_time(), t(4, 8));
            assert_eq!(inst.stacks(), 1);
            assert_eq!(inst.modifiers(), b.modifiers());
        }

        #[test]
        fn end_past_the_calendar_is_rejected() {
            let b = buff(1, MAX_BUFF_DURATION_DAYS);
            let far = DateTime::<Utc>::MAX_UTC - Duration::days(1);
            let err = BuffInstance::schedule(&b, CharacterId::new(), far, t(1, 8)).unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
            assert!(BuffInstance::activate_now(&b, CharacterId::new(), far).is_err());
        }

        #[test]
        fn schedule_requires_future_start() {
            let b = buff(1, 1);
            assert!(BuffInstance::schedule(&b, CharacterId::new(), t(1, 8), t(1, 8)).is_err());
            let inst = BuffInstance::schedule(&b, CharacterId::new(), t(2, 0), t(1, 8)).unwrap();
            assert_eq!(inst.status(), BuffInstanceStatus::Pending);
            assert_eq!(inst.end_time(), t(3, 0));
        }
    }

    mod stacking {
        use super::*;

        #[test]
        fn stacks_up_to_maximum() {
            let b = buff(2, 7);
            let mut inst =
                BuffInstance::activate_now(&b, CharacterId::new(), t(1, 8)).unwrap();
            assert_eq!(
                inst.add_stack(2, t(1, 9)).unwrap(),
                StackOutcome::Stacked { stacks: 2 }
            );
            assert_eq!(
                inst.add_stack(2, t(1, 10)).unwrap(),
                StackOutcome::AtMaximum { max_stacks: 2 }
            );
            assert_eq!(inst.stacks(), 2);
            assert_eq!(inst.effective_modifiers().mp, 10);
            assert_eq!(inst.effective_modifiers().mp_percent, 20);
        }

        #[test]
        fn single_stack_buff_never_doubles() {
            let b = buff(1, 7);
            let mut inst =
                BuffInstance::activate_now(&b, CharacterId::new(), t(1, 8)).unwrap();
            let outcome = inst.add_stack(1, t(1, 9)).unwrap();
            assert_eq!(outcome, StackOutcome::AtMaximum { max_stacks: 1 });
            assert_eq!(inst.effective_modifiers(), *b.modifiers());
        }

        #[test]
        fn cannot_stack_terminal_instance() {
            let b = buff(3, 7);
            let mut inst =
                BuffInstance::activate_now(&b, CharacterId::new(), t(1, 8)).unwrap();
            inst.cancel(t(1, 9)).unwrap();
            assert!(inst.add_stack(3, t(1, 10)).is_err());
        }
    }

    mod lifecycle {
        use super::*;

        #[test]
        fn pending_activates_only_when_due() {
            let b = buff(1, 1);
            let mut inst =
                BuffInstance::schedule(&b, CharacterId::new(), t(3, 0), t(1, 8)).unwrap();
            assert!(!inst.is_due(t(2, 23)));
            assert!(inst.activate(t(2, 23)).is_err());
            assert!(inst.is_due(t(3, 0)));
            let transition = inst.activate(t(3, 0)).unwrap();
            assert_eq!(transition.from, BuffInstanceStatus::Pending);
            assert_eq!(transition.to, BuffInstanceStatus::Active);
        }

        #[test]
        fn expires_at_end_time() {
            let b = buff(1, 2);
            let mut inst =
                BuffInstance::activate_now(&b, CharacterId::new(), t(1, 8)).unwrap();
            assert!(!inst.is_over(t(3, 7)));
            assert!(inst.expire(t(3, 7)).is_err());
            assert!(inst.is_over(t(3, 8)));
            inst.expire(t(3, 8)).unwrap();
            assert_eq!(inst.status(), BuffInstanceStatus::Expired);
            assert!(!inst.is_over(t(4, 0)));
        }

        #[test]
        fn expired_instance_cannot_be_cancelled() {
            let b = buff(1, 1);
            let mut inst =
                BuffInstance::activate_now(&b, CharacterId::new(), t(1, 8)).unwrap();
            inst.expire(t(2, 8)).unwrap();
            let err = inst.cancel(t(2, 9)).unwrap_err();
            assert!(matches!(err, DomainError::InvalidStateTransition(_)));
        }

        #[test]
        fn purge_window_counts_from_retirement() {
            let b = buff(1, 7);
            let mut inst =
                BuffInstance::activate_now(&b, CharacterId::new(), t(1, 8)).unwrap();
            assert!(!inst.is_purgeable(t(30, 0), Duration::days(7)));

            // Cancelled on day 2, long before its natural end on day 8
            inst.cancel(t(2, 8)).unwrap();
            assert_eq!(inst.retired_at(), Some(t(2, 8)));
            assert!(!inst.is_purgeable(t(9, 7), Duration::days(7)));
            assert!(inst.is_purgeable(t(9, 8), Duration::days(7)));
        }

        #[test]
        fn endless_retention_never_purges() {
            let b = buff(1, 1);
            let mut inst =
                BuffInstance::activate_now(&b, CharacterId::new(), t(1, 8)).unwrap();
            inst.cancel(t(1, 9)).unwrap();
            assert!(!inst.is_purgeable(t(30, 0), Duration::days(i64::from(u32::MAX))));
        }
    }
}
