//! QuestRun aggregate - one attempt at a quest

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Quest;
use crate::events::QuestRunTransition;
use crate::value_objects::{QuestName, QuestRunStatus, Reward};
use crate::{DomainError, QuestId, QuestRunId};

/// A single attempt at a quest
///
/// # Invariants
///
/// - `start_time` is set once the run leaves `NotStarted`
/// - `end_time` is set once the run is `Completed` or `Failed`
/// - rewards can be marked applied at most once, and only after completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestRun {
    id: QuestRunId,
    quest_id: QuestId,
    quest_name: QuestName,
    status: QuestRunStatus,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    rewards: Vec<Reward>,
    #[serde(default)]
    rewards_applied: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl QuestRun {
    pub fn new(quest: &Quest, now: DateTime<Utc>) -> Self {
        Self {
            id: QuestRunId::new(),
            quest_id: quest.id(),
            quest_name: quest.name().clone(),
            status: QuestRunStatus::NotStarted,
            start_time: None,
            end_time: None,
            rewards: Vec::new(),
            rewards_applied: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// A run that is already in progress.
    pub fn begin(quest: &Quest, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let mut run = Self::new(quest, now);
        run.start(now)?;
        Ok(run)
    }

    #[inline]
    pub fn id(&self) -> QuestRunId {
        self.id
    }

    #[inline]
    pub fn quest_id(&self) -> QuestId {
        self.quest_id
    }

    pub fn quest_name(&self) -> &QuestName {
        &self.quest_name
    }

    #[inline]
    pub fn status(&self) -> QuestRunStatus {
        self.status
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn rewards(&self) -> &[Reward] {
        &self.rewards
    }

    pub fn rewards_applied(&self) -> bool {
        self.rewards_applied
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// When the run was completed, if it was.
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        match self.status {
            QuestRunStatus::Completed => self.end_time,
            _ => None,
        }
    }

    fn transition(
        &mut self,
        to: QuestRunStatus,
        verb: &str,
        now: DateTime<Utc>,
    ) -> Result<QuestRunTransition, DomainError> {
        let from = self.status;
        if !from.can_transition_to(to) {
            return Err(DomainError::invalid_state_transition(format!(
                "Cannot {} a quest that is {}",
                verb, from
            )));
        }
        self.status = to;
        self.updated_at = now;
        Ok(QuestRunTransition { from, to })
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> Result<QuestRunTransition, DomainError> {
        let transition = self.transition(QuestRunStatus::InProgress, "start", now)?;
        self.start_time = Some(now);
        Ok(transition)
    }

    /// Finish successfully, recording the rewards that were earned.
    pub fn complete(
        &mut self,
        rewards: Vec<Reward>,
        now: DateTime<Utc>,
    ) -> Result<QuestRunTransition, DomainError> {
        let transition = self.transition(QuestRunStatus::Completed, "complete", now)?;
        self.end_time = Some(now);
        self.rewards = rewards;
        Ok(transition)
    }

    pub fn fail(&mut self, now: DateTime<Utc>) -> Result<QuestRunTransition, DomainError> {
        let transition = self.transition(QuestRunStatus::Failed, "fail", now)?;
        self.end_time = Some(now);
        Ok(transition)
    }

    /// # Errors
    ///
    /// Returns `DomainError::Constraint` if the run isn't completed or its
    /// rewards were already applied.
    pub fn mark_rewards_applied(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status != QuestRunStatus::Completed {
            return Err(DomainError::constraint(format!(
                "Cannot apply rewards for a quest run that is {}",
                self.status
            )));
        }
        if self.rewards_applied {
            return Err(DomainError::constraint(
                "Rewards for this quest run were already applied",
            ));
        }
        self.rewards_applied = true;
        self.updated_at = now;
        Ok(())
    }
}
