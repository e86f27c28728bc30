//! Buff instance use cases: applying buffs to the character and taking them off.
//!
//! Every operation that changes which instances are live recomputes the
//! character's aggregate modifier from scratch afterwards, so modifiers are
//! never applied or removed incrementally.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use lifeforge_domain::{
    BuffId, BuffInstance, BuffInstanceId, CharacterId, DomainError, StackOutcome,
};

use crate::infrastructure::ports::{
    BuffInstanceRepo, BuffRepo, CharacterRepo, ClockPort, RepoError,
};

use super::aggregation::BuffAggregation;

#[derive(Debug, thiserror::Error)]
pub enum BuffInstanceError {
    #[error("Buff not found")]
    BuffNotFound,
    #[error("Character not found")]
    CharacterNotFound,
    #[error("Buff instance not found")]
    InstanceNotFound,
    #[error("Buff instance does not belong to this character")]
    NotOwned,
    #[error("Buff '{buff_name}' is already at maximum stacks ({max_stacks})")]
    MaxStacksReached { buff_name: String, max_stacks: u32 },
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

/// What an activation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationResult {
    pub instance_id: BuffInstanceId,
    pub stacks: u32,
    /// Labelled per-stack modifiers of the buff, non-zero entries only.
    /// Empty when the stack went onto a pending instance, which only takes
    /// effect once the nightly job activates it.
    pub modifiers_applied: Vec<(&'static str, i32)>,
}

/// What a deactivation took off the character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeactivationResult {
    pub instance_id: BuffInstanceId,
    /// Empty when the instance was still pending.
    pub modifiers_removed: Vec<(&'static str, i32)>,
}

pub struct BuffInstances {
    character_repo: Arc<dyn CharacterRepo>,
    buff_repo: Arc<dyn BuffRepo>,
    instance_repo: Arc<dyn BuffInstanceRepo>,
    aggregation: Arc<BuffAggregation>,
    clock: Arc<dyn ClockPort>,
}

impl BuffInstances {
    pub fn new(
        character_repo: Arc<dyn CharacterRepo>,
        buff_repo: Arc<dyn BuffRepo>,
        instance_repo: Arc<dyn BuffInstanceRepo>,
        aggregation: Arc<BuffAggregation>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            character_repo,
            buff_repo,
            instance_repo,
            aggregation,
            clock,
        }
    }

    /// Apply a buff to a character right now.
    ///
    /// If the character already has a live instance of the buff, a stack is
    /// added to it instead of creating a second instance. An active instance
    /// is preferred; if only a scheduled one exists, the stack is queued on it.
    pub async fn activate(
        &self,
        character_id: CharacterId,
        buff_id: BuffId,
    ) -> Result<ActivationResult, BuffInstanceError> {
        let buff = self
            .buff_repo
            .get(buff_id)
            .await?
            .ok_or(BuffInstanceError::BuffNotFound)?;
        if self.character_repo.get(character_id).await?.is_none() {
            return Err(BuffInstanceError::CharacterNotFound);
        }
        let now = self.clock.now();

        let live = self
            .instance_repo
            .list_for_character(character_id)
            .await?
            .into_iter()
            .filter(|i| i.buff_id() == buff_id && i.status().is_live())
            .min_by_key(|i| (!i.is_active(), i.created_at()));

        let instance = match live {
            Some(mut existing) => match existing.add_stack(buff.max_stacks(), now)? {
                StackOutcome::Stacked { stacks } => {
                    self.instance_repo.save(&existing).await?;
                    tracing::info!(
                        character_id = %character_id,
                        buff_id = %buff_id,
                        stacks,
                        "Buff stacked"
                    );
                    existing
                }
                StackOutcome::AtMaximum { max_stacks } => {
                    tracing::debug!(
                        character_id = %character_id,
                        buff_id = %buff_id,
                        max_stacks,
                        "Buff already at maximum stacks"
                    );
                    return Err(BuffInstanceError::MaxStacksReached {
                        buff_name: buff.name().to_string(),
                        max_stacks,
                    });
                }
            },
            None => {
                let created = BuffInstance::activate_now(&buff, character_id, now)?;
                self.instance_repo.save(&created).await?;
                tracing::info!(
                    character_id = %character_id,
                    buff_id = %buff_id,
                    instance_id = %created.id(),
                    "Buff activated"
                );
                created
            }
        };

        self.aggregation.refresh(character_id).await?;

        let modifiers_applied = if instance.is_active() {
            buff.modifiers().summary()
        } else {
            Vec::new()
        };
        Ok(ActivationResult {
            instance_id: instance.id(),
            stacks: instance.stacks(),
            modifiers_applied,
        })
    }

    /// Queue a buff to start later. The nightly job activates it.
    pub async fn schedule(
        &self,
        character_id: CharacterId,
        buff_id: BuffId,
        start_time: DateTime<Utc>,
    ) -> Result<BuffInstance, BuffInstanceError> {
        let buff = self
            .buff_repo
            .get(buff_id)
            .await?
            .ok_or(BuffInstanceError::BuffNotFound)?;
        if self.character_repo.get(character_id).await?.is_none() {
            return Err(BuffInstanceError::CharacterNotFound);
        }

        let instance = BuffInstance::schedule(&buff, character_id, start_time, self.clock.now())?;
        self.instance_repo.save(&instance).await?;
        tracing::info!(
            character_id = %character_id,
            buff_id = %buff_id,
            start_time = %start_time,
            "Buff scheduled"
        );
        Ok(instance)
    }

    /// Cancel one of the character's live buff instances.
    pub async fn deactivate(
        &self,
        character_id: CharacterId,
        instance_id: BuffInstanceId,
    ) -> Result<DeactivationResult, BuffInstanceError> {
        let mut instance = self
            .instance_repo
            .get(instance_id)
            .await?
            .ok_or(BuffInstanceError::InstanceNotFound)?;
        if instance.character_id() != character_id {
            return Err(BuffInstanceError::NotOwned);
        }

        let was_active = instance.is_active();
        instance.cancel(self.clock.now())?;
        self.instance_repo.save(&instance).await?;
        self.aggregation.refresh(character_id).await?;
        tracing::info!(
            character_id = %character_id,
            instance_id = %instance_id,
            "Buff deactivated"
        );

        let modifiers_removed = if was_active {
            instance.effective_modifiers().summary()
        } else {
            Vec::new()
        };
        Ok(DeactivationResult {
            instance_id,
            modifiers_removed,
        })
    }

    pub async fn get(&self, id: BuffInstanceId) -> Result<Option<BuffInstance>, BuffInstanceError> {
        Ok(self.instance_repo.get(id).await?)
    }

    pub async fn list(&self) -> Result<Vec<BuffInstance>, BuffInstanceError> {
        Ok(self.instance_repo.list().await?)
    }

    pub async fn list_for_character(
        &self,
        character_id: CharacterId,
    ) -> Result<Vec<BuffInstance>, BuffInstanceError> {
        Ok(self.instance_repo.list_for_character(character_id).await?)
    }

    /// Delete an instance outright and recompute its character's aggregate.
    pub async fn delete(&self, id: BuffInstanceId) -> Result<(), BuffInstanceError> {
        let instance = self
            .instance_repo
            .get(id)
            .await?
            .ok_or(BuffInstanceError::InstanceNotFound)?;
        self.instance_repo.delete(id).await?;
        self.aggregation.refresh(instance.character_id()).await?;
        tracing::info!(instance_id = %id, "Buff instance deleted");
        Ok(())
    }
}
