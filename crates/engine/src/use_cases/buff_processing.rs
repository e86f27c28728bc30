//! Nightly buff reconciliation.
//!
//! For each character, in order:
//! 1. pending instances whose start time has come become active,
//! 2. live instances whose end time has passed expire,
//! 3. the aggregate modifier is recomputed,
//! 4. instances retired for longer than the retention window are deleted.
//!
//! Characters are processed one at a time. A failure for one character is
//! logged and counted, and the run moves on to the next.

use std::ops::AddAssign;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use lifeforge_domain::{BuffInstance, CharacterId};

use crate::infrastructure::ports::{BuffInstanceRepo, CharacterRepo, ClockPort, RepoError};

use super::aggregation::BuffAggregation;

#[derive(Debug, thiserror::Error)]
pub enum BuffProcessingError {
    #[error("Character not found")]
    CharacterNotFound,
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

/// Counts from one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingReport {
    pub characters: usize,
    pub activated: usize,
    pub expired: usize,
    pub purged: usize,
    pub failed: usize,
}

impl AddAssign for ProcessingReport {
    fn add_assign(&mut self, rhs: Self) {
        self.characters += rhs.characters;
        self.activated += rhs.activated;
        self.expired += rhs.expired;
        self.purged += rhs.purged;
        self.failed += rhs.failed;
    }
}

pub struct BuffProcessing {
    character_repo: Arc<dyn CharacterRepo>,
    instance_repo: Arc<dyn BuffInstanceRepo>,
    aggregation: Arc<BuffAggregation>,
    clock: Arc<dyn ClockPort>,
    retention: Duration,
}

impl BuffProcessing {
    pub fn new(
        character_repo: Arc<dyn CharacterRepo>,
        instance_repo: Arc<dyn BuffInstanceRepo>,
        aggregation: Arc<BuffAggregation>,
        clock: Arc<dyn ClockPort>,
        retention: Duration,
    ) -> Self {
        Self {
            character_repo,
            instance_repo,
            aggregation,
            clock,
            retention,
        }
    }

    /// Reconcile every character.
    pub async fn process_all(&self) -> Result<ProcessingReport, BuffProcessingError> {
        let now = self.clock.now();
        let characters = self.character_repo.list().await?;
        tracing::info!(count = characters.len(), "Starting buff processing");

        let mut report = ProcessingReport::default();
        for character in &characters {
            match self.reconcile(character.id(), now).await {
                Ok(counts) => report += counts,
                Err(e) => {
                    tracing::error!(
                        character_id = %character.id(),
                        error = %e,
                        "Buff processing failed for character"
                    );
                    report.characters += 1;
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            characters = report.characters,
            activated = report.activated,
            expired = report.expired,
            purged = report.purged,
            failed = report.failed,
            "Buff processing finished"
        );
        Ok(report)
    }

    /// Reconcile a single character.
    pub async fn process_character(
        &self,
        character_id: CharacterId,
    ) -> Result<ProcessingReport, BuffProcessingError> {
        if self.character_repo.get(character_id).await?.is_none() {
            return Err(BuffProcessingError::CharacterNotFound);
        }
        Ok(self.reconcile(character_id, self.clock.now()).await?)
    }

    async fn reconcile(
        &self,
        character_id: CharacterId,
        now: DateTime<Utc>,
    ) -> Result<ProcessingReport, RepoError> {
        let mut report = ProcessingReport {
            characters: 1,
            ..Default::default()
        };
        let mut instances = self.instance_repo.list_for_character(character_id).await?;

        let mut changed: Vec<BuffInstance> = Vec::new();
        for instance in instances.iter_mut() {
            let mut touched = false;
            if instance.is_due(now) && instance.activate(now).is_ok() {
                tracing::debug!(instance_id = %instance.id(), "Activated scheduled buff");
                report.activated += 1;
                touched = true;
            }
            if instance.is_over(now) && instance.expire(now).is_ok() {
                tracing::debug!(instance_id = %instance.id(), "Expired buff");
                report.expired += 1;
                touched = true;
            }
            if touched {
                changed.push(instance.clone());
            }
        }
        if !changed.is_empty() {
            self.instance_repo.save_all(&changed).await?;
        }

        self.aggregation.refresh(character_id).await?;

        for instance in instances
            .iter()
            .filter(|i| i.is_purgeable(now, self.retention))
        {
            self.instance_repo.delete(instance.id()).await?;
            report.purged += 1;
        }

        if report.activated + report.expired + report.purged > 0 {
            tracing::info!(
                character_id = %character_id,
                activated = report.activated,
                expired = report.expired,
                purged = report.purged,
                "Reconciled buffs"
            );
        }
        Ok(report)
    }
}
