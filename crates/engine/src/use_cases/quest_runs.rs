//! Quest run use cases: starting, finishing and failing attempts at a quest.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use lifeforge_domain::{
    DomainError, QuestId, QuestRepeatability, QuestRun, QuestRunId, QuestRunStatus,
};

use crate::infrastructure::ports::{ClockPort, QuestRepo, QuestRunRepo, RepoError};

use super::rewards::{QuestRewards, RewardApplicationResult, RewardError};

#[derive(Debug, thiserror::Error)]
pub enum QuestRunError {
    #[error("Quest not found")]
    QuestNotFound,
    #[error("Quest run not found")]
    RunNotFound,
    #[error("Quest already has a run in progress")]
    AlreadyInProgress,
    #[error("Quest cannot be run again yet ({0:?})")]
    NotRepeatable(QuestRepeatability),
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
    #[error("Reward error: {0}")]
    Rewards(#[from] RewardError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

/// A completed run together with what it paid out.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResult {
    pub run: QuestRun,
    pub rewards: RewardApplicationResult,
}

pub struct QuestRuns {
    quest_repo: Arc<dyn QuestRepo>,
    quest_run_repo: Arc<dyn QuestRunRepo>,
    rewards: Arc<QuestRewards>,
    clock: Arc<dyn ClockPort>,
}

impl QuestRuns {
    pub fn new(
        quest_repo: Arc<dyn QuestRepo>,
        quest_run_repo: Arc<dyn QuestRunRepo>,
        rewards: Arc<QuestRewards>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            quest_repo,
            quest_run_repo,
            rewards,
            clock,
        }
    }

    /// Begin a new attempt at a quest.
    ///
    /// A quest has at most one run in progress, and finished runs count
    /// against its repeatability.
    pub async fn start(&self, quest_id: QuestId) -> Result<QuestRun, QuestRunError> {
        let quest = self
            .quest_repo
            .get(quest_id)
            .await?
            .ok_or(QuestRunError::QuestNotFound)?;
        let now = self.clock.now();

        let previous = self.quest_run_repo.list_for_quest(quest_id).await?;
        if previous
            .iter()
            .any(|r| r.status() == QuestRunStatus::InProgress)
        {
            return Err(QuestRunError::AlreadyInProgress);
        }
        let completed: Vec<DateTime<Utc>> =
            previous.iter().filter_map(QuestRun::completed_at).collect();
        if !quest.repeatability().allows_new_run(&completed, now) {
            tracing::debug!(
                quest_id = %quest_id,
                repeatability = ?quest.repeatability(),
                "Quest run refused by repeatability"
            );
            return Err(QuestRunError::NotRepeatable(quest.repeatability()));
        }

        let run = QuestRun::begin(&quest, now)?;
        self.quest_run_repo.save(&run).await?;
        tracing::info!(quest_id = %quest_id, quest_run_id = %run.id(), "Quest started");
        Ok(run)
    }

    /// Finish a run successfully and pay out its rewards.
    pub async fn complete(&self, run_id: QuestRunId) -> Result<CompletionResult, QuestRunError> {
        let mut run = self
            .quest_run_repo
            .get(run_id)
            .await?
            .ok_or(QuestRunError::RunNotFound)?;
        let quest = self
            .quest_repo
            .get(run.quest_id())
            .await?
            .ok_or(QuestRunError::QuestNotFound)?;

        run.complete(quest.rewards_or_default(), self.clock.now())?;
        self.quest_run_repo.save(&run).await?;
        tracing::info!(quest_run_id = %run_id, quest = %run.quest_name(), "Quest completed");

        let rewards = self.rewards.apply_quest_rewards(run_id).await.map_err(|e| {
            tracing::error!(
                quest_run_id = %run_id,
                error = %e,
                "Quest completed but its rewards could not be applied"
            );
            e
        })?;
        let run = self.quest_run_repo.get(run_id).await?.unwrap_or(run);
        Ok(CompletionResult { run, rewards })
    }

    pub async fn fail(&self, run_id: QuestRunId) -> Result<QuestRun, QuestRunError> {
        let mut run = self
            .quest_run_repo
            .get(run_id)
            .await?
            .ok_or(QuestRunError::RunNotFound)?;
        run.fail(self.clock.now())?;
        self.quest_run_repo.save(&run).await?;
        tracing::info!(quest_run_id = %run_id, "Quest failed");
        Ok(run)
    }

    pub async fn get(&self, id: QuestRunId) -> Result<Option<QuestRun>, QuestRunError> {
        Ok(self.quest_run_repo.get(id).await?)
    }

    pub async fn list(&self) -> Result<Vec<QuestRun>, QuestRunError> {
        Ok(self.quest_run_repo.list().await?)
    }

    pub async fn list_in_progress(&self) -> Result<Vec<QuestRun>, QuestRunError> {
        Ok(self.quest_run_repo.list_in_progress().await?)
    }

    pub async fn list_for_quest(&self, quest_id: QuestId) -> Result<Vec<QuestRun>, QuestRunError> {
        Ok(self.quest_run_repo.list_for_quest(quest_id).await?)
    }

    pub async fn delete(&self, id: QuestRunId) -> Result<(), QuestRunError> {
        if self.quest_run_repo.get(id).await?.is_none() {
            return Err(QuestRunError::RunNotFound);
        }
        self.quest_run_repo.delete(id).await?;
        tracing::info!(quest_run_id = %id, "Quest run deleted");
        Ok(())
    }
}
