//! Applying a completed quest run's rewards to the character.

use std::collections::BTreeMap;
use std::sync::Arc;

use lifeforge_domain::{
    CurrencyType, DomainError, ExperienceOutcome, QuestRunId, QuestRunStatus, RewardOutcome,
};

use crate::infrastructure::ports::{CharacterRepo, ClockPort, QuestRunRepo, RepoError};

use super::characters::{CharacterError, Characters};

#[derive(Debug, thiserror::Error)]
pub enum RewardError {
    #[error("Quest run not found")]
    RunNotFound,
    #[error("Quest must be completed to apply rewards (status: {0})")]
    NotCompleted(QuestRunStatus),
    #[error("Rewards for this quest run were already applied")]
    AlreadyApplied,
    #[error("Character error: {0}")]
    Character(#[from] CharacterError),
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

/// Everything a reward application credited, for reporting back to the player.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewardApplicationResult {
    /// Player-facing lines such as `+15 Gold`.
    pub applied: Vec<String>,
    pub currencies_gained: BTreeMap<CurrencyType, i64>,
    /// Experience actually credited per class, after XP gain modifiers.
    pub experience_gained: BTreeMap<String, i64>,
    /// Classes that gained at least one level.
    pub level_ups: Vec<ExperienceOutcome>,
    /// Rewards that could not be applied and why.
    pub skipped: Vec<String>,
}

pub struct QuestRewards {
    character_repo: Arc<dyn CharacterRepo>,
    quest_run_repo: Arc<dyn QuestRunRepo>,
    characters: Arc<Characters>,
    clock: Arc<dyn ClockPort>,
}

impl QuestRewards {
    pub fn new(
        character_repo: Arc<dyn CharacterRepo>,
        quest_run_repo: Arc<dyn QuestRunRepo>,
        characters: Arc<Characters>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            character_repo,
            quest_run_repo,
            characters,
            clock,
        }
    }

    /// Credit a completed run's rewards to the primary character, exactly once.
    ///
    /// The character is saved before the run is marked as paid, and the two
    /// writes are not atomic. If the run save fails after the character save
    /// succeeded, the run still reads as unpaid and a retry credits the
    /// rewards again. The run save error is returned in that case, so a
    /// caller seeing `RewardError::Repo` cannot assume nothing was paid.
    pub async fn apply_quest_rewards(
        &self,
        run_id: QuestRunId,
    ) -> Result<RewardApplicationResult, RewardError> {
        let mut run = self
            .quest_run_repo
            .get(run_id)
            .await?
            .ok_or(RewardError::RunNotFound)?;
        if run.status() != QuestRunStatus::Completed {
            return Err(RewardError::NotCompleted(run.status()));
        }
        if run.rewards_applied() {
            return Err(RewardError::AlreadyApplied);
        }

        let now = self.clock.now();
        let mut character = self.characters.get_or_create().await?;
        let mut result = RewardApplicationResult::default();

        for reward in run.rewards() {
            match character.apply_reward(reward, now) {
                Ok(outcome) => {
                    if let Some(line) = outcome.describe() {
                        result.applied.push(line);
                    }
                    match outcome {
                        RewardOutcome::Currency {
                            currency, amount, ..
                        } => {
                            let total = result.currencies_gained.entry(currency).or_insert(0);
                            *total = total.saturating_add(amount);
                        }
                        RewardOutcome::Experience(xp) => {
                            let total = result
                                .experience_gained
                                .entry(xp.class_name.clone())
                                .or_insert(0);
                            *total = total.saturating_add(xp.gained);
                            if xp.leveled_up() {
                                tracing::info!(
                                    class = %xp.class_name,
                                    level = xp.level_after,
                                    "Class leveled up"
                                );
                                result.level_ups.push(xp);
                            }
                        }
                        RewardOutcome::Unsupported { reward_type } => {
                            tracing::warn!(
                                quest_run_id = %run_id,
                                reward_type = ?reward_type,
                                "Reward type is not supported; skipping"
                            );
                            result.skipped.push(format!(
                                "{:?} reward '{}' is not supported",
                                reward_type,
                                reward.reward_class()
                            ));
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        quest_run_id = %run_id,
                        reward_class = %reward.reward_class(),
                        error = %e,
                        "Could not apply reward; skipping"
                    );
                    result
                        .skipped
                        .push(format!("{} ({})", reward.reward_class(), e));
                }
            }
        }

        run.mark_rewards_applied(now)?;
        self.character_repo.save(&character).await?;
        if let Err(e) = self.quest_run_repo.save(&run).await {
            tracing::error!(
                quest_run_id = %run_id,
                error = %e,
                "Character was credited but the run could not be marked as paid"
            );
            return Err(e.into());
        }

        tracing::info!(
            quest_run_id = %run_id,
            applied = result.applied.len(),
            skipped = result.skipped.len(),
            "Quest rewards applied"
        );
        Ok(result)
    }
}
