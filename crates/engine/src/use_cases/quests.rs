//! Quest catalogue CRUD.

use std::sync::Arc;

use lifeforge_domain::{
    Description, DifficultyLevel, DomainError, Quest, QuestId, QuestName, QuestRepeatability,
    Reward,
};

use crate::infrastructure::ports::{ClockPort, QuestRepo, RepoError};

#[derive(Debug, thiserror::Error)]
pub enum QuestError {
    #[error("Quest not found")]
    NotFound,
    #[error("Validation error: {0}")]
    Validation(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Default)]
pub struct NewQuest {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub difficulty: DifficultyLevel,
    pub repeatability: QuestRepeatability,
    /// Empty means the difficulty's default payout.
    pub rewards: Vec<Reward>,
}

#[derive(Debug, Clone, Default)]
pub struct QuestUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<Option<String>>,
    pub difficulty: Option<DifficultyLevel>,
    pub repeatability: Option<QuestRepeatability>,
    pub rewards: Option<Vec<Reward>>,
}

pub struct QuestCatalog {
    quest_repo: Arc<dyn QuestRepo>,
    clock: Arc<dyn ClockPort>,
}

impl QuestCatalog {
    pub fn new(quest_repo: Arc<dyn QuestRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { quest_repo, clock }
    }

    pub async fn create(&self, input: NewQuest) -> Result<Quest, QuestError> {
        let mut quest = Quest::new(QuestName::new(input.name)?, input.difficulty, self.clock.now())
            .with_repeatability(input.repeatability)
            .with_rewards(input.rewards);
        if let Some(description) = input.description {
            quest = quest.with_description(Description::new(description)?);
        }
        if let Some(icon) = input.icon {
            quest = quest.with_icon(icon);
        }

        self.quest_repo.save(&quest).await?;
        tracing::info!(quest_id = %quest.id(), name = %quest.name(), "Quest created");
        Ok(quest)
    }

    pub async fn update(&self, id: QuestId, update: QuestUpdate) -> Result<Quest, QuestError> {
        let mut quest = self.quest_repo.get(id).await?.ok_or(QuestError::NotFound)?;

        if let Some(name) = update.name {
            quest.rename(QuestName::new(name)?);
        }
        if let Some(description) = update.description {
            quest.set_description(Description::new(description)?);
        }
        if let Some(icon) = update.icon {
            quest.set_icon(icon);
        }
        if let Some(difficulty) = update.difficulty {
            quest.set_difficulty(difficulty);
        }
        if let Some(repeatability) = update.repeatability {
            quest.set_repeatability(repeatability);
        }
        if let Some(rewards) = update.rewards {
            quest.set_rewards(rewards);
        }
        quest.touch(self.clock.now());

        self.quest_repo.save(&quest).await?;
        tracing::info!(quest_id = %id, "Quest updated");
        Ok(quest)
    }

    pub async fn get(&self, id: QuestId) -> Result<Option<Quest>, QuestError> {
        Ok(self.quest_repo.get(id).await?)
    }

    pub async fn list(&self) -> Result<Vec<Quest>, QuestError> {
        Ok(self.quest_repo.list().await?)
    }

    pub async fn delete(&self, id: QuestId) -> Result<(), QuestError> {
        if self.quest_repo.get(id).await?.is_none() {
            return Err(QuestError::NotFound);
        }
        self.quest_repo.delete(id).await?;
        tracing::info!(quest_id = %id, "Quest deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockClockPort, MockQuestRepo};
    use crate::test_fixtures::start_time;

    fn clock() -> Arc<MockClockPort> {
        let mut clock = MockClockPort::new();
        clock.expect_now().returning(start_time);
        Arc::new(clock)
    }

    #[tokio::test]
    async fn create_without_rewards_uses_the_difficulty_payout() {
        let mut repo = MockQuestRepo::new();
        repo.expect_save().times(1).returning(|_| Ok(()));

        let catalog = QuestCatalog::new(Arc::new(repo), clock());
        let quest = catalog
            .create(NewQuest {
                name: "Morning run".to_string(),
                difficulty: DifficultyLevel::Hard,
                repeatability: QuestRepeatability::Daily,
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(quest.rewards().is_empty());
        assert_eq!(quest.rewards_or_default(), Reward::default_for(DifficultyLevel::Hard));
    }

    #[tokio::test]
    async fn create_rejects_empty_name() {
        let mut repo = MockQuestRepo::new();
        repo.expect_save().never();

        let catalog = QuestCatalog::new(Arc::new(repo), clock());
        let result = catalog.create(NewQuest::default()).await;
        assert!(matches!(result, Err(QuestError::Validation(_))));
    }

    #[tokio::test]
    async fn update_replaces_rewards() {
        let existing = Quest::new(
            QuestName::new("Read").unwrap(),
            DifficultyLevel::Easy,
            start_time(),
        );
        let id = existing.id();
        let mut repo = MockQuestRepo::new();
        repo.expect_get()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_save().returning(|_| Ok(()));

        let catalog = QuestCatalog::new(Arc::new(repo), clock());
        let karma = Reward::currency("Karma", 3).unwrap();
        let updated = catalog
            .update(
                id,
                QuestUpdate {
                    rewards: Some(vec![karma.clone()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.rewards(), &[karma]);
        assert_eq!(updated.difficulty(), DifficultyLevel::Easy);
    }

    #[tokio::test]
    async fn update_of_unknown_quest_is_not_found() {
        let mut repo = MockQuestRepo::new();
        repo.expect_get().returning(|_| Ok(None));

        let catalog = QuestCatalog::new(Arc::new(repo), clock());
        let result = catalog.update(QuestId::new(), QuestUpdate::default()).await;
        assert!(matches!(result, Err(QuestError::NotFound)));
    }
}
