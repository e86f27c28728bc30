//! Character use cases.
//!
//! LifeForge has a single player character. It is created on demand the
//! first time anything asks for it.

use std::sync::Arc;

use lifeforge_domain::{BaseStats, Character, CharacterId, CharacterName, DomainError, EffectiveStats};

use crate::infrastructure::ports::{CharacterRepo, ClockPort, RepoError};

#[derive(Debug, thiserror::Error)]
pub enum CharacterError {
    #[error("Character not found")]
    NotFound,
    #[error("Validation error: {0}")]
    Validation(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

/// Fields of the character profile that the player may edit.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub stats: Option<BaseStats>,
}

pub struct Characters {
    character_repo: Arc<dyn CharacterRepo>,
    clock: Arc<dyn ClockPort>,
}

impl Characters {
    pub fn new(character_repo: Arc<dyn CharacterRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            character_repo,
            clock,
        }
    }

    /// The primary character, created with default stats if none exists yet.
    pub async fn get_or_create(&self) -> Result<Character, CharacterError> {
        if let Some(character) = self.character_repo.get_primary().await? {
            return Ok(character);
        }
        let character = Character::default_hero(self.clock.now())?;
        self.character_repo.save(&character).await?;
        tracing::info!(character_id = %character.id(), "Created default character");
        Ok(character)
    }

    pub async fn get(&self, id: CharacterId) -> Result<Option<Character>, CharacterError> {
        Ok(self.character_repo.get(id).await?)
    }

    pub async fn list(&self) -> Result<Vec<Character>, CharacterError> {
        Ok(self.character_repo.list().await?)
    }

    pub async fn update_profile(
        &self,
        id: CharacterId,
        update: ProfileUpdate,
    ) -> Result<Character, CharacterError> {
        let mut character = self
            .character_repo
            .get(id)
            .await?
            .ok_or(CharacterError::NotFound)?;

        let name = match update.name {
            Some(name) => CharacterName::new(name)?,
            None => character.name().clone(),
        };
        let stats = update.stats.unwrap_or(*character.base_stats());
        character.update_profile(name, stats, self.clock.now());

        self.character_repo.save(&character).await?;
        tracing::info!(character_id = %id, "Character profile updated");
        Ok(character)
    }

    /// Base stats with the stored aggregate buff modifier applied.
    pub async fn effective_stats(&self, id: CharacterId) -> Result<EffectiveStats, CharacterError> {
        let character = self
            .character_repo
            .get(id)
            .await?
            .ok_or(CharacterError::NotFound)?;
        Ok(character.effective_stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockCharacterRepo, MockClockPort};
    use crate::test_fixtures::{hero, start_time};
    use lifeforge_domain::{StatModifiers, DEFAULT_HERO_NAME};

    fn clock() -> Arc<MockClockPort> {
        let mut clock = MockClockPort::new();
        clock.expect_now().returning(start_time);
        Arc::new(clock)
    }

    #[tokio::test]
    async fn get_or_create_returns_existing_character() {
        let existing = hero(start_time());
        let expected_id = existing.id();
        let mut repo = MockCharacterRepo::new();
        repo.expect_get_primary()
            .returning(move || Ok(Some(existing.clone())));
        repo.expect_save().never();

        let use_case = Characters::new(Arc::new(repo), clock());
        let character = use_case.get_or_create().await.unwrap();
        assert_eq!(character.id(), expected_id);
    }

    #[tokio::test]
    async fn get_or_create_creates_the_default_hero() {
        let mut repo = MockCharacterRepo::new();
        repo.expect_get_primary().returning(|| Ok(None));
        repo.expect_save()
            .withf(|c| c.name().as_str() == DEFAULT_HERO_NAME)
            .times(1)
            .returning(|_| Ok(()));

        let use_case = Characters::new(Arc::new(repo), clock());
        let character = use_case.get_or_create().await.unwrap();
        assert_eq!(character.base_stats(), &BaseStats::default());
        assert_eq!(character.created_at(), start_time());
    }

    #[tokio::test]
    async fn update_profile_keeps_unspecified_fields() {
        let existing = hero(start_time());
        let id = existing.id();
        let mut repo = MockCharacterRepo::new();
        repo.expect_get()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_save().returning(|_| Ok(()));

        let use_case = Characters::new(Arc::new(repo), clock());
        let updated = use_case
            .update_profile(
                id,
                ProfileUpdate {
                    name: Some("Ada".to_string()),
                    stats: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name().as_str(), "Ada");
        assert_eq!(updated.base_stats(), &BaseStats::default());
    }

    #[tokio::test]
    async fn update_profile_rejects_blank_name() {
        let existing = hero(start_time());
        let id = existing.id();
        let mut repo = MockCharacterRepo::new();
        repo.expect_get()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_save().never();

        let use_case = Characters::new(Arc::new(repo), clock());
        let result = use_case
            .update_profile(
                id,
                ProfileUpdate {
                    name: Some("   ".to_string()),
                    stats: None,
                },
            )
            .await;
        assert!(matches!(result, Err(CharacterError::Validation(_))));
    }

    #[tokio::test]
    async fn effective_stats_apply_stored_modifiers() {
        let mut existing = hero(start_time());
        existing.set_active_buff_modifiers(StatModifiers::new().with_hp_max(20, 0), start_time());
        let id = existing.id();
        let mut repo = MockCharacterRepo::new();
        repo.expect_get()
            .returning(move |_| Ok(Some(existing.clone())));

        let use_case = Characters::new(Arc::new(repo), clock());
        let stats = use_case.effective_stats(id).await.unwrap();
        assert_eq!(stats.hp_max, 120);
    }

    #[tokio::test]
    async fn missing_character_is_not_found() {
        let mut repo = MockCharacterRepo::new();
        repo.expect_get().returning(|_| Ok(None));

        let use_case = Characters::new(Arc::new(repo), clock());
        let result = use_case.effective_stats(CharacterId::new()).await;
        assert!(matches!(result, Err(CharacterError::NotFound)));
    }
}
