//! Repository port traits for document storage.
//!
//! `save` is always an upsert keyed by the aggregate's id. `delete` of a
//! missing id is not an error.

use async_trait::async_trait;
use lifeforge_domain::{
    Action, ActionCategory, ActionId, Buff, BuffId, BuffInstance, BuffInstanceId,
    BuffInstanceStatus, Character, CharacterId, Quest, QuestId, QuestRun, QuestRunId,
};

use super::error::RepoError;

// =============================================================================
// Database Ports (one per aggregate)
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterRepo: Send + Sync {
    async fn get(&self, id: CharacterId) -> Result<Option<Character>, RepoError>;
    /// The single player character, oldest first if several exist.
    async fn get_primary(&self) -> Result<Option<Character>, RepoError>;
    async fn list(&self) -> Result<Vec<Character>, RepoError>;
    async fn save(&self, character: &Character) -> Result<(), RepoError>;
    async fn delete(&self, id: CharacterId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BuffRepo: Send + Sync {
    async fn get(&self, id: BuffId) -> Result<Option<Buff>, RepoError>;
    async fn list(&self) -> Result<Vec<Buff>, RepoError>;
    async fn save(&self, buff: &Buff) -> Result<(), RepoError>;
    async fn delete(&self, id: BuffId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BuffInstanceRepo: Send + Sync {
    async fn get(&self, id: BuffInstanceId) -> Result<Option<BuffInstance>, RepoError>;
    async fn list(&self) -> Result<Vec<BuffInstance>, RepoError>;
    async fn list_for_character(
        &self,
        character_id: CharacterId,
    ) -> Result<Vec<BuffInstance>, RepoError>;
    async fn list_by_status(
        &self,
        status: BuffInstanceStatus,
    ) -> Result<Vec<BuffInstance>, RepoError>;
    async fn save(&self, instance: &BuffInstance) -> Result<(), RepoError>;
    async fn save_all(&self, instances: &[BuffInstance]) -> Result<(), RepoError>;
    async fn delete(&self, id: BuffInstanceId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestRepo: Send + Sync {
    async fn get(&self, id: QuestId) -> Result<Option<Quest>, RepoError>;
    async fn list(&self) -> Result<Vec<Quest>, RepoError>;
    async fn save(&self, quest: &Quest) -> Result<(), RepoError>;
    async fn delete(&self, id: QuestId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestRunRepo: Send + Sync {
    async fn get(&self, id: QuestRunId) -> Result<Option<QuestRun>, RepoError>;
    async fn list(&self) -> Result<Vec<QuestRun>, RepoError>;
    async fn list_in_progress(&self) -> Result<Vec<QuestRun>, RepoError>;
    async fn list_for_quest(&self, quest_id: QuestId) -> Result<Vec<QuestRun>, RepoError>;
    async fn save(&self, run: &QuestRun) -> Result<(), RepoError>;
    async fn delete(&self, id: QuestRunId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActionRepo: Send + Sync {
    async fn get(&self, id: ActionId) -> Result<Option<Action>, RepoError>;
    async fn list(&self) -> Result<Vec<Action>, RepoError>;
    async fn list_by_category(&self, category: ActionCategory) -> Result<Vec<Action>, RepoError>;
    async fn save(&self, action: &Action) -> Result<(), RepoError>;
    async fn delete(&self, id: ActionId) -> Result<(), RepoError>;
}
