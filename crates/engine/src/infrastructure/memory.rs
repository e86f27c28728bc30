//! In-memory repositories backed by `DashMap`.
//!
//! Used by the flow tests and by `STORAGE=memory` for throwaway runs.
//! Lists are returned sorted by creation time so results are stable.

use std::hash::Hash;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use lifeforge_domain::{
    Action, ActionCategory, ActionId, Buff, BuffId, BuffInstance, BuffInstanceId,
    BuffInstanceStatus, Character, CharacterId, Quest, QuestId, QuestRun, QuestRunId,
    QuestRunStatus,
};

use crate::infrastructure::ports::{
    ActionRepo, BuffInstanceRepo, BuffRepo, CharacterRepo, QuestRepo, QuestRunRepo, RepoError,
};

/// One keyed collection of cloned aggregates.
struct Collection<K, V> {
    items: DashMap<K, V>,
}

impl<K, V> Collection<K, V>
where
    K: Eq + Hash + Copy,
    V: Clone,
{
    fn new() -> Self {
        Self {
            items: DashMap::new(),
        }
    }

    fn get(&self, id: K) -> Option<V> {
        self.items.get(&id).map(|r| r.value().clone())
    }

    fn put(&self, id: K, value: &V) {
        self.items.insert(id, value.clone());
    }

    fn remove(&self, id: K) {
        self.items.remove(&id);
    }

    fn filtered(
        &self,
        keep: impl Fn(&V) -> bool,
        created_at: impl Fn(&V) -> DateTime<Utc>,
    ) -> Vec<V> {
        let mut out: Vec<V> = self
            .items
            .iter()
            .filter(|r| keep(r.value()))
            .map(|r| r.value().clone())
            .collect();
        out.sort_by_key(|v| created_at(v));
        out
    }
}

// =============================================================================
// Characters
// =============================================================================

pub struct InMemoryCharacterRepo {
    characters: Collection<CharacterId, Character>,
}

#[async_trait]
impl CharacterRepo for InMemoryCharacterRepo {
    async fn get(&self, id: CharacterId) -> Result<Option<Character>, RepoError> {
        Ok(self.characters.get(id))
    }

    async fn get_primary(&self) -> Result<Option<Character>, RepoError> {
        Ok(self
            .characters
            .filtered(|_| true, Character::created_at)
            .into_iter()
            .next())
    }

    async fn list(&self) -> Result<Vec<Character>, RepoError> {
        Ok(self.characters.filtered(|_| true, Character::created_at))
    }

    async fn save(&self, character: &Character) -> Result<(), RepoError> {
        self.characters.put(character.id(), character);
        Ok(())
    }

    async fn delete(&self, id: CharacterId) -> Result<(), RepoError> {
        self.characters.remove(id);
        Ok(())
    }
}

// =============================================================================
// Buffs
// =============================================================================

pub struct InMemoryBuffRepo {
    buffs: Collection<BuffId, Buff>,
}

#[async_trait]
impl BuffRepo for InMemoryBuffRepo {
    async fn get(&self, id: BuffId) -> Result<Option<Buff>, RepoError> {
        Ok(self.buffs.get(id))
    }

    async fn list(&self) -> Result<Vec<Buff>, RepoError> {
        Ok(self.buffs.filtered(|_| true, Buff::created_at))
    }

    async fn save(&self, buff: &Buff) -> Result<(), RepoError> {
        self.buffs.put(buff.id(), buff);
        Ok(())
    }

    async fn delete(&self, id: BuffId) -> Result<(), RepoError> {
        self.buffs.remove(id);
        Ok(())
    }
}

pub struct InMemoryBuffInstanceRepo {
    instances: Collection<BuffInstanceId, BuffInstance>,
}

#[async_trait]
impl BuffInstanceRepo for InMemoryBuffInstanceRepo {
    async fn get(&self, id: BuffInstanceId) -> Result<Option<BuffInstance>, RepoError> {
        Ok(self.instances.get(id))
    }

    async fn list(&self) -> Result<Vec<BuffInstance>, RepoError> {
        Ok(self.instances.filtered(|_| true, BuffInstance::created_at))
    }

    async fn list_for_character(
        &self,
        character_id: CharacterId,
    ) -> Result<Vec<BuffInstance>, RepoError> {
        Ok(self.instances.filtered(
            |i| i.character_id() == character_id,
            BuffInstance::created_at,
        ))
    }

    async fn list_by_status(
        &self,
        status: BuffInstanceStatus,
    ) -> Result<Vec<BuffInstance>, RepoError> {
        Ok(self
            .instances
            .filtered(|i| i.status() == status, BuffInstance::created_at))
    }

    async fn save(&self, instance: &BuffInstance) -> Result<(), RepoError> {
        self.instances.put(instance.id(), instance);
        Ok(())
    }

    async fn save_all(&self, instances: &[BuffInstance]) -> Result<(), RepoError> {
        for instance in instances {
            self.instances.put(instance.id(), instance);
        }
        Ok(())
    }

    async fn delete(&self, id: BuffInstanceId) -> Result<(), RepoError> {
        self.instances.remove(id);
        Ok(())
    }
}

// =============================================================================
// Quests
// =============================================================================

pub struct InMemoryQuestRepo {
    quests: Collection<QuestId, Quest>,
}

#[async_trait]
impl QuestRepo for InMemoryQuestRepo {
    async fn get(&self, id: QuestId) -> Result<Option<Quest>, RepoError> {
        Ok(self.quests.get(id))
    }

    async fn list(&self) -> Result<Vec<Quest>, RepoError> {
        Ok(self.quests.filtered(|_| true, Quest::created_at))
    }

    async fn save(&self, quest: &Quest) -> Result<(), RepoError> {
        self.quests.put(quest.id(), quest);
        Ok(())
    }

    async fn delete(&self, id: QuestId) -> Result<(), RepoError> {
        self.quests.remove(id);
        Ok(())
    }
}

pub struct InMemoryQuestRunRepo {
    runs: Collection<QuestRunId, QuestRun>,
}

#[async_trait]
impl QuestRunRepo for InMemoryQuestRunRepo {
    async fn get(&self, id: QuestRunId) -> Result<Option<QuestRun>, RepoError> {
        Ok(self.runs.get(id))
    }

    async fn list(&self) -> Result<Vec<QuestRun>, RepoError> {
        Ok(self.runs.filtered(|_| true, QuestRun::created_at))
    }

    async fn list_in_progress(&self) -> Result<Vec<QuestRun>, RepoError> {
        Ok(self.runs.filtered(
            |r| r.status() == QuestRunStatus::InProgress,
            QuestRun::created_at,
        ))
    }

    async fn list_for_quest(&self, quest_id: QuestId) -> Result<Vec<QuestRun>, RepoError> {
        Ok(self
            .runs
            .filtered(|r| r.quest_id() == quest_id, QuestRun::created_at))
    }

    async fn save(&self, run: &QuestRun) -> Result<(), RepoError> {
        self.runs.put(run.id(), run);
        Ok(())
    }

    async fn delete(&self, id: QuestRunId) -> Result<(), RepoError> {
        self.runs.remove(id);
        Ok(())
    }
}

// =============================================================================
// Actions
// =============================================================================

pub struct InMemoryActionRepo {
    actions: Collection<ActionId, Action>,
}

#[async_trait]
impl ActionRepo for InMemoryActionRepo {
    async fn get(&self, id: ActionId) -> Result<Option<Action>, RepoError> {
        Ok(self.actions.get(id))
    }

    async fn list(&self) -> Result<Vec<Action>, RepoError> {
        Ok(self.actions.filtered(|_| true, Action::created_at))
    }

    async fn list_by_category(&self, category: ActionCategory) -> Result<Vec<Action>, RepoError> {
        Ok(self
            .actions
            .filtered(|a| a.category() == category, Action::created_at))
    }

    async fn save(&self, action: &Action) -> Result<(), RepoError> {
        self.actions.put(action.id(), action);
        Ok(())
    }

    async fn delete(&self, id: ActionId) -> Result<(), RepoError> {
        self.actions.remove(id);
        Ok(())
    }
}

// =============================================================================
// Bundle
// =============================================================================

/// All in-memory repositories, sharing nothing but the process.
#[derive(Clone)]
pub struct InMemoryRepositories {
    pub character: Arc<InMemoryCharacterRepo>,
    pub buff: Arc<InMemoryBuffRepo>,
    pub buff_instance: Arc<InMemoryBuffInstanceRepo>,
    pub quest: Arc<InMemoryQuestRepo>,
    pub quest_run: Arc<InMemoryQuestRunRepo>,
    pub action: Arc<InMemoryActionRepo>,
}

impl InMemoryRepositories {
    pub fn new() -> Self {
        Self {
            character: Arc::new(InMemoryCharacterRepo {
                characters: Collection::new(),
            }),
            buff: Arc::new(InMemoryBuffRepo {
                buffs: Collection::new(),
            }),
            buff_instance: Arc::new(InMemoryBuffInstanceRepo {
                instances: Collection::new(),
            }),
            quest: Arc::new(InMemoryQuestRepo {
                quests: Collection::new(),
            }),
            quest_run: Arc::new(InMemoryQuestRunRepo {
                runs: Collection::new(),
            }),
            action: Arc::new(InMemoryActionRepo {
                actions: Collection::new(),
            }),
        }
    }
}

impl Default for InMemoryRepositories {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use lifeforge_domain::{BuffName, StatModifiers};

    fn t(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, 8, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn primary_character_is_the_oldest() {
        let repos = InMemoryRepositories::new();
        let newer = Character::default_hero(t(3)).unwrap();
        let older = Character::default_hero(t(1)).unwrap();
        repos.character.save(&newer).await.unwrap();
        repos.character.save(&older).await.unwrap();

        let primary = repos.character.get_primary().await.unwrap().unwrap();
        assert_eq!(primary.id(), older.id());
    }

    #[tokio::test]
    async fn save_is_an_upsert() {
        let repos = InMemoryRepositories::new();
        let mut buff = Buff::new(BuffName::new("Calm").unwrap(), StatModifiers::new(), t(1));
        repos.buff.save(&buff).await.unwrap();
        buff.set_max_stacks(4).unwrap();
        repos.buff.save(&buff).await.unwrap();

        let all = repos.buff.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].max_stacks(), 4);
    }

    #[tokio::test]
    async fn instances_filter_by_character_and_status() {
        let repos = InMemoryRepositories::new();
        let buff = Buff::new(BuffName::new("Calm").unwrap(), StatModifiers::new(), t(1));
        let me = CharacterId::new();
        let other = CharacterId::new();
        let mine = BuffInstance::activate_now(&buff, me, t(1)).unwrap();
        let mut theirs = BuffInstance::activate_now(&buff, other, t(2)).unwrap();
        theirs.cancel(t(2)).unwrap();
        repos
            .buff_instance
            .save_all(&[mine.clone(), theirs.clone()])
            .await
            .unwrap();

        let for_me = repos.buff_instance.list_for_character(me).await.unwrap();
        assert_eq!(for_me, vec![mine.clone()]);
        let cancelled = repos
            .buff_instance
            .list_by_status(BuffInstanceStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled, vec![theirs]);

        repos.buff_instance.delete(mine.id()).await.unwrap();
        assert!(repos.buff_instance.get(mine.id()).await.unwrap().is_none());
    }
}
