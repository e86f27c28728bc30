//! Aggregate modifier use cases.
//!
//! Recomputes a character's aggregate buff modifier from its stored buff
//! instances and writes it back onto the character.

use std::collections::HashMap;
use std::sync::Arc;

use lifeforge_domain::{aggregate_modifiers, Aggregation, CharacterId, ModifiersChange};

use crate::infrastructure::ports::{
    BuffInstanceRepo, BuffRepo, CharacterRepo, ClockPort, RepoError,
};

pub struct BuffAggregation {
    character_repo: Arc<dyn CharacterRepo>,
    buff_repo: Arc<dyn BuffRepo>,
    instance_repo: Arc<dyn BuffInstanceRepo>,
    clock: Arc<dyn ClockPort>,
}

impl BuffAggregation {
    pub fn new(
        character_repo: Arc<dyn CharacterRepo>,
        buff_repo: Arc<dyn BuffRepo>,
        instance_repo: Arc<dyn BuffInstanceRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            character_repo,
            buff_repo,
            instance_repo,
            clock,
        }
    }

    /// Sum the character's active buff instances.
    ///
    /// Instances whose buff definition was deleted contribute nothing and
    /// are logged.
    pub async fn calculate(&self, character_id: CharacterId) -> Result<Aggregation, RepoError> {
        let instances = self.instance_repo.list_for_character(character_id).await?;

        let mut max_stacks = HashMap::new();
        for instance in instances.iter().filter(|i| i.is_active()) {
            let buff_id = instance.buff_id();
            if max_stacks.contains_key(&buff_id) {
                continue;
            }
            let cap = self.buff_repo.get(buff_id).await?.map(|b| b.max_stacks());
            max_stacks.insert(buff_id, cap);
        }

        let aggregation =
            aggregate_modifiers(&instances, |id| max_stacks.get(&id).copied().flatten());
        for buff_id in &aggregation.missing_buffs {
            tracing::warn!(
                character_id = %character_id,
                buff_id = %buff_id,
                "Active buff instance refers to a missing buff; ignoring it"
            );
        }
        tracing::debug!(
            character_id = %character_id,
            buffs = aggregation.counted_stacks.len(),
            "Calculated aggregate modifiers"
        );
        Ok(aggregation)
    }

    /// Recalculate and persist the aggregate onto the character.
    ///
    /// Returns `None` when the character does not exist.
    pub async fn refresh(
        &self,
        character_id: CharacterId,
    ) -> Result<Option<ModifiersChange>, RepoError> {
        let Some(mut character) = self.character_repo.get(character_id).await? else {
            tracing::warn!(
                character_id = %character_id,
                "Cannot refresh modifiers: character not found"
            );
            return Ok(None);
        };

        let aggregation = self.calculate(character_id).await?;
        let change = character.set_active_buff_modifiers(aggregation.modifiers, self.clock.now());
        if let ModifiersChange::Changed { .. } = change {
            self.character_repo.save(&character).await?;
            tracing::info!(character_id = %character_id, "Aggregate modifiers updated");
        }
        Ok(Some(change))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{
        MockBuffInstanceRepo, MockBuffRepo, MockCharacterRepo, MockClockPort,
    };
    use crate::test_fixtures::{buff, hero, start_time};
    use lifeforge_domain::{BuffInstance, StatModifiers};
    use mockall::predicate::*;

    fn clock() -> MockClockPort {
        let mut clock = MockClockPort::new();
        clock.expect_now().returning(start_time);
        clock
    }

    #[tokio::test]
    async fn missing_buff_definitions_contribute_nothing() {
        let character = hero(start_time());
        let character_id = character.id();
        let kept = buff("Focused", StatModifiers::new().with_mp(5, 0), start_time());
        let gone = buff("Forgotten", StatModifiers::new().with_hp(50, 0), start_time());
        let kept_id = kept.id();
        let instances = vec![
            BuffInstance::activate_now(&kept, character_id, start_time()).unwrap(),
            BuffInstance::activate_now(&gone, character_id, start_time()).unwrap(),
        ];

        let mut instance_repo = MockBuffInstanceRepo::new();
        instance_repo
            .expect_list_for_character()
            .with(eq(character_id))
            .returning(move |_| Ok(instances.clone()));
        let mut buff_repo = MockBuffRepo::new();
        buff_repo.expect_get().returning(move |id| {
            Ok((id == kept_id).then(|| kept.clone()))
        });

        let use_case = BuffAggregation::new(
            Arc::new(MockCharacterRepo::new()),
            Arc::new(buff_repo),
            Arc::new(instance_repo),
            Arc::new(clock()),
        );

        let aggregation = use_case.calculate(character_id).await.unwrap();
        assert_eq!(aggregation.modifiers, StatModifiers::new().with_mp(5, 0));
        assert_eq!(aggregation.missing_buffs.len(), 1);
    }

    #[tokio::test]
    async fn refresh_of_missing_character_is_a_no_op() {
        let mut character_repo = MockCharacterRepo::new();
        character_repo.expect_get().returning(|_| Ok(None));
        character_repo.expect_save().never();

        let use_case = BuffAggregation::new(
            Arc::new(character_repo),
            Arc::new(MockBuffRepo::new()),
            Arc::new(MockBuffInstanceRepo::new()),
            Arc::new(clock()),
        );

        let result = use_case.refresh(CharacterId::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn refresh_skips_the_write_when_nothing_changed() {
        let character = hero(start_time());
        let character_id = character.id();

        let mut character_repo = MockCharacterRepo::new();
        character_repo
            .expect_get()
            .returning(move |_| Ok(Some(character.clone())));
        character_repo.expect_save().never();
        let mut instance_repo = MockBuffInstanceRepo::new();
        instance_repo
            .expect_list_for_character()
            .returning(|_| Ok(Vec::new()));

        let use_case = BuffAggregation::new(
            Arc::new(character_repo),
            Arc::new(MockBuffRepo::new()),
            Arc::new(instance_repo),
            Arc::new(clock()),
        );

        let change = use_case.refresh(character_id).await.unwrap();
        assert_eq!(change, Some(ModifiersChange::Unchanged));
    }

    #[tokio::test]
    async fn refresh_persists_a_changed_aggregate() {
        let character = hero(start_time());
        let character_id = character.id();
        let strong = buff("Strong", StatModifiers::new().with_hp_max(0, 10), start_time());
        let instances =
            vec![BuffInstance::activate_now(&strong, character_id, start_time()).unwrap()];

        let mut character_repo = MockCharacterRepo::new();
        character_repo
            .expect_get()
            .returning(move |_| Ok(Some(character.clone())));
        character_repo
            .expect_save()
            .withf(|c| c.active_buff_modifiers().hp_max_percent == 10)
            .times(1)
            .returning(|_| Ok(()));
        let mut instance_repo = MockBuffInstanceRepo::new();
        instance_repo
            .expect_list_for_character()
            .returning(move |_| Ok(instances.clone()));
        let mut buff_repo = MockBuffRepo::new();
        buff_repo
            .expect_get()
            .returning(move |_| Ok(Some(strong.clone())));

        let use_case = BuffAggregation::new(
            Arc::new(character_repo),
            Arc::new(buff_repo),
            Arc::new(instance_repo),
            Arc::new(clock()),
        );

        let change = use_case.refresh(character_id).await.unwrap();
        assert!(matches!(change, Some(ModifiersChange::Changed { .. })));
    }
}
