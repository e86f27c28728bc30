//! Action use cases: the catalogue of everyday activities and performing them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use lifeforge_domain::{
    Action, ActionCategory, ActionId, ActionName, BuffId, CharacterId, CooldownStatus,
    Description, DomainError,
};

use crate::infrastructure::ports::{ActionRepo, ClockPort, RepoError};

use super::buff_instances::{ActivationResult, BuffInstances};

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Action not found")]
    NotFound,
    #[error("Action is on cooldown until {ready_at}")]
    OnCooldown { ready_at: DateTime<Utc> },
    #[error("Validation error: {0}")]
    Validation(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Default)]
pub struct NewAction {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub category: ActionCategory,
    pub buff_ids: Vec<BuffId>,
    pub cooldown_hours: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ActionUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<Option<String>>,
    pub category: Option<ActionCategory>,
    pub buff_ids: Option<Vec<BuffId>>,
    pub cooldown_hours: Option<u32>,
}

/// Result of performing an action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerformResult {
    pub activated: Vec<(BuffId, ActivationResult)>,
    /// Buffs that could not be activated, with the reason.
    pub failed: Vec<(BuffId, String)>,
}

impl PerformResult {
    /// An action counts as performed when at least one of its buffs took effect.
    pub fn is_success(&self) -> bool {
        !self.activated.is_empty()
    }
}

pub struct Actions {
    action_repo: Arc<dyn ActionRepo>,
    buff_instances: Arc<BuffInstances>,
    clock: Arc<dyn ClockPort>,
}

impl Actions {
    pub fn new(
        action_repo: Arc<dyn ActionRepo>,
        buff_instances: Arc<BuffInstances>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            action_repo,
            buff_instances,
            clock,
        }
    }

    pub async fn create(&self, input: NewAction) -> Result<Action, ActionError> {
        let mut action = Action::new(ActionName::new(input.name)?, input.category, self.clock.now())
            .with_buffs(input.buff_ids)
            .with_cooldown_hours(input.cooldown_hours);
        if let Some(description) = input.description {
            action = action.with_description(Description::new(description)?);
        }
        if let Some(icon) = input.icon {
            action = action.with_icon(icon);
        }

        self.action_repo.save(&action).await?;
        tracing::info!(action_id = %action.id(), name = %action.name(), "Action created");
        Ok(action)
    }

    pub async fn update(&self, id: ActionId, update: ActionUpdate) -> Result<Action, ActionError> {
        let mut action = self.action_repo.get(id).await?.ok_or(ActionError::NotFound)?;

        if let Some(name) = update.name {
            action.rename(ActionName::new(name)?);
        }
        if let Some(description) = update.description {
            action.set_description(Description::new(description)?);
        }
        if let Some(icon) = update.icon {
            action.set_icon(icon);
        }
        if let Some(category) = update.category {
            action.set_category(category);
        }
        if let Some(buff_ids) = update.buff_ids {
            action.set_buffs(buff_ids);
        }
        if let Some(hours) = update.cooldown_hours {
            action.set_cooldown_hours(hours);
        }
        action.touch(self.clock.now());

        self.action_repo.save(&action).await?;
        tracing::info!(action_id = %id, "Action updated");
        Ok(action)
    }

    pub async fn get(&self, id: ActionId) -> Result<Option<Action>, ActionError> {
        Ok(self.action_repo.get(id).await?)
    }

    pub async fn list(&self) -> Result<Vec<Action>, ActionError> {
        Ok(self.action_repo.list().await?)
    }

    pub async fn list_by_category(
        &self,
        category: ActionCategory,
    ) -> Result<Vec<Action>, ActionError> {
        Ok(self.action_repo.list_by_category(category).await?)
    }

    pub async fn delete(&self, id: ActionId) -> Result<(), ActionError> {
        if self.action_repo.get(id).await?.is_none() {
            return Err(ActionError::NotFound);
        }
        self.action_repo.delete(id).await?;
        tracing::info!(action_id = %id, "Action deleted");
        Ok(())
    }

    /// Perform an action: activate each of its buffs on the character.
    ///
    /// A buff that fails to activate does not stop the others. The action's
    /// cooldown only starts if something was activated.
    pub async fn perform(
        &self,
        action_id: ActionId,
        character_id: CharacterId,
    ) -> Result<PerformResult, ActionError> {
        let mut action = self
            .action_repo
            .get(action_id)
            .await?
            .ok_or(ActionError::NotFound)?;
        let now = self.clock.now();
        if let CooldownStatus::CoolingDown { ready_at } = action.check_cooldown(now) {
            return Err(ActionError::OnCooldown { ready_at });
        }

        let mut result = PerformResult::default();
        for &buff_id in action.buff_ids() {
            match self.buff_instances.activate(character_id, buff_id).await {
                Ok(activation) => result.activated.push((buff_id, activation)),
                Err(e) => {
                    tracing::warn!(
                        action_id = %action_id,
                        buff_id = %buff_id,
                        error = %e,
                        "Failed to activate buff for action"
                    );
                    result.failed.push((buff_id, e.to_string()));
                }
            }
        }

        if result.is_success() {
            action.record_performed(now);
            self.action_repo.save(&action).await?;
            tracing::info!(
                action_id = %action_id,
                character_id = %character_id,
                activated = result.activated.len(),
                "Action performed"
            );
        } else {
            tracing::warn!(
                action_id = %action_id,
                character_id = %character_id,
                "Action activated no buffs"
            );
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{ActionRepo, BuffRepo, CharacterRepo};
    use crate::test_fixtures::{buff, hero, memory_app, start_time, ManualClock};
    use chrono::Duration;
    use lifeforge_domain::StatModifiers;

    #[tokio::test]
    async fn perform_activates_buffs_and_starts_the_cooldown() {
        let clock = ManualClock::at(start_time());
        let (app, repos) = memory_app(clock.clone());
        let character = hero(start_time());
        let energised = buff("Energised", StatModifiers::new().with_mp(5, 0), start_time())
            .with_max_stacks(5)
            .unwrap();
        repos.character.save(&character).await.unwrap();
        repos.buff.save(&energised).await.unwrap();
        let walk = app
            .use_cases
            .actions
            .create(NewAction {
                name: "Walk".to_string(),
                category: ActionCategory::Health,
                buff_ids: vec![energised.id()],
                cooldown_hours: 2,
                ..Default::default()
            })
            .await
            .unwrap();

        let first = app
            .use_cases
            .actions
            .perform(walk.id(), character.id())
            .await
            .unwrap();
        assert!(first.is_success());
        let stored = repos.action.get(walk.id()).await.unwrap().unwrap();
        assert_eq!(stored.last_performed_at(), Some(start_time()));

        clock.advance(Duration::minutes(90));
        let blocked = app.use_cases.actions.perform(walk.id(), character.id()).await;
        assert!(matches!(
            blocked,
            Err(ActionError::OnCooldown { ready_at }) if ready_at == start_time() + Duration::hours(2)
        ));

        clock.advance(Duration::minutes(30));
        let again = app
            .use_cases
            .actions
            .perform(walk.id(), character.id())
            .await
            .unwrap();
        assert_eq!(again.activated[0].1.stacks, 2);
    }

    #[tokio::test]
    async fn one_failing_buff_does_not_stop_the_rest() {
        let clock = ManualClock::at(start_time());
        let (app, repos) = memory_app(clock.clone());
        let character = hero(start_time());
        let calm = buff("Calm", StatModifiers::new().with_mp(3, 0), start_time());
        repos.character.save(&character).await.unwrap();
        repos.buff.save(&calm).await.unwrap();
        let missing = BuffId::new();
        let meditate = app
            .use_cases
            .actions
            .create(NewAction {
                name: "Meditate".to_string(),
                buff_ids: vec![missing, calm.id()],
                ..Default::default()
            })
            .await
            .unwrap();

        let result = app
            .use_cases
            .actions
            .perform(meditate.id(), character.id())
            .await
            .unwrap();
        assert!(result.is_success());
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].0, missing);
        assert_eq!(result.activated[0].0, calm.id());
    }

    #[tokio::test]
    async fn nothing_activated_leaves_the_action_ready() {
        let clock = ManualClock::at(start_time());
        let (app, repos) = memory_app(clock.clone());
        let character = hero(start_time());
        repos.character.save(&character).await.unwrap();
        let nap = app
            .use_cases
            .actions
            .create(NewAction {
                name: "Nap".to_string(),
                buff_ids: vec![BuffId::new()],
                cooldown_hours: 8,
                ..Default::default()
            })
            .await
            .unwrap();

        let result = app
            .use_cases
            .actions
            .perform(nap.id(), character.id())
            .await
            .unwrap();
        assert!(!result.is_success());
        let stored = repos.action.get(nap.id()).await.unwrap().unwrap();
        assert_eq!(stored.last_performed_at(), None);
    }

    #[tokio::test]
    async fn list_by_category_filters() {
        let clock = ManualClock::at(start_time());
        let (app, _repos) = memory_app(clock);
        let actions = &app.use_cases.actions;
        for (name, category) in [
            ("Call a friend", ActionCategory::Social),
            ("Swim", ActionCategory::Health),
            ("Dinner party", ActionCategory::Social),
        ] {
            actions
                .create(NewAction {
                    name: name.to_string(),
                    category,
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let social = actions.list_by_category(ActionCategory::Social).await.unwrap();
        assert_eq!(social.len(), 2);
        assert!(actions.update(ActionId::new(), ActionUpdate::default()).await.is_err());
    }
}
