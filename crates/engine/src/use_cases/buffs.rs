//! Buff catalogue CRUD.

use std::sync::Arc;

use lifeforge_domain::{
    Buff, BuffId, BuffName, BuffTrigger, Description, DomainError, StatModifiers,
};

use crate::infrastructure::ports::{BuffRepo, ClockPort, RepoError};

#[derive(Debug, thiserror::Error)]
pub enum BuffError {
    #[error("Buff not found")]
    NotFound,
    #[error("Validation error: {0}")]
    Validation(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

/// Input for a new buff definition. Unset limits use the domain defaults.
#[derive(Debug, Clone, Default)]
pub struct NewBuff {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub is_debuff: bool,
    pub trigger: BuffTrigger,
    pub max_stacks: Option<u32>,
    pub duration_days: Option<u32>,
    pub modifiers: StatModifiers,
}

/// Partial update of a buff definition.
#[derive(Debug, Clone, Default)]
pub struct BuffUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<Option<String>>,
    pub is_debuff: Option<bool>,
    pub trigger: Option<BuffTrigger>,
    pub max_stacks: Option<u32>,
    pub duration_days: Option<u32>,
    pub modifiers: Option<StatModifiers>,
}

pub struct BuffCatalog {
    buff_repo: Arc<dyn BuffRepo>,
    clock: Arc<dyn ClockPort>,
}

impl BuffCatalog {
    pub fn new(buff_repo: Arc<dyn BuffRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { buff_repo, clock }
    }

    pub async fn create(&self, input: NewBuff) -> Result<Buff, BuffError> {
        let mut buff = Buff::new(BuffName::new(input.name)?, input.modifiers, self.clock.now())
            .with_trigger(input.trigger);
        if let Some(description) = input.description {
            buff = buff.with_description(Description::new(description)?);
        }
        if let Some(icon) = input.icon {
            buff = buff.with_icon(icon);
        }
        if input.is_debuff {
            buff = buff.as_debuff();
        }
        if let Some(max_stacks) = input.max_stacks {
            buff = buff.with_max_stacks(max_stacks)?;
        }
        if let Some(days) = input.duration_days {
            buff = buff.with_duration_days(days)?;
        }

        self.buff_repo.save(&buff).await?;
        tracing::info!(buff_id = %buff.id(), name = %buff.name(), "Buff created");
        Ok(buff)
    }

    /// Edit a definition. Instances already applied keep the modifiers they
    /// were created with.
    pub async fn update(&self, id: BuffId, update: BuffUpdate) -> Result<Buff, BuffError> {
        let mut buff = self.buff_repo.get(id).await?.ok_or(BuffError::NotFound)?;

        if let Some(name) = update.name {
            buff.rename(BuffName::new(name)?);
        }
        if let Some(description) = update.description {
            buff.set_description(Description::new(description)?);
        }
        if let Some(icon) = update.icon {
            buff.set_icon(icon);
        }
        if let Some(is_debuff) = update.is_debuff {
            buff.set_debuff(is_debuff);
        }
        if let Some(trigger) = update.trigger {
            buff.set_trigger(trigger);
        }
        if let Some(max_stacks) = update.max_stacks {
            buff.set_max_stacks(max_stacks)?;
        }
        if let Some(days) = update.duration_days {
            buff.set_duration_days(days)?;
        }
        if let Some(modifiers) = update.modifiers {
            buff.set_modifiers(modifiers);
        }
        buff.touch(self.clock.now());

        self.buff_repo.save(&buff).await?;
        tracing::info!(buff_id = %id, "Buff updated");
        Ok(buff)
    }

    pub async fn get(&self, id: BuffId) -> Result<Option<Buff>, BuffError> {
        Ok(self.buff_repo.get(id).await?)
    }

    pub async fn list(&self) -> Result<Vec<Buff>, BuffError> {
        Ok(self.buff_repo.list().await?)
    }

    pub async fn delete(&self, id: BuffId) -> Result<(), BuffError> {
        if self.buff_repo.get(id).await?.is_none() {
            return Err(BuffError::NotFound);
        }
        self.buff_repo.delete(id).await?;
        tracing::info!(buff_id = %id, "Buff deleted");
        Ok(())
    }
}
