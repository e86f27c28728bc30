//! Application state and composition.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::infrastructure::{
    memory::InMemoryRepositories,
    ports::{
        ActionRepo, BuffInstanceRepo, BuffRepo, CharacterRepo, ClockPort, QuestRepo,
        QuestRunRepo,
    },
    sqlite::SqliteRepositories,
};
use crate::use_cases;

/// Main application state.
///
/// Holds the repository ports and every use case, wired once at startup.
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
    pub clock: Arc<dyn ClockPort>,
}

/// Container for the repository ports, injected directly into use cases.
#[derive(Clone)]
pub struct Repositories {
    pub character: Arc<dyn CharacterRepo>,
    pub buff: Arc<dyn BuffRepo>,
    pub buff_instance: Arc<dyn BuffInstanceRepo>,
    pub quest: Arc<dyn QuestRepo>,
    pub quest_run: Arc<dyn QuestRunRepo>,
    pub action: Arc<dyn ActionRepo>,
}

impl From<InMemoryRepositories> for Repositories {
    fn from(repos: InMemoryRepositories) -> Self {
        Self {
            character: repos.character,
            buff: repos.buff,
            buff_instance: repos.buff_instance,
            quest: repos.quest,
            quest_run: repos.quest_run,
            action: repos.action,
        }
    }
}

impl From<SqliteRepositories> for Repositories {
    fn from(repos: SqliteRepositories) -> Self {
        Self {
            character: repos.character,
            buff: repos.buff,
            buff_instance: repos.buff_instance,
            quest: repos.quest,
            quest_run: repos.quest_run,
            action: repos.action,
        }
    }
}

/// Container for all use cases.
pub struct UseCases {
    pub characters: Arc<use_cases::Characters>,
    pub buffs: Arc<use_cases::BuffCatalog>,
    pub buff_instances: Arc<use_cases::BuffInstances>,
    pub aggregation: Arc<use_cases::BuffAggregation>,
    pub quests: Arc<use_cases::QuestCatalog>,
    pub quest_runs: Arc<use_cases::QuestRuns>,
    pub rewards: Arc<use_cases::QuestRewards>,
    pub actions: Arc<use_cases::Actions>,
    pub buff_processing: Arc<use_cases::BuffProcessing>,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(repos: Repositories, clock: Arc<dyn ClockPort>, config: &AppConfig) -> Self {
        let characters = Arc::new(use_cases::Characters::new(
            repos.character.clone(),
            clock.clone(),
        ));
        let buffs = Arc::new(use_cases::BuffCatalog::new(repos.buff.clone(), clock.clone()));
        let aggregation = Arc::new(use_cases::BuffAggregation::new(
            repos.character.clone(),
            repos.buff.clone(),
            repos.buff_instance.clone(),
            clock.clone(),
        ));
        let buff_instances = Arc::new(use_cases::BuffInstances::new(
            repos.character.clone(),
            repos.buff.clone(),
            repos.buff_instance.clone(),
            aggregation.clone(),
            clock.clone(),
        ));
        let quests = Arc::new(use_cases::QuestCatalog::new(
            repos.quest.clone(),
            clock.clone(),
        ));
        let rewards = Arc::new(use_cases::QuestRewards::new(
            repos.character.clone(),
            repos.quest_run.clone(),
            characters.clone(),
            clock.clone(),
        ));
        let quest_runs = Arc::new(use_cases::QuestRuns::new(
            repos.quest.clone(),
            repos.quest_run.clone(),
            rewards.clone(),
            clock.clone(),
        ));
        let actions = Arc::new(use_cases::Actions::new(
            repos.action.clone(),
            buff_instances.clone(),
            clock.clone(),
        ));
        let buff_processing = Arc::new(use_cases::BuffProcessing::new(
            repos.character.clone(),
            repos.buff_instance.clone(),
            aggregation.clone(),
            clock.clone(),
            config.retention(),
        ));

        Self {
            repositories: repos,
            use_cases: UseCases {
                characters,
                buffs,
                buff_instances,
                aggregation,
                quests,
                quest_runs,
                rewards,
                actions,
                buff_processing,
            },
            clock,
        }
    }

    pub fn from_memory(
        repos: InMemoryRepositories,
        clock: Arc<dyn ClockPort>,
        config: &AppConfig,
    ) -> Self {
        Self::new(repos.into(), clock, config)
    }

    pub fn from_sqlite(
        repos: SqliteRepositories,
        clock: Arc<dyn ClockPort>,
        config: &AppConfig,
    ) -> Self {
        Self::new(repos.into(), clock, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{start_time, ManualClock};
    use lifeforge_domain::{DifficultyLevel, StatModifiers};

    use crate::use_cases::buffs::NewBuff;
    use crate::use_cases::quests::NewQuest;

    /// A day in the life, end to end over SQLite.
    #[tokio::test]
    async fn wires_every_use_case_over_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.db");
        let repos = SqliteRepositories::connect(path.to_str().unwrap())
            .await
            .unwrap();
        let clock = ManualClock::at(start_time());
        let app = App::from_sqlite(repos, clock.clone(), &AppConfig::default());

        let hero = app.use_cases.characters.get_or_create().await.unwrap();
        let focus = app
            .use_cases
            .buffs
            .create(NewBuff {
                name: "Focus".to_string(),
                modifiers: StatModifiers::new().with_xp_gains_percent(10),
                ..Default::default()
            })
            .await
            .unwrap();
        app.use_cases
            .buff_instances
            .activate(hero.id(), focus.id())
            .await
            .unwrap();

        let quest = app
            .use_cases
            .quests
            .create(NewQuest {
                name: "Deep work".to_string(),
                difficulty: DifficultyLevel::Hard,
                ..Default::default()
            })
            .await
            .unwrap();
        let run = app.use_cases.quest_runs.start(quest.id()).await.unwrap();
        let done = app.use_cases.quest_runs.complete(run.id()).await.unwrap();
        assert_eq!(done.rewards.experience_gained.get("General"), Some(&110));

        let stored = app
            .repositories
            .character
            .get(hero.id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.class_profile("General").unwrap().level(), 2);
    }
}
