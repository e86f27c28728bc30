//! SQLite-backed document storage.
//!
//! Every aggregate is stored as a JSON document in one `documents` table,
//! keyed by `(collection, id)`. The few fields the repositories filter on
//! (owning character or quest, status, category) are copied into indexed
//! columns next to the body.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use lifeforge_domain::{
    Action, ActionCategory, ActionId, Buff, BuffId, BuffInstance, BuffInstanceId,
    BuffInstanceStatus, Character, CharacterId, Quest, QuestId, QuestRun, QuestRunId,
    QuestRunStatus,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::infrastructure::ports::{
    ActionRepo, BuffInstanceRepo, BuffRepo, CharacterRepo, QuestRepo, QuestRunRepo, RepoError,
};

const CHARACTERS: &str = "characters";
const BUFFS: &str = "buffs";
const BUFF_INSTANCES: &str = "buff_instances";
const QUESTS: &str = "quests";
const QUEST_RUNS: &str = "quest_runs";
const ACTIONS: &str = "actions";

/// Columns stored alongside a document body.
struct DocumentMeta {
    id: String,
    owner_id: Option<String>,
    status: Option<String>,
    created_at: DateTime<Utc>,
}

impl DocumentMeta {
    fn new(id: impl ToString, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            owner_id: None,
            status: None,
            created_at,
        }
    }

    fn owned_by(mut self, owner: impl ToString) -> Self {
        self.owner_id = Some(owner.to_string());
        self
    }

    fn with_status(mut self, status: impl ToString) -> Self {
        self.status = Some(status.to_string());
        self
    }
}

/// Optional column filter for `list`.
enum Filter<'a> {
    All,
    Owner(&'a str),
    Status(&'a str),
}

fn timestamp(at: DateTime<Utc>) -> String {
    // Fixed width so the column sorts chronologically as text
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Shared pool plus the generic document operations.
#[derive(Clone)]
pub struct DocumentStore {
    pool: SqlitePool,
}

impl DocumentStore {
    pub async fn connect(db_path: &str) -> Result<Self, RepoError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| RepoError::database("connect", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                owner_id TEXT,
                status TEXT,
                created_at TEXT NOT NULL,
                body TEXT NOT NULL,
                PRIMARY KEY (collection, id)
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("create_schema", e))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_documents_owner ON documents (collection, owner_id)",
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("create_schema", e))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_documents_status ON documents (collection, status)",
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("create_schema", e))?;

        tracing::debug!(db_path = %db_path, "SQLite document store ready");
        Ok(Self { pool })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        collection: &'static str,
        id: &str,
    ) -> Result<Option<T>, RepoError> {
        let row = sqlx::query("SELECT body FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database(collection, e))?;

        match row {
            Some(row) => {
                let json: String = row.get("body");
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => Ok(None),
        }
    }

    async fn list<T: DeserializeOwned>(
        &self,
        collection: &'static str,
        filter: Filter<'_>,
    ) -> Result<Vec<T>, RepoError> {
        let (clause, value) = match filter {
            Filter::All => ("", None),
            Filter::Owner(owner) => (" AND owner_id = ?", Some(owner)),
            Filter::Status(status) => (" AND status = ?", Some(status)),
        };
        let sql = format!(
            "SELECT body FROM documents WHERE collection = ?{} ORDER BY created_at, id",
            clause
        );

        let mut q = sqlx::query(&sql).bind(collection);
        if let Some(value) = value {
            q = q.bind(value);
        }

        let rows = q
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database(collection, e))?;

        rows.iter()
            .map(|row| {
                let json: String = row.get("body");
                serde_json::from_str(&json).map_err(RepoError::from)
            })
            .collect()
    }

    async fn upsert<T: Serialize>(
        &self,
        collection: &'static str,
        meta: DocumentMeta,
        document: &T,
    ) -> Result<(), RepoError> {
        let body = serde_json::to_string(document)?;
        Self::upsert_query(collection, &meta, body)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database(collection, e))?;
        Ok(())
    }

    /// Upsert several documents in one transaction.
    async fn upsert_all<T: Serialize>(
        &self,
        collection: &'static str,
        documents: Vec<(DocumentMeta, &T)>,
    ) -> Result<(), RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database(collection, e))?;

        for (meta, document) in documents {
            let body = serde_json::to_string(document)?;
            Self::upsert_query(collection, &meta, body)
                .execute(&mut *tx)
                .await
                .map_err(|e| RepoError::database(collection, e))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepoError::database(collection, e))?;
        Ok(())
    }

    fn upsert_query<'q>(
        collection: &'static str,
        meta: &DocumentMeta,
        body: String,
    ) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, owner_id, status, created_at, body)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(collection, id) DO UPDATE SET
                owner_id = excluded.owner_id,
                status = excluded.status,
                body = excluded.body
            "#,
        )
        .bind(collection)
        .bind(meta.id.clone())
        .bind(meta.owner_id.clone())
        .bind(meta.status.clone())
        .bind(timestamp(meta.created_at))
        .bind(body)
    }

    async fn delete(&self, collection: &'static str, id: &str) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database(collection, e))?;
        Ok(())
    }
}

// =============================================================================
// Repositories
// =============================================================================

pub struct SqliteCharacterRepo {
    store: DocumentStore,
}

#[async_trait]
impl CharacterRepo for SqliteCharacterRepo {
    async fn get(&self, id: CharacterId) -> Result<Option<Character>, RepoError> {
        self.store.get(CHARACTERS, &id.to_string()).await
    }

    async fn get_primary(&self) -> Result<Option<Character>, RepoError> {
        let characters: Vec<Character> = self.store.list(CHARACTERS, Filter::All).await?;
        Ok(characters.into_iter().next())
    }

    async fn list(&self) -> Result<Vec<Character>, RepoError> {
        self.store.list(CHARACTERS, Filter::All).await
    }

    async fn save(&self, character: &Character) -> Result<(), RepoError> {
        let meta = DocumentMeta::new(character.id(), character.created_at());
        self.store.upsert(CHARACTERS, meta, character).await
    }

    async fn delete(&self, id: CharacterId) -> Result<(), RepoError> {
        self.store.delete(CHARACTERS, &id.to_string()).await
    }
}

pub struct SqliteBuffRepo {
    store: DocumentStore,
}

#[async_trait]
impl BuffRepo for SqliteBuffRepo {
    async fn get(&self, id: BuffId) -> Result<Option<Buff>, RepoError> {
        self.store.get(BUFFS, &id.to_string()).await
    }

    async fn list(&self) -> Result<Vec<Buff>, RepoError> {
        self.store.list(BUFFS, Filter::All).await
    }

    async fn save(&self, buff: &Buff) -> Result<(), RepoError> {
        let meta = DocumentMeta::new(buff.id(), buff.created_at());
        self.store.upsert(BUFFS, meta, buff).await
    }

    async fn delete(&self, id: BuffId) -> Result<(), RepoError> {
        self.store.delete(BUFFS, &id.to_string()).await
    }
}

pub struct SqliteBuffInstanceRepo {
    store: DocumentStore,
}

fn instance_meta(instance: &BuffInstance) -> DocumentMeta {
    DocumentMeta::new(instance.id(), instance.created_at())
        .owned_by(instance.character_id())
        .with_status(instance.status())
}

#[async_trait]
impl BuffInstanceRepo for SqliteBuffInstanceRepo {
    async fn get(&self, id: BuffInstanceId) -> Result<Option<BuffInstance>, RepoError> {
        self.store.get(BUFF_INSTANCES, &id.to_string()).await
    }

    async fn list(&self) -> Result<Vec<BuffInstance>, RepoError> {
        self.store.list(BUFF_INSTANCES, Filter::All).await
    }

    async fn list_for_character(
        &self,
        character_id: CharacterId,
    ) -> Result<Vec<BuffInstance>, RepoError> {
        let owner = character_id.to_string();
        self.store
            .list(BUFF_INSTANCES, Filter::Owner(&owner))
            .await
    }

    async fn list_by_status(
        &self,
        status: BuffInstanceStatus,
    ) -> Result<Vec<BuffInstance>, RepoError> {
        let status = status.to_string();
        self.store
            .list(BUFF_INSTANCES, Filter::Status(&status))
            .await
    }

    async fn save(&self, instance: &BuffInstance) -> Result<(), RepoError> {
        self.store
            .upsert(BUFF_INSTANCES, instance_meta(instance), instance)
            .await
    }

    async fn save_all(&self, instances: &[BuffInstance]) -> Result<(), RepoError> {
        let documents = instances.iter().map(|i| (instance_meta(i), i)).collect();
        self.store.upsert_all(BUFF_INSTANCES, documents).await
    }

    async fn delete(&self, id: BuffInstanceId) -> Result<(), RepoError> {
        self.store.delete(BUFF_INSTANCES, &id.to_string()).await
    }
}

pub struct SqliteQuestRepo {
    store: DocumentStore,
}

#[async_trait]
impl QuestRepo for SqliteQuestRepo {
    async fn get(&self, id: QuestId) -> Result<Option<Quest>, RepoError> {
        self.store.get(QUESTS, &id.to_string()).await
    }

    async fn list(&self) -> Result<Vec<Quest>, RepoError> {
        self.store.list(QUESTS, Filter::All).await
    }

    async fn save(&self, quest: &Quest) -> Result<(), RepoError> {
        let meta = DocumentMeta::new(quest.id(), quest.created_at());
        self.store.upsert(QUESTS, meta, quest).await
    }

    async fn delete(&self, id: QuestId) -> Result<(), RepoError> {
        self.store.delete(QUESTS, &id.to_string()).await
    }
}

pub struct SqliteQuestRunRepo {
    store: DocumentStore,
}

#[async_trait]
impl QuestRunRepo for SqliteQuestRunRepo {
    async fn get(&self, id: QuestRunId) -> Result<Option<QuestRun>, RepoError> {
        self.store.get(QUEST_RUNS, &id.to_string()).await
    }

    async fn list(&self) -> Result<Vec<QuestRun>, RepoError> {
        self.store.list(QUEST_RUNS, Filter::All).await
    }

    async fn list_in_progress(&self) -> Result<Vec<QuestRun>, RepoError> {
        let status = QuestRunStatus::InProgress.to_string();
        self.store.list(QUEST_RUNS, Filter::Status(&status)).await
    }

    async fn list_for_quest(&self, quest_id: QuestId) -> Result<Vec<QuestRun>, RepoError> {
        let owner = quest_id.to_string();
        self.store.list(QUEST_RUNS, Filter::Owner(&owner)).await
    }

    async fn save(&self, run: &QuestRun) -> Result<(), RepoError> {
        let meta = DocumentMeta::new(run.id(), run.created_at())
            .owned_by(run.quest_id())
            .with_status(run.status());
        self.store.upsert(QUEST_RUNS, meta, run).await
    }

    async fn delete(&self, id: QuestRunId) -> Result<(), RepoError> {
        self.store.delete(QUEST_RUNS, &id.to_string()).await
    }
}

pub struct SqliteActionRepo {
    store: DocumentStore,
}

#[async_trait]
impl ActionRepo for SqliteActionRepo {
    async fn get(&self, id: ActionId) -> Result<Option<Action>, RepoError> {
        self.store.get(ACTIONS, &id.to_string()).await
    }

    async fn list(&self) -> Result<Vec<Action>, RepoError> {
        self.store.list(ACTIONS, Filter::All).await
    }

    async fn list_by_category(&self, category: ActionCategory) -> Result<Vec<Action>, RepoError> {
        // Category shares the status column
        let category = category.to_string();
        self.store.list(ACTIONS, Filter::Status(&category)).await
    }

    async fn save(&self, action: &Action) -> Result<(), RepoError> {
        let meta =
            DocumentMeta::new(action.id(), action.created_at()).with_status(action.category());
        self.store.upsert(ACTIONS, meta, action).await
    }

    async fn delete(&self, id: ActionId) -> Result<(), RepoError> {
        self.store.delete(ACTIONS, &id.to_string()).await
    }
}

/// All SQLite repositories over one shared pool.
#[derive(Clone)]
pub struct SqliteRepositories {
    pub character: Arc<SqliteCharacterRepo>,
    pub buff: Arc<SqliteBuffRepo>,
    pub buff_instance: Arc<SqliteBuffInstanceRepo>,
    pub quest: Arc<SqliteQuestRepo>,
    pub quest_run: Arc<SqliteQuestRunRepo>,
    pub action: Arc<SqliteActionRepo>,
}

impl SqliteRepositories {
    pub async fn connect(db_path: &str) -> Result<Self, RepoError> {
        let store = DocumentStore::connect(db_path).await?;
        Ok(Self {
            character: Arc::new(SqliteCharacterRepo {
                store: store.clone(),
            }),
            buff: Arc::new(SqliteBuffRepo {
                store: store.clone(),
            }),
            buff_instance: Arc::new(SqliteBuffInstanceRepo {
                store: store.clone(),
            }),
            quest: Arc::new(SqliteQuestRepo {
                store: store.clone(),
            }),
            quest_run: Arc::new(SqliteQuestRunRepo {
                store: store.clone(),
            }),
            action: Arc::new(SqliteActionRepo { store }),
        })
    }
}
