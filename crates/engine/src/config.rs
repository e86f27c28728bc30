//! Application configuration

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use tracing::{info, warn};

/// Where aggregates are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

/// Application configuration loaded from environment
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub storage: StorageBackend,
    /// SQLite database file (ignored for the memory backend)
    pub database_path: String,
    /// How long expired or cancelled buff instances are kept before purging
    pub expired_buff_retention_days: u32,
    /// Whether `serve` schedules the nightly buff job
    pub run_midnight_job: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageBackend::Sqlite,
            database_path: "lifeforge.db".to_string(),
            expired_buff_retention_days: 7,
            run_midnight_job: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            storage: try_load(&lookup, "STORAGE", defaults.storage),
            database_path: lookup("DATABASE_PATH")
                .filter(|p| !p.trim().is_empty())
                .unwrap_or(defaults.database_path),
            expired_buff_retention_days: try_load(
                &lookup,
                "EXPIRED_BUFF_RETENTION_DAYS",
                defaults.expired_buff_retention_days,
            ),
            run_midnight_job: try_load(&lookup, "RUN_MIDNIGHT_JOB", defaults.run_midnight_job),
        }
    }

    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.expired_buff_retention_days))
    }
}

fn try_load<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        info!("{key} not set, using default: {default:?}");
        return default;
    };
    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value '{raw}': {e}, using default: {default:?}");
        default
    })
}
