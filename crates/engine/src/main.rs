//! LifeForge Engine - Main entry point.
//!
//! `lifeforge-engine [serve]` runs the nightly buff job until Ctrl-C.
//! `lifeforge-engine process-now` runs one buff processing pass and exits.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lifeforge_engine::background;
use lifeforge_engine::config::{AppConfig, StorageBackend};
use lifeforge_engine::infrastructure::{
    clock::SystemClock, memory::InMemoryRepositories, ports::ClockPort,
    sqlite::SqliteRepositories,
};
use lifeforge_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the binary may run from `crates/engine`).
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lifeforge_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LifeForge Engine");

    let config = AppConfig::from_env();
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());

    let app = match config.storage {
        StorageBackend::Sqlite => {
            tracing::info!(path = %config.database_path, "Opening SQLite store");
            let repos = SqliteRepositories::connect(&config.database_path).await?;
            App::from_sqlite(repos, clock.clone(), &config)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, nothing will be persisted");
            App::from_memory(InMemoryRepositories::new(), clock.clone(), &config)
        }
    };

    let hero = app.use_cases.characters.get_or_create().await?;
    tracing::info!(character_id = %hero.id(), name = %hero.name(), "Character ready");

    let command = std::env::args().nth(1).unwrap_or_else(|| "serve".into());
    match command.as_str() {
        "serve" => serve(&app, clock, &config).await,
        "process-now" => {
            let report = app.use_cases.buff_processing.process_all().await?;
            println!(
                "characters={} activated={} expired={} purged={} failed={}",
                report.characters, report.activated, report.expired, report.purged, report.failed
            );
            Ok(())
        }
        other => anyhow::bail!("unknown command `{other}` (expected `serve` or `process-now`)"),
    }
}

async fn serve(app: &App, clock: Arc<dyn ClockPort>, config: &AppConfig) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    let job = if config.run_midnight_job {
        Some(tokio::spawn(background::midnight::run(
            app.use_cases.buff_processing.clone(),
            clock,
            cancel.clone(),
        )))
    } else {
        tracing::info!("Midnight job disabled");
        None
    };

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");
    cancel.cancel();

    if let Some(job) = job {
        if let Err(e) = job.await {
            tracing::error!(error = %e, "Midnight job panicked");
        }
    }
    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
