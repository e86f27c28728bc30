//! LifeForge Engine library.
//!
//! This crate contains all server-side code for the LifeForge backend.
//!
//! ## Structure
//!
//! - `use_cases/` - User story orchestration across domain aggregates
//! - `infrastructure/` - Port traits and their SQLite / in-memory adapters
//! - `background/` - Long-running jobs (nightly buff processing)
//! - `config` - Environment-driven settings
//! - `app` - Application composition

pub mod app;
pub mod background;
pub mod config;
pub mod infrastructure;
pub mod use_cases;

/// Shared fixtures for unit and flow tests.
#[cfg(test)]
pub mod test_fixtures;

pub use app::App;
pub use config::AppConfig;
