//! Shared helpers for engine tests.
//!
//! Multi-step flows run against [`InMemoryRepositories`] with a
//! [`ManualClock`] that tests move forward explicitly.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use lifeforge_domain::{Buff, BuffName, Character, StatModifiers};

use crate::app::App;
use crate::config::AppConfig;
use crate::infrastructure::memory::InMemoryRepositories;
use crate::infrastructure::ports::ClockPort;

/// A clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(now),
        })
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl ClockPort for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Midday on 1 May 2024, UTC.
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

/// A wired [`App`] over fresh in-memory storage.
pub fn memory_app(clock: Arc<ManualClock>) -> (App, InMemoryRepositories) {
    let repos = InMemoryRepositories::new();
    let app = App::from_memory(repos.clone(), clock, &AppConfig::default());
    (app, repos)
}

pub fn hero(now: DateTime<Utc>) -> Character {
    Character::default_hero(now).unwrap()
}

pub fn buff(name: &str, modifiers: StatModifiers, now: DateTime<Utc>) -> Buff {
    Buff::new(BuffName::new(name).unwrap(), modifiers, now)
}
