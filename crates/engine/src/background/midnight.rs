//! Nightly buff processing, run at every UTC midnight.

use std::sync::Arc;

use chrono::{DateTime, NaiveTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::infrastructure::ports::ClockPort;
use crate::use_cases::BuffProcessing;

/// The first UTC midnight strictly after `now`.
pub fn next_midnight_after(now: DateTime<Utc>) -> DateTime<Utc> {
    match now.date_naive().succ_opt() {
        Some(tomorrow) => tomorrow.and_time(NaiveTime::MIN).and_utc(),
        None => DateTime::<Utc>::MAX_UTC,
    }
}

/// Run buff processing every midnight until `cancel` is triggered.
pub async fn run(
    processing: Arc<BuffProcessing>,
    clock: Arc<dyn ClockPort>,
    cancel: CancellationToken,
) {
    tracing::info!("Midnight buff processing job started");
    let mut last_run: Option<DateTime<Utc>> = None;

    loop {
        let now = clock.now();
        // Never fire twice for the same midnight, even if the clock lags.
        let target = next_midnight_after(last_run.map_or(now, |last| last.max(now)));
        let delay = (target - now).to_std().unwrap_or_default();
        tracing::debug!(next_run = %target, delay_secs = delay.as_secs(), "Waiting for midnight");

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Midnight buff processing job stopping");
                break;
            }
            _ = tokio::time::sleep(delay) => {
                last_run = Some(target);
                match processing.process_all().await {
                    Ok(report) => tracing::info!(
                        characters = report.characters,
                        activated = report.activated,
                        expired = report.expired,
                        purged = report.purged,
                        failed = report.failed,
                        "Midnight buff processing complete"
                    ),
                    Err(e) => tracing::error!(error = %e, "Midnight buff processing failed"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{BuffInstanceRepo, BuffRepo, CharacterRepo};
    use crate::test_fixtures::{buff, hero, memory_app, ManualClock};
    use chrono::{Duration, TimeZone};
    use lifeforge_domain::{BuffInstance, StatModifiers};

    #[test]
    fn next_midnight_is_the_start_of_tomorrow() {
        let evening = Utc.with_ymd_and_hms(2024, 12, 31, 21, 15, 0).unwrap();
        assert_eq!(
            next_midnight_after(evening),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn exactly_midnight_waits_a_full_day() {
        let midnight = Utc.with_ymd_and_hms(2024, 2, 28, 0, 0, 0).unwrap();
        assert_eq!(
            next_midnight_after(midnight),
            Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn last_representable_day_has_no_next_midnight() {
        assert_eq!(next_midnight_after(DateTime::<Utc>::MAX_UTC), DateTime::<Utc>::MAX_UTC);
    }

    #[tokio::test]
    async fn cancelling_stops_the_job_before_midnight() {
        let clock = ManualClock::at(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        let (app, _repos) = memory_app(clock.clone());
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(run(
            app.use_cases.buff_processing.clone(),
            clock,
            cancel.clone(),
        ));
        cancel.cancel();

        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .expect("job did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn processes_once_when_midnight_arrives() {
        let almost_midnight = Utc.with_ymd_and_hms(2024, 5, 1, 23, 59, 59).unwrap()
            + Duration::milliseconds(950);
        let clock = ManualClock::at(almost_midnight);
        let (app, repos) = memory_app(clock.clone());
        let character = hero(almost_midnight);
        let glow = buff("Glow", StatModifiers::new().with_mp(4, 0), almost_midnight);
        repos.character.save(&character).await.unwrap();
        repos.buff.save(&glow).await.unwrap();
        // Stored without refreshing the aggregate; the job has to catch it up.
        repos
            .buff_instance
            .save(&BuffInstance::activate_now(&glow, character.id(), almost_midnight).unwrap())
            .await
            .unwrap();

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(
            app.use_cases.buff_processing.clone(),
            clock,
            cancel.clone(),
        ));
        tokio::time::sleep(std::time::Duration::from_millis(300)).await;

        let stored = repos.character.get(character.id()).await.unwrap().unwrap();
        assert_eq!(stored.active_buff_modifiers().mp, 4);

        cancel.cancel();
        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .expect("job did not stop")
            .unwrap();
    }
}
