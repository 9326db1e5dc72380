#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK poisoned");
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use escape_reservation::clock::FixedClock;
use escape_reservation::db::{LocalRepository, ThemeRepository, TimeSlotRepository};
use escape_reservation::models::{NewTheme, ThemeId, TimeSlotId};
use escape_reservation::services::ReservationService;

/// The date every fixture clock reports as "today".
pub fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 1).expect("valid fixture date")
}

pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(fixed_today()))
}

/// An in-memory repository holding one time slot and one theme, both with id 1.
pub async fn seeded_repository() -> (Arc<LocalRepository>, TimeSlotId, ThemeId) {
    let repo = Arc::new(LocalRepository::new());
    let time_id = repo
        .save_time_slot(NaiveTime::from_hms_opt(10, 0, 0).expect("valid time"))
        .await
        .expect("seed time slot");
    let theme_id = repo
        .save_theme(&NewTheme {
            name: "Haunted Library".to_string(),
            description: "Find the missing page before midnight.".to_string(),
            thumbnail: "https://example.com/haunted-library.png".to_string(),
        })
        .await
        .expect("seed theme");
    (repo, time_id, theme_id)
}

/// A reservation workflow over [`seeded_repository`] with a fixed clock.
pub async fn seeded_service() -> (Arc<LocalRepository>, ReservationService) {
    let (repo, _, _) = seeded_repository().await;
    let service = ReservationService::with_clock(repo.clone(), fixed_clock());
    (repo, service)
}
