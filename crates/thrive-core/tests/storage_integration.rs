//! Integration tests for persistence and the tick driver.

use tempfile::TempDir;
use thrive_core::storage::keys;
use thrive_core::{
    Config, Event, KvStore, ManualClock, ProgressStore, SqliteStore, StaticCatalog, TickDriver,
    TimerRegistry,
};

#[test]
fn progress_survives_sqlite_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("thrive.db");

    {
        let sqlite = SqliteStore::open_at(&path).unwrap();
        let mut store = ProgressStore::open(sqlite, StaticCatalog::builtin(), &Config::default());
        store.complete_workout(2);
        store.mark_complete(4, "cat-cow");
        assert!(!store.is_dirty());
    }

    let sqlite = SqliteStore::open_at(&path).unwrap();
    let raw_stats = sqlite.get(keys::USER_STATS).unwrap().unwrap();
    assert!(raw_stats.contains("\"total_workouts\":1"));

    let store = ProgressStore::open(sqlite, StaticCatalog::builtin(), &Config::default());
    assert_eq!(store.stats().xp, 20);
    assert_eq!(store.completed_workouts().ids(), &[2]);
    assert_eq!(store.progress(4).completed, 1);
    assert_eq!(store.progress(2).completed, 5);
}

#[test]
fn completion_map_is_one_document() {
    let sqlite = SqliteStore::open_memory().unwrap();
    let mut store = ProgressStore::open(sqlite, StaticCatalog::builtin(), &Config::default());
    store.mark_complete(1, "box-breathing");
    store.mark_complete(5, "plank");

    let raw = store.store().get(keys::COMPLETED_ACTIVITIES).unwrap().unwrap();
    let map: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(map["1-box-breathing"], true);
    assert_eq!(map["5-plank"], true);
    assert_eq!(store.store().keys().unwrap().len(), 1);
}

#[test]
fn driver_feeds_store_in_whole_seconds() {
    let clock = ManualClock::new(1_000_000);
    let mut driver = TickDriver::new(clock.clone(), 3600);
    let mut store = ProgressStore::open(
        SqliteStore::open_memory().unwrap(),
        StaticCatalog::builtin(),
        &Config::default(),
    );

    store.start(1, "body-scan").unwrap();
    driver.start();

    let mut events = Vec::new();
    for _ in 0..150 {
        clock.advance(400);
        let due = driver.poll();
        events.extend(store.advance(due));
    }

    assert!(events
        .iter()
        .any(|e| matches!(e, Event::ActivityCompleted { activity_id, .. } if activity_id == "body-scan")));
    assert!(store.timers().is_empty());
}

#[test]
fn registry_resumes_after_gap() {
    let mut store = ProgressStore::open(
        SqliteStore::open_memory().unwrap(),
        StaticCatalog::builtin(),
        &Config::default(),
    );
    store.start(5, "plank").unwrap();
    let saved: TimerRegistry =
        serde_json::from_str(&serde_json::to_string(store.timers()).unwrap()).unwrap();

    let clock = ManualClock::new(50_000);
    let mut driver = TickDriver::resume_from(clock, 20_000, 3600);
    let mut resumed = ProgressStore::open(
        SqliteStore::open_memory().unwrap(),
        StaticCatalog::builtin(),
        &Config::default(),
    );
    resumed.restore_timers(saved);
    resumed.advance(driver.poll());
    assert_eq!(resumed.timers().get("plank").map(|t| t.time_left_secs), Some(30));
}
