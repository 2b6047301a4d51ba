//! Progress store wiring shared by every command.
//!
//! Timers live in memory in the core, so between CLI invocations the
//! registry and the last tick boundary are saved under one kv key. Opening
//! a session replays the whole seconds that elapsed since then.
//!
//! Events produced by that replay are held as pending until a command
//! reports them. Commands that print no events leave them saved for the
//! next one, so a completion that happened between commands is always
//! shown once.

use serde::{Deserialize, Serialize};
use thrive_core::{
    Config, Event, KvStore, ProgressStore, SqliteStore, StaticCatalog, SystemClock, TickDriver,
    TimerRegistry,
};

pub const TIMERS_KEY: &str = "thrive.cli.timers";

#[derive(Debug, Default, Serialize, Deserialize)]
struct SavedTimers {
    registry: TimerRegistry,
    last_tick_ms: Option<u64>,
    /// Caught-up events no command has reported yet.
    #[serde(default)]
    undelivered: Vec<Event>,
}

pub struct CliSession {
    pub store: ProgressStore<SqliteStore>,
    pub config: Config,
    driver: TickDriver<SystemClock>,
    pending: Vec<Event>,
}

impl CliSession {
    /// Open the store, restore saved timers and catch up elapsed time.
    ///
    /// Events produced while catching up are kept as pending; see
    /// [`CliSession::take_pending`].
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load()?;
        let sqlite = SqliteStore::open()?;
        let saved = match sqlite.get(TIMERS_KEY)? {
            Some(json) => serde_json::from_str::<SavedTimers>(&json).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "discarding unreadable saved timers");
                SavedTimers::default()
            }),
            None => SavedTimers::default(),
        };

        let max = config.timer.max_catch_up_secs;
        let driver = match saved.last_tick_ms {
            Some(ms) => TickDriver::resume_from(SystemClock, ms, max),
            None => TickDriver::new(SystemClock, max),
        };

        let mut store = ProgressStore::open(sqlite, StaticCatalog::builtin(), &config);
        store.restore_timers(saved.registry);

        let mut session = Self {
            store,
            config,
            driver,
            pending: saved.undelivered,
        };
        let caught_up = session.catch_up();
        if !caught_up.is_empty() {
            tracing::info!(count = caught_up.len(), "events produced while catching up");
        }
        session.pending.extend(caught_up);
        Ok(session)
    }

    /// Hand over pending caught-up events. The caller must report them.
    pub fn take_pending(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.pending)
    }

    /// Pending events followed by `events`, for commands that print one
    /// event list.
    pub fn with_pending(&mut self, events: Vec<Event>) -> Vec<Event> {
        let mut all = self.take_pending();
        all.extend(events);
        all
    }

    /// Deliver every whole second that elapsed since the last poll.
    pub fn catch_up(&mut self) -> Vec<Event> {
        let due = self.driver.poll();
        if due > 0 {
            tracing::debug!(due, "catching up timers");
        }
        self.store.advance(due)
    }

    /// Save timers for the next invocation.
    pub fn save(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let anyone_running = self.store.timers().iter().any(|t| t.is_running);
        let saved = SavedTimers {
            registry: self.store.timers().clone(),
            last_tick_ms: if anyone_running {
                self.driver.last_tick_ms()
            } else {
                None
            },
            undelivered: self.pending.clone(),
        };
        let json = serde_json::to_string(&saved)?;
        self.store.store_mut().set(TIMERS_KEY, &json)?;
        Ok(())
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print events one per line, suitable for streaming.
pub fn print_events(events: &[Event]) -> Result<(), Box<dyn std::error::Error>> {
    for event in events {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}
