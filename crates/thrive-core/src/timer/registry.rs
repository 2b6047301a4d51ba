//! Registry of concurrently running activity countdowns.
//!
//! The registry holds at most one countdown per activity id. It has no
//! internal clock: the caller invokes `tick()` once per elapsed second
//! (see [`super::TickDriver`]).
//!
//! ## Entry lifecycle
//!
//! ```text
//! start -> running <-> paused
//!            |
//!            +-> tick to zero -> removed (returned as completed)
//!            +-> stop / stop_workout -> removed
//! ```
//!
//! Removal at zero is what guarantees a completion is reported once:
//! later ticks cannot see the entry again.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::entry::ActivityTimer;
use crate::catalog::ActivityDefinition;
use crate::events::Event;

/// Result of delivering a tick to a single activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No entry for this id. Nothing was mutated.
    Ghost,
    /// Entry exists but is paused.
    Paused,
    /// Entry decremented and still counting.
    Counting(u64),
    /// Entry reached zero and was removed.
    Completed(ActivityTimer),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerRegistry {
    timers: BTreeMap<String, ActivityTimer>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn get(&self, activity_id: &str) -> Option<&ActivityTimer> {
        self.timers.get(activity_id)
    }

    pub fn contains(&self, activity_id: &str) -> bool {
        self.timers.contains_key(activity_id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivityTimer> {
        self.timers.values()
    }

    /// Entries belonging to one workout.
    pub fn active_for(&self, workout_id: u32) -> impl Iterator<Item = &ActivityTimer> {
        self.timers.values().filter(move |t| t.workout_id == workout_id)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Insert a fresh running countdown at full duration.
    ///
    /// Restarting an activity that already has an entry replaces it.
    pub fn start(&mut self, activity: &ActivityDefinition, workout_id: u32) -> Event {
        let timer = ActivityTimer::new(activity, workout_id);
        let replaced = self.timers.insert(activity.id.clone(), timer).is_some();
        Event::ActivityStarted {
            workout_id,
            activity_id: activity.id.clone(),
            duration_secs: activity.duration_secs,
            replaced,
            at: Utc::now(),
        }
    }

    /// Flip running/paused. Returns `None` if the id is absent.
    pub fn toggle(&mut self, activity_id: &str) -> Option<Event> {
        let timer = self.timers.get_mut(activity_id)?;
        timer.is_running = !timer.is_running;
        Some(Event::ActivityToggled {
            activity_id: activity_id.to_string(),
            is_running: timer.is_running,
            time_left_secs: timer.time_left_secs,
            at: Utc::now(),
        })
    }

    pub fn stop(&mut self, activity_id: &str) -> Option<ActivityTimer> {
        self.timers.remove(activity_id)
    }

    /// Remove every entry owned by `workout_id`.
    pub fn stop_workout(&mut self, workout_id: u32) -> Vec<ActivityTimer> {
        let ids: Vec<String> = self
            .active_for(workout_id)
            .map(|t| t.activity_id.clone())
            .collect();
        ids.iter().filter_map(|id| self.timers.remove(id)).collect()
    }

    /// Advance every running countdown by one second.
    ///
    /// Returns the entries that reached zero, already removed from the registry.
    pub fn tick(&mut self) -> Vec<ActivityTimer> {
        let mut finished = Vec::new();
        for timer in self.timers.values_mut().filter(|t| t.is_running) {
            timer.time_left_secs = timer.time_left_secs.saturating_sub(1);
            if timer.time_left_secs == 0 {
                finished.push(timer.activity_id.clone());
            }
        }
        finished
            .iter()
            .filter_map(|id| self.timers.remove(id))
            .collect()
    }

    /// Deliver a tick to a single activity.
    ///
    /// This is the per-timer callback form. A tick for an id that is no
    /// longer registered is a no-op and never recreates the entry.
    pub fn tick_one(&mut self, activity_id: &str) -> TickOutcome {
        let Some(timer) = self.timers.get_mut(activity_id) else {
            return TickOutcome::Ghost;
        };
        if !timer.is_running {
            return TickOutcome::Paused;
        }
        timer.time_left_secs = timer.time_left_secs.saturating_sub(1);
        if timer.time_left_secs > 0 {
            return TickOutcome::Counting(timer.time_left_secs);
        }
        match self.timers.remove(activity_id) {
            Some(done) => TickOutcome::Completed(done),
            None => TickOutcome::Ghost,
        }
    }
}
