//! Workout progression state store.
//!
//! [`ProgressStore`] owns every piece of mutable progression state: the
//! timer registry, completion records, user stats, and the completed-workout
//! ledger. The presentation layer issues commands and reads [`Snapshot`]s;
//! every command returns the events it produced.
//!
//! ## Control flow
//!
//! ```text
//! start -> registry entry (running)
//! tick  -> countdown hits zero -> entry removed -> mark_complete
//!       -> progress recomputed -> all done? -> workout completion
//! ```
//!
//! Persistence is write-through and best effort: a failed write is logged,
//! reported as [`Event::PersistenceFailed`], and retried on the next write.
//! In-memory state is authoritative for the session either way.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::{DifficultyTier, StaticCatalog, WorkoutCatalog};
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::progress::{progress_for, CompletionTracker, WorkoutProgress};
use crate::rewards::{
    celebration_message, CompletedWorkouts, CompletionSource, RewardPolicy, UserStats,
};
use crate::storage::{keys, Config, KvStore, Persister};
use crate::timer::{ActivityTimer, TimerRegistry};

/// Read-only projection handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub active_timers: Vec<ActivityTimer>,
    pub completion_map: BTreeMap<String, bool>,
    pub workout_progress: BTreeMap<u32, WorkoutProgress>,
    pub user_stats: UserStats,
    pub completed_workouts: Vec<u32>,
    pub tier: DifficultyTier,
    /// True while some write is still waiting to reach storage.
    pub dirty: bool,
}

#[derive(Debug)]
pub struct ProgressStore<S: KvStore, C: WorkoutCatalog = StaticCatalog> {
    catalog: C,
    registry: TimerRegistry,
    tracker: CompletionTracker,
    stats: UserStats,
    completed: CompletedWorkouts,
    tier: DifficultyTier,
    rewards: RewardPolicy,
    persister: Persister<S>,
}

impl<S: KvStore, C: WorkoutCatalog> ProgressStore<S, C> {
    /// Hydrate from `store`. Missing or unreadable values start from defaults.
    pub fn open(store: S, catalog: C, config: &Config) -> Self {
        let persister = Persister::new(store, config.persistence.max_attempts);
        let tracker: CompletionTracker = hydrate(&persister, keys::COMPLETED_ACTIVITIES);
        let stats: UserStats = hydrate(&persister, keys::USER_STATS);
        let completed: CompletedWorkouts = hydrate(&persister, keys::COMPLETED_WORKOUTS);
        let tier: Option<DifficultyTier> = hydrate(&persister, keys::SESSION_TIER);
        tracing::debug!(
            records = tracker.len(),
            completed = completed.ids().len(),
            xp = stats.xp,
            "hydrated progress store"
        );
        Self {
            catalog,
            registry: TimerRegistry::new(),
            tracker,
            stats,
            completed,
            tier: tier.unwrap_or(config.default_tier),
            rewards: config.rewards.clone(),
            persister,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn timers(&self) -> &TimerRegistry {
        &self.registry
    }

    pub fn tracker(&self) -> &CompletionTracker {
        &self.tracker
    }

    pub fn stats(&self) -> &UserStats {
        &self.stats
    }

    pub fn completed_workouts(&self) -> &CompletedWorkouts {
        &self.completed
    }

    pub fn tier(&self) -> DifficultyTier {
        self.tier
    }

    pub fn rewards(&self) -> &RewardPolicy {
        &self.rewards
    }

    pub fn store(&self) -> &S {
        self.persister.store()
    }

    pub fn store_mut(&mut self) -> &mut S {
        self.persister.store_mut()
    }

    pub fn is_dirty(&self) -> bool {
        self.persister.is_dirty()
    }

    pub fn progress(&self, workout_id: u32) -> WorkoutProgress {
        progress_for(&self.catalog, &self.tracker, workout_id)
    }

    pub fn snapshot(&self) -> Snapshot {
        let workout_progress = DifficultyTier::ALL
            .iter()
            .flat_map(|tier| self.catalog.list_workouts(*tier))
            .map(|w| (w.id, self.tracker.progress(w)))
            .collect();
        Snapshot {
            active_timers: self.registry.iter().cloned().collect(),
            completion_map: self.tracker.records().clone(),
            workout_progress,
            user_stats: self.stats.clone(),
            completed_workouts: self.completed.ids().to_vec(),
            tier: self.tier,
            dirty: self.persister.is_dirty(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the in-memory registry, e.g. with one saved by a previous
    /// process. Does not emit events.
    pub fn restore_timers(&mut self, registry: TimerRegistry) {
        self.registry = registry;
    }

    pub fn set_tier(&mut self, tier: DifficultyTier) -> Vec<Event> {
        self.tier = tier;
        persist(&mut self.persister, keys::SESSION_TIER, &tier)
            .into_iter()
            .collect()
    }

    /// Start (or restart) the countdown for one activity.
    ///
    /// # Errors
    /// Returns an error if the workout or activity is not in the catalog.
    pub fn start(&mut self, workout_id: u32, activity_id: &str) -> Result<Vec<Event>> {
        let workout = self
            .catalog
            .find_workout(workout_id)
            .ok_or(CoreError::UnknownWorkout(workout_id))?;
        let activity = workout
            .activity(activity_id)
            .ok_or_else(|| CoreError::UnknownActivity {
                workout_id,
                activity_id: activity_id.to_string(),
            })?;
        tracing::debug!(workout_id, activity_id, "starting activity timer");
        Ok(vec![self.registry.start(activity, workout_id)])
    }

    pub fn toggle(&mut self, activity_id: &str) -> Vec<Event> {
        self.registry.toggle(activity_id).into_iter().collect()
    }

    pub fn stop(&mut self, activity_id: &str) -> Vec<Event> {
        self.registry
            .stop(activity_id)
            .map(stopped_event)
            .into_iter()
            .collect()
    }

    /// Stop every running countdown for a workout without recording progress.
    pub fn abandon_workout(&mut self, workout_id: u32) -> Vec<Event> {
        self.registry
            .stop_workout(workout_id)
            .into_iter()
            .map(stopped_event)
            .collect()
    }

    /// Advance all running countdowns by one second.
    pub fn tick(&mut self) -> Vec<Event> {
        let finished = self.registry.tick();
        let mut events = Vec::new();
        for timer in finished {
            events.extend(self.mark_complete(timer.workout_id, &timer.activity_id));
        }
        events
    }

    /// Deliver `seconds` ticks, stopping early once nothing is running.
    pub fn advance(&mut self, seconds: u64) -> Vec<Event> {
        let mut events = Vec::new();
        for _ in 0..seconds {
            if !self.registry.iter().any(|t| t.is_running) {
                break;
            }
            events.extend(self.tick());
        }
        events
    }

    /// Record an activity as done and evaluate workout completion.
    ///
    /// Idempotent: repeating the call changes nothing and never rewards twice.
    pub fn mark_complete(&mut self, workout_id: u32, activity_id: &str) -> Vec<Event> {
        let mut events = Vec::new();
        if self.tracker.mark_complete(workout_id, activity_id) {
            events.push(Event::ActivityCompleted {
                workout_id,
                activity_id: activity_id.to_string(),
                at: Utc::now(),
            });
            events.extend(persist(
                &mut self.persister,
                keys::COMPLETED_ACTIVITIES,
                &self.tracker,
            ));
        }
        events.extend(self.evaluate_completion(workout_id, CompletionSource::Progressive));
        events
    }

    /// Mark a whole workout done in one action. Unknown workouts are ignored.
    pub fn complete_workout(&mut self, workout_id: u32) -> Vec<Event> {
        let Some(workout) = self.catalog.find_workout(workout_id) else {
            tracing::debug!(workout_id, "complete_workout for unknown workout");
            return Vec::new();
        };
        let activity_ids: Vec<String> = workout.activity_ids().map(str::to_string).collect();

        let mut events = self.abandon_workout(workout_id);
        let mut changed = false;
        for id in &activity_ids {
            changed |= self.tracker.mark_complete(workout_id, id);
        }
        if changed {
            events.extend(persist(
                &mut self.persister,
                keys::COMPLETED_ACTIVITIES,
                &self.tracker,
            ));
        }
        events.extend(self.evaluate_completion(workout_id, CompletionSource::Manual));
        events
    }

    /// Clear completion for a workout so it can be replayed and earn again.
    pub fn reset_progress(&mut self, workout_id: u32) -> Vec<Event> {
        let Some(workout) = self.catalog.find_workout(workout_id) else {
            return Vec::new();
        };

        let cleared = self.tracker.reset_workout(workout);
        let mut events = Vec::new();
        if cleared > 0 {
            events.extend(persist(
                &mut self.persister,
                keys::COMPLETED_ACTIVITIES,
                &self.tracker,
            ));
        }
        if self.completed.remove(workout_id) {
            events.extend(persist(
                &mut self.persister,
                keys::COMPLETED_WORKOUTS,
                &self.completed,
            ));
        }
        events.push(Event::ProgressReset {
            workout_id,
            cleared,
            at: Utc::now(),
        });
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn evaluate_completion(&mut self, workout_id: u32, source: CompletionSource) -> Vec<Event> {
        let progress = self.progress(workout_id);
        if !progress.is_complete() || !self.completed.insert(workout_id) {
            return Vec::new();
        }

        let mut events: Vec<Event> =
            persist(&mut self.persister, keys::COMPLETED_WORKOUTS, &self.completed)
                .into_iter()
                .collect();

        let at = Utc::now();
        let reward_xp = self.rewards.reward_for(self.tier, source);
        self.stats.record_workout(reward_xp, at);
        events.extend(persist(&mut self.persister, keys::USER_STATS, &self.stats));

        tracing::info!(
            workout_id,
            reward_xp,
            ?source,
            streak = self.stats.streak,
            "workout completed"
        );
        events.push(Event::WorkoutCompleted {
            workout_id,
            reward_xp,
            source,
            tier: self.tier,
            message: celebration_message(self.tier).to_string(),
            stats: self.stats.clone(),
            at,
        });
        events
    }
}

fn stopped_event(timer: ActivityTimer) -> Event {
    Event::ActivityStopped {
        workout_id: timer.workout_id,
        activity_id: timer.activity_id,
        time_left_secs: timer.time_left_secs,
        at: Utc::now(),
    }
}

fn hydrate<S: KvStore, T: DeserializeOwned + Default>(persister: &Persister<S>, key: &str) -> T {
    match persister.read(key) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "discarding unreadable stored value");
            T::default()
        }),
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read stored value");
            T::default()
        }
    }
}

/// Write `value` through, turning failure into an event instead of an error.
fn persist<S: KvStore, T: Serialize + ?Sized>(
    persister: &mut Persister<S>,
    key: &str,
    value: &T,
) -> Option<Event> {
    match persister.write_json(key, value) {
        Ok(()) => None,
        Err(e) => {
            let failed = match &e {
                CoreError::Storage(err) => err.failed_key().unwrap_or(key),
                _ => key,
            };
            tracing::warn!(key = failed, error = %e, "persistence failed, keeping in-memory state");
            Some(Event::PersistenceFailed {
                key: failed.to_string(),
                error: e.to_string(),
                at: Utc::now(),
            })
        }
    }
}
