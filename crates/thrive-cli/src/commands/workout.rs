use clap::Subcommand;
use serde::Serialize;
use thrive_core::{CoreError, DifficultyTier, WorkoutCatalog, WorkoutDefinition, WorkoutProgress};

use crate::state::{print_json, CliSession};

#[derive(Subcommand)]
pub enum WorkoutAction {
    /// List workouts for a difficulty tier
    List {
        /// Tier to list (defaults to the session tier)
        #[arg(long)]
        tier: Option<DifficultyTier>,
    },
    /// Show one workout with per-activity completion
    Show {
        /// Workout ID
        id: u32,
    },
    /// Mark the whole workout done in one step
    Finish {
        /// Workout ID
        id: u32,
    },
    /// Clear completion so the workout can be replayed
    Reset {
        /// Workout ID
        id: u32,
    },
    /// Stop every running timer of the workout
    Abandon {
        /// Workout ID
        id: u32,
    },
}

#[derive(Serialize)]
struct WorkoutSummary<'a> {
    id: u32,
    name: &'a str,
    duration_min: u32,
    tier: DifficultyTier,
    activity_count: usize,
    progress: WorkoutProgress,
    completed: bool,
}

#[derive(Serialize)]
struct ActivityView<'a> {
    id: &'a str,
    name: &'a str,
    duration_secs: u64,
    completed: bool,
    time_left_secs: Option<u64>,
    is_running: Option<bool>,
}

#[derive(Serialize)]
struct WorkoutDetail<'a> {
    #[serde(flatten)]
    summary: WorkoutSummary<'a>,
    description: &'a str,
    activities: Vec<ActivityView<'a>>,
}

fn summary<'a>(session: &CliSession, w: &'a WorkoutDefinition) -> WorkoutSummary<'a> {
    WorkoutSummary {
        id: w.id,
        name: &w.name,
        duration_min: w.duration_min,
        tier: w.tier,
        activity_count: w.activities.len(),
        progress: session.store.progress(w.id),
        completed: session.store.completed_workouts().contains(w.id),
    }
}

pub fn run(action: WorkoutAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = CliSession::open()?;

    match action {
        WorkoutAction::List { tier } => {
            let tier = tier.unwrap_or_else(|| session.store.tier());
            let catalog = session.store.catalog();
            let list: Vec<_> = catalog
                .list_workouts(tier)
                .into_iter()
                .map(|w| summary(&session, w))
                .collect();
            print_json(&list)?;
        }
        WorkoutAction::Show { id } => {
            let w = session
                .store
                .catalog()
                .find_workout(id)
                .ok_or(CoreError::UnknownWorkout(id))?;
            let activities = w
                .activities
                .iter()
                .map(|a| {
                    let timer = session.store.timers().get(&a.id).filter(|t| t.workout_id == id);
                    ActivityView {
                        id: &a.id,
                        name: &a.name,
                        duration_secs: a.duration_secs,
                        completed: session.store.tracker().is_complete(id, &a.id),
                        time_left_secs: timer.map(|t| t.time_left_secs),
                        is_running: timer.map(|t| t.is_running),
                    }
                })
                .collect();
            print_json(&WorkoutDetail {
                summary: summary(&session, w),
                description: &w.description,
                activities,
            })?;
        }
        WorkoutAction::Finish { id } => {
            if session.store.catalog().find_workout(id).is_none() {
                return Err(CoreError::UnknownWorkout(id).into());
            }
            let events = session.store.complete_workout(id);
            print_json(&session.with_pending(events))?;
        }
        WorkoutAction::Reset { id } => {
            if session.store.catalog().find_workout(id).is_none() {
                return Err(CoreError::UnknownWorkout(id).into());
            }
            let events = session.store.reset_progress(id);
            print_json(&session.with_pending(events))?;
        }
        WorkoutAction::Abandon { id } => {
            let events = session.store.abandon_workout(id);
            print_json(&session.with_pending(events))?;
        }
    }

    session.save()
}
