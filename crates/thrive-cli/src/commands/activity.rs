use clap::Subcommand;
use thrive_core::{CoreError, WorkoutCatalog};

use crate::state::{print_json, CliSession};

#[derive(Subcommand)]
pub enum ActivityAction {
    /// Start (or restart) an activity countdown
    Start {
        /// Workout ID
        workout: u32,
        /// Activity ID within the workout
        activity: String,
    },
    /// Pause or resume a running countdown
    Toggle {
        /// Activity ID
        activity: String,
    },
    /// Stop a countdown without recording completion
    Stop {
        /// Activity ID
        activity: String,
    },
    /// Mark an activity done without running its timer
    Complete {
        /// Workout ID
        workout: u32,
        /// Activity ID within the workout
        activity: String,
    },
}

pub fn run(action: ActivityAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = CliSession::open()?;

    let events = match action {
        ActivityAction::Start { workout, activity } => {
            let tier = session
                .store
                .catalog()
                .find_workout(workout)
                .map(|w| w.tier)
                .ok_or(CoreError::UnknownWorkout(workout))?;
            let mut events = Vec::new();
            if tier != session.store.tier() {
                events.extend(session.store.set_tier(tier));
            }
            events.extend(session.store.start(workout, &activity)?);
            events
        }
        ActivityAction::Toggle { activity } => session.store.toggle(&activity),
        ActivityAction::Stop { activity } => session.store.stop(&activity),
        ActivityAction::Complete { workout, activity } => {
            if session.store.catalog().find_activity(workout, &activity).is_none() {
                return Err(CoreError::UnknownActivity {
                    workout_id: workout,
                    activity_id: activity,
                }
                .into());
            }
            session.store.mark_complete(workout, &activity)
        }
    };

    print_json(&session.with_pending(events))?;
    session.save()
}
