use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::DifficultyTier;
use crate::rewards::{CompletionSource, UserStats};

/// Every state change in the progression core produces an Event.
/// Commands return the events they produced to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    ActivityStarted {
        workout_id: u32,
        activity_id: String,
        duration_secs: u64,
        /// True when an existing countdown for the same activity was replaced.
        replaced: bool,
        at: DateTime<Utc>,
    },
    ActivityToggled {
        activity_id: String,
        is_running: bool,
        time_left_secs: u64,
        at: DateTime<Utc>,
    },
    ActivityStopped {
        workout_id: u32,
        activity_id: String,
        time_left_secs: u64,
        at: DateTime<Utc>,
    },
    ActivityCompleted {
        workout_id: u32,
        activity_id: String,
        at: DateTime<Utc>,
    },
    /// Celebration payload for the presentation layer.
    WorkoutCompleted {
        workout_id: u32,
        reward_xp: u64,
        source: CompletionSource,
        tier: DifficultyTier,
        message: String,
        stats: UserStats,
        at: DateTime<Utc>,
    },
    ProgressReset {
        workout_id: u32,
        cleared: usize,
        at: DateTime<Utc>,
    },
    /// A write could not be persisted after all attempts.
    /// In-memory state is unaffected.
    PersistenceFailed {
        key: String,
        error: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Workout the event belongs to. Toggles and persistence failures
    /// carry no workout id.
    pub fn workout_id(&self) -> Option<u32> {
        match self {
            Event::ActivityStarted { workout_id, .. }
            | Event::ActivityStopped { workout_id, .. }
            | Event::ActivityCompleted { workout_id, .. }
            | Event::WorkoutCompleted { workout_id, .. }
            | Event::ProgressReset { workout_id, .. } => Some(*workout_id),
            Event::ActivityToggled { .. } | Event::PersistenceFailed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_snake_case_tag() {
        let event = Event::ActivityCompleted {
            workout_id: 3,
            activity_id: "plank".into(),
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "activity_completed");
        assert_eq!(json["activity_id"], "plank");
    }

    #[test]
    fn workout_id_only_for_workout_scoped_events() {
        let completed = Event::ActivityCompleted {
            workout_id: 3,
            activity_id: "plank".into(),
            at: Utc::now(),
        };
        let toggled = Event::ActivityToggled {
            activity_id: "plank".into(),
            is_running: false,
            time_left_secs: 12,
            at: Utc::now(),
        };
        assert_eq!(completed.workout_id(), Some(3));
        assert_eq!(toggled.workout_id(), None);
    }
}
