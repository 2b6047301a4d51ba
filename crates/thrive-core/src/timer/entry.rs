use serde::{Deserialize, Serialize};

use crate::catalog::ActivityDefinition;

/// A single per-activity countdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityTimer {
    pub activity_id: String,
    pub workout_id: u32,
    /// Fixed at creation.
    pub duration_secs: u64,
    pub time_left_secs: u64,
    pub is_running: bool,
}

impl ActivityTimer {
    /// A running countdown at full duration.
    pub fn new(activity: &ActivityDefinition, workout_id: u32) -> Self {
        Self {
            activity_id: activity.id.clone(),
            workout_id,
            duration_secs: activity.duration_secs,
            time_left_secs: activity.duration_secs,
            is_running: true,
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.duration_secs.saturating_sub(self.time_left_secs)
    }

    /// 0.0 .. 1.0 progress through the countdown.
    pub fn progress(&self) -> f64 {
        if self.duration_secs == 0 {
            return 1.0;
        }
        self.elapsed_secs() as f64 / self.duration_secs as f64
    }
}
