//! XP rewards, user stats, and the completed-workout ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::DifficultyTier;

/// How a workout reached completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionSource {
    /// Every activity was completed one by one.
    Progressive,
    /// The whole workout was marked done in a single action.
    Manual,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub xp: u64,
    /// Incremented on every completion. There is no day-boundary check.
    pub streak: u32,
    pub total_workouts: u32,
    pub last_workout_date: Option<DateTime<Utc>>,
}

impl UserStats {
    pub fn record_workout(&mut self, reward_xp: u64, at: DateTime<Utc>) {
        self.xp = self.xp.saturating_add(reward_xp);
        self.streak = self.streak.saturating_add(1);
        self.total_workouts = self.total_workouts.saturating_add(1);
        self.last_workout_date = Some(at);
    }
}

/// Base XP per tier plus the progressive-completion bonus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardPolicy {
    #[serde(default = "default_low_xp")]
    pub low_xp: u64,
    #[serde(default = "default_medium_xp")]
    pub medium_xp: u64,
    #[serde(default = "default_high_xp")]
    pub high_xp: u64,
    /// Fraction of the base added when every activity was completed.
    #[serde(default = "default_progressive_bonus")]
    pub progressive_bonus: f64,
}

fn default_low_xp() -> u64 {
    10
}
fn default_medium_xp() -> u64 {
    20
}
fn default_high_xp() -> u64 {
    30
}
fn default_progressive_bonus() -> f64 {
    0.5
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            low_xp: default_low_xp(),
            medium_xp: default_medium_xp(),
            high_xp: default_high_xp(),
            progressive_bonus: default_progressive_bonus(),
        }
    }
}

impl RewardPolicy {
    pub fn base_xp(&self, tier: DifficultyTier) -> u64 {
        match tier {
            DifficultyTier::Low => self.low_xp,
            DifficultyTier::Medium => self.medium_xp,
            DifficultyTier::High => self.high_xp,
        }
    }

    pub fn reward_for(&self, tier: DifficultyTier, source: CompletionSource) -> u64 {
        let base = self.base_xp(tier);
        match source {
            CompletionSource::Manual => base,
            CompletionSource::Progressive => {
                let bonus = (base as f64 * self.progressive_bonus.max(0.0)).floor() as u64;
                base.saturating_add(bonus)
            }
        }
    }
}

pub fn celebration_message(tier: DifficultyTier) -> &'static str {
    match tier {
        DifficultyTier::Low => "Nice start! Every small step counts.",
        DifficultyTier::Medium => "Great work! You're building real momentum.",
        DifficultyTier::High => "Outstanding! You crushed a tough session.",
    }
}

/// Ordered ledger of completed workout ids. Each id appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletedWorkouts {
    ids: Vec<u32>,
}

impl CompletedWorkouts {
    pub fn contains(&self, workout_id: u32) -> bool {
        self.ids.contains(&workout_id)
    }

    /// Append `workout_id` unless already present. Returns true if appended.
    pub fn insert(&mut self, workout_id: u32) -> bool {
        if self.contains(workout_id) {
            return false;
        }
        self.ids.push(workout_id);
        true
    }

    pub fn remove(&mut self, workout_id: u32) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| *id != workout_id);
        self.ids.len() != before
    }

    pub fn ids(&self) -> &[u32] {
        &self.ids
    }
}
