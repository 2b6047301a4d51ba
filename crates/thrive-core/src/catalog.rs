//! Static workout catalog.
//!
//! Workout definitions are read-only for the lifetime of a session. The
//! built-in catalog ships three sessions per difficulty tier.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Difficulty level of a session. Determines the base XP reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Low,
    #[default]
    Medium,
    High,
}

impl DifficultyTier {
    pub const ALL: [DifficultyTier; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyTier::Low => "low",
            DifficultyTier::Medium => "medium",
            DifficultyTier::High => "high",
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" | "beginner" | "easy" => Ok(Self::Low),
            "medium" | "intermediate" => Ok(Self::Medium),
            "high" | "advanced" | "hard" => Ok(Self::High),
            other => Err(format!("unknown difficulty tier: {other}")),
        }
    }
}

/// A single timed step within a workout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDefinition {
    pub id: String,
    pub name: String,
    pub duration_secs: u64,
}

impl ActivityDefinition {
    pub fn new(id: &str, name: &str, duration_secs: u64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            duration_secs,
        }
    }
}

/// A named collection of activities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutDefinition {
    pub id: u32,
    pub name: String,
    /// Stated duration in minutes. Approximates the sum of activity durations.
    pub duration_min: u32,
    #[serde(default)]
    pub description: String,
    pub tier: DifficultyTier,
    pub activities: Vec<ActivityDefinition>,
}

impl WorkoutDefinition {
    pub fn activity(&self, activity_id: &str) -> Option<&ActivityDefinition> {
        self.activities.iter().find(|a| a.id == activity_id)
    }

    pub fn activity_ids(&self) -> impl Iterator<Item = &str> {
        self.activities.iter().map(|a| a.id.as_str())
    }

    /// Sum of all activity durations in seconds.
    pub fn total_activity_secs(&self) -> u64 {
        self.activities
            .iter()
            .map(|a| a.duration_secs)
            .fold(0u64, u64::saturating_add)
    }

    /// Check that activity ids are non-empty and unique.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for activity in &self.activities {
            if activity.id.is_empty() {
                return Err(ValidationError::EmptyId(self.id));
            }
            if !seen.insert(activity.id.as_str()) {
                return Err(ValidationError::DuplicateActivity {
                    workout_id: self.id,
                    activity_id: activity.id.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Read-only source of workout definitions.
pub trait WorkoutCatalog {
    fn list_workouts(&self, tier: DifficultyTier) -> Vec<&WorkoutDefinition>;

    fn find_workout(&self, workout_id: u32) -> Option<&WorkoutDefinition>;

    fn find_activity(&self, workout_id: u32, activity_id: &str) -> Option<&ActivityDefinition> {
        self.find_workout(workout_id)?.activity(activity_id)
    }
}

/// In-memory catalog backed by a fixed list of workouts.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    workouts: Vec<WorkoutDefinition>,
}

impl StaticCatalog {
    /// Build a catalog from arbitrary workouts, rejecting duplicate ids.
    pub fn from_workouts(workouts: Vec<WorkoutDefinition>) -> Result<Self, ValidationError> {
        let mut ids = HashSet::new();
        for workout in &workouts {
            if !ids.insert(workout.id) {
                return Err(ValidationError::DuplicateWorkout(workout.id));
            }
            workout.validate()?;
        }
        Ok(Self { workouts })
    }

    pub fn all(&self) -> &[WorkoutDefinition] {
        &self.workouts
    }

    /// The catalog bundled with the app.
    pub fn builtin() -> Self {
        Self {
            workouts: builtin_workouts(),
        }
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl WorkoutCatalog for StaticCatalog {
    fn list_workouts(&self, tier: DifficultyTier) -> Vec<&WorkoutDefinition> {
        self.workouts.iter().filter(|w| w.tier == tier).collect()
    }

    fn find_workout(&self, workout_id: u32) -> Option<&WorkoutDefinition> {
        self.workouts.iter().find(|w| w.id == workout_id)
    }
}

fn workout(
    id: u32,
    name: &str,
    duration_min: u32,
    description: &str,
    tier: DifficultyTier,
    activities: &[(&str, &str, u64)],
) -> WorkoutDefinition {
    WorkoutDefinition {
        id,
        name: name.into(),
        duration_min,
        description: description.into(),
        tier,
        activities: activities
            .iter()
            .map(|(id, name, secs)| ActivityDefinition::new(id, name, *secs))
            .collect(),
    }
}

fn builtin_workouts() -> Vec<WorkoutDefinition> {
    use DifficultyTier::*;
    vec![
        workout(
            1,
            "Morning Breath",
            5,
            "Gentle breathing to start the day.",
            Low,
            &[
                ("box-breathing", "Box breathing", 120),
                ("4-7-8", "Hold breath for 7 counts", 120),
                ("body-scan", "Quick body scan", 60),
            ],
        ),
        workout(
            2,
            "Desk Stretch",
            6,
            "Loosen neck, shoulders and wrists.",
            Low,
            &[
                ("neck-rolls", "Neck rolls", 60),
                ("shoulder-shrugs", "Shoulder shrugs", 60),
                ("wrist-circles", "Wrist circles", 60),
                ("seated-twist", "Seated twist", 120),
                ("forward-fold", "Forward fold", 60),
            ],
        ),
        workout(
            3,
            "Wind Down",
            8,
            "Slow movement before sleep.",
            Low,
            &[
                ("childs-pose", "Child's pose", 180),
                ("legs-up-wall", "Legs up the wall", 180),
                ("slow-breath", "Slow exhale breathing", 120),
            ],
        ),
        workout(
            4,
            "Mobility Flow",
            12,
            "Full-body joint mobility.",
            Medium,
            &[
                ("cat-cow", "Cat-cow", 120),
                ("hip-openers", "Hip openers", 180),
                ("thoracic-rotations", "Thoracic rotations", 180),
                ("deep-squat-hold", "Deep squat hold", 120),
                ("ankle-mobility", "Ankle mobility", 120),
            ],
        ),
        workout(
            5,
            "Core Builder",
            10,
            "Bodyweight core circuit.",
            Medium,
            &[
                ("plank", "Plank", 60),
                ("dead-bug", "Dead bug", 90),
                ("side-plank-left", "Side plank (left)", 45),
                ("side-plank-right", "Side plank (right)", 45),
                ("hollow-hold", "Hollow hold", 60),
                ("rest", "Rest", 60),
                ("bird-dog", "Bird dog", 90),
                ("glute-bridge", "Glute bridge", 90),
                ("cooldown", "Cooldown", 60),
            ],
        ),
        workout(
            6,
            "Focus Reset",
            10,
            "Breathwork and mindful walking.",
            Medium,
            &[
                ("coherent-breathing", "Coherent breathing", 240),
                ("mindful-walk", "Mindful walk", 240),
                ("gratitude", "Gratitude reflection", 120),
            ],
        ),
        workout(
            7,
            "HIIT Burner",
            20,
            "High intensity intervals.",
            High,
            &[
                ("warmup", "Warm up", 180),
                ("burpees", "Burpees", 240),
                ("mountain-climbers", "Mountain climbers", 240),
                ("jump-squats", "Jump squats", 240),
                ("high-knees", "High knees", 180),
                ("cooldown", "Cooldown", 120),
            ],
        ),
        workout(
            8,
            "Strength Circuit",
            25,
            "Push, pull and legs with bodyweight.",
            High,
            &[
                ("pushups", "Push-ups", 300),
                ("rows", "Inverted rows", 300),
                ("lunges", "Walking lunges", 300),
                ("pike-pushups", "Pike push-ups", 300),
                ("stretch", "Stretch", 300),
            ],
        ),
        workout(
            9,
            "Breath Hold Training",
            15,
            "Progressive breath holds with recovery.",
            High,
            &[
                ("prep-breathing", "Preparation breathing", 180),
                ("hold-1", "First hold", 120),
                ("recover-1", "Recovery", 120),
                ("hold-2", "Second hold", 180),
                ("recover-2", "Recovery", 120),
                ("hold-3", "Final hold", 180),
            ],
        ),
    ]
}
