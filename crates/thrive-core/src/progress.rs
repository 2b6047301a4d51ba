//! Activity completion records and per-workout progress.
//!
//! Completion is keyed by `"{workout_id}-{activity_id}"` and stored as one
//! map so it can be persisted as a single value.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::{WorkoutCatalog, WorkoutDefinition};

pub fn completion_key(workout_id: u32, activity_id: &str) -> String {
    format!("{workout_id}-{activity_id}")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionTracker {
    records: BTreeMap<String, bool>,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an activity as done. Returns true if the record was newly set.
    pub fn mark_complete(&mut self, workout_id: u32, activity_id: &str) -> bool {
        let slot = self
            .records
            .entry(completion_key(workout_id, activity_id))
            .or_insert(false);
        let newly = !*slot;
        *slot = true;
        newly
    }

    pub fn is_complete(&self, workout_id: u32, activity_id: &str) -> bool {
        self.records
            .get(&completion_key(workout_id, activity_id))
            .copied()
            .unwrap_or(false)
    }

    /// Delete every record for this workout's activities. Returns how many
    /// records were removed.
    pub fn reset_workout(&mut self, workout: &WorkoutDefinition) -> usize {
        workout
            .activity_ids()
            .filter(|id| self.records.remove(&completion_key(workout.id, id)).is_some())
            .count()
    }

    pub fn records(&self) -> &BTreeMap<String, bool> {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Progress of `workout` against these records.
    pub fn progress(&self, workout: &WorkoutDefinition) -> WorkoutProgress {
        let completed = workout
            .activity_ids()
            .filter(|id| self.is_complete(workout.id, id))
            .count();
        WorkoutProgress {
            completed,
            total: workout.activities.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutProgress {
    pub completed: usize,
    pub total: usize,
}

impl WorkoutProgress {
    /// A workout with no activities is never complete.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }

    /// 0.0 .. 100.0
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}

/// Progress for a workout id. Unknown workouts report `{0, 0}`.
pub fn progress_for<C: WorkoutCatalog + ?Sized>(
    catalog: &C,
    tracker: &CompletionTracker,
    workout_id: u32,
) -> WorkoutProgress {
    catalog
        .find_workout(workout_id)
        .map(|w| tracker.progress(w))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ActivityDefinition, DifficultyTier, StaticCatalog};
    use proptest::prelude::*;

    fn workout(id: u32, ids: &[&str]) -> WorkoutDefinition {
        WorkoutDefinition {
            id,
            name: format!("W{id}"),
            duration_min: 3,
            description: String::new(),
            tier: DifficultyTier::Medium,
            activities: ids
                .iter()
                .map(|a| ActivityDefinition::new(a, a, 60))
                .collect(),
        }
    }

    fn catalog() -> StaticCatalog {
        StaticCatalog::from_workouts(vec![
            workout(1, &["a", "b", "c"]),
            workout(2, &["a", "b"]),
            workout(3, &[]),
        ])
        .unwrap()
    }

    #[test]
    fn mark_complete_is_idempotent() {
        let mut tracker = CompletionTracker::new();
        assert!(tracker.mark_complete(1, "a"));
        let before = tracker.clone();
        assert!(!tracker.mark_complete(1, "a"));
        assert_eq!(tracker, before);
    }

    #[test]
    fn progress_ignores_other_workouts() {
        let catalog = catalog();
        let mut tracker = CompletionTracker::new();
        tracker.mark_complete(2, "a");
        tracker.mark_complete(2, "b");
        tracker.mark_complete(1, "a");
        tracker.mark_complete(1, "zzz");
        let p = progress_for(&catalog, &tracker, 1);
        assert_eq!(p, WorkoutProgress { completed: 1, total: 3 });
        assert!(progress_for(&catalog, &tracker, 2).is_complete());
    }

    #[test]
    fn unknown_workout_is_zero() {
        let tracker = CompletionTracker::new();
        assert_eq!(progress_for(&catalog(), &tracker, 42), WorkoutProgress::default());
    }

    #[test]
    fn empty_workout_never_complete() {
        let p = progress_for(&catalog(), &CompletionTracker::new(), 3);
        assert_eq!(p, WorkoutProgress { completed: 0, total: 0 });
        assert!(!p.is_complete());
        assert_eq!(p.percent(), 0.0);
    }

    #[test]
    fn reset_clears_only_target_workout() {
        let catalog = catalog();
        let mut tracker = CompletionTracker::new();
        for id in ["a", "b", "c"] {
            tracker.mark_complete(1, id);
        }
        tracker.mark_complete(2, "a");
        let w1 = catalog.find_workout(1).unwrap();
        assert_eq!(tracker.reset_workout(w1), 3);
        assert_eq!(tracker.progress(w1).completed, 0);
        assert!(tracker.is_complete(2, "a"));
    }

    #[test]
    fn serializes_as_flat_map() {
        let mut tracker = CompletionTracker::new();
        tracker.mark_complete(7, "plank");
        let json = serde_json::to_string(&tracker).unwrap();
        assert_eq!(json, r#"{"7-plank":true}"#);
    }

    proptest! {
        #[test]
        fn progress_counts_exactly_own_records(
            marks in proptest::collection::vec((1u32..4, 0usize..5), 0..40)
        ) {
            let names = ["a", "b", "c", "d", "e"];
            let catalog = catalog();
            let mut tracker = CompletionTracker::new();
            for (w, i) in &marks {
                tracker.mark_complete(*w, names[*i]);
            }
            for w in catalog.all() {
                let expected = w
                    .activity_ids()
                    .filter(|a| marks.iter().any(|(mw, mi)| *mw == w.id && names[*mi] == *a))
                    .count();
                let p = progress_for(&catalog, &tracker, w.id);
                prop_assert_eq!(p.completed, expected);
                prop_assert_eq!(p.total, w.activities.len());
            }
        }
    }
}
