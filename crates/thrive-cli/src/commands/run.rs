//! Foreground workout runner.
//!
//! Drives the store from one tokio interval instead of per-timer callbacks.
//! Each activity that finishes starts the next incomplete one until the
//! workout completes or the user interrupts.

use std::time::Duration;
use thrive_core::{
    CoreError, Event, KvStore, ProgressStore, WorkoutCatalog, WorkoutDefinition,
};
use tokio::time::MissedTickBehavior;

use crate::state::{print_events, CliSession};

/// What the runner does after a tick.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    /// A countdown for this workout is still going.
    Wait,
    /// Start the named activity.
    Start(String),
    /// Leave the loop.
    Done,
}

fn next_incomplete<S: KvStore, C: WorkoutCatalog>(
    store: &ProgressStore<S, C>,
    workout: &WorkoutDefinition,
) -> Option<String> {
    workout
        .activities
        .iter()
        .find(|a| !store.tracker().is_complete(workout.id, &a.id))
        .map(|a| a.id.clone())
}

fn workout_done(events: &[Event], workout_id: u32) -> bool {
    events
        .iter()
        .any(|e| matches!(e, Event::WorkoutCompleted { workout_id: id, .. } if *id == workout_id))
}

/// Decide the next move from the events one tick produced.
///
/// Without auto-advance the loop ends after the first event that belongs
/// to this workout; events of other workouts never end it.
fn next_step<S: KvStore, C: WorkoutCatalog>(
    store: &ProgressStore<S, C>,
    workout: &WorkoutDefinition,
    events: &[Event],
    auto_advance: bool,
) -> Step {
    if workout_done(events, workout.id) {
        return Step::Done;
    }
    if store.timers().active_for(workout.id).next().is_some() {
        return Step::Wait;
    }
    let own_events = events.iter().any(|e| e.workout_id() == Some(workout.id));
    if !auto_advance && own_events {
        return Step::Done;
    }
    match next_incomplete(store, workout) {
        Some(activity) => Step::Start(activity),
        None => Step::Done,
    }
}

/// Resume every paused countdown of the workout.
fn resume_paused<S: KvStore, C: WorkoutCatalog>(
    store: &mut ProgressStore<S, C>,
    workout_id: u32,
) -> Vec<Event> {
    let paused: Vec<String> = store
        .timers()
        .active_for(workout_id)
        .filter(|t| !t.is_running)
        .map(|t| t.activity_id.clone())
        .collect();
    paused.iter().flat_map(|a| store.toggle(a)).collect()
}

pub fn run(workout_id: u32) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = CliSession::open()?;
    print_events(&session.take_pending())?;

    let workout = session
        .store
        .catalog()
        .find_workout(workout_id)
        .cloned()
        .ok_or(CoreError::UnknownWorkout(workout_id))?;
    if workout.tier != session.store.tier() {
        print_events(&session.store.set_tier(workout.tier))?;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let outcome = runtime.block_on(drive(&mut session, &workout));

    // Save whatever progress was made even if the loop failed.
    session.save()?;
    outcome
}

async fn drive(
    session: &mut CliSession,
    workout: &WorkoutDefinition,
) -> Result<(), Box<dyn std::error::Error>> {
    if session.store.progress(workout.id).is_complete() {
        eprintln!("Workout {} is already complete; reset it to replay.", workout.id);
        return Ok(());
    }

    print_events(&resume_paused(&mut session.store, workout.id))?;

    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let events = session.catch_up();
                print_events(&events)?;
                let auto_advance = session.config.timer.auto_advance;
                match next_step(&session.store, workout, &events, auto_advance) {
                    Step::Wait => {}
                    Step::Start(activity) => {
                        tracing::debug!(workout_id = workout.id, %activity, "advancing to next activity");
                        print_events(&session.store.start(workout.id, &activity)?)?;
                    }
                    Step::Done => return Ok(()),
                }
            }
            _ = &mut ctrl_c => {
                eprintln!("Interrupted; timers saved.");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thrive_core::{
        ActivityDefinition, Config, DifficultyTier, ManualClock, MemoryStore, StaticCatalog,
        TickDriver,
    };

    fn catalog() -> StaticCatalog {
        let w = |id: u32, acts: &[(&str, u64)]| WorkoutDefinition {
            id,
            name: format!("W{id}"),
            duration_min: 1,
            description: String::new(),
            tier: DifficultyTier::Low,
            activities: acts
                .iter()
                .map(|(a, s)| ActivityDefinition::new(a, a, *s))
                .collect(),
        };
        StaticCatalog::from_workouts(vec![w(1, &[("a", 3), ("b", 2)]), w(2, &[("x", 1)])]).unwrap()
    }

    fn open() -> ProgressStore<MemoryStore> {
        ProgressStore::open(MemoryStore::new(), catalog(), &Config::default())
    }

    /// Mirror of `drive` on a manual clock. Returns all events and the
    /// second at which the loop ended.
    fn simulate(
        store: &mut ProgressStore<MemoryStore>,
        workout_id: u32,
        auto_advance: bool,
    ) -> (Vec<Event>, u64) {
        let workout = store.catalog().find_workout(workout_id).cloned().unwrap();
        let clock = ManualClock::new(0);
        let mut driver = TickDriver::new(clock.clone(), 3600);
        driver.start();

        let mut all = resume_paused(store, workout_id);
        for second in 0..60 {
            let events = store.advance(driver.poll());
            all.extend(events.iter().cloned());
            match next_step(store, &workout, &events, auto_advance) {
                Step::Wait => {}
                Step::Start(activity) => all.extend(store.start(workout_id, &activity).unwrap()),
                Step::Done => return (all, second),
            }
            clock.advance(1000);
        }
        panic!("runner did not finish within a minute");
    }

    fn count(events: &[Event], pred: impl Fn(&Event) -> bool) -> usize {
        events.iter().filter(|e| pred(e)).count()
    }

    #[test]
    fn auto_advance_runs_every_activity_then_stops() {
        let mut store = open();
        let (events, ended_at) = simulate(&mut store, 1, true);

        assert_eq!(
            count(&events, |e| matches!(e, Event::ActivityStarted { .. })),
            2
        );
        assert_eq!(
            count(&events, |e| matches!(e, Event::WorkoutCompleted { .. })),
            1
        );
        assert!(store.progress(1).is_complete());
        // 3s + 2s of countdown, started back to back.
        assert_eq!(ended_at, 5);
    }

    #[test]
    fn without_auto_advance_stops_after_first_activity() {
        let mut store = open();
        let (events, _) = simulate(&mut store, 1, false);

        assert_eq!(
            count(&events, |e| matches!(e, Event::ActivityCompleted { .. })),
            1
        );
        assert!(store.tracker().is_complete(1, "a"));
        assert!(!store.tracker().is_complete(1, "b"));
        assert!(store.timers().is_empty());
    }

    #[test]
    fn other_workout_events_do_not_end_the_run() {
        let mut store = open();
        store.start(2, "x").unwrap();
        let workout = store.catalog().find_workout(1).cloned().unwrap();

        let events = store.advance(1);
        assert!(workout_done(&events, 2));
        assert_eq!(
            next_step(&store, &workout, &events, false),
            Step::Start("a".into())
        );
    }

    #[test]
    fn waits_while_own_timer_runs() {
        let mut store = open();
        store.start(1, "a").unwrap();
        let workout = store.catalog().find_workout(1).cloned().unwrap();
        let events = store.advance(1);
        assert_eq!(next_step(&store, &workout, &events, true), Step::Wait);
    }

    #[test]
    fn paused_timers_resume_before_running() {
        let mut store = open();
        store.start(1, "a").unwrap();
        store.advance(1);
        store.toggle("a");

        let resumed = resume_paused(&mut store, 1);
        assert!(matches!(
            resumed.as_slice(),
            [Event::ActivityToggled { is_running: true, time_left_secs: 2, .. }]
        ));

        let (events, _) = simulate(&mut store, 1, true);
        assert_eq!(
            count(&events, |e| matches!(e, Event::WorkoutCompleted { .. })),
            1
        );
    }
}
