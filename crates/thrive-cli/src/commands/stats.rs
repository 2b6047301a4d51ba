use clap::Subcommand;
use serde::Serialize;
use thrive_core::{DifficultyTier, Event, UserStats};

use crate::state::{print_json, CliSession};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Show XP, streak and workout totals
    Show,
}

#[derive(Subcommand)]
pub enum TierAction {
    /// Print the session difficulty tier
    Show,
    /// Change the session difficulty tier
    Set {
        /// low, medium or high
        tier: DifficultyTier,
    },
}

#[derive(Serialize)]
struct StatsView<'a> {
    #[serde(flatten)]
    stats: &'a UserStats,
    completed_workouts: &'a [u32],
    tier: DifficultyTier,
    caught_up: Vec<Event>,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = CliSession::open()?;

    match action {
        StatsAction::Show => {
            let caught_up = session.take_pending();
            print_json(&StatsView {
                stats: session.store.stats(),
                completed_workouts: session.store.completed_workouts().ids(),
                tier: session.store.tier(),
                caught_up,
            })?;
        }
    }

    session.save()
}

pub fn run_tier(action: TierAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = CliSession::open()?;

    match action {
        TierAction::Show => println!("{}", session.store.tier()),
        TierAction::Set { tier } => {
            let events = session.store.set_tier(tier);
            print_json(&session.with_pending(events))?;
        }
    }

    session.save()
}
