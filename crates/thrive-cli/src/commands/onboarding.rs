use clap::Subcommand;
use thrive_core::onboarding;
use thrive_core::SqliteStore;

use crate::state::print_json;

#[derive(Subcommand)]
pub enum OnboardingAction {
    /// Print the effective onboarding status
    Status,
    /// Remove persisted onboarding keys that contradict each other
    Reconcile,
    /// Record the current onboarding step
    Step {
        /// Step index
        step: u32,
    },
    /// Mark onboarding as completed
    Complete,
    /// Clear all onboarding state so the flow runs again
    Reset,
}

pub fn run(action: OnboardingAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = SqliteStore::open()?;
    match action {
        OnboardingAction::Status => {
            print_json(&onboarding::read_status(&store)?)?;
        }
        OnboardingAction::Reconcile => {
            print_json(&onboarding::reconcile(&mut store)?)?;
        }
        OnboardingAction::Step { step } => {
            onboarding::set_step(&mut store, step)?;
            print_json(&onboarding::read_status(&store)?)?;
        }
        OnboardingAction::Complete => {
            print_json(&onboarding::mark_completed(&mut store)?)?;
        }
        OnboardingAction::Reset => {
            onboarding::reset(&mut store)?;
            print_json(&onboarding::read_status(&store)?)?;
        }
    }
    Ok(())
}
