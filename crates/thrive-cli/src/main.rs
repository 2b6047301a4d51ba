use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod state;

#[derive(Parser)]
#[command(name = "thrive", version, about = "THRIVE workout timers and progress")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse, finish and reset workouts
    Workout {
        #[command(subcommand)]
        action: commands::workout::WorkoutAction,
    },
    /// Per-activity timer control
    Activity {
        #[command(subcommand)]
        action: commands::activity::ActivityAction,
    },
    /// Run a workout in the foreground, one activity after another
    Run {
        /// Workout ID
        workout: u32,
    },
    /// Print timers, completion and stats as JSON
    Status,
    /// XP and streak statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Session difficulty tier
    Tier {
        #[command(subcommand)]
        action: commands::stats::TierAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Onboarding state maintenance
    Onboarding {
        #[command(subcommand)]
        action: commands::onboarding::OnboardingAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("THRIVE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Workout { action } => commands::workout::run(action),
        Commands::Activity { action } => commands::activity::run(action),
        Commands::Run { workout } => commands::run::run(workout),
        Commands::Status => commands::status::run(),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Tier { action } => commands::stats::run_tier(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Onboarding { action } => commands::onboarding::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
