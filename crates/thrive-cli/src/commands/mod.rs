pub mod activity;
pub mod config;
pub mod onboarding;
pub mod run;
pub mod stats;
pub mod status;
pub mod workout;
