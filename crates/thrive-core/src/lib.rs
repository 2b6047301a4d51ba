//! # THRIVE Core Library
//!
//! Workout activity timers and progression for the THRIVE wellness app.
//! The `thrive` CLI and any GUI shell are thin layers over this crate.
//!
//! ## Architecture
//!
//! - **Timer Registry**: independent per-activity countdowns, advanced by a
//!   single periodic tick driver that the caller polls
//! - **Progress**: completion records keyed by workout and activity, and the
//!   per-workout aggregate derived from them
//! - **Rewards**: XP per difficulty tier, user stats, completed-workout ledger
//! - **Storage**: key-value persistence (SQLite or in-memory) with
//!   write-through retry, plus TOML configuration
//! - **Onboarding**: reconciliation of persisted onboarding flags
//!
//! ## Key Components
//!
//! - [`ProgressStore`]: the state store commands flow through
//! - [`TimerRegistry`]: per-activity countdowns
//! - [`TickDriver`]: whole-second tick source over a [`Clock`]
//! - [`KvStore`]: persistence collaborator trait
//! - [`WorkoutCatalog`]: read-only workout definitions

pub mod catalog;
pub mod error;
pub mod events;
pub mod onboarding;
pub mod progress;
pub mod rewards;
pub mod session;
pub mod storage;
pub mod timer;

pub use catalog::{ActivityDefinition, DifficultyTier, StaticCatalog, WorkoutCatalog, WorkoutDefinition};
pub use error::{ConfigError, CoreError, Result, StorageError, ValidationError};
pub use events::Event;
pub use onboarding::{OnboardingStatus, Reconciliation};
pub use progress::{completion_key, progress_for, CompletionTracker, WorkoutProgress};
pub use rewards::{CompletedWorkouts, CompletionSource, RewardPolicy, UserStats};
pub use session::{ProgressStore, Snapshot};
pub use storage::{Config, KvStore, MemoryStore, Persister, SqliteStore};
pub use timer::{ActivityTimer, Clock, ManualClock, SystemClock, TickDriver, TickOutcome, TimerRegistry};
