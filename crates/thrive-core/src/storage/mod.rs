mod config;
mod memory;
mod persister;
mod sqlite;

pub use config::{Config, PersistenceConfig, TimerConfig};
pub use memory::MemoryStore;
pub use persister::Persister;
pub use sqlite::SqliteStore;

use std::path::PathBuf;

use crate::error::{Result, StorageError};

/// Storage keys owned by the progression core.
pub mod keys {
    pub const COMPLETED_ACTIVITIES: &str = "thrive.completed_activities";
    pub const USER_STATS: &str = "thrive.user_stats";
    pub const COMPLETED_WORKOUTS: &str = "thrive.completed_workouts";
    pub const SESSION_TIER: &str = "thrive.session_tier";
}

/// Key-value persistence with whole-value overwrite semantics.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Returns `~/.config/thrive[-dev]/`.
///
/// `THRIVE_DATA_DIR` overrides the location entirely; otherwise
/// `THRIVE_ENV=dev` selects the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("THRIVE_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("THRIVE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("thrive-dev")
            } else {
                base_dir.join("thrive")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
