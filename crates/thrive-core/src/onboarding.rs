//! Onboarding state stored in the key-value store.
//!
//! Several screens write onboarding keys independently, so the persisted
//! set can end up contradicting itself (for example a completed flag next
//! to a half-finished step). `reconcile` removes the keys that conflict
//! with the strongest recorded outcome.
//!
//! Precedence: completed > skipped > in progress > not started.

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::storage::KvStore;

pub mod keys {
    pub const COMPLETED: &str = "thrive.onboarding.completed";
    pub const SKIPPED: &str = "thrive.onboarding.skipped";
    pub const STEP: &str = "thrive.onboarding.step";
    pub const ANSWERS: &str = "thrive.onboarding.answers";

    pub const ALL: [&str; 4] = [COMPLETED, SKIPPED, STEP, ANSWERS];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OnboardingStatus {
    NotStarted,
    InProgress { step: u32 },
    Completed,
    Skipped,
}

/// Keys deleted by a reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub removed: Vec<String>,
}

impl Reconciliation {
    pub fn is_clean(&self) -> bool {
        self.removed.is_empty()
    }
}

fn flag<S: KvStore + ?Sized>(store: &S, key: &str) -> Result<bool, StorageError> {
    Ok(matches!(store.get(key)?.as_deref().map(str::trim), Some("true") | Some("1")))
}

fn step<S: KvStore + ?Sized>(store: &S) -> Result<Option<Result<u32, String>>, StorageError> {
    Ok(store
        .get(keys::STEP)?
        .map(|raw| raw.trim().parse::<u32>().map_err(|_| raw)))
}

/// Derive the effective status. Unparsable steps count as not started.
pub fn read_status<S: KvStore + ?Sized>(store: &S) -> Result<OnboardingStatus, StorageError> {
    if flag(store, keys::COMPLETED)? {
        return Ok(OnboardingStatus::Completed);
    }
    if flag(store, keys::SKIPPED)? {
        return Ok(OnboardingStatus::Skipped);
    }
    Ok(match step(store)? {
        Some(Ok(step)) => OnboardingStatus::InProgress { step },
        _ => OnboardingStatus::NotStarted,
    })
}

/// Delete persisted keys that conflict with the effective status.
pub fn reconcile<S: KvStore + ?Sized>(store: &mut S) -> Result<Reconciliation, StorageError> {
    let stale: &[&str] = match read_status(&*store)? {
        OnboardingStatus::Completed => &[keys::SKIPPED, keys::STEP, keys::ANSWERS],
        OnboardingStatus::Skipped => &[keys::STEP, keys::ANSWERS],
        OnboardingStatus::InProgress { .. } => &[],
        OnboardingStatus::NotStarted => &[keys::STEP],
    };

    let mut result = Reconciliation::default();
    for key in stale {
        if store.get(key)?.is_some() {
            store.remove(key)?;
            result.removed.push((*key).to_string());
        }
    }
    if !result.is_clean() {
        tracing::info!(removed = ?result.removed, "reconciled onboarding state");
    }
    Ok(result)
}

/// Remove every onboarding key so the flow can run again.
pub fn reset<S: KvStore + ?Sized>(store: &mut S) -> Result<(), StorageError> {
    for key in keys::ALL {
        store.remove(key)?;
    }
    Ok(())
}

pub fn set_step<S: KvStore + ?Sized>(store: &mut S, step: u32) -> Result<(), StorageError> {
    store.set(keys::STEP, &step.to_string())
}

/// Record completion and drop the now-stale in-progress keys.
pub fn mark_completed<S: KvStore + ?Sized>(store: &mut S) -> Result<Reconciliation, StorageError> {
    store.set(keys::COMPLETED, "true")?;
    reconcile(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn empty_store_is_not_started() {
        let store = MemoryStore::new();
        assert_eq!(read_status(&store).unwrap(), OnboardingStatus::NotStarted);
    }

    #[test]
    fn step_means_in_progress() {
        let mut store = MemoryStore::new();
        set_step(&mut store, 3).unwrap();
        assert_eq!(read_status(&store).unwrap(), OnboardingStatus::InProgress { step: 3 });
        assert!(reconcile(&mut store).unwrap().is_clean());
    }

    #[test]
    fn completed_clears_conflicting_keys() {
        let mut store = MemoryStore::new();
        store.set(keys::COMPLETED, "true").unwrap();
        store.set(keys::SKIPPED, "true").unwrap();
        store.set(keys::STEP, "2").unwrap();
        store.set(keys::ANSWERS, "{}").unwrap();

        let result = reconcile(&mut store).unwrap();
        assert_eq!(result.removed.len(), 3);
        assert_eq!(store.raw(keys::COMPLETED), Some("true"));
        assert!(store.raw(keys::STEP).is_none());
        assert!(store.raw(keys::ANSWERS).is_none());
        assert!(store.raw(keys::SKIPPED).is_none());
        assert!(reconcile(&mut store).unwrap().is_clean());
    }

    #[test]
    fn skipped_keeps_flag_drops_progress() {
        let mut store = MemoryStore::new();
        store.set(keys::SKIPPED, "1").unwrap();
        store.set(keys::STEP, "1").unwrap();
        let result = reconcile(&mut store).unwrap();
        assert_eq!(result.removed, vec![keys::STEP.to_string()]);
        assert_eq!(read_status(&store).unwrap(), OnboardingStatus::Skipped);
    }

    #[test]
    fn garbage_step_is_removed() {
        let mut store = MemoryStore::new();
        store.set(keys::STEP, "three").unwrap();
        assert_eq!(read_status(&store).unwrap(), OnboardingStatus::NotStarted);
        let result = reconcile(&mut store).unwrap();
        assert_eq!(result.removed, vec![keys::STEP.to_string()]);
    }

    #[test]
    fn mark_completed_then_reset() {
        let mut store = MemoryStore::new();
        set_step(&mut store, 4).unwrap();
        mark_completed(&mut store).unwrap();
        assert_eq!(read_status(&store).unwrap(), OnboardingStatus::Completed);
        assert!(store.raw(keys::STEP).is_none());

        reset(&mut store).unwrap();
        assert_eq!(read_status(&store).unwrap(), OnboardingStatus::NotStarted);
    }
}
