//! Write-through persistence with retry and a dirty set.
//!
//! Writes are attempted immediately. A write that still fails after
//! `max_attempts` is remembered as dirty with its latest value; every later
//! write retries the dirty keys first, so the next healthy write reconciles
//! storage. Failures are reported to the caller but never undo in-memory
//! state.

use serde::Serialize;
use std::collections::BTreeMap;

use super::KvStore;
use crate::error::{Result, StorageError};

#[derive(Debug)]
pub struct Persister<S: KvStore> {
    store: S,
    max_attempts: u32,
    /// Latest unpersisted value per key.
    dirty: BTreeMap<String, String>,
}

impl<S: KvStore> Persister<S> {
    pub fn new(store: S, max_attempts: u32) -> Self {
        Self {
            store,
            max_attempts: max_attempts.max(1),
            dirty: BTreeMap::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn dirty_keys(&self) -> impl Iterator<Item = &str> {
        self.dirty.keys().map(String::as_str)
    }

    pub fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        if let Some(pending) = self.dirty.get(key) {
            return Ok(Some(pending.clone()));
        }
        self.store.get(key)
    }

    /// Serialize `value` and write it under `key`.
    pub fn write_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.write(key, &json)?;
        Ok(())
    }

    /// Queue `value` as the latest for `key` and flush everything pending.
    pub fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.dirty.insert(key.to_string(), value.to_string());
        self.flush()
    }

    /// Retry every dirty key. Stops at the first key that still fails and
    /// reports it as [`StorageError::WriteFailed`].
    pub fn flush(&mut self) -> Result<(), StorageError> {
        while let Some((key, value)) = self.dirty.pop_first() {
            if let Err(e) = self.attempt(&key, &value) {
                self.dirty.insert(key, value);
                return Err(e);
            }
            tracing::debug!(key = %key, "reconciled dirty key");
        }
        Ok(())
    }

    fn attempt(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut last_err = None;
        for attempt in 1..=self.max_attempts {
            match self.store.set(key, value) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::debug!(key, attempt, error = %e, "write attempt failed");
                    last_err = Some(e);
                }
            }
        }
        let source = last_err.unwrap_or_else(|| StorageError::Unavailable(key.to_string()));
        Err(StorageError::WriteFailed {
            key: key.to_string(),
            source: Box::new(source),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn retries_transient_failure() {
        let mut store = MemoryStore::new();
        store.fail_next_writes(2);
        let mut persister = Persister::new(store, 3);
        persister.write("k", "v").unwrap();
        assert!(!persister.is_dirty());
        assert_eq!(persister.store().raw("k"), Some("v"));
        assert_eq!(persister.store().write_attempts(), 3);
    }

    #[test]
    fn persistent_failure_marks_dirty_then_reconciles() {
        let mut store = MemoryStore::new();
        store.fail_writes(true);
        let mut persister = Persister::new(store, 2);

        assert!(persister.write("a", "1").is_err());
        assert!(persister.write("a", "2").is_err());
        assert_eq!(persister.dirty_keys().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(persister.read("a").unwrap().as_deref(), Some("2"));

        persister.store_mut().fail_writes(false);
        persister.write("b", "x").unwrap();
        assert!(!persister.is_dirty());
        assert_eq!(persister.store().raw("a"), Some("2"));
        assert_eq!(persister.store().raw("b"), Some("x"));
    }

    #[test]
    fn failure_names_the_key_that_failed() {
        let mut store = MemoryStore::new();
        store.fail_writes(true);
        let mut persister = Persister::new(store, 1);
        let err = persister.write("a", "1").unwrap_err();
        assert_eq!(err.failed_key(), Some("a"));

        // "a" is retried first and fails again, so "b" is never attempted.
        let err = persister.write("b", "2").unwrap_err();
        assert_eq!(err.failed_key(), Some("a"));
        assert_eq!(persister.dirty_keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn write_json_serializes() {
        let mut persister = Persister::new(MemoryStore::new(), 1);
        persister.write_json("list", &vec![1, 2]).unwrap();
        assert_eq!(persister.store().raw("list"), Some("[1,2]"));
    }
}
