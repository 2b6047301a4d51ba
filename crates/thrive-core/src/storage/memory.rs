use std::collections::HashMap;

use super::KvStore;
use crate::error::StorageError;

/// HashMap-backed store. Writes can be made to fail for exercising the
/// best-effort persistence path.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    fail_writes: bool,
    fail_next: u32,
    write_attempts: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set`/`remove` fail until turned off.
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Make only the next `n` writes fail.
    pub fn fail_next_writes(&mut self, n: u32) {
        self.fail_next = n;
    }

    /// Total `set`/`remove` calls, including failed ones.
    pub fn write_attempts(&self) -> u64 {
        self.write_attempts
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn check_write(&mut self) -> Result<(), StorageError> {
        self.write_attempts += 1;
        if self.fail_writes {
            return Err(StorageError::Unavailable("writes disabled".into()));
        }
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(StorageError::Unavailable("injected failure".into()));
        }
        Ok(())
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_write()?;
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.check_write()?;
        self.values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let mut store = MemoryStore::new();
        assert!(store.get("k").unwrap().is_none());
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
    }

    #[test]
    fn injected_failures_leave_value_untouched() {
        let mut store = MemoryStore::new();
        store.set("k", "old").unwrap();
        store.fail_next_writes(1);
        assert!(store.set("k", "new").is_err());
        assert_eq!(store.raw("k"), Some("old"));
        store.set("k", "new").unwrap();
        assert_eq!(store.raw("k"), Some("new"));
        assert_eq!(store.write_attempts(), 3);
    }
}
