//! Key-value storage capability behind the session store.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;

use crate::db::{DbError, DbResult};

/// Durable string storage.
///
/// Implemented by [`crate::db::Database`] for on-device persistence and by
/// [`MemoryStore`] for tests and ephemeral sessions.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> DbResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> DbResult<()>;

    /// Remove every key. Must not leave a partially cleared store behind.
    fn clear(&self) -> DbResult<()>;

    /// Clear, then write `entries`.
    fn replace_all(&self, entries: &[(&str, &str)]) -> DbResult<()> {
        self.clear()?;
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

/// Non-persistent store backed by a map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    fields: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> DbResult<Ref<'_, BTreeMap<String, String>>> {
        self.fields
            .try_borrow()
            .map_err(|e| DbError::Unavailable(e.to_string()))
    }

    fn write(&self) -> DbResult<RefMut<'_, BTreeMap<String, String>>> {
        self.fields
            .try_borrow_mut()
            .map_err(|e| DbError::Unavailable(e.to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self.read()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> DbResult<()> {
        self.write()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self) -> DbResult<()> {
        self.write()?.clear();
        Ok(())
    }

    fn replace_all(&self, entries: &[(&str, &str)]) -> DbResult<()> {
        let fresh = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        *self.write()? = fresh;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_basics() {
        let store = MemoryStore::new();
        assert_eq!(store.get("token").unwrap(), None);

        store.set("token", "abc").unwrap();
        store.set("token", "def").unwrap();
        assert_eq!(store.get("token").unwrap(), Some("def".into()));
        assert_eq!(store.fields.borrow().len(), 1);

        store.clear().unwrap();
        assert!(store.fields.borrow().is_empty());
    }

    #[test]
    fn test_memory_store_replace_all() {
        let store = MemoryStore::new();
        store.set("phone", "0600").unwrap();
        store.replace_all(&[("token", "t"), ("role", "admin")]).unwrap();

        assert_eq!(store.get("phone").unwrap(), None);
        assert_eq!(store.get("role").unwrap(), Some("admin".into()));
        assert_eq!(store.fields.borrow().len(), 2);
    }

    #[test]
    fn test_memory_store_reentrant_write_is_unavailable() {
        let store = MemoryStore::new();
        store.set("token", "abc").unwrap();

        let _held = store.fields.borrow();
        assert!(matches!(store.set("token", "def"), Err(DbError::Unavailable(_))));
        assert_eq!(store.get("token").unwrap(), Some("abc".into()));
    }
}
