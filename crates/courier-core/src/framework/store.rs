//! Keyed data stores.
//!
//! A dispatcher keeps one [`SharedData`] per chat id, one per user id, and a
//! single global entry. Contexts hold clones of the same `Arc`, so writes
//! through any context are visible to every later context for that id.
//!
//! Each entry carries its own lock. Two events for the same chat running on
//! different tasks serialize on that entry only; the store map itself is
//! locked just long enough to look up or insert an entry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

/// A shared, lockable data entry.
pub type SharedData<T> = Arc<RwLock<T>>;

/// The default data shape: a string-keyed JSON map.
pub type DataMap = HashMap<String, Value>;

/// Wraps a value into a fresh [`SharedData`].
pub fn shared<T>(value: T) -> SharedData<T> {
    Arc::new(RwLock::new(value))
}

/// A map from chat or user id to that id's data entry.
pub struct KeyedStore<T> {
    entries: RwLock<HashMap<i64, SharedData<T>>>,
}

impl<T> KeyedStore<T> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the entry for `id`, if present.
    pub fn get(&self, id: i64) -> Option<SharedData<T>> {
        self.entries.read().get(&id).cloned()
    }

    /// Returns the entry for `id`, creating it with `T::default()` if absent.
    pub fn get_or_default(&self, id: i64) -> SharedData<T>
    where
        T: Default,
    {
        if let Some(entry) = self.get(id) {
            return entry;
        }
        self.entries
            .write()
            .entry(id)
            .or_insert_with(|| shared(T::default()))
            .clone()
    }

    /// Replaces the entry for `id`, e.g. when restoring from persistence.
    pub fn insert(&self, id: i64, value: T) -> SharedData<T> {
        let entry = shared(value);
        self.entries.write().insert(id, Arc::clone(&entry));
        entry
    }

    /// Removes the entry for `id`. Contexts already holding it keep their clone.
    pub fn remove(&self, id: i64) -> Option<SharedData<T>> {
        self.entries.write().remove(&id)
    }

    /// Returns `true` if an entry exists for `id`.
    pub fn contains(&self, id: i64) -> bool {
        self.entries.read().contains_key(&id)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns the ids currently present.
    pub fn ids(&self) -> Vec<i64> {
        self.entries.read().keys().copied().collect()
    }
}

impl<T> Default for KeyedStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for KeyedStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedStore")
            .field("len", &self.len())
            .finish()
    }
}

/// The three stores a dispatcher owns: per-chat, per-user and global.
///
/// Dispatcher implementations can embed this and forward the
/// [`Dispatcher`](crate::Dispatcher) data methods to it.
#[derive(Debug)]
pub struct DataStores<UD, CD, BD> {
    pub chat_data: KeyedStore<CD>,
    pub user_data: KeyedStore<UD>,
    pub bot_data: SharedData<BD>,
}

impl<UD, CD, BD: Default> DataStores<UD, CD, BD> {
    /// Creates empty stores with a default global entry.
    pub fn new() -> Self {
        Self {
            chat_data: KeyedStore::new(),
            user_data: KeyedStore::new(),
            bot_data: shared(BD::default()),
        }
    }
}

impl<UD, CD, BD: Default> Default for DataStores<UD, CD, BD> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_or_default_returns_same_entry() {
        let store: KeyedStore<DataMap> = KeyedStore::new();
        let a = store.get_or_default(1);
        let b = store.get_or_default(1);

        assert!(Arc::ptr_eq(&a, &b));
        a.write().insert("k".into(), json!(1));
        assert_eq!(b.read().get("k"), Some(&json!(1)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_does_not_create() {
        let store: KeyedStore<DataMap> = KeyedStore::new();
        assert!(store.get(5).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_keeps_outstanding_clone() {
        let store: KeyedStore<DataMap> = KeyedStore::new();
        let held = store.get_or_default(3);
        held.write().insert("x".into(), json!("y"));

        let removed = store.remove(3).unwrap();
        assert!(Arc::ptr_eq(&held, &removed));
        assert!(!store.contains(3));
        assert_eq!(held.read().get("x"), Some(&json!("y")));
    }
}
