//! In-memory cache for arbitrary callback data.
//!
//! Inline keyboards can only carry short strings in their buttons. When a bot
//! enables arbitrary callback data, the real payloads are kept here under a
//! generated keyboard id, and each incoming callback query is linked to the
//! keyboard it came from.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::trace;
use uuid::Uuid;

use crate::foundation::{CallbackDataError, CallbackQuery};

#[derive(Debug, Default)]
struct CacheState {
    /// keyboard id -> (button id -> payload)
    keyboards: HashMap<String, HashMap<String, Value>>,
    /// callback query id -> keyboard id
    queries: HashMap<String, String>,
}

/// Cache of callback-data payloads, keyed by keyboard and callback query.
#[derive(Debug, Default)]
pub struct CallbackDataCache {
    state: Mutex<CacheState>,
}

impl CallbackDataCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the payloads of one keyboard and returns its generated id.
    pub fn put_keyboard(&self, buttons: HashMap<String, Value>) -> String {
        let keyboard_id = Uuid::new_v4().simple().to_string();
        self.state
            .lock()
            .keyboards
            .insert(keyboard_id.clone(), buttons);
        keyboard_id
    }

    /// Links a callback query to the keyboard it was sent from.
    pub fn register_query(&self, query_id: impl Into<String>, keyboard_id: impl Into<String>) {
        self.state
            .lock()
            .queries
            .insert(query_id.into(), keyboard_id.into());
    }

    /// Looks up the payload of one button.
    pub fn resolve(&self, keyboard_id: &str, button_id: &str) -> Option<Value> {
        self.state
            .lock()
            .keyboards
            .get(keyboard_id)
            .and_then(|buttons| buttons.get(button_id))
            .cloned()
    }

    /// Returns `true` if the callback query id is known.
    pub fn contains_query(&self, query_id: &str) -> bool {
        self.state.lock().queries.contains_key(query_id)
    }

    /// Returns `true` if the keyboard id is known.
    pub fn contains_keyboard(&self, keyboard_id: &str) -> bool {
        self.state.lock().keyboards.contains_key(keyboard_id)
    }

    /// Drops the cached data for `callback_query`.
    ///
    /// Fails only when the query id itself is unknown. A query whose keyboard
    /// payloads were already dropped is not an error.
    pub fn drop_data(&self, callback_query: &CallbackQuery) -> Result<(), CallbackDataError> {
        let mut state = self.state.lock();
        let keyboard_id = state
            .queries
            .remove(&callback_query.id)
            .ok_or_else(|| CallbackDataError::QueryNotFound(callback_query.id.clone()))?;

        if state.keyboards.remove(&keyboard_id).is_none() {
            trace!(keyboard_id = %keyboard_id, "Keyboard data already gone");
        }
        Ok(())
    }

    /// Removes everything from the cache.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.keyboards.clear();
        state.queries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::User;
    use serde_json::json;

    fn query(id: &str) -> CallbackQuery {
        CallbackQuery {
            id: id.to_string(),
            from: User {
                id: 1,
                is_bot: false,
                first_name: "A".into(),
                username: None,
            },
            message: None,
            data: None,
        }
    }

    #[test]
    fn test_drop_data_removes_query_and_keyboard() {
        let cache = CallbackDataCache::new();
        let kb = cache.put_keyboard(HashMap::from([("b1".to_string(), json!({"n": 1}))]));
        cache.register_query("q1", &kb);
        assert_eq!(cache.resolve(&kb, "b1"), Some(json!({"n": 1})));

        cache.drop_data(&query("q1")).unwrap();

        assert!(!cache.contains_query("q1"));
        assert!(!cache.contains_keyboard(&kb));
    }

    #[test]
    fn test_drop_data_unknown_query() {
        let cache = CallbackDataCache::new();
        let err = cache.drop_data(&query("missing")).unwrap_err();
        assert_eq!(err, CallbackDataError::QueryNotFound("missing".into()));
    }

    #[test]
    fn test_drop_data_missing_keyboard_is_ok() {
        let cache = CallbackDataCache::new();
        cache.register_query("q2", "gone");
        assert!(cache.drop_data(&query("q2")).is_ok());
    }
}
