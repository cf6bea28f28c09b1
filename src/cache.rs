//! In-memory cache for parsed query responses.
//!
//! The HTTP layer already has a disk cache driven by cache headers; this one
//! sits above it and stores fully parsed JSON keyed by the request URL, so
//! repeated `search`/`suggest`/`languages` calls never touch the transport.
//! Cleared wholesale when the client switches site or language.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: Mutex<HashMap<String, Value>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached response by its full request URL.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries
            .lock()
            .ok()
            .and_then(|map| map.get(key).cloned())
    }

    pub fn insert(&self, key: String, value: Value) {
        if let Ok(mut map) = self.entries.lock() {
            map.insert(key, value);
        }
    }

    /// Drop every cached response.
    pub fn clear(&self) {
        if let Ok(mut map) = self.entries.lock() {
            map.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_get_clear() {
        let cache = QueryCache::new();
        assert!(cache.is_empty());

        cache.insert("a?x=1".into(), json!({"query": {"search": []}}));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a?x=1"), Some(json!({"query": {"search": []}})));
        assert_eq!(cache.get("a?x=2"), None);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get("a?x=1"), None);
    }

    #[test]
    fn same_key_overwrites() {
        let cache = QueryCache::new();
        cache.insert("k".into(), json!(1));
        cache.insert("k".into(), json!(2));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k"), Some(json!(2)));
    }
}
