use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::sync::Cache;
use moka::Expiry;
use serde_json::Value;
use tracing::debug;

use crate::errors::ServiceError;

/// Key/value cache over JSON values with optional per-entry TTL.
pub trait SimpleCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    /// Store `value`; `ttl` of `None` falls back to the backend default.
    fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<(), ServiceError>;
    /// Returns whether the key existed.
    fn delete(&self, key: &str) -> bool;
    fn clear(&self);

    fn has(&self, key: &str) -> bool { self.get(key).is_some() }
}

pub type SharedCache = Arc<dyn SimpleCache>;

const RESERVED: &[char] = &['{', '}', '(', ')', '/', '\\', '@', ':'];

fn validate_key(key: &str) -> Result<(), ServiceError> {
    if key.is_empty() {
        return Err(ServiceError::Cache("cache key must not be empty".into()));
    }
    if let Some(c) = key.chars().find(|c| RESERVED.contains(c)) {
        return Err(ServiceError::Cache(format!("cache key {key:?} contains reserved character {c:?}")));
    }
    Ok(())
}

#[derive(Clone)]
struct Entry {
    value: Value,
    ttl: Option<Duration>,
}

struct EntryExpiry {
    default_ttl: Option<Duration>,
}

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        value.ttl.or(self.default_ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl.or(self.default_ttl)
    }
}

/// In-process cache backed by `moka`.
pub struct MemoryCache {
    inner: Cache<String, Entry>,
}

impl MemoryCache {
    pub fn new(max_capacity: u64, default_ttl: Option<Duration>) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryExpiry { default_ttl })
            .build();
        Self { inner }
    }
}

impl SimpleCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        self.inner.get(key).map(|e| e.value)
    }

    fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<(), ServiceError> {
        validate_key(key)?;
        if ttl == Some(Duration::ZERO) {
            // zero TTL means "expire now"
            self.inner.invalidate(key);
            return Ok(());
        }
        debug!(%key, ?ttl, "cache set");
        self.inner.insert(key.to_string(), Entry { value, ttl });
        Ok(())
    }

    fn delete(&self, key: &str) -> bool {
        self.inner.remove(key).is_some()
    }

    fn clear(&self) {
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_get_delete() {
        let cache = MemoryCache::new(100, None);
        cache.set("question_7", json!({"title": "why"}), None).unwrap();
        assert!(cache.has("question_7"));
        assert_eq!(cache.get("question_7"), Some(json!({"title": "why"})));
        assert!(cache.delete("question_7"));
        assert!(!cache.delete("question_7"));
        assert_eq!(cache.get("question_7"), None);
    }

    #[test]
    fn entry_expires_after_ttl() {
        let cache = MemoryCache::new(100, None);
        cache.set("throttle_1", json!(3), Some(Duration::from_millis(50))).unwrap();
        assert!(cache.has("throttle_1"));
        std::thread::sleep(Duration::from_millis(150));
        assert!(!cache.has("throttle_1"));
    }

    #[test]
    fn zero_ttl_removes_entry() {
        let cache = MemoryCache::new(100, None);
        cache.set("k", json!(1), None).unwrap();
        cache.set("k", json!(2), Some(Duration::ZERO)).unwrap();
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn reserved_characters_are_rejected() {
        let cache = MemoryCache::new(100, None);
        assert!(cache.set("", json!(1), None).is_err());
        assert!(cache.set("user:1", json!(1), None).is_err());
        assert!(cache.set("a/b", json!(1), None).is_err());
    }

    #[test]
    fn clear_drops_everything() {
        let cache = MemoryCache::new(100, None);
        cache.set("a", json!(1), None).unwrap();
        cache.set("b", json!(2), None).unwrap();
        cache.clear();
        assert!(!cache.has("a"));
        assert!(!cache.has("b"));
    }
}
