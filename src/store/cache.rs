use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use crate::errors::Error;

use super::Cache;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory TTL cache over an LRU map. Expired entries are evicted lazily
/// on access; capacity pressure falls back to LRU eviction.
pub struct MemoryCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1))
            .unwrap_or_else(|| NonZeroUsize::new(1).expect("NonZeroUsize(1) must exist"));
        Self { entries: Mutex::new(LruCache::new(cap)) }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let mut guard = self.entries.lock();
        match guard.get(key) {
            Some(entry) if entry.is_expired() => {
                guard.pop(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), Error> {
        let entry = CacheEntry { value: value.to_string(), expires_at: Instant::now() + ttl };
        self.entries.lock().put(key.to_string(), entry);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), Error> {
        self.entries.lock().pop(key);
        Ok(())
    }

    fn has_key(&self, key: &str) -> Result<bool, Error> {
        let mut guard = self.entries.lock();
        match guard.peek(key) {
            Some(entry) if entry.is_expired() => {
                guard.pop(key);
                Ok(false)
            }
            Some(_) => Ok(true),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_delete_roundtrip() {
        let cache = MemoryCache::new(8);
        cache.set("post:1", "{}", Duration::from_secs(60)).unwrap();
        assert!(cache.has_key("post:1").unwrap());
        assert_eq!(cache.get("post:1").unwrap().as_deref(), Some("{}"));
        cache.delete("post:1").unwrap();
        assert!(!cache.has_key("post:1").unwrap());
        assert_eq!(cache.get("post:1").unwrap(), None);
    }

    #[test]
    fn expired_entries_are_evicted_on_access() {
        let cache = MemoryCache::new(8);
        cache.set("k", "v", Duration::from_secs(0)).unwrap();
        assert_eq!(cache.get("k").unwrap(), None);
        cache.set("k2", "v", Duration::from_secs(0)).unwrap();
        assert!(!cache.has_key("k2").unwrap());
    }

    #[test]
    fn capacity_falls_back_to_lru() {
        let cache = MemoryCache::new(2);
        cache.set("a", "1", Duration::from_secs(60)).unwrap();
        cache.set("b", "2", Duration::from_secs(60)).unwrap();
        cache.set("c", "3", Duration::from_secs(60)).unwrap();
        assert_eq!(cache.get("a").unwrap(), None);
        assert_eq!(cache.get("c").unwrap().as_deref(), Some("3"));
    }
}
