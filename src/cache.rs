//! URL-keyed result cache with TTL expiry and LRU eviction.
//!
//! The application creates one cache per kind of result and hands it to the
//! components that need it; nothing here is global and nothing is persisted.

use crate::config::CacheConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Cache shared between a component and whoever created it.
pub type SharedCache<V> = Arc<Mutex<TtlCache<V>>>;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    created_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

#[derive(Debug)]
pub struct TtlCache<V> {
    config: CacheConfig,
    entries: HashMap<String, CacheEntry<V>>,
    access_order: Vec<String>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(config: CacheConfig) -> Self {
        tracing::debug!(
            ttl_secs = config.ttl_secs,
            max_entries = config.max_entries,
            enabled = config.enabled,
            "Creating media cache"
        );
        Self {
            config,
            entries: HashMap::new(),
            access_order: Vec::new(),
        }
    }

    pub fn shared(config: CacheConfig) -> SharedCache<V> {
        Arc::new(Mutex::new(Self::new(config)))
    }

    pub fn insert(&mut self, key: &str, value: V) {
        if !self.config.enabled || self.config.max_entries == 0 {
            return;
        }

        if self.entries.len() >= self.config.max_entries && !self.entries.contains_key(key) {
            self.evict_lru();
        }

        self.touch(key);
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                created_at: Instant::now(),
                ttl: Duration::from_secs(self.config.ttl_secs),
            },
        );
    }

    /// Cloned value for `key`, dropping it first if it has expired.
    pub fn get(&mut self, key: &str) -> Option<V> {
        if !self.config.enabled {
            return None;
        }

        if self.entries.get(key)?.is_expired() {
            tracing::debug!(key, "Cache entry expired");
            self.remove(key);
            return None;
        }

        self.touch(key);
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        self.access_order.retain(|k| k != key);
    }

    pub fn cleanup_expired(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let entries = &self.entries;
        self.access_order.retain(|k| entries.contains_key(k));

        let removed = before - self.entries.len();
        if removed > 0 {
            tracing::info!(removed, remaining = self.entries.len(), "Cleaned up expired cache entries");
        }
        removed
    }

    pub fn clear(&mut self) {
        let count = self.entries.len();
        self.entries.clear();
        self.access_order.clear();
        tracing::info!(cleared = count, "Cleared cache");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn touch(&mut self, key: &str) {
        self.access_order.retain(|k| k != key);
        self.access_order.push(key.to_string());
    }

    fn evict_lru(&mut self) {
        if self.access_order.is_empty() {
            return;
        }
        let key = self.access_order.remove(0);
        tracing::debug!(key = %key, "Evicting least recently used entry");
        self.entries.remove(&key);
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(ttl_secs: u64, max_entries: usize) -> CacheConfig {
        CacheConfig {
            enabled: true,
            ttl_secs,
            max_entries,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let mut cache = TtlCache::new(config(60, 10));
        cache.insert("a", 1);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expired_entry_not_returned() {
        let mut cache = TtlCache::new(config(0, 10));
        cache.insert("a", 1);
        assert_eq!(cache.get("a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = TtlCache::new(config(60, 2));
        cache.insert("a", 1);
        cache.insert("b", 2);
        // refresh "a" so "b" becomes the oldest
        assert_eq!(cache.get("a"), Some(1));
        cache.insert("c", 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn test_disabled_cache_stores_nothing() {
        let mut cache = TtlCache::new(CacheConfig {
            enabled: false,
            ..config(60, 10)
        });
        cache.insert("a", 1);
        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_cleanup_and_clear() {
        let mut cache = TtlCache::new(config(0, 10));
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.cleanup_expired(), 2);

        let mut cache = TtlCache::new(config(60, 10));
        cache.insert("a", 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
