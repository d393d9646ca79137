//! Interning cache.
//!
//! Maps each distinct key to exactly one shared, immutable instance. The
//! first request for a key runs the caller's factory; every later request
//! gets the same `Arc`. Entries are never removed.
//!
//! # Concurrency
//!
//! The map lock is only held long enough to find or insert the key's slot.
//! Each slot is a [`OnceCell`], so the factory runs outside the map lock and
//! racing callers for the same fresh key block on that one slot: exactly one
//! factory call succeeds and every caller observes its result. A failing
//! factory leaves the slot empty, so the key can be retried.
//!
//! A factory must not request its own key from the same cache; that call
//! would wait on the slot it is initializing.

use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::OnceCell;

use crate::stats::{CacheStats, StatsCounters};

/// One key's lazily initialized instance.
type Slot<V> = Arc<OnceCell<Arc<V>>>;

/// Configuration for the interning cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Label used in log events.
    pub name: String,
    /// Capacity hint for the key map.
    pub initial_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            name: "intern".to_string(),
            initial_capacity: 16,
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log label.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the capacity hint.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}

/// Keyed registry of canonical shared instances.
pub struct InternCache<K, V> {
    slots: RwLock<HashMap<K, Slot<V>>>,
    stats: StatsCounters,
    config: CacheConfig,
}

impl<K, V> Default for InternCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> InternCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
{
    /// Create an empty cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Create an empty cache.
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            slots: RwLock::new(HashMap::with_capacity(config.initial_capacity)),
            stats: StatsCounters::default(),
            config,
        }
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Return the canonical instance for `key`, creating it with `factory`
    /// on first request.
    ///
    /// The factory runs at most once per successful materialization. Its
    /// error is returned unchanged and leaves no entry behind.
    pub fn get_or_create<F, E>(&self, key: K, factory: F) -> Result<Arc<V>, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        if let Some(instance) = self.get(&key) {
            self.stats.hit();
            tracing::trace!(cache = %self.config.name, key = ?key, "shared instance hit");
            return Ok(instance);
        }

        let slot = self.slot_for(&key);
        let mut created = false;
        let result = slot
            .get_or_try_init(|| {
                let value = factory(&key)?;
                created = true;
                // Counted before publication so `len()` never lags a visible instance.
                self.stats.miss();
                Ok(Arc::new(value))
            })
            .map(Arc::clone);

        match &result {
            Ok(_) if created => {
                tracing::debug!(
                    cache = %self.config.name,
                    key = ?key,
                    entries = self.stats.entries(),
                    "created new shared instance"
                );
            }
            // Lost the race to another caller's factory.
            Ok(_) => self.stats.hit(),
            Err(_) => {
                self.stats.failure();
                self.release_empty_slot(&key, &slot);
                tracing::debug!(cache = %self.config.name, key = ?key, "factory failed");
            }
        }
        result
    }

    /// Infallible form of [`get_or_create`](Self::get_or_create).
    pub fn get_or_insert_with<F>(&self, key: K, factory: F) -> Arc<V>
    where
        F: FnOnce(&K) -> V,
    {
        match self.get_or_create::<_, Infallible>(key, |k| Ok(factory(k))) {
            Ok(instance) => instance,
            Err(never) => match never {},
        }
    }

    /// Look up an already materialized instance without creating one.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.get(key).and_then(|slot| slot.get().cloned())
    }

    /// Whether `key` has a materialized instance.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Number of distinct materialized keys. Never decreases.
    pub fn len(&self) -> usize {
        self.stats.entries() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the materialized keys, in no particular order.
    pub fn keys(&self) -> Vec<K> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots
            .iter()
            .filter(|(_, slot)| slot.get().is_some())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    fn slot_for(&self, key: &K) -> Slot<V> {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(key.clone()).or_default())
    }

    /// Drop the slot of a failed key unless another caller still holds it.
    ///
    /// Handles are only cloned under the write lock, so a strong count of two
    /// (the map plus `slot`) means no waiter can initialize it later.
    fn release_empty_slot(&self, key: &K, slot: &Slot<V>) {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        let unused = slots
            .get(key)
            .is_some_and(|held| Arc::ptr_eq(held, slot) && held.get().is_none())
            && Arc::strong_count(slot) == 2;
        if unused {
            slots.remove(key);
        }
    }
}

impl<K, V> Debug for InternCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InternCache")
            .field("name", &self.config.name)
            .field("entries", &self.stats.entries())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_same_key_returns_same_instance() {
        let cache: InternCache<String, String> = InternCache::new();
        let calls = AtomicUsize::new(0);
        let make = |k: &String| {
            calls.fetch_add(1, Ordering::SeqCst);
            k.to_uppercase()
        };

        let a = cache.get_or_insert_with("karak".to_string(), make);
        let b = cache.get_or_insert_with("karak".to_string(), make);

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*a, "KARAK");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_keys_grow_size() {
        let cache: InternCache<&'static str, usize> = InternCache::new();
        assert!(cache.is_empty());

        cache.get_or_insert_with("karak", |k| k.len());
        cache.get_or_insert_with("jasmine", |k| k.len());
        cache.get_or_insert_with("karak", |k| k.len());

        assert_eq!(cache.len(), 2);
        let mut keys = cache.keys();
        keys.sort();
        assert_eq!(keys, vec!["jasmine", "karak"]);
    }

    #[test]
    fn test_failed_factory_leaves_no_entry_and_can_retry() {
        let cache: InternCache<&'static str, u32> = InternCache::new();

        let err = cache
            .get_or_create("karak", |_| Err::<u32, _>("broken"))
            .unwrap_err();
        assert_eq!(err, "broken");
        assert!(!cache.contains_key(&"karak"));
        assert_eq!(cache.len(), 0);
        assert!(cache.keys().is_empty());

        let value = cache
            .get_or_create::<_, &str>("karak", |_| Ok(7))
            .unwrap();
        assert_eq!(*value, 7);
        assert_eq!(cache.len(), 1);

        let stats = cache.stats();
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_failed_keys_leave_no_slots() {
        let cache: InternCache<u32, u32> = InternCache::new();

        for key in 0..1_000u32 {
            assert!(cache.get_or_create(key, |_| Err::<u32, _>("bad")).is_err());
        }

        assert_eq!(cache.len(), 0);
        assert_eq!(cache.stats().failures, 1_000);
        assert!(cache.slots.read().unwrap().is_empty());

        cache.get_or_insert_with(7, |k| k * 2);
        assert_eq!(cache.slots.read().unwrap().len(), 1);
    }

    #[test]
    fn test_hit_does_not_invoke_factory() {
        let cache: InternCache<u8, u8> = InternCache::new();
        cache.get_or_insert_with(1, |k| *k);

        let result = cache.get_or_create::<_, ()>(1, |_| panic!("factory must not run on a hit"));
        assert_eq!(*result.unwrap(), 1);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_get_does_not_create() {
        let cache: InternCache<u8, u8> = InternCache::new();
        assert!(cache.get(&3).is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_cache_config_builder() {
        let config = CacheConfig::new()
            .with_name("tea")
            .with_initial_capacity(4);
        assert_eq!(config.name, "tea");
        assert_eq!(config.initial_capacity, 4);

        let cache: InternCache<u8, u8> = InternCache::with_config(config);
        assert_eq!(cache.config().name, "tea");
    }
}
