//! Usage ledger.
//!
//! Records every request made through it, resolves the requested key to its
//! shared instance through the owned [`InternCache`], and renders that
//! instance for the request's use site. The ledger never writes use-site
//! data into a shared instance.

use std::fmt::{self, Debug, Display};
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

use canon_core::{CanonResult, Flyweight, Sequence};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::intern::InternCache;
use crate::stats::CacheStats;

type Factory<K, V> = Box<dyn Fn(&K) -> CanonResult<V> + Send + Sync>;
type Resolver<K> = Box<dyn Fn(&K) -> CanonResult<K> + Send + Sync>;

/// One request, in arrival order. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageRecord<K, S> {
    /// 0-based arrival index.
    pub sequence: Sequence,
    pub site: S,
    /// The key as requested, before any policy substitution.
    pub key: K,
    pub recorded_at: DateTime<Utc>,
}

/// Point-in-time request totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageReport {
    pub total_requests: u64,
    pub distinct_keys: usize,
}

impl Display for UsageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total requests: {}, distinct keys: {}",
            self.total_requests, self.distinct_keys
        )
    }
}

/// Request ledger in front of an interning cache.
///
/// The factory is bound once at construction. An optional resolver maps a
/// requested key to the key that is actually interned; it is where an
/// embedding application applies its unknown-key policy.
pub struct UsageLedger<K, V, S> {
    cache: InternCache<K, V>,
    factory: Factory<K, V>,
    resolver: Option<Resolver<K>>,
    records: Mutex<Vec<UsageRecord<K, S>>>,
}

impl<K, V, S> UsageLedger<K, V, S>
where
    K: Eq + Hash + Clone + Debug,
    V: Flyweight<S>,
    S: Clone,
{
    /// Create a ledger that owns `cache` and materializes with `factory`.
    pub fn new<F>(cache: InternCache<K, V>, factory: F) -> Self
    where
        F: Fn(&K) -> CanonResult<V> + Send + Sync + 'static,
    {
        Self {
            cache,
            factory: Box::new(factory),
            resolver: None,
            records: Mutex::new(Vec::new()),
        }
    }

    /// Map each requested key through `resolver` before interning.
    pub fn with_resolver<R>(mut self, resolver: R) -> Self
    where
        R: Fn(&K) -> CanonResult<K> + Send + Sync + 'static,
    {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// Record a request for `key` at `site` and render the shared instance.
    ///
    /// The record is appended before resolution, so rejected or failed
    /// requests are still counted.
    pub fn record(&self, site: S, key: K) -> CanonResult<V::Output> {
        let sequence = self.append(site.clone(), key.clone());

        let resolved = match &self.resolver {
            Some(resolve) => resolve(&key)?,
            None => key,
        };
        let instance = self
            .cache
            .get_or_create(resolved, |k| (self.factory)(k))?;

        tracing::trace!(sequence, "rendered shared instance");
        Ok(instance.render(&site))
    }

    /// Totals consistent with some serialization of the preceding requests.
    pub fn report(&self) -> UsageReport {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        // Read under the records lock: every materialized key has its
        // record appended already, so distinct_keys <= total_requests.
        UsageReport {
            total_requests: records.len() as u64,
            distinct_keys: self.cache.len(),
        }
    }

    /// Snapshot of all records in arrival order.
    pub fn records(&self) -> Vec<UsageRecord<K, S>> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The shared instance for `key`, if it has been materialized.
    pub fn instance(&self, key: &K) -> Option<Arc<V>> {
        self.cache.get(key)
    }

    pub fn cache(&self) -> &InternCache<K, V> {
        &self.cache
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn append(&self, site: S, key: K) -> Sequence {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let sequence = records.len() as Sequence;
        records.push(UsageRecord {
            sequence,
            site,
            key,
            recorded_at: Utc::now(),
        });
        sequence
    }
}

impl<K, V, S> Debug for UsageLedger<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsageLedger")
            .field("cache", &self.cache)
            .field("has_resolver", &self.resolver.is_some())
            .finish()
    }
}
