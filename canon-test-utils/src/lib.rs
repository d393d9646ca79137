//! CANON Test Utilities
//!
//! Centralized test infrastructure for the CANON workspace:
//! - Counting and failing factories for sharing assertions
//! - Proptest generators for keys and request streams
//! - Small fixtures shared by property tests

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

pub use canon_core::{CanonError, CanonResult, InternError};

// ============================================================================
// FACTORIES
// ============================================================================

/// Counts factory invocations, in total and per key.
///
/// Clones share the same counters, so a wrapped factory can be moved into a
/// cache or ledger while the test keeps a handle for assertions.
#[derive(Debug, Clone, Default)]
pub struct CountingFactory {
    calls: Arc<AtomicUsize>,
    per_key: Arc<Mutex<HashMap<String, usize>>>,
}

impl CountingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap `build` so every invocation is counted.
    pub fn wrap<K, V, F>(&self, build: F) -> impl Fn(&K) -> V + Send + Sync + Clone + 'static
    where
        K: Debug + 'static,
        V: 'static,
        F: Fn(&K) -> V + Send + Sync + Clone + 'static,
    {
        let counter = self.clone();
        move |key: &K| {
            counter.bump(format!("{:?}", key));
            build(key)
        }
    }

    /// Total invocations across all keys.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Invocations for one key, matched by its `Debug` rendering.
    pub fn calls_for<K: Debug>(&self, key: &K) -> usize {
        self.per_key
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&format!("{:?}", key))
            .copied()
            .unwrap_or(0)
    }

    fn bump(&self, key: String) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .per_key
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_insert(0) += 1;
    }
}

/// Fails the first `failures` invocations with [`InternError::FactoryFailed`].
#[derive(Debug, Clone)]
pub struct FailingFactory {
    remaining: Arc<AtomicUsize>,
}

impl FailingFactory {
    pub fn new(failures: usize) -> Self {
        Self {
            remaining: Arc::new(AtomicUsize::new(failures)),
        }
    }

    /// Wrap `build`, failing while the failure budget lasts.
    pub fn wrap<K, V, F>(
        &self,
        build: F,
    ) -> impl Fn(&K) -> CanonResult<V> + Send + Sync + Clone + 'static
    where
        K: Debug + 'static,
        V: 'static,
        F: Fn(&K) -> V + Send + Sync + Clone + 'static,
    {
        let remaining = Arc::clone(&self.remaining);
        move |key: &K| {
            let failed = remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failed {
                Err(CanonError::from(InternError::FactoryFailed {
                    key: format!("{:?}", key),
                    reason: "injected failure".to_string(),
                }))
            } else {
                Ok(build(key))
            }
        }
    }

    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::SeqCst)
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

/// Number of distinct keys in `requests`.
pub fn distinct_count<S, K: Eq + std::hash::Hash>(requests: &[(S, K)]) -> usize {
    requests
        .iter()
        .map(|(_, k)| k)
        .collect::<std::collections::HashSet<_>>()
        .len()
}

// ============================================================================
// GENERATORS
// ============================================================================

pub mod generators {
    use proptest::prelude::*;

    /// Short keys over a small alphabet, so streams repeat keys often.
    pub fn arb_key() -> impl Strategy<Value = String> {
        "[a-e]{1,2}"
    }

    /// A stream of (site, key) requests.
    pub fn arb_requests(max_len: usize) -> impl Strategy<Value = Vec<(u32, String)>> {
        prop::collection::vec((1u32..50, arb_key()), 0..max_len)
    }

    /// Keys a tea shop might receive, recognized or not.
    pub fn arb_tea_key() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("karak".to_string()),
            Just("jasmine".to_string()),
            Just(" Karak ".to_string()),
            Just("JASMINE".to_string()),
            "[a-z]{1,8}",
        ]
    }
}
