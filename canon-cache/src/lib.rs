//! CANON Cache - Interning Cache and Usage Ledger
//!
//! A canonicalization cache: each distinct key is materialized at most once
//! and every request for it shares the same immutable instance. Entries are
//! never evicted; the key set only grows.
//!
//! # Example
//!
//! ```
//! use canon_cache::InternCache;
//! use std::sync::Arc;
//!
//! let cache: InternCache<&str, String> = InternCache::new();
//! let a = cache.get_or_insert_with("karak", |k| k.to_uppercase());
//! let b = cache.get_or_insert_with("karak", |_| unreachable!());
//! assert!(Arc::ptr_eq(&a, &b));
//! assert_eq!(cache.len(), 1);
//! ```

pub mod intern;
pub mod ledger;
pub mod stats;

pub use intern::{CacheConfig, InternCache};
pub use ledger::{UsageLedger, UsageRecord, UsageReport};
pub use stats::CacheStats;
