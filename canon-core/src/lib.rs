//! CANON Core - Shared Types
//!
//! Error taxonomy, unknown-key policy, and the rendering contract that
//! shared instances implement. All other crates depend on this.
//! This crate contains no cache logic.

pub mod error;
pub mod policy;

pub use error::{CanonError, CanonResult, ConfigError, InternError};
pub use policy::{Resolution, UnknownKeyPolicy};

/// Arrival index of a request in a usage ledger, starting at 0.
pub type Sequence = u64;

// ============================================================================
// FLYWEIGHT CONTRACT
// ============================================================================

/// A shared, immutable instance that renders per-use output.
///
/// Use-site data `S` is always passed in and never stored; `render` takes
/// `&self`, so an instance handed out by the cache cannot be changed by any
/// caller. Implementations must be `Send + Sync` so one instance can be read
/// from any number of threads.
pub trait Flyweight<S>: Send + Sync {
    /// Result of rendering the instance at one use site.
    type Output;

    /// Render this instance for `site`.
    fn render(&self, site: &S) -> Self::Output;
}
