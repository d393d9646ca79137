//! Error types for CANON operations

use thiserror::Error;

/// Interning errors.
///
/// Raised while resolving a key to its canonical shared instance. Neither
/// variant leaves an entry behind in the cache.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InternError {
    #[error("Unknown key: {key}")]
    UnknownKey { key: String },

    #[error("Factory failed for key {key}: {reason}")]
    FactoryFailed { key: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or CANON_TEASHOP_CONFIG)")]
    MissingConfigPath,

    #[error("Failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to parse config TOML: {reason}")]
    Parse { reason: String },

    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Master error type for all CANON errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CanonError {
    #[error("Intern error: {0}")]
    Intern(#[from] InternError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl CanonError {
    /// True when the error came from an unrecognized key under a strict policy.
    pub fn is_unknown_key(&self) -> bool {
        matches!(self, CanonError::Intern(InternError::UnknownKey { .. }))
    }
}

/// Result type alias for CANON operations.
pub type CanonResult<T> = Result<T, CanonError>;

// =============================================================================
// TESTS
// =============================================================================
