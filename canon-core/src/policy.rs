//! Unknown-key policy.
//!
//! An embedding application decides what happens when a caller asks for a
//! key outside its recognized categories: reject it, or serve the canonical
//! instance of a designated default key. There is no implicit default.

use serde::{Deserialize, Serialize};

use crate::InternError;

/// What to do with a key the embedding domain does not recognize.
///
/// In TOML this is either `unknown_key_policy = "reject"` or
/// `unknown_key_policy = { fallback = "karak" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKeyPolicy {
    /// Fail with [`InternError::UnknownKey`].
    #[default]
    Reject,
    /// Substitute the canonical instance of this key.
    Fallback(String),
}

/// Outcome of resolving a requested key against a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The requested key is recognized and used as-is.
    Direct(&'a str),
    /// The requested key was unknown and the default key stands in for it.
    Substituted { requested: &'a str, default: &'a str },
}

impl<'a> Resolution<'a> {
    /// The key that should actually be interned.
    pub fn key(&self) -> &'a str {
        match self {
            Resolution::Direct(key) => key,
            Resolution::Substituted { default, .. } => default,
        }
    }

    pub fn is_substituted(&self) -> bool {
        matches!(self, Resolution::Substituted { .. })
    }
}

impl UnknownKeyPolicy {
    /// Resolve `key` using `is_known` as the domain's recognition test.
    ///
    /// A fallback key that is itself unknown is rejected as well, so a
    /// misconfigured default never materializes an unrelated instance.
    pub fn resolve<'a, F>(&'a self, key: &'a str, is_known: F) -> Result<Resolution<'a>, InternError>
    where
        F: Fn(&str) -> bool,
    {
        if is_known(key) {
            return Ok(Resolution::Direct(key));
        }
        match self {
            UnknownKeyPolicy::Reject => Err(InternError::UnknownKey {
                key: key.to_string(),
            }),
            UnknownKeyPolicy::Fallback(default) if is_known(default) => {
                Ok(Resolution::Substituted {
                    requested: key,
                    default: default.as_str(),
                })
            }
            UnknownKeyPolicy::Fallback(default) => Err(InternError::UnknownKey {
                key: default.clone(),
            }),
        }
    }

    /// The designated default key, if any.
    pub fn fallback_key(&self) -> Option<&str> {
        match self {
            UnknownKeyPolicy::Reject => None,
            UnknownKeyPolicy::Fallback(key) => Some(key.as_str()),
        }
    }
}
