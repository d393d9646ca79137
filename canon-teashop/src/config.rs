//! Configuration loading for the tea shop.
//!
//! Every field has a default, so the shop runs without a config file. A file
//! is read from `--config <path>` or `CANON_TEASHOP_CONFIG` when given.

use std::path::{Path, PathBuf};

use canon_core::{CanonError, CanonResult, ConfigError, UnknownKeyPolicy};
use serde::{Deserialize, Serialize};

use crate::tea::TeaVariety;

pub const CONFIG_ENV_VAR: &str = "CANON_TEASHOP_CONFIG";

/// Upper bound for `initial_capacity`; the hint is allocated eagerly.
pub const MAX_INITIAL_CAPACITY: usize = 1 << 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShopConfig {
    /// What to do with an order for a tea that is not on the menu.
    pub unknown_key_policy: UnknownKeyPolicy,
    /// Capacity hint for the tea cache.
    pub initial_capacity: usize,
    /// Recognized tea keys.
    pub menu: Vec<String>,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// `EnvFilter` directives; `RUST_LOG` takes precedence.
    pub filter: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            unknown_key_policy: UnknownKeyPolicy::Reject,
            initial_capacity: 16,
            menu: TeaVariety::ALL
                .iter()
                .map(|v| v.as_key().to_string())
                .collect(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            filter: "canon_teashop=info,canon_cache=info,warn".to_string(),
        }
    }
}

impl ShopConfig {
    /// Load from the path given on the command line or in the environment,
    /// or fall back to defaults when neither is set.
    pub fn load() -> CanonResult<Self> {
        let config = match config_path_from_args()? {
            Some(path) => Self::from_path(&path)?,
            None => match config_path_from_env() {
                Some(path) => Self::from_path(&path)?,
                None => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> CanonResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(source: &str) -> CanonResult<Self> {
        toml::from_str(source).map_err(|e| {
            ConfigError::Parse {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Recognized varieties, parsed from `menu`.
    pub fn menu_varieties(&self) -> CanonResult<Vec<TeaVariety>> {
        self.menu
            .iter()
            .map(|key| {
                key.parse::<TeaVariety>()
                    .map_err(|_| invalid("menu", &format!("unknown tea '{}'", key)))
            })
            .collect()
    }

    pub fn validate(&self) -> CanonResult<()> {
        if self.initial_capacity == 0 {
            return Err(invalid("initial_capacity", "must be > 0"));
        }
        if self.initial_capacity > MAX_INITIAL_CAPACITY {
            return Err(invalid(
                "initial_capacity",
                &format!("must be <= {}", MAX_INITIAL_CAPACITY),
            ));
        }
        if self.menu.is_empty() {
            return Err(invalid("menu", "must list at least one tea"));
        }
        let menu = self.menu_varieties()?;
        if let Some(fallback) = self.unknown_key_policy.fallback_key() {
            let on_menu = fallback
                .parse::<TeaVariety>()
                .map(|v| menu.contains(&v))
                .unwrap_or(false);
            if !on_menu {
                return Err(invalid(
                    "unknown_key_policy.fallback",
                    &format!("'{}' is not on the menu", fallback),
                ));
            }
        }
        if self.logging.filter.trim().is_empty() {
            return Err(invalid("logging.filter", "must not be empty"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> CanonError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from)
}

fn config_path_from_args() -> CanonResult<Option<PathBuf>> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args
                .next()
                .map(|p| Some(PathBuf::from(p)))
                .ok_or_else(|| ConfigError::MissingConfigPath.into());
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = ShopConfig::default();
        config.validate().unwrap();
        assert_eq!(config.unknown_key_policy, UnknownKeyPolicy::Reject);
        assert_eq!(config.menu, vec!["karak", "jasmine"]);
    }

    #[test]
    fn test_parse_full_config() {
        let config = ShopConfig::from_toml_str(
            r#"
            unknown_key_policy = { fallback = "karak" }
            initial_capacity = 4
            menu = ["karak", "jasmine"]

            [logging]
            format = "json"
            filter = "canon_teashop=debug"
            "#,
        )
        .unwrap();
        config.validate().unwrap();
        assert_eq!(
            config.unknown_key_policy,
            UnknownKeyPolicy::Fallback("karak".to_string())
        );
        assert_eq!(config.initial_capacity, 4);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = ShopConfig::from_toml_str("initial_capacity = 8").unwrap();
        assert_eq!(config.initial_capacity, 8);
        assert_eq!(config.menu, ShopConfig::default().menu);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = ShopConfig::from_toml_str("eviction = true").unwrap_err();
        assert!(matches!(
            err,
            CanonError::Config(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = ShopConfig {
            initial_capacity: 0,
            ..Default::default()
        };
        let msg = config.validate().unwrap_err().to_string();
        assert!(msg.contains("initial_capacity"));
    }

    #[test]
    fn test_validate_rejects_oversized_capacity() {
        let config = ShopConfig {
            initial_capacity: MAX_INITIAL_CAPACITY + 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_menu_item() {
        let config = ShopConfig {
            menu: vec!["karak".to_string(), "oolong".to_string()],
            ..Default::default()
        };
        let msg = config.validate().unwrap_err().to_string();
        assert!(msg.contains("oolong"));
    }

    #[test]
    fn test_validate_rejects_fallback_off_menu() {
        let config = ShopConfig {
            menu: vec!["jasmine".to_string()],
            unknown_key_policy: UnknownKeyPolicy::Fallback("karak".to_string()),
            ..Default::default()
        };
        let msg = config.validate().unwrap_err().to_string();
        assert!(msg.contains("unknown_key_policy.fallback"));
    }

    #[test]
    fn test_from_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"unknown_key_policy = "reject""#).unwrap();
        writeln!(file, "initial_capacity = 2").unwrap();

        let config = ShopConfig::from_path(file.path()).unwrap();
        assert_eq!(config.initial_capacity, 2);
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = ShopConfig::from_path(Path::new("/nonexistent/teashop.toml")).unwrap_err();
        assert!(matches!(
            err,
            CanonError::Config(ConfigError::Read { .. })
        ));
    }
}
