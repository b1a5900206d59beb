//! Index writer configuration.
//!
//! Defaults reproduce the established on-disk format; only change them for
//! a fresh deployment or a planned migration.

use crate::error::{ErrorClass, ErrorOrigin, InternalError};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error as ThisError;

/// Byte budget for string values in every string-valued table except the
/// legacy name-keyed one.
pub const DEFAULT_STRING_BYTE_BUDGET: usize = 500;

/// Byte budget for the legacy name-keyed string table.
pub const DEFAULT_LEGACY_STRING_BYTE_BUDGET: usize = 400;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0} must be greater than zero")]
    ZeroBudget(&'static str),
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorClass::Misconfigured, ErrorOrigin::Config, err.to_string())
    }
}

///
/// TruncationMode
///
/// How over-budget strings are cut when encoded to bytes.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationMode {
    /// Slice the UTF-8 bytes at exactly the budget, even mid-character.
    #[default]
    Bytes,
    /// Cut at the last character boundary at or below the budget.
    CharBoundary,
}

///
/// IndexConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// Encode short-constant indexes in-row when the backend supports it.
    pub in_row: bool,
    pub truncation: TruncationMode,
    pub string_byte_budget: usize,
    pub legacy_string_byte_budget: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            in_row: true,
            truncation: TruncationMode::Bytes,
            string_byte_budget: DEFAULT_STRING_BYTE_BUDGET,
            legacy_string_byte_budget: DEFAULT_LEGACY_STRING_BYTE_BUDGET,
        }
    }
}

impl IndexConfig {
    /// Parse config from TOML. Accepts either a bare table or one nested
    /// under `[index]`.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Wrapped {
            index: IndexConfig,
        }

        let config = match toml::from_str::<Wrapped>(source) {
            Ok(wrapped) => wrapped.index,
            Err(_) => toml::from_str::<Self>(source)?,
        };
        config.validate()?;

        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.string_byte_budget == 0 {
            return Err(ConfigError::ZeroBudget("string_byte_budget"));
        }
        if self.legacy_string_byte_budget == 0 {
            return Err(ConfigError::ZeroBudget("legacy_string_byte_budget"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_yields_defaults() {
        let config = IndexConfig::from_toml_str("").expect("defaults");
        assert_eq!(config, IndexConfig::default());
        assert_eq!(config.string_byte_budget, 500);
        assert_eq!(config.legacy_string_byte_budget, 400);
        assert!(config.in_row);
    }

    #[test]
    fn nested_index_table_is_accepted() {
        let config = IndexConfig::from_toml_str(
            "[index]\nin_row = false\ntruncation = \"char_boundary\"\n",
        )
        .expect("config");

        assert!(!config.in_row);
        assert_eq!(config.truncation, TruncationMode::CharBoundary);
    }

    #[test]
    fn bare_table_is_accepted() {
        let config = IndexConfig::from_toml_str("string_byte_budget = 64").expect("config");
        assert_eq!(config.string_byte_budget, 64);
    }

    #[test]
    fn zero_budget_is_rejected() {
        let err = IndexConfig::from_toml_str("string_byte_budget = 0").expect_err("zero");
        assert!(matches!(err, ConfigError::ZeroBudget("string_byte_budget")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = IndexConfig::from_toml_str("bogus = true").expect_err("unknown");
        assert!(matches!(err, ConfigError::Parse(_)));

        let internal = InternalError::from(err);
        assert!(internal.is_misconfigured());
    }
}
