//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Settings shared by compilation and retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinderConfig {
    /// Page size used when a request does not give one.
    #[serde(default = "default_per_page")]
    pub default_per_page: u32,

    /// Pattern template for substring matches. The first `?` is replaced
    /// with the lowercased search text.
    #[serde(default = "default_like_pattern")]
    pub like_pattern: String,

    /// Row count above which an in-memory method sort logs a warning.
    #[serde(default = "default_method_sort_warn_rows")]
    pub method_sort_warn_rows: usize,
}

fn default_per_page() -> u32 {
    15
}

pub(crate) fn default_like_pattern() -> String {
    "%?%".to_string()
}

fn default_method_sort_warn_rows() -> usize {
    10_000
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            default_per_page: default_per_page(),
            like_pattern: default_like_pattern(),
            method_sort_warn_rows: default_method_sort_warn_rows(),
        }
    }
}

impl FinderConfig {
    /// Builds a configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `FINDER_DEFAULT_PER_PAGE` (default: 15)
    /// - `FINDER_LIKE_PATTERN` (default: "%?%")
    /// - `FINDER_METHOD_SORT_WARN_ROWS` (default: 10000)
    ///
    /// Unparsable numbers fall back to their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            default_per_page: std::env::var("FINDER_DEFAULT_PER_PAGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_per_page),
            like_pattern: std::env::var("FINDER_LIKE_PATTERN")
                .unwrap_or_else(|_| default_like_pattern()),
            method_sort_warn_rows: std::env::var("FINDER_METHOD_SORT_WARN_ROWS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_method_sort_warn_rows),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates configuration invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_per_page == 0 {
            return Err(ConfigError::InvalidValue {
                key: "default_per_page".to_string(),
                message: "must be > 0".to_string(),
            });
        }
        if !self.like_pattern.contains('?') {
            return Err(ConfigError::InvalidValue {
                key: "like_pattern".to_string(),
                message: "must contain a '?' placeholder".to_string(),
            });
        }
        Ok(())
    }
}
