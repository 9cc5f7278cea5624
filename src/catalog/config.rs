//! Catalog configuration
//!
//! Loaded from an optional JSON file. Every field has a default, so `{}` is
//! a valid configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::index::{
    IndexOptions, DEFAULT_GENRE_SEPARATOR, DEFAULT_HASH_SLOTS, DEFAULT_RANGE_ORDER,
    MIN_RANGE_ORDER,
};
use crate::observability::Severity;
use crate::record::{RecordValidator, DEFAULT_MAX_YEAR, DEFAULT_MIN_YEAR};

/// Configuration errors, all reported as `FOLIO_CONFIG_INVALID`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        "FOLIO_CONFIG_INVALID"
    }
}

/// Result type for configuration
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Catalog configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Hash index slot count (default 101)
    #[serde(default = "default_hash_slots")]
    pub hash_slots: usize,

    /// B+ tree order (default 4, minimum 3)
    #[serde(default = "default_range_order")]
    pub range_order: usize,

    /// Genre path separator (default '/')
    #[serde(default = "default_genre_separator")]
    pub genre_separator: char,

    /// Lowest accepted year (default -9999)
    #[serde(default = "default_min_year")]
    pub min_year: i32,

    /// Highest accepted year (default 9999)
    #[serde(default = "default_max_year")]
    pub max_year: i32,

    /// Run every structure check after each mutation (default: on in debug builds)
    #[serde(default = "default_verify_invariants")]
    pub verify_invariants: bool,

    /// Minimum log severity (default "warn")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_hash_slots() -> usize {
    DEFAULT_HASH_SLOTS
}
fn default_range_order() -> usize {
    DEFAULT_RANGE_ORDER
}
fn default_genre_separator() -> char {
    DEFAULT_GENRE_SEPARATOR
}
fn default_min_year() -> i32 {
    DEFAULT_MIN_YEAR
}
fn default_max_year() -> i32 {
    DEFAULT_MAX_YEAR
}
fn default_verify_invariants() -> bool {
    cfg!(debug_assertions)
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            hash_slots: default_hash_slots(),
            range_order: default_range_order(),
            genre_separator: default_genre_separator(),
            min_year: default_min_year(),
            max_year: default_max_year(),
            verify_invariants: default_verify_invariants(),
            log_level: default_log_level(),
        }
    }
}

impl CatalogConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration text
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: CatalogConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.hash_slots == 0 {
            return Err(ConfigError::Invalid("hash_slots must be > 0".into()));
        }

        if self.range_order < MIN_RANGE_ORDER {
            return Err(ConfigError::Invalid(format!(
                "range_order must be >= {}, got {}",
                MIN_RANGE_ORDER, self.range_order
            )));
        }

        if self.min_year > self.max_year {
            return Err(ConfigError::Invalid(format!(
                "min_year {} is greater than max_year {}",
                self.min_year, self.max_year
            )));
        }

        if self.genre_separator.is_whitespace() {
            return Err(ConfigError::Invalid(
                "genre_separator must not be whitespace".into(),
            ));
        }

        self.severity()?;
        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> ConfigResult<Severity> {
        self.log_level
            .parse::<Severity>()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn index_options(&self) -> IndexOptions {
        IndexOptions {
            hash_slots: self.hash_slots,
            range_order: self.range_order,
            genre_separator: self.genre_separator,
        }
    }

    pub fn validator(&self) -> RecordValidator {
        RecordValidator::new(self.min_year, self.max_year)
    }
}
