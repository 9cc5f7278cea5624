//! Record validation performed before any index is touched.
//!
//! Rules:
//! - title is present and not blank
//! - year lies within the configured bounds
//!
//! Validation is deterministic and never mutates the record.

use super::errors::{RecordError, RecordResult};
use super::types::Record;

/// Lowest year accepted by default
pub const DEFAULT_MIN_YEAR: i32 = -9999;

/// Highest year accepted by default
pub const DEFAULT_MAX_YEAR: i32 = 9999;

/// Validates records against the catalog's acceptance rules.
#[derive(Debug, Clone, Copy)]
pub struct RecordValidator {
    min_year: i32,
    max_year: i32,
}

impl Default for RecordValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_YEAR, DEFAULT_MAX_YEAR)
    }
}

impl RecordValidator {
    /// Creates a validator accepting years in `[min_year, max_year]`.
    pub fn new(min_year: i32, max_year: i32) -> Self {
        Self { min_year, max_year }
    }

    /// Validates a record.
    ///
    /// # Errors
    ///
    /// Returns `FOLIO_INVALID_RECORD` if the title is blank or the year is
    /// out of bounds.
    pub fn validate(&self, record: &Record) -> RecordResult<()> {
        if record.title.trim().is_empty() {
            return Err(RecordError::invalid_field("title", "must not be blank"));
        }

        if record.year < self.min_year || record.year > self.max_year {
            return Err(RecordError::invalid_field(
                "year",
                format!(
                    "{} is outside [{}, {}]",
                    record.year, self.min_year, self.max_year
                ),
            ));
        }

        Ok(())
    }

    /// Parses a year field as produced by a loader.
    ///
    /// # Errors
    ///
    /// Returns `FOLIO_INVALID_RECORD` if the value is absent or not an integer.
    pub fn parse_year(raw: Option<&str>) -> RecordResult<i32> {
        let raw = raw
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| RecordError::invalid_field("year", "is missing"))?;

        raw.parse::<i32>()
            .map_err(|_| RecordError::invalid_field("year", format!("'{}' is not a number", raw)))
    }
}
