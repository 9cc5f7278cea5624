//! Sort fields and their comparison rules.
//!
//! Text fields compare case-folded, character by character; year compares
//! numerically.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::errors::{SortError, SortResult};
use crate::record::Record;

/// Record attribute a sequence can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Title,
    Author,
    Genre,
    Year,
}

/// A field value to search for in a sorted sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    Text(String),
    Year(i32),
}

fn fold_cmp(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Author => "author",
            SortField::Genre => "genre",
            SortField::Year => "year",
        }
    }

    fn text<'r>(&self, record: &'r Record) -> &'r str {
        match self {
            SortField::Title => &record.title,
            SortField::Author => &record.author,
            SortField::Genre => &record.genre,
            SortField::Year => "",
        }
    }

    /// Orders two records by this field
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        match self {
            SortField::Year => a.year.cmp(&b.year),
            _ => fold_cmp(self.text(a), self.text(b)),
        }
    }

    /// Orders a record's value for this field against `key`.
    ///
    /// A key of the wrong kind orders every record before it.
    pub fn compare_key(&self, record: &Record, key: &SortKey) -> Ordering {
        match (self, key) {
            (SortField::Year, SortKey::Year(year)) => record.year.cmp(year),
            (SortField::Year, SortKey::Text(_)) => Ordering::Less,
            (_, SortKey::Text(text)) => fold_cmp(self.text(record), text),
            (_, SortKey::Year(_)) => Ordering::Less,
        }
    }

    /// Parses a search value for this field.
    ///
    /// # Errors
    ///
    /// Returns `SortError::InvalidYear` if the field is year and `value` is
    /// not an integer.
    pub fn parse_key(&self, value: &str) -> SortResult<SortKey> {
        match self {
            SortField::Year => value
                .trim()
                .parse()
                .map(SortKey::Year)
                .map_err(|_| SortError::InvalidYear(value.to_string())),
            _ => Ok(SortKey::Text(value.to_string())),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(SortField::Title),
            "author" => Ok(SortField::Author),
            "genre" => Ok(SortField::Genre),
            "year" => Ok(SortField::Year),
            _ => Err(SortError::UnknownField(s.to_string())),
        }
    }
}
