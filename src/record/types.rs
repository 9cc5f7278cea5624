//! Record value types
//!
//! A `Record` is immutable once cataloged. Identity is the
//! `(title, author, year)` triple: cover and preview never take part in
//! equality or hashing.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Catalog-assigned record handle.
///
/// Ids are handed out in increasing order, so ascending id order is
/// insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl RecordId {
    pub fn new(id: u64) -> Self {
        RecordId(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of a record for deduplication and relation tests.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub title: String,
    pub author: String,
    pub year: i32,
}

impl RecordKey {
    pub fn new(title: impl Into<String>, author: impl Into<String>, year: i32) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year,
        }
    }
}

/// A cataloged book.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    /// Cover image reference (URL or path)
    #[serde(default)]
    pub cover: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    /// Genre path, segments separated by the configured separator
    #[serde(default)]
    pub genre: String,
    pub year: i32,
    /// Free-text excerpt
    #[serde(default)]
    pub preview: String,
}

impl Record {
    /// Creates a record with empty cover and preview.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        genre: impl Into<String>,
        year: i32,
    ) -> Self {
        Self {
            cover: String::new(),
            title: title.into(),
            author: author.into(),
            genre: genre.into(),
            year,
            preview: String::new(),
        }
    }

    pub fn with_cover(mut self, cover: impl Into<String>) -> Self {
        self.cover = cover.into();
        self
    }

    pub fn with_preview(mut self, preview: impl Into<String>) -> Self {
        self.preview = preview.into();
        self
    }

    /// Returns the identity triple.
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.title.clone(), self.author.clone(), self.year)
    }

    /// Returns true if both records are the same book.
    pub fn same_book(&self, other: &Record) -> bool {
        self.title == other.title && self.author == other.author && self.year == other.year
    }

    /// Returns true if `keyword` occurs, ignoring case, in the title,
    /// author or preview.
    pub fn mentions(&self, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.author.to_lowercase().contains(&needle)
            || self.preview.to_lowercase().contains(&needle)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.same_book(other)
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.title.hash(state);
        self.author.hash(state);
        self.year.hash(state);
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cover: {}", self.cover)?;
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "Author: {}", self.author)?;
        writeln!(f, "Genre: {}", self.genre)?;
        writeln!(f, "Year: {}", self.year)?;
        writeln!(f, "Preview: {}", self.preview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(record: &Record) -> u64 {
        let mut hasher = DefaultHasher::new();
        record.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_identity_ignores_cover_and_preview() {
        let a = Record::new("Dune", "Herbert", "SciFi", 1965).with_cover("a.jpg");
        let b = Record::new("Dune", "Herbert", "Space Opera", 1965).with_preview("Arrakis...");

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_identity_distinguishes_year() {
        let a = Record::new("Dune", "Herbert", "SciFi", 1965);
        let b = Record::new("Dune", "Herbert", "SciFi", 1966);
        assert_ne!(a, b);
    }

    #[test]
    fn test_mentions_is_case_insensitive() {
        let record = Record::new("Dune", "Frank Herbert", "SciFi", 1965)
            .with_preview("A desert planet");

        assert!(record.mentions("DUNE"));
        assert!(record.mentions("herb"));
        assert!(record.mentions("Desert"));
        assert!(!record.mentions("ocean"));
    }

    #[test]
    fn test_record_id_order_is_insertion_order() {
        assert!(RecordId::new(1) < RecordId::new(2));
        assert_eq!(RecordId::new(7).value(), 7);
        assert_eq!(RecordId::new(3).to_string(), "#3");
    }
}
