//! Query routing
//!
//! A `Query` names one key dimension. Each variant is answered by exactly
//! one index; the catalog never combines indexes to serve a `Query`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single-dimension catalog query
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum Query {
    /// Title prefix, case-insensitive (title trie)
    Title(String),
    /// Author prefix, case-insensitive (author trie)
    Author(String),
    /// Genre path, exact node only (genre tree)
    Genre(String),
    /// Exact publication year (year tree)
    Year(i32),
}

impl Query {
    pub fn title(prefix: impl Into<String>) -> Self {
        Query::Title(prefix.into())
    }

    pub fn author(prefix: impl Into<String>) -> Self {
        Query::Author(prefix.into())
    }

    pub fn genre(path: impl Into<String>) -> Self {
        Query::Genre(path.into())
    }

    pub fn year(year: i32) -> Self {
        Query::Year(year)
    }

    /// Name of the dimension, used as the `by` log field
    pub fn dimension(&self) -> &'static str {
        match self {
            Query::Title(_) => "title",
            Query::Author(_) => "author",
            Query::Genre(_) => "genre",
            Query::Year(_) => "year",
        }
    }

    /// Name of the index that answers this query
    pub fn index_name(&self) -> &'static str {
        match self {
            Query::Title(_) => "title_trie",
            Query::Author(_) => "author_trie",
            Query::Genre(_) => "genre_tree",
            Query::Year(_) => "year_tree",
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Title(v) | Query::Author(v) | Query::Genre(v) => {
                write!(f, "{}={:?}", self.dimension(), v)
            }
            Query::Year(y) => write!(f, "year={}", y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Query::title("Du").to_string(), "title=\"Du\"");
        assert_eq!(Query::year(1965).to_string(), "year=1965");
    }

    #[test]
    fn test_routing_names() {
        assert_eq!(Query::author("Her").index_name(), "author_trie");
        assert_eq!(Query::genre("SciFi").dimension(), "genre");
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&Query::year(1815)).unwrap();
        assert_eq!(json, r#"{"by":"year","value":1815}"#);

        let parsed: Query = serde_json::from_str(r#"{"by":"title","value":"Emma"}"#).unwrap();
        assert_eq!(parsed, Query::title("Emma"));
    }
}
