//! Sort argument errors

use thiserror::Error;

/// Errors produced when parsing sort arguments
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    #[error("unknown sort field '{0}' (expected title, author, genre or year)")]
    UnknownField(String),

    #[error("unknown sort algorithm '{0}' (expected quick or merge)")]
    UnknownAlgorithm(String),

    #[error("'{0}' is not a valid year")]
    InvalidYear(String),
}

/// Result type for sort operations
pub type SortResult<T> = Result<T, SortError>;
