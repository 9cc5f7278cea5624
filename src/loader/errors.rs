//! Loader error types
//!
//! Error codes:
//! - FOLIO_LOADER_IO: the record file could not be read
//! - FOLIO_INVALID_RECORD: a block has a missing or non-numeric year

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::record::RecordError;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("block {block}: {source}")]
    InvalidRecord {
        /// 1-based position of the block among non-empty blocks
        block: usize,
        #[source]
        source: RecordError,
    },
}

impl LoaderError {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            LoaderError::Io { .. } => "FOLIO_LOADER_IO",
            LoaderError::InvalidRecord { source, .. } => source.code().code(),
        }
    }

    /// Block number for record errors
    pub fn block(&self) -> Option<usize> {
        match self {
            LoaderError::InvalidRecord { block, .. } => Some(*block),
            LoaderError::Io { .. } => None,
        }
    }
}

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;
