//! CLI-specific error types
//!
//! Every CLI error is fatal for the process: it is reported as a JSON error
//! object on stdout and the binary exits non-zero. Codes from the catalog,
//! loader and configuration layers are passed through unchanged.

use std::fmt;
use std::io;

use crate::catalog::{CatalogError, ConfigError};
use crate::loader::LoaderError;
use crate::record::RecordErrorCode;
use crate::sort::SortError;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file unreadable or invalid
    ConfigInvalid,
    /// Record file unreadable
    LoaderIo,
    /// Record file holds a malformed block, or an added record is invalid
    InvalidRecord,
    /// An added record is already cataloged
    DuplicateRecord,
    /// An index failed its self-check
    InvariantViolation,
    /// Catalog refused a mutation after a fatal error
    CatalogPoisoned,
    /// Argument value not usable for the command
    InvalidArgument,
    /// stdout could not be written
    Io,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigInvalid => "FOLIO_CONFIG_INVALID",
            Self::LoaderIo => "FOLIO_LOADER_IO",
            Self::InvalidRecord => "FOLIO_INVALID_RECORD",
            Self::DuplicateRecord => "FOLIO_DUPLICATE_RECORD",
            Self::InvariantViolation => "FOLIO_STRUCTURAL_INVARIANT_VIOLATION",
            Self::CatalogPoisoned => "FOLIO_CATALOG_POISONED",
            Self::InvalidArgument => "FOLIO_CLI_INVALID_ARGUMENT",
            Self::Io => "FOLIO_CLI_IO",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidArgument, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::Io, msg)
    }

    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(CliErrorCode::ConfigInvalid, e.to_string())
    }
}

impl From<LoaderError> for CliError {
    fn from(e: LoaderError) -> Self {
        let code = match e {
            LoaderError::Io { .. } => CliErrorCode::LoaderIo,
            LoaderError::InvalidRecord { .. } => CliErrorCode::InvalidRecord,
        };
        Self::new(code, e.to_string())
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        let code = match e {
            CatalogError::Record(ref r) => match r.code() {
                RecordErrorCode::FolioDuplicateRecord => CliErrorCode::DuplicateRecord,
                RecordErrorCode::FolioInvalidRecord => CliErrorCode::InvalidRecord,
            },
            CatalogError::Index(_) => CliErrorCode::InvariantViolation,
            CatalogError::Poisoned(_) => CliErrorCode::CatalogPoisoned,
        };
        Self::new(code, e.to_string())
    }
}

impl From<SortError> for CliError {
    fn from(e: SortError) -> Self {
        Self::invalid_argument(e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
