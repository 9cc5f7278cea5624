//! Record error types
//!
//! Error codes:
//! - FOLIO_INVALID_RECORD (REJECT)
//! - FOLIO_DUPLICATE_RECORD (REJECT)
//!
//! Record errors are raised before any index is touched, so a rejected
//! insert never leaves partial state behind.

use std::fmt;

/// Severity levels for record errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller request rejected, catalog unchanged
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Record-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordErrorCode {
    /// Missing title, unusable year, or malformed loader block
    FolioInvalidRecord,
    /// A record with the same (title, author, year) is already cataloged
    FolioDuplicateRecord,
}

impl RecordErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            RecordErrorCode::FolioInvalidRecord => "FOLIO_INVALID_RECORD",
            RecordErrorCode::FolioDuplicateRecord => "FOLIO_DUPLICATE_RECORD",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for RecordErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Record error with the offending field, when one is known
#[derive(Debug, Clone)]
pub struct RecordError {
    code: RecordErrorCode,
    message: String,
    field: Option<String>,
}

impl RecordError {
    /// A field failed validation
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            code: RecordErrorCode::FolioInvalidRecord,
            message: format!("field '{}': {}", field, reason.into()),
            field: Some(field),
        }
    }

    /// The record is not usable for a reason not tied to one field
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            code: RecordErrorCode::FolioInvalidRecord,
            message: reason.into(),
            field: None,
        }
    }

    /// The record collides with an existing one on (title, author, year)
    pub fn duplicate(title: &str, author: &str, year: i32) -> Self {
        Self {
            code: RecordErrorCode::FolioDuplicateRecord,
            message: format!(
                "record ('{}', '{}', {}) is already cataloged",
                title, author, year
            ),
            field: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> RecordErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the offending field, if any
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for RecordError {}

/// Result type for record operations
pub type RecordResult<T> = Result<T, RecordError>;
