//! Index error types
//!
//! Error codes:
//! - FOLIO_STRUCTURAL_INVARIANT_VIOLATION (FATAL)
//!
//! Index mutations themselves never fail: lookups that miss return empty
//! buckets. The only index error is a broken internal invariant, which is a
//! defect and must stop the catalog from accepting further writes.

use std::fmt;

/// Severity levels for index errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Catalog must stop accepting mutations
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Index-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexErrorCode {
    /// Balance, coloring, ordering or linkage of a structure is broken
    FolioStructuralInvariantViolation,
}

impl IndexErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            IndexErrorCode::FolioStructuralInvariantViolation => {
                "FOLIO_STRUCTURAL_INVARIANT_VIOLATION"
            }
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Fatal // All index errors are FATAL
    }
}

impl fmt::Display for IndexErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Index error type with the structure that reported it
#[derive(Debug, Clone)]
pub struct IndexError {
    code: IndexErrorCode,
    structure: &'static str,
    message: String,
}

impl IndexError {
    /// Create a structural invariant violation error
    pub fn invariant_violation(structure: &'static str, reason: impl Into<String>) -> Self {
        Self {
            code: IndexErrorCode::FolioStructuralInvariantViolation,
            structure,
            message: reason.into(),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> IndexErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the name of the structure whose invariant broke
    pub fn structure(&self) -> &'static str {
        self.structure
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        true
    }
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.code.severity(),
            self.code.code(),
            self.message,
            self.structure
        )
    }
}

impl std::error::Error for IndexError {}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// Returns an invariant violation from the enclosing function when `cond`
/// does not hold.
macro_rules! ensure_invariant {
    ($cond:expr, $structure:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::index::IndexError::invariant_violation(
                $structure,
                format!($($arg)+),
            ));
        }
    };
}

pub(crate) use ensure_invariant;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_matches() {
        assert_eq!(
            IndexErrorCode::FolioStructuralInvariantViolation.code(),
            "FOLIO_STRUCTURAL_INVARIANT_VIOLATION"
        );
    }

    #[test]
    fn test_all_errors_are_fatal() {
        let err = IndexError::invariant_violation("year_tree", "balance factor 2");
        assert_eq!(err.severity(), Severity::Fatal);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_error_display() {
        let err = IndexError::invariant_violation("title_tree", "red node with red child");
        let display = format!("{}", err);
        assert!(display.contains("FATAL"));
        assert!(display.contains("FOLIO_STRUCTURAL_INVARIANT_VIOLATION"));
        assert!(display.contains("title_tree"));
    }

    fn check(ok: bool) -> IndexResult<()> {
        ensure_invariant!(ok, "test", "value was {}", ok);
        Ok(())
    }

    #[test]
    fn test_ensure_invariant_macro() {
        assert!(check(true).is_ok());
        let err = check(false).unwrap_err();
        assert_eq!(err.message(), "value was false");
    }
}
