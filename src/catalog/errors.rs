//! Catalog error type
//!
//! Wraps record rejections (REJECT) and structural failures (FATAL). A
//! fatal error poisons the catalog.

use thiserror::Error;

use crate::index::IndexError;
use crate::record::RecordError;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// Insert rejected before any index was touched
    #[error(transparent)]
    Record(#[from] RecordError),

    /// An index structure failed its self-check
    #[error(transparent)]
    Index(#[from] IndexError),

    /// A mutation was attempted after a fatal error
    #[error("[FATAL] FOLIO_CATALOG_POISONED: catalog rejected a mutation after: {0}")]
    Poisoned(String),
}

impl CatalogError {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::Record(e) => e.code().code(),
            CatalogError::Index(e) => e.code().code(),
            CatalogError::Poisoned(_) => "FOLIO_CATALOG_POISONED",
        }
    }

    /// Returns whether this error leaves the catalog unusable for writes
    pub fn is_fatal(&self) -> bool {
        !matches!(self, CatalogError::Record(_))
    }
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let rejected: CatalogError = RecordError::duplicate("Dune", "Herbert", 1965).into();
        assert_eq!(rejected.code(), "FOLIO_DUPLICATE_RECORD");
        assert!(!rejected.is_fatal());

        let broken: CatalogError = IndexError::invariant_violation("year_tree", "bf 2").into();
        assert_eq!(broken.code(), "FOLIO_STRUCTURAL_INVARIANT_VIOLATION");
        assert!(broken.is_fatal());

        let poisoned = CatalogError::Poisoned("year_tree: bf 2".into());
        assert_eq!(poisoned.code(), "FOLIO_CATALOG_POISONED");
        assert!(poisoned.is_fatal());
        assert!(poisoned.to_string().contains("FOLIO_CATALOG_POISONED"));
    }

    #[test]
    fn test_display_is_transparent() {
        let err: CatalogError = RecordError::invalid_field("title", "must not be blank").into();
        assert!(err.to_string().starts_with("[REJECT] FOLIO_INVALID_RECORD"));
    }
}
