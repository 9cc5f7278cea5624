//! Record subsystem for folio
//!
//! Records are the values every index is kept over.
//!
//! # Invariants
//!
//! - Records are immutable once cataloged; edits are remove + insert
//! - Identity is `(title, author, year)`; hashing agrees with equality
//! - Validation happens before any index is touched

mod errors;
mod types;
mod validator;

pub use errors::{RecordError, RecordErrorCode, RecordResult, Severity};
pub use types::{Record, RecordId, RecordKey};
pub use validator::{RecordValidator, DEFAULT_MAX_YEAR, DEFAULT_MIN_YEAR};
