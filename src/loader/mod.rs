//! Record loader for folio
//!
//! Reads the flat-text record format into `Record` values. The loader only
//! parses; validation against catalog rules happens on insert.

mod errors;
mod parser;

use std::fs;
use std::path::Path;

pub use errors::{LoaderError, LoaderResult};
pub use parser::{parse_records, render_records, BLOCK_MARKER};

use crate::observability::ObservationScope;
use crate::record::Record;

/// Reads and parses a record file.
///
/// # Errors
///
/// `FOLIO_LOADER_IO` if the file cannot be read, `FOLIO_INVALID_RECORD` if
/// a block is malformed.
pub fn load_file(path: impl AsRef<Path>) -> LoaderResult<Vec<Record>> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let scope = ObservationScope::with_fields("LOAD_RECORDS", &[("path", display.as_str())]);

    let result = fs::read_to_string(path)
        .map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })
        .and_then(|text| parse_records(&text));

    match &result {
        Ok(records) => {
            let count = records.len().to_string();
            scope.complete_with_fields(&[("records", count.as_str())]);
        }
        Err(e) => scope.fail(&e.to_string()),
    }
    result
}

/// Writes records to `path` in the loader format.
///
/// # Errors
///
/// `FOLIO_LOADER_IO` if the file cannot be written.
pub fn save_file<'a>(
    path: impl AsRef<Path>,
    records: impl IntoIterator<Item = &'a Record>,
) -> LoaderResult<()> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let scope = ObservationScope::with_fields("SAVE_RECORDS", &[("path", display.as_str())]);

    let text = render_records(records);
    let result = fs::write(path, text).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    });

    match &result {
        Ok(()) => scope.complete(),
        Err(e) => scope.fail(&e.to_string()),
    }
    result
}
