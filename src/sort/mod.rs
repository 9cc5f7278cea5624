//! Sorting and searching over record sequences
//!
//! Sorting never touches the indexes; it produces a new ordering of the
//! records it is given.

mod algorithms;
mod errors;
mod field;

use std::borrow::Borrow;

pub use algorithms::{binary_search_by, merge_sort_by, quick_sort_by, sort_by, SortAlgorithm};
pub use errors::{SortError, SortResult};
pub use field::{SortField, SortKey};

use crate::record::Record;

fn record<R: Borrow<Record>>(r: &R) -> &Record {
    r.borrow()
}

/// Returns `records` ordered by `field`.
pub fn sort<R>(records: &[R], field: SortField, algorithm: SortAlgorithm) -> Vec<R>
where
    R: Borrow<Record> + Clone,
{
    sort_by(records, algorithm, |a, b| field.compare(record(a), record(b)))
}

/// Finds the first record whose `field` equals `value` in a sequence
/// sorted ascending by `field`.
///
/// # Errors
///
/// Returns `SortError::InvalidYear` when searching by year for a value
/// that is not an integer.
pub fn binary_search<R>(sorted: &[R], field: SortField, value: &str) -> SortResult<Option<usize>>
where
    R: Borrow<Record>,
{
    let key = field.parse_key(value)?;
    Ok(binary_search_by(sorted, |r| field.compare_key(record(r), &key)))
}
