//! folio - a multi-index book catalog
//!
//! An in-memory catalog that keeps several index structures over one
//! record set and answers title, author, genre and year queries from the
//! index that owns each dimension.

pub mod catalog;
pub mod cli;
pub mod index;
pub mod loader;
pub mod observability;
pub mod record;
pub mod sort;
