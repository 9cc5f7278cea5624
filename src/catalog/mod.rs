//! Catalog subsystem for folio
//!
//! The `Catalog` is the single entry point to the indexes: it validates
//! records, fans each mutation out to every index and routes each query to
//! the index that owns its dimension.
//!
//! # Usage
//!
//! ```ignore
//! use folio::catalog::{Catalog, CatalogConfig};
//! use folio::record::Record;
//!
//! let mut catalog = Catalog::new(CatalogConfig::default());
//! catalog.insert(Record::new("Dune", "Frank Herbert", "SciFi", 1965))?;
//! let found = catalog.find_by_author("herb");
//! ```

#[allow(clippy::module_inception)]
mod catalog;
mod config;
mod errors;
mod query;

pub use catalog::{Catalog, CatalogStats, LoadSummary};
pub use config::{CatalogConfig, ConfigError, ConfigResult};
pub use errors::{CatalogError, CatalogResult};
pub use query::Query;
