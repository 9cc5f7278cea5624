//! CLI module for folio
//!
//! Loads one record file into a catalog and runs one command:
//! - add, remove (the record file is saved afterwards)
//! - list, find, get, range, genre-tree, keyword, related
//! - sort, search-sorted
//! - stats, check
//!
//! Responses are single JSON objects on stdout; logs go to stderr.

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{execute, load_config, open_catalog, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_error_to, write_response, write_response_to};
