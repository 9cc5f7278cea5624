//! CLI command implementations
//!
//! Every invocation follows the same sequence:
//! 1. Load configuration (file or defaults) and apply the log level
//! 2. Load the record file into a fresh catalog
//! 3. Run exactly one command against the catalog
//! 4. `add` and `remove` write the catalog back to the record file when
//!    they changed it
//! 5. Print one JSON object on stdout
//!
//! Saving rewrites the file in load order. Comments and blocks the catalog
//! rejected on load are not kept.

use std::path::Path;

use serde::Serialize;
use serde_json::{json, Value};

use crate::catalog::{Catalog, CatalogConfig, Query};
use crate::loader;
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::record::Record;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// Parse arguments, run the command and print its response.
///
/// On failure the JSON error object is printed before the error is
/// returned, so the caller only has to set the exit status.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    match execute(&cli) {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Run a parsed invocation and return the response `data`
pub fn execute(cli: &Cli) -> CliResult<Value> {
    let config = load_config(cli.config.as_deref())?;
    Logger::set_min_severity(config.severity()?);

    let mut catalog = open_catalog(config, &cli.data)?;
    let before = catalog.len();
    let data = run_command(&mut catalog, &cli.command)?;

    if cli.command.is_mutation() && catalog.len() != before {
        loader::save_file(&cli.data, catalog.records())?;
    }
    Ok(data)
}

/// Load configuration from `path`, or defaults when no path is given
pub fn load_config(path: Option<&Path>) -> CliResult<CatalogConfig> {
    let config = match path {
        Some(path) => CatalogConfig::load(path)?,
        None => CatalogConfig::default(),
    };

    let source = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    log_event_with_fields(Event::ConfigLoaded, &[("source", source.as_str())]);

    Ok(config)
}

/// Build a catalog from a record file.
///
/// Records the catalog rejects are skipped; malformed blocks abort.
pub fn open_catalog(config: CatalogConfig, data: &Path) -> CliResult<Catalog> {
    let records = loader::load_file(data)?;
    let mut catalog = Catalog::new(config);
    catalog.insert_all(records)?;
    Ok(catalog)
}

/// Run one command against a loaded catalog.
///
/// `add` and `remove` change only the in-memory catalog; `execute` saves it.
pub fn run_command(catalog: &mut Catalog, command: &Command) -> CliResult<Value> {
    match command {
        Command::List => to_data(catalog.records().collect::<Vec<_>>()),

        Command::Add {
            title,
            author,
            genre,
            year,
            cover,
            preview,
        } => {
            let mut record = Record::new(title.as_str(), author.as_str(), genre.as_str(), *year);
            if let Some(cover) = cover {
                record = record.with_cover(cover.as_str());
            }
            if let Some(preview) = preview {
                record = record.with_preview(preview.as_str());
            }

            let id = catalog.insert(record)?;
            Ok(json!({
                "id": id.value(),
                "record": to_data(catalog.get(id))?,
                "records": catalog.len(),
            }))
        }

        Command::Remove { title } => {
            let removed = catalog.remove(title)?;
            Ok(json!({
                "removed": to_data(removed)?,
                "records": catalog.len(),
            }))
        }

        Command::Find {
            title,
            author,
            genre,
            year,
        } => {
            let query = query_from(title, author, genre, year)?;
            to_data(catalog.find(&query))
        }

        Command::Get { title } => to_data(catalog.get_by_title(title)),

        Command::Range { from, to } => to_data(catalog.find_by_year_range(*from, *to)),

        Command::GenreTree { genre } => Ok(json!({
            "records": to_data(catalog.find_by_genre_tree(genre))?,
            "subgenres": catalog.subgenres(genre),
        })),

        Command::Keyword { text } => to_data(catalog.search_keyword(text)),

        Command::Related { title } => {
            let related: Vec<Related<'_>> = catalog
                .related_to(title)
                .into_iter()
                .map(|(record, kind)| Related {
                    relation: kind.as_str(),
                    record,
                })
                .collect();
            to_data(related)
        }

        Command::Sort { field, algorithm } => to_data(catalog.sort_by(*field, *algorithm)),

        Command::SearchSorted {
            field,
            value,
            algorithm,
        } => to_data(catalog.search_sorted(*field, *algorithm, value)?),

        Command::Stats => Ok(json!({
            "catalog": to_data(catalog.stats())?,
            "genres": catalog.genre_counts(),
        })),

        Command::Check => {
            catalog.check_invariants()?;
            Ok(json!({ "consistent": true, "records": catalog.len() }))
        }
    }
}

#[derive(Serialize)]
struct Related<'a> {
    relation: &'static str,
    record: &'a Record,
}

fn query_from(
    title: &Option<String>,
    author: &Option<String>,
    genre: &Option<String>,
    year: &Option<i32>,
) -> CliResult<Query> {
    match (title, author, genre, year) {
        (Some(title), None, None, None) => Ok(Query::title(title.as_str())),
        (None, Some(author), None, None) => Ok(Query::author(author.as_str())),
        (None, None, Some(genre), None) => Ok(Query::genre(genre.as_str())),
        (None, None, None, Some(year)) => Ok(Query::year(*year)),
        _ => Err(CliError::invalid_argument(
            "find takes exactly one of --title, --author, --genre or --year",
        )),
    }
}

fn to_data<T: Serialize>(value: T) -> CliResult<Value> {
    Ok(serde_json::to_value(value)?)
}
