//! CLI argument definitions using clap
//!
//! Commands:
//! - folio list
//! - folio add --title <title> --author <author> --genre <path> --year <year>
//! - folio remove --title <title>
//! - folio find --title|--author|--genre|--year <value>
//! - folio get --title <title>
//! - folio range --from <year> --to <year>
//! - folio genre-tree --genre <path>
//! - folio keyword --text <text>
//! - folio related --title <title>
//! - folio sort --field <field> --algorithm <algorithm>
//! - folio search-sorted --field <field> --value <value>
//! - folio stats
//! - folio check
//!
//! `--config` and `--data` are accepted before or after the subcommand.

use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

use crate::sort::{SortAlgorithm, SortField};

/// folio - a multi-index book catalog
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to an optional JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the record file
    #[arg(long, global = true, default_value = "./books.txt")]
    pub data: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print every record in file order
    List,

    /// Catalog a new record and save the record file
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        author: String,

        /// Genre path, e.g. Fiction/SciFi
        #[arg(long, default_value = "")]
        genre: String,

        #[arg(long, allow_negative_numbers = true)]
        year: i32,

        /// Cover image path
        #[arg(long)]
        cover: Option<String>,

        /// Short description
        #[arg(long)]
        preview: Option<String>,
    },

    /// Remove the earliest record with this title and save the record file
    Remove {
        #[arg(long)]
        title: String,
    },

    /// Look records up by one dimension
    #[command(group(
        ArgGroup::new("by")
            .required(true)
            .args(["title", "author", "genre", "year"]),
    ))]
    Find {
        /// Title prefix
        #[arg(long)]
        title: Option<String>,

        /// Author prefix
        #[arg(long)]
        author: Option<String>,

        /// Genre path, exact node
        #[arg(long)]
        genre: Option<String>,

        /// Publication year
        #[arg(long, allow_negative_numbers = true)]
        year: Option<i32>,
    },

    /// Records with exactly this title
    Get {
        #[arg(long)]
        title: String,
    },

    /// Records published between two years, inclusive
    Range {
        #[arg(long, allow_negative_numbers = true)]
        from: i32,

        #[arg(long, allow_negative_numbers = true)]
        to: i32,
    },

    /// Records in a genre and all of its subgenres
    GenreTree {
        #[arg(long)]
        genre: String,
    },

    /// Case-insensitive search in title, author and preview
    Keyword {
        #[arg(long)]
        text: String,
    },

    /// Records sharing an attribute with the named record
    Related {
        #[arg(long)]
        title: String,
    },

    /// Print every record ordered by a field
    Sort {
        /// title, author, genre or year
        #[arg(long, default_value = "title")]
        field: SortField,

        /// quick or merge
        #[arg(long, default_value = "merge")]
        algorithm: SortAlgorithm,
    },

    /// Sort by a field, then binary-search for a value
    SearchSorted {
        #[arg(long)]
        field: SortField,

        #[arg(long, allow_hyphen_values = true)]
        value: String,

        #[arg(long, default_value = "merge")]
        algorithm: SortAlgorithm,
    },

    /// Index sizes, counters and genre counts
    Stats,

    /// Verify every index structure
    Check,
}

impl Command {
    /// Returns true for commands that change the record file
    pub fn is_mutation(&self) -> bool {
        matches!(self, Command::Add { .. } | Command::Remove { .. })
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
