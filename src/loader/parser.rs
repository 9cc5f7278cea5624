//! Flat-text record format.
//!
//! ```text
//! # comment
//! title: Dune
//! author: Frank Herbert
//! genre: Fiction/SciFi
//! year: 1965
//! ---
//! title: Emma
//! ...
//! ```
//!
//! A line holding only `---` closes a block. Keys are case-insensitive and
//! split from the value at the first `:`. Blank lines, `#` comments, lines
//! without a `:` and unknown keys are ignored. Blocks with no recognised
//! key are skipped and do not count toward block numbers.

use super::errors::{LoaderError, LoaderResult};
use crate::record::{Record, RecordValidator};

/// Line separating two records
pub const BLOCK_MARKER: &str = "---";

#[derive(Debug, Default)]
struct Block {
    cover: Option<String>,
    title: Option<String>,
    author: Option<String>,
    genre: Option<String>,
    year: Option<String>,
    preview: Option<String>,
}

impl Block {
    fn is_empty(&self) -> bool {
        self.cover.is_none()
            && self.title.is_none()
            && self.author.is_none()
            && self.genre.is_none()
            && self.year.is_none()
            && self.preview.is_none()
    }

    fn set(&mut self, key: &str, value: &str) {
        let slot = match key.to_ascii_lowercase().as_str() {
            "cover" => &mut self.cover,
            "title" => &mut self.title,
            "author" => &mut self.author,
            "genre" => &mut self.genre,
            "year" => &mut self.year,
            "preview" => &mut self.preview,
            _ => return,
        };
        *slot = Some(value.to_string());
    }

    fn into_record(self, block: usize) -> LoaderResult<Record> {
        let year = RecordValidator::parse_year(self.year.as_deref())
            .map_err(|source| LoaderError::InvalidRecord { block, source })?;

        Ok(Record {
            cover: self.cover.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            author: self.author.unwrap_or_default(),
            genre: self.genre.unwrap_or_default(),
            year,
            preview: self.preview.unwrap_or_default(),
        })
    }
}

/// Parses every block in `text`, in file order.
///
/// # Errors
///
/// Returns `LoaderError::InvalidRecord` for the first block whose year is
/// missing or not an integer.
pub fn parse_records(text: &str) -> LoaderResult<Vec<Record>> {
    let mut records = Vec::new();
    let mut block = Block::default();

    for line in text.lines() {
        let line = line.trim();

        if line == BLOCK_MARKER {
            finish_block(std::mem::take(&mut block), &mut records)?;
            continue;
        }
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            block.set(key.trim(), value.trim());
        }
    }
    finish_block(block, &mut records)?;

    Ok(records)
}

fn finish_block(block: Block, records: &mut Vec<Record>) -> LoaderResult<()> {
    if block.is_empty() {
        return Ok(());
    }
    let record = block.into_record(records.len() + 1)?;
    records.push(record);
    Ok(())
}

/// Writes records in the same format `parse_records` reads.
///
/// Line breaks inside values are flattened to spaces.
pub fn render_records<'a>(records: impl IntoIterator<Item = &'a Record>) -> String {
    fn flat(value: &str) -> String {
        value.replace(['\r', '\n'], " ")
    }

    let mut out = String::new();
    for (i, record) in records.into_iter().enumerate() {
        if i > 0 {
            out.push_str(BLOCK_MARKER);
            out.push('\n');
        }
        for (key, value) in [
            ("cover", record.cover.as_str()),
            ("title", record.title.as_str()),
            ("author", record.author.as_str()),
            ("genre", record.genre.as_str()),
        ] {
            if !value.is_empty() {
                out.push_str(&format!("{}: {}\n", key, flat(value)));
            }
        }
        out.push_str(&format!("year: {}\n", record.year));
        if !record.preview.is_empty() {
            out.push_str(&format!("preview: {}\n", flat(&record.preview)));
        }
    }
    out
}
