//! Index set for folio
//!
//! Holds every index structure over one record collection and applies each
//! mutation to all of them.
//!
//! # API
//!
//! - `apply_insert(id, record, prior)` - File a record in every index
//! - `apply_remove(id, record)` - Remove a record from every index
//! - `check_invariants()` - Verify every structure
//! - `check_after_mutation(id)` - Verify every structure, and only the
//!   graph edges around `id`
//! - `stats()` - Sizes of every structure

use serde::Serialize;

use super::errors::{IndexError, IndexResult};
use super::genre_tree::{GenreTree, DEFAULT_GENRE_SEPARATOR};
use super::graph::RelationGraph;
use super::hash::{HashIndex, HashKey, HashStats, DEFAULT_HASH_SLOTS};
use super::range::{RangeIndex, DEFAULT_RANGE_ORDER};
use super::title_tree::TitleTree;
use super::trie::PrefixTrie;
use super::year_tree::YearTree;
use crate::record::{Record, RecordId};

/// Construction parameters for an `IndexSet`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOptions {
    pub hash_slots: usize,
    pub range_order: usize,
    pub genre_separator: char,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            hash_slots: DEFAULT_HASH_SLOTS,
            range_order: DEFAULT_RANGE_ORDER,
            genre_separator: DEFAULT_GENRE_SEPARATOR,
        }
    }
}

/// Sizes of every index structure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexStats {
    pub hash: HashStats,
    pub title_trie_nodes: usize,
    pub author_trie_nodes: usize,
    pub distinct_years: usize,
    pub year_tree_height: u32,
    pub year_tree_rotations: u64,
    pub distinct_titles: usize,
    pub genre_nodes: usize,
    pub range_entries: usize,
    pub range_depth: usize,
    pub range_leaves: usize,
    pub graph_edges: usize,
}

/// Every index kept over the catalog's records
#[derive(Debug, Clone)]
pub struct IndexSet {
    hash: HashIndex,
    title_trie: PrefixTrie,
    author_trie: PrefixTrie,
    years: YearTree,
    titles: TitleTree,
    genres: GenreTree,
    ranges: RangeIndex,
    graph: RelationGraph,
}

impl Default for IndexSet {
    fn default() -> Self {
        Self::new(IndexOptions::default())
    }
}

impl IndexSet {
    /// Creates an empty index set
    pub fn new(options: IndexOptions) -> Self {
        Self {
            hash: HashIndex::new(options.hash_slots),
            title_trie: PrefixTrie::new("title_trie"),
            author_trie: PrefixTrie::new("author_trie"),
            years: YearTree::new(),
            titles: TitleTree::new(),
            genres: GenreTree::new(options.genre_separator),
            ranges: RangeIndex::new(options.range_order),
            graph: RelationGraph::new(),
        }
    }

    /// The hash keys a record is filed under
    pub fn hash_keys(record: &Record) -> [HashKey; 3] {
        [
            HashKey::Genre(record.genre.clone()),
            HashKey::Year(record.year),
            HashKey::Title(record.title.clone()),
        ]
    }

    /// Files a validated record in every index.
    ///
    /// `prior` yields the records already cataloged; the new record is
    /// related against each of them.
    pub fn apply_insert<'a>(
        &mut self,
        id: RecordId,
        record: &Record,
        prior: impl IntoIterator<Item = (RecordId, &'a Record)>,
    ) {
        for key in Self::hash_keys(record) {
            self.hash.insert(key, id);
        }
        self.title_trie.insert(&record.title, id);
        self.author_trie.insert(&record.author, id);
        self.years.insert(record.year, id);
        self.titles.insert(&record.title, id);
        self.genres.insert(&record.genre, id);
        self.ranges.insert(record.year, id);

        self.graph.add_book(id);
        for (other_id, other) in prior {
            self.graph.connect(id, other_id, record, other);
        }
    }

    /// Removes a record from every index.
    ///
    /// Every index is visited even after a miss. The first index that did
    /// not hold `id` under the record's keys is reported.
    pub fn apply_remove(&mut self, id: RecordId, record: &Record) -> IndexResult<()> {
        let mut held = Vec::with_capacity(10);
        for key in Self::hash_keys(record) {
            held.push(("hash_index", self.hash.remove(&key, id)));
        }
        held.push(("title_trie", self.title_trie.remove(&record.title, id)));
        held.push(("author_trie", self.author_trie.remove(&record.author, id)));
        held.push(("year_tree", self.years.remove(record.year, id)));
        held.push(("title_tree", self.titles.remove(&record.title, id)));
        held.push(("genre_tree", self.genres.remove(&record.genre, id)));
        held.push(("range_index", self.ranges.remove(record.year, id)));
        held.push(("relation_graph", self.graph.remove_book(id)));

        match held.into_iter().find(|&(_, removed)| !removed) {
            Some((structure, _)) => Err(IndexError::invariant_violation(
                structure,
                format!("record {} was not held under \"{}\"", id, record.title),
            )),
            None => Ok(()),
        }
    }

    pub fn hash(&self) -> &HashIndex {
        &self.hash
    }

    pub fn title_trie(&self) -> &PrefixTrie {
        &self.title_trie
    }

    pub fn author_trie(&self) -> &PrefixTrie {
        &self.author_trie
    }

    pub fn years(&self) -> &YearTree {
        &self.years
    }

    pub fn titles(&self) -> &TitleTree {
        &self.titles
    }

    pub fn genres(&self) -> &GenreTree {
        &self.genres
    }

    pub fn ranges(&self) -> &RangeIndex {
        &self.ranges
    }

    pub fn graph(&self) -> &RelationGraph {
        &self.graph
    }

    /// Runs every structure's invariant check, stopping at the first failure.
    pub fn check_invariants(&self) -> IndexResult<()> {
        self.check_linear()?;
        self.graph.check_invariants()
    }

    /// Check run after inserting or removing `id`.
    ///
    /// The graph can hold a quadratic number of edges, so only the edges
    /// around `id` are checked; the other structures are checked in full.
    pub fn check_after_mutation(&self, id: RecordId) -> IndexResult<()> {
        self.check_linear()?;
        self.graph.check_node(id)
    }

    fn check_linear(&self) -> IndexResult<()> {
        self.hash.check_invariants()?;
        self.years.check_invariants()?;
        self.titles.check_invariants()?;
        self.genres.check_invariants()?;
        self.title_trie.check_invariants()?;
        self.author_trie.check_invariants()?;
        self.ranges.check_invariants()?;
        Ok(())
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            hash: self.hash.stats(),
            title_trie_nodes: self.title_trie.node_count(),
            author_trie_nodes: self.author_trie.node_count(),
            distinct_years: self.years.key_count(),
            year_tree_height: self.years.height(),
            year_tree_rotations: self.years.rotation_count(),
            distinct_titles: self.titles.key_count(),
            genre_nodes: self.genres.node_count(),
            range_entries: self.ranges.len(),
            range_depth: self.ranges.depth(),
            range_leaves: self.ranges.leaf_count(),
            graph_edges: self.graph.edge_count(),
        }
    }
}
