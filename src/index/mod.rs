//! Index subsystem for folio
//!
//! Every index is derived, in-memory state over the catalog's records. The
//! catalog owns one `IndexSet` and is the only caller that mutates it.
//!
//! # Design Principles
//!
//! - Indexes store `RecordId`s, never records
//! - Buckets keep insertion order
//! - Deterministic: ordered maps, fixed hash keys, no randomness
//!
//! # Invariants
//!
//! - Every structure can verify itself with `check_invariants()`
//! - Lookup misses return empty buckets, never errors

mod arena;
mod errors;
mod genre_tree;
mod graph;
mod hash;
mod manager;
mod range;
mod title_tree;
mod trie;
mod year_tree;

pub use arena::{Arena, NodeId};
pub use errors::{IndexError, IndexErrorCode, IndexResult, Severity};
pub use genre_tree::{GenreTree, DEFAULT_GENRE_SEPARATOR};
pub use graph::{Relation, RelationGraph, RelationKind};
pub use hash::{HashIndex, HashKey, HashStats, DEFAULT_HASH_SLOTS};
pub use manager::{IndexOptions, IndexSet, IndexStats};
pub use range::{RangeIndex, DEFAULT_RANGE_ORDER, MIN_RANGE_ORDER};
pub use title_tree::TitleTree;
pub use trie::PrefixTrie;
pub use year_tree::YearTree;
