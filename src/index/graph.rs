//! Undirected relation multigraph over records.
//!
//! Two records are joined by one edge per attribute they share, tagged with
//! that attribute. Edges are stored on both endpoints, in the order they
//! were added.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

use super::errors::{ensure_invariant, IndexResult};
use crate::record::{Record, RecordId};

const STRUCTURE: &str = "relation_graph";

/// Attribute shared by two related records
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Author,
    Genre,
    Year,
    Title,
}

impl RelationKind {
    /// Every kind, in the order edges are added
    pub const ALL: [RelationKind; 4] = [
        RelationKind::Author,
        RelationKind::Genre,
        RelationKind::Year,
        RelationKind::Title,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Author => "author",
            RelationKind::Genre => "genre",
            RelationKind::Year => "year",
            RelationKind::Title => "title",
        }
    }

    /// Returns true if `a` and `b` agree on this attribute. Empty text
    /// never matches.
    pub fn holds(&self, a: &Record, b: &Record) -> bool {
        fn same(x: &str, y: &str) -> bool {
            !x.is_empty() && x == y
        }

        match self {
            RelationKind::Author => same(&a.author, &b.author),
            RelationKind::Genre => same(&a.genre, &b.genre),
            RelationKind::Year => a.year == b.year,
            RelationKind::Title => same(&a.title, &b.title),
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An incident edge as seen from one endpoint
pub type Relation = (RecordId, RelationKind);

/// Kinds joining one pair of records, one bit per `RelationKind`
type KindSet = u8;

fn kind_bit(kind: RelationKind) -> KindSet {
    1 << kind as u8
}

#[derive(Debug, Clone, Default)]
struct Node {
    /// Incident edges in insertion order
    edges: Vec<Relation>,
    /// Kinds shared with each neighbour
    peers: HashMap<RecordId, KindSet>,
}

impl Node {
    fn link(&mut self, peer: RecordId, kind: RelationKind) {
        self.edges.push((peer, kind));
        *self.peers.entry(peer).or_default() |= kind_bit(kind);
    }
}

#[derive(Debug, Clone, Default)]
pub struct RelationGraph {
    adjacency: BTreeMap<RecordId, Node>,
    edges: usize,
}

impl RelationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `id` as an isolated node.
    pub fn add_book(&mut self, id: RecordId) {
        self.adjacency.entry(id).or_default();
    }

    /// Adds one edge per attribute `a` and `b` share. Returns the number of
    /// edges added.
    pub fn connect(&mut self, a: RecordId, b: RecordId, ra: &Record, rb: &Record) -> usize {
        if a == b {
            return 0;
        }

        let mut added = 0;
        for kind in RelationKind::ALL {
            if kind.holds(ra, rb) {
                self.adjacency.entry(a).or_default().link(b, kind);
                self.adjacency.entry(b).or_default().link(a, kind);
                added += 1;
            }
        }
        self.edges += added;
        added
    }

    /// Edges incident to `id`, in insertion order.
    pub fn related(&self, id: RecordId) -> &[Relation] {
        self.adjacency
            .get(&id)
            .map(|node| node.edges.as_slice())
            .unwrap_or(&[])
    }

    /// Drops `id` and every edge touching it.
    pub fn remove_book(&mut self, id: RecordId) -> bool {
        let Some(node) = self.adjacency.remove(&id) else {
            return false;
        };

        for other in node.peers.keys() {
            if let Some(peer) = self.adjacency.get_mut(other) {
                peer.edges.retain(|(x, _)| *x != id);
                peer.peers.remove(&id);
            }
        }
        self.edges -= node.edges.len();
        true
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.adjacency.contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.edges
    }

    /// Verifies the edges of one node in O(degree): the edge list and the
    /// per-neighbour kinds agree, there are no self-loops or repeated edges,
    /// and every neighbour holds the same kinds back. An absent node passes.
    pub fn check_node(&self, id: RecordId) -> IndexResult<()> {
        let Some(node) = self.adjacency.get(&id) else {
            return Ok(());
        };

        let mut listed: HashMap<RecordId, KindSet> = HashMap::with_capacity(node.peers.len());
        for &(peer, kind) in &node.edges {
            ensure_invariant!(peer != id, STRUCTURE, "{} has a {} self-loop", id, kind);

            let set = listed.entry(peer).or_default();
            ensure_invariant!(
                *set & kind_bit(kind) == 0,
                STRUCTURE,
                "{} edge {} -> {} is listed twice",
                kind,
                id,
                peer
            );
            *set |= kind_bit(kind);
        }

        ensure_invariant!(
            listed == node.peers,
            STRUCTURE,
            "{} edge list disagrees with its neighbour kinds",
            id
        );

        for (&peer, &set) in &node.peers {
            let mirrored = self
                .adjacency
                .get(&peer)
                .and_then(|other| other.peers.get(&id))
                .copied();
            ensure_invariant!(
                mirrored == Some(set),
                STRUCTURE,
                "edges {} -> {} are not mirrored",
                id,
                peer
            );
        }
        Ok(())
    }

    /// Verifies that every edge is stored on both endpoints. Linear in the
    /// number of edges.
    pub fn check_invariants(&self) -> IndexResult<()> {
        let mut half_edges = 0;

        for (&id, node) in &self.adjacency {
            self.check_node(id)?;
            half_edges += node.edges.len();
        }

        ensure_invariant!(
            half_edges == self.edges * 2,
            STRUCTURE,
            "{} half-edges for {} edges",
            half_edges,
            self.edges
        );
        Ok(())
    }
}
