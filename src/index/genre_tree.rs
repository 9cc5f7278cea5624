//! Genre hierarchy tree.
//!
//! A genre string such as `"Fiction/Fantasy/Epic"` names a path from the
//! root. Segments are trimmed and matched case-insensitively; empty
//! segments are skipped, so a blank genre files the record at the root.
//! Each node keeps the display label of the first insert that created it.

use std::collections::BTreeMap;

use super::arena::{Arena, NodeId};
use super::errors::{ensure_invariant, IndexResult};
use crate::record::RecordId;

const STRUCTURE: &str = "genre_tree";

/// Default segment separator
pub const DEFAULT_GENRE_SEPARATOR: char = '/';

#[derive(Debug, Clone)]
struct GenreNode {
    label: String,
    bucket: Vec<RecordId>,
    children: BTreeMap<String, NodeId>,
    parent: Option<NodeId>,
}

impl GenreNode {
    fn new(label: &str, parent: Option<NodeId>) -> Self {
        Self {
            label: label.to_string(),
            bucket: Vec::new(),
            children: BTreeMap::new(),
            parent,
        }
    }
}

/// N-ary tree of genre paths
#[derive(Debug, Clone)]
pub struct GenreTree {
    nodes: Arena<GenreNode>,
    root: NodeId,
    separator: char,
    records: usize,
}

impl Default for GenreTree {
    fn default() -> Self {
        Self::new(DEFAULT_GENRE_SEPARATOR)
    }
}

impl GenreTree {
    pub fn new(separator: char) -> Self {
        let mut nodes = Arena::new();
        let root = nodes.alloc(GenreNode::new("", None));
        Self {
            nodes,
            root,
            separator,
            records: 0,
        }
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// Splits a genre string into `(key, label)` segments.
    fn segments<'a>(&self, genre: &'a str) -> impl Iterator<Item = (String, &'a str)> {
        genre
            .split(self.separator)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| (s.to_lowercase(), s))
    }

    /// Files `id` at the node named by `genre`, creating missing nodes.
    pub fn insert(&mut self, genre: &str, id: RecordId) {
        let mut current = self.root;
        for (key, label) in self.segments(genre).collect::<Vec<_>>() {
            current = match self.nodes[current].children.get(&key) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.alloc(GenreNode::new(label, Some(current)));
                    self.nodes[current].children.insert(key, child);
                    child
                }
            };
        }
        self.nodes[current].bucket.push(id);
        self.records += 1;
    }

    fn locate(&self, genre: &str) -> Option<NodeId> {
        let mut current = self.root;
        for (key, _) in self.segments(genre) {
            current = *self.nodes[current].children.get(&key)?;
        }
        Some(current)
    }

    /// Records filed at exactly `genre`.
    pub fn search(&self, genre: &str) -> &[RecordId] {
        match self.locate(genre) {
            Some(n) => &self.nodes[n].bucket,
            None => &[],
        }
    }

    /// Records filed at `genre` or anywhere below it, in pre-order with
    /// children visited in label order.
    pub fn search_with_subgenres(&self, genre: &str) -> Vec<RecordId> {
        let mut result = Vec::new();
        let Some(start) = self.locate(genre) else {
            return result;
        };

        let mut stack = vec![start];
        while let Some(n) = stack.pop() {
            let node = &self.nodes[n];
            result.extend_from_slice(&node.bucket);
            stack.extend(node.children.values().rev());
        }
        result
    }

    /// Display labels of the direct subgenres of `genre`.
    pub fn subgenres(&self, genre: &str) -> Vec<&str> {
        match self.locate(genre) {
            Some(n) => self.nodes[n]
                .children
                .values()
                .map(|&c| self.nodes[c].label.as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Removes `id` from `genre` and prunes nodes left with no records and
    /// no children.
    pub fn remove(&mut self, genre: &str, id: RecordId) -> bool {
        let Some(n) = self.locate(genre) else {
            return false;
        };

        let bucket = &mut self.nodes[n].bucket;
        let Some(pos) = bucket.iter().position(|&x| x == id) else {
            return false;
        };
        bucket.remove(pos);
        self.records -= 1;

        self.prune(n);
        true
    }

    fn prune(&mut self, mut n: NodeId) {
        while n != self.root {
            let node = &self.nodes[n];
            if !node.bucket.is_empty() || !node.children.is_empty() {
                break;
            }
            let Some(parent) = node.parent else { break };
            let key = node.label.to_lowercase();

            self.nodes[parent].children.remove(&key);
            self.nodes.free(n);
            n = parent;
        }
    }

    /// Number of nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Verifies parent links, child keys and pruning.
    pub fn check_invariants(&self) -> IndexResult<()> {
        ensure_invariant!(
            self.nodes[self.root].parent.is_none(),
            STRUCTURE,
            "root has a parent"
        );

        let mut seen_records = 0;
        let mut stack = vec![self.root];
        while let Some(n) = stack.pop() {
            let node = &self.nodes[n];
            seen_records += node.bucket.len();

            if n != self.root {
                ensure_invariant!(
                    !node.bucket.is_empty() || !node.children.is_empty(),
                    STRUCTURE,
                    "genre '{}' is empty but was not pruned",
                    node.label
                );
            }

            for (key, &child) in &node.children {
                let child_node = &self.nodes[child];
                ensure_invariant!(
                    child_node.parent == Some(n),
                    STRUCTURE,
                    "genre '{}' does not link back to its parent",
                    child_node.label
                );
                ensure_invariant!(
                    *key == child_node.label.to_lowercase(),
                    STRUCTURE,
                    "genre '{}' is filed under key '{}'",
                    child_node.label,
                    key
                );
                stack.push(child);
            }
        }

        ensure_invariant!(
            seen_records == self.records,
            STRUCTURE,
            "tree holds {} records but counter says {}",
            seen_records,
            self.records
        );
        Ok(())
    }
}
