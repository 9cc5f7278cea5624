//! Character trie for prefix lookups on titles and authors.
//!
//! Keys are case-folded before insertion and lookup. A record is filed at
//! the node where its key ends, so a prefix search returns the buckets of
//! the prefix node and every descendant.

use std::collections::BTreeMap;

use super::arena::{Arena, NodeId};
use super::errors::{ensure_invariant, IndexResult};
use crate::record::RecordId;

#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: BTreeMap<char, NodeId>,
    bucket: Vec<RecordId>,
    parent: Option<(NodeId, char)>,
}

#[derive(Debug, Clone)]
pub struct PrefixTrie {
    nodes: Arena<TrieNode>,
    root: NodeId,
    records: usize,
    name: &'static str,
}

impl Default for PrefixTrie {
    fn default() -> Self {
        Self::new("trie")
    }
}

impl PrefixTrie {
    /// Creates an empty trie; `name` identifies it in invariant reports.
    pub fn new(name: &'static str) -> Self {
        let mut nodes = Arena::new();
        let root = nodes.alloc(TrieNode::default());
        Self {
            nodes,
            root,
            records: 0,
            name,
        }
    }

    pub fn insert(&mut self, key: &str, id: RecordId) {
        let mut current = self.root;
        for ch in key.to_lowercase().chars() {
            current = match self.nodes[current].children.get(&ch) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.alloc(TrieNode {
                        parent: Some((current, ch)),
                        ..TrieNode::default()
                    });
                    self.nodes[current].children.insert(ch, child);
                    child
                }
            };
        }
        self.nodes[current].bucket.push(id);
        self.records += 1;
    }

    fn walk(&self, key: &str) -> Option<NodeId> {
        let mut current = self.root;
        for ch in key.to_lowercase().chars() {
            current = *self.nodes[current].children.get(&ch)?;
        }
        Some(current)
    }

    /// Returns every id whose key starts with `prefix`.
    ///
    /// Buckets are collected in pre-order, children in character order. An
    /// empty prefix returns every id in the trie.
    pub fn search(&self, prefix: &str) -> Vec<RecordId> {
        let mut result = Vec::new();
        let Some(start) = self.walk(prefix) else {
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

    /// Returns the ids filed under exactly `key`.
    pub fn get(&self, key: &str) -> &[RecordId] {
        match self.walk(key) {
            Some(n) => &self.nodes[n].bucket,
            None => &[],
        }
    }

    /// Removes `id` from `key`'s terminal node and prunes the dead branch.
    pub fn remove(&mut self, key: &str, id: RecordId) -> bool {
        let Some(n) = self.walk(key) else {
            return false;
        };

        let bucket = &mut self.nodes[n].bucket;
        let Some(pos) = bucket.iter().position(|&x| x == id) else {
            return false;
        };
        bucket.remove(pos);
        self.records -= 1;

        let mut current = n;
        while current != self.root {
            let node = &self.nodes[current];
            if !node.bucket.is_empty() || !node.children.is_empty() {
                break;
            }
            let Some((parent, ch)) = node.parent else { break };
            self.nodes[parent].children.remove(&ch);
            self.nodes.free(current);
            current = parent;
        }
        true
    }

    /// Number of nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn record_count(&self) -> usize {
        self.records
    }

    pub fn check_invariants(&self) -> IndexResult<()> {
        let mut seen_records = 0;
        let mut stack = vec![self.root];

        while let Some(n) = stack.pop() {
            let node = &self.nodes[n];
            seen_records += node.bucket.len();

            if n != self.root {
                ensure_invariant!(
                    !node.bucket.is_empty() || !node.children.is_empty(),
                    self.name,
                    "node {} has no records and no children",
                    n
                );
            }

            for (&ch, &child) in &node.children {
                ensure_invariant!(
                    self.nodes[child].parent == Some((n, ch)),
                    self.name,
                    "child '{}' of node {} has a stale parent link",
                    ch,
                    n
                );
                stack.push(child);
            }
        }

        ensure_invariant!(
            seen_records == self.records,
            self.name,
            "trie holds {} records but counter says {}",
            seen_records,
            self.records
        );
        Ok(())
    }
}
