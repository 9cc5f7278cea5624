//! B+ tree over `(year, id)` entries for ordered range scans.
//!
//! Leaves hold the entries and are doubly linked in key order; internal
//! nodes hold separators only. A node splits when it reaches `order`
//! entries (or keys), so every node holds at most `order - 1` after an
//! operation completes.
//!
//! Separators are full `(year, id)` entries, which keeps them unique even
//! when many records share a year. Child `i` of an internal node holds
//! entries in `[keys[i - 1], keys[i])`.
//!
//! Removal unlinks leaves that become empty and drops internal nodes left
//! without children, collapsing the root while it has a single child.
//! Underfull nodes are not merged.

use super::arena::{Arena, NodeId};
use super::errors::{ensure_invariant, IndexResult};
use crate::record::RecordId;

const STRUCTURE: &str = "range_index";

/// Default branching order
pub const DEFAULT_RANGE_ORDER: usize = 4;

/// Smallest order that still splits into two non-empty halves
pub const MIN_RANGE_ORDER: usize = 3;

type Entry = (i32, RecordId);

#[derive(Debug, Clone)]
enum RangeNode {
    Leaf {
        entries: Vec<Entry>,
        prev: Option<NodeId>,
        next: Option<NodeId>,
    },
    Internal {
        keys: Vec<Entry>,
        children: Vec<NodeId>,
    },
}

impl RangeNode {
    fn empty_leaf() -> Self {
        RangeNode::Leaf {
            entries: Vec::new(),
            prev: None,
            next: None,
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            RangeNode::Leaf { entries, .. } => entries.is_empty(),
            RangeNode::Internal { children, .. } => children.is_empty(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RangeIndex {
    nodes: Arena<RangeNode>,
    root: NodeId,
    order: usize,
    len: usize,
}

impl Default for RangeIndex {
    fn default() -> Self {
        Self::new(DEFAULT_RANGE_ORDER)
    }
}

impl RangeIndex {
    /// Creates an empty index. Orders below `MIN_RANGE_ORDER` are raised.
    pub fn new(order: usize) -> Self {
        let mut nodes = Arena::new();
        let root = nodes.alloc(RangeNode::empty_leaf());
        Self {
            nodes,
            root,
            order: order.max(MIN_RANGE_ORDER),
            len: 0,
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Inserts `(year, id)`. Returns false if the entry already exists.
    pub fn insert(&mut self, year: i32, id: RecordId) -> bool {
        if self.contains(year, id) {
            return false;
        }

        if let Some((separator, right)) = self.insert_at(self.root, (year, id)) {
            let old_root = self.root;
            self.root = self.nodes.alloc(RangeNode::Internal {
                keys: vec![separator],
                children: vec![old_root, right],
            });
        }
        self.len += 1;
        true
    }

    /// Inserts below `n`; returns the separator and new right sibling when
    /// `n` split.
    fn insert_at(&mut self, n: NodeId, entry: Entry) -> Option<(Entry, NodeId)> {
        let order = self.order;

        let (i, child) = match &mut self.nodes[n] {
            RangeNode::Leaf { entries, .. } => {
                let pos = entries.partition_point(|e| *e < entry);
                entries.insert(pos, entry);
                if entries.len() < order {
                    return None;
                }
                return self.split_leaf(n);
            }
            RangeNode::Internal { keys, children } => {
                let i = keys.partition_point(|k| *k <= entry);
                (i, children[i])
            }
        };

        let (separator, right) = self.insert_at(child, entry)?;

        let RangeNode::Internal { keys, children } = &mut self.nodes[n] else {
            return None;
        };
        keys.insert(i, separator);
        children.insert(i + 1, right);
        if keys.len() < order {
            return None;
        }
        self.split_internal(n)
    }

    fn split_leaf(&mut self, n: NodeId) -> Option<(Entry, NodeId)> {
        let RangeNode::Leaf { entries, next, .. } = &mut self.nodes[n] else {
            return None;
        };
        let upper = entries.split_off(entries.len() / 2);
        let old_next = *next;
        let separator = *upper.first()?;

        let right = self.nodes.alloc(RangeNode::Leaf {
            entries: upper,
            prev: Some(n),
            next: old_next,
        });

        if let RangeNode::Leaf { next, .. } = &mut self.nodes[n] {
            *next = Some(right);
        }
        if let Some(after) = old_next {
            if let RangeNode::Leaf { prev, .. } = &mut self.nodes[after] {
                *prev = Some(right);
            }
        }

        Some((separator, right))
    }

    fn split_internal(&mut self, n: NodeId) -> Option<(Entry, NodeId)> {
        let RangeNode::Internal { keys, children } = &mut self.nodes[n] else {
            return None;
        };
        let mid = keys.len() / 2;
        let upper_keys = keys.split_off(mid + 1);
        let separator = keys.pop()?;
        let upper_children = children.split_off(mid + 1);

        let right = self.nodes.alloc(RangeNode::Internal {
            keys: upper_keys,
            children: upper_children,
        });
        Some((separator, right))
    }

    fn first_leaf(&self) -> NodeId {
        let mut n = self.root;
        while let RangeNode::Internal { children, .. } = &self.nodes[n] {
            match children.first() {
                Some(&child) => n = child,
                None => break,
            }
        }
        n
    }

    /// Leaf where entries with year `year` would start.
    fn leaf_for(&self, year: i32) -> NodeId {
        let mut n = self.root;
        while let RangeNode::Internal { keys, children } = &self.nodes[n] {
            let i = keys.partition_point(|k| k.0 < year);
            match children.get(i) {
                Some(&child) => n = child,
                None => break,
            }
        }
        n
    }

    /// Ids with year in `[lo, hi]`, ordered by `(year, id)`.
    pub fn range(&self, lo: i32, hi: i32) -> Vec<RecordId> {
        let mut result = Vec::new();
        if lo > hi {
            return result;
        }

        let mut leaf = Some(self.leaf_for(lo));
        while let Some(n) = leaf {
            let RangeNode::Leaf { entries, next, .. } = &self.nodes[n] else {
                break;
            };
            for &(year, id) in entries {
                if year > hi {
                    return result;
                }
                if year >= lo {
                    result.push(id);
                }
            }
            leaf = *next;
        }
        result
    }

    /// Ids with exactly `year`, ascending.
    pub fn search(&self, year: i32) -> Vec<RecordId> {
        self.range(year, year)
    }

    pub fn contains(&self, year: i32, id: RecordId) -> bool {
        let entry = (year, id);
        let mut n = self.root;
        loop {
            match &self.nodes[n] {
                RangeNode::Leaf { entries, .. } => return entries.binary_search(&entry).is_ok(),
                RangeNode::Internal { keys, children } => {
                    let i = keys.partition_point(|k| *k <= entry);
                    match children.get(i) {
                        Some(&child) => n = child,
                        None => return false,
                    }
                }
            }
        }
    }

    /// Removes `(year, id)`. Returns false if it was not present.
    pub fn remove(&mut self, year: i32, id: RecordId) -> bool {
        if !self.remove_at(self.root, (year, id)) {
            return false;
        }
        self.len -= 1;

        while let RangeNode::Internal { children, .. } = &self.nodes[self.root] {
            let next_root = match children.as_slice() {
                [only] => Some(*only),
                [] => None,
                _ => break,
            };
            let old_root = self.root;
            self.root = match next_root {
                Some(only) => only,
                None => self.nodes.alloc(RangeNode::empty_leaf()),
            };
            self.nodes.free(old_root);
        }
        true
    }

    fn remove_at(&mut self, n: NodeId, entry: Entry) -> bool {
        let (i, child) = match &mut self.nodes[n] {
            RangeNode::Leaf { entries, .. } => {
                return match entries.binary_search(&entry) {
                    Ok(pos) => {
                        entries.remove(pos);
                        true
                    }
                    Err(_) => false,
                };
            }
            RangeNode::Internal { keys, children } => {
                let i = keys.partition_point(|k| *k <= entry);
                (i, children[i])
            }
        };

        if !self.remove_at(child, entry) {
            return false;
        }
        if self.nodes[child].is_empty() {
            self.detach_child(n, i);
        }
        true
    }

    /// Drops child `i` of `n` together with one adjacent separator.
    fn detach_child(&mut self, n: NodeId, i: usize) {
        let RangeNode::Internal { keys, children } = &mut self.nodes[n] else {
            return;
        };
        let child = children.remove(i);
        if !keys.is_empty() {
            keys.remove(i.saturating_sub(1));
        }

        if let Some(RangeNode::Leaf { prev, next, .. }) = self.nodes.free(child) {
            if let Some(p) = prev {
                if let RangeNode::Leaf { next: link, .. } = &mut self.nodes[p] {
                    *link = next;
                }
            }
            if let Some(q) = next {
                if let RangeNode::Leaf { prev: link, .. } = &mut self.nodes[q] {
                    *link = prev;
                }
            }
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Levels from root to leaf, 1 for a lone leaf
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut n = self.root;
        while let RangeNode::Internal { children, .. } = &self.nodes[n] {
            match children.first() {
                Some(&child) => {
                    n = child;
                    depth += 1;
                }
                None => break,
            }
        }
        depth
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut leaf = Some(self.first_leaf());
        while let Some(n) = leaf {
            let RangeNode::Leaf { next, .. } = &self.nodes[n] else {
                break;
            };
            count += 1;
            leaf = *next;
        }
        count
    }

    /// Verifies node capacities, key order and bounds, uniform leaf depth
    /// and the leaf chain.
    pub fn check_invariants(&self) -> IndexResult<()> {
        let mut walk = Walk::default();
        self.verify(self.root, None, None, 1, &mut walk)?;

        ensure_invariant!(
            walk.entries == self.len,
            STRUCTURE,
            "tree holds {} entries but counter says {}",
            walk.entries,
            self.len
        );

        let mut expected_prev = None;
        let mut chained = Vec::with_capacity(walk.leaves.len());
        let mut leaf = walk.leaves.first().copied();
        while let Some(n) = leaf {
            let RangeNode::Leaf { prev, next, .. } = &self.nodes[n] else {
                break;
            };
            ensure_invariant!(
                *prev == expected_prev,
                STRUCTURE,
                "leaf {} has prev link {:?}, expected {:?}",
                n,
                prev,
                expected_prev
            );
            ensure_invariant!(
                chained.len() < walk.leaves.len(),
                STRUCTURE,
                "leaf chain is longer than the tree"
            );
            chained.push(n);
            expected_prev = Some(n);
            leaf = *next;
        }
        ensure_invariant!(
            chained == walk.leaves,
            STRUCTURE,
            "leaf chain {:?} differs from tree order {:?}",
            chained,
            walk.leaves
        );

        Ok(())
    }

    fn verify(
        &self,
        n: NodeId,
        lower: Option<Entry>,
        upper: Option<Entry>,
        depth: usize,
        walk: &mut Walk,
    ) -> IndexResult<()> {
        let within = |e: &Entry| lower.map_or(true, |lo| *e >= lo) && upper.map_or(true, |hi| *e < hi);

        match &self.nodes[n] {
            RangeNode::Leaf { entries, .. } => {
                ensure_invariant!(
                    entries.len() < self.order,
                    STRUCTURE,
                    "leaf {} holds {} entries with order {}",
                    n,
                    entries.len(),
                    self.order
                );
                ensure_invariant!(
                    n == self.root || !entries.is_empty(),
                    STRUCTURE,
                    "non-root leaf {} is empty",
                    n
                );
                ensure_invariant!(
                    entries.windows(2).all(|w| w[0] < w[1]),
                    STRUCTURE,
                    "leaf {} entries are not strictly ordered",
                    n
                );
                ensure_invariant!(
                    entries.iter().all(within),
                    STRUCTURE,
                    "leaf {} holds an entry outside its separator bounds",
                    n
                );
                match walk.leaf_depth {
                    None => walk.leaf_depth = Some(depth),
                    Some(expected) => ensure_invariant!(
                        expected == depth,
                        STRUCTURE,
                        "leaf {} at depth {} but other leaves at depth {}",
                        n,
                        depth,
                        expected
                    ),
                }
                walk.entries += entries.len();
                walk.leaves.push(n);
            }
            RangeNode::Internal { keys, children } => {
                ensure_invariant!(
                    keys.len() < self.order,
                    STRUCTURE,
                    "internal node {} holds {} keys with order {}",
                    n,
                    keys.len(),
                    self.order
                );
                ensure_invariant!(
                    children.len() == keys.len() + 1,
                    STRUCTURE,
                    "internal node {} has {} keys and {} children",
                    n,
                    keys.len(),
                    children.len()
                );
                ensure_invariant!(
                    keys.windows(2).all(|w| w[0] < w[1]) && keys.iter().all(within),
                    STRUCTURE,
                    "internal node {} keys are unordered or out of bounds",
                    n
                );

                for (i, &child) in children.iter().enumerate() {
                    let lo = if i == 0 { lower } else { keys.get(i - 1).copied() };
                    let hi = keys.get(i).copied().or(upper);
                    self.verify(child, lo, hi, depth + 1, walk)?;
                }
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct Walk {
    leaf_depth: Option<usize>,
    leaves: Vec<NodeId>,
    entries: usize,
}
