//! AVL tree keyed by publication year.
//!
//! Each node buckets every record published in its year, in insertion
//! order. Duplicate years grow the existing bucket and never add a node.
//! After every insert and delete the nodes on the modified path are
//! rebalanced, so `|height(left) - height(right)| <= 1` holds everywhere.

use std::cmp::Ordering;

use super::arena::{Arena, NodeId};
use super::errors::{ensure_invariant, IndexResult};
use crate::record::RecordId;

const STRUCTURE: &str = "year_tree";

#[derive(Debug, Clone)]
struct YearNode {
    year: i32,
    bucket: Vec<RecordId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    height: u32,
}

impl YearNode {
    fn leaf(year: i32, id: RecordId) -> Self {
        Self {
            year,
            bucket: vec![id],
            left: None,
            right: None,
            height: 1,
        }
    }
}

/// Height-balanced year index
#[derive(Debug, Clone, Default)]
pub struct YearTree {
    nodes: Arena<YearNode>,
    root: Option<NodeId>,
    records: usize,
    rotations: u64,
}

impl YearTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files `id` under `year`, rebalancing the insertion path.
    pub fn insert(&mut self, year: i32, id: RecordId) {
        let root = self.insert_at(self.root, year, id);
        self.root = Some(root);
        self.records += 1;
    }

    fn insert_at(&mut self, node: Option<NodeId>, year: i32, id: RecordId) -> NodeId {
        let Some(n) = node else {
            return self.nodes.alloc(YearNode::leaf(year, id));
        };

        match year.cmp(&self.nodes[n].year) {
            Ordering::Less => {
                let left = self.insert_at(self.nodes[n].left, year, id);
                self.nodes[n].left = Some(left);
            }
            Ordering::Greater => {
                let right = self.insert_at(self.nodes[n].right, year, id);
                self.nodes[n].right = Some(right);
            }
            Ordering::Equal => {
                // Heights cannot change when only a bucket grows.
                self.nodes[n].bucket.push(id);
                return n;
            }
        }

        self.rebalance(n)
    }

    /// Returns the bucket for `year`, empty if no record has that year.
    pub fn search(&self, year: i32) -> &[RecordId] {
        match self.find(year) {
            Some(n) => &self.nodes[n].bucket,
            None => &[],
        }
    }

    fn find(&self, year: i32) -> Option<NodeId> {
        let mut current = self.root;
        while let Some(n) = current {
            let node = &self.nodes[n];
            current = match year.cmp(&node.year) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(n),
            };
        }
        None
    }

    /// Returns ids for every year in `[lo, hi]`, ascending by year.
    pub fn range(&self, lo: i32, hi: i32) -> Vec<RecordId> {
        let mut result = Vec::new();
        if lo > hi {
            return result;
        }

        let mut stack = Vec::new();
        let mut current = self.root;
        loop {
            while let Some(n) = current {
                let node = &self.nodes[n];
                if node.year >= lo {
                    stack.push(n);
                    current = node.left;
                } else {
                    current = node.right;
                }
            }

            let Some(n) = stack.pop() else { break };
            let node = &self.nodes[n];
            if node.year > hi {
                break;
            }
            result.extend_from_slice(&node.bucket);
            current = node.right;
        }

        result
    }

    /// Distinct years in ascending order.
    pub fn years(&self) -> Vec<i32> {
        let mut years = Vec::with_capacity(self.nodes.len());
        let mut stack = Vec::new();
        let mut current = self.root;
        loop {
            while let Some(n) = current {
                stack.push(n);
                current = self.nodes[n].left;
            }
            let Some(n) = stack.pop() else { break };
            years.push(self.nodes[n].year);
            current = self.nodes[n].right;
        }
        years
    }

    /// Removes `id` from the bucket of `year`.
    ///
    /// A node whose bucket empties is deleted and the path rebalanced.
    /// Returns false if the id was not filed under that year.
    pub fn remove(&mut self, year: i32, id: RecordId) -> bool {
        let Some(n) = self.find(year) else {
            return false;
        };

        let bucket = &mut self.nodes[n].bucket;
        let Some(pos) = bucket.iter().position(|&x| x == id) else {
            return false;
        };
        bucket.remove(pos);
        self.records -= 1;

        if bucket.is_empty() {
            self.root = self.delete_at(self.root, year);
        }
        true
    }

    fn delete_at(&mut self, node: Option<NodeId>, year: i32) -> Option<NodeId> {
        let n = node?;

        match year.cmp(&self.nodes[n].year) {
            Ordering::Less => {
                let left = self.delete_at(self.nodes[n].left, year);
                self.nodes[n].left = left;
            }
            Ordering::Greater => {
                let right = self.delete_at(self.nodes[n].right, year);
                self.nodes[n].right = right;
            }
            Ordering::Equal => match (self.nodes[n].left, self.nodes[n].right) {
                (None, None) => {
                    self.nodes.free(n);
                    return None;
                }
                (Some(child), None) | (None, Some(child)) => {
                    self.nodes.free(n);
                    return Some(child);
                }
                (Some(_), Some(right)) => {
                    // Pull the in-order successor's key and bucket into n.
                    let (new_right, successor) = self.detach_min(right);
                    self.nodes[n].right = new_right;
                    if let Some(succ) = self.nodes.free(successor) {
                        let node = &mut self.nodes[n];
                        node.year = succ.year;
                        node.bucket = succ.bucket;
                    }
                }
            },
        }

        Some(self.rebalance(n))
    }

    /// Unlinks the minimum node of the subtree at `n`.
    ///
    /// Returns the rebalanced subtree root and the detached node, which is
    /// still allocated.
    fn detach_min(&mut self, n: NodeId) -> (Option<NodeId>, NodeId) {
        match self.nodes[n].left {
            None => (self.nodes[n].right, n),
            Some(left) => {
                let (new_left, min) = self.detach_min(left);
                self.nodes[n].left = new_left;
                (Some(self.rebalance(n)), min)
            }
        }
    }

    fn height_of(&self, node: Option<NodeId>) -> u32 {
        node.map_or(0, |n| self.nodes[n].height)
    }

    fn update_height(&mut self, n: NodeId) {
        let left = self.height_of(self.nodes[n].left);
        let right = self.height_of(self.nodes[n].right);
        self.nodes[n].height = 1 + left.max(right);
    }

    fn balance_factor(&self, n: NodeId) -> i64 {
        let node = &self.nodes[n];
        i64::from(self.height_of(node.left)) - i64::from(self.height_of(node.right))
    }

    /// Restores the balance of `n` and returns the new subtree root.
    fn rebalance(&mut self, n: NodeId) -> NodeId {
        self.update_height(n);
        let balance = self.balance_factor(n);

        if balance > 1 {
            if let Some(left) = self.nodes[n].left {
                if self.balance_factor(left) < 0 {
                    let rotated = self.rotate_left(left);
                    self.nodes[n].left = Some(rotated);
                }
            }
            return self.rotate_right(n);
        }

        if balance < -1 {
            if let Some(right) = self.nodes[n].right {
                if self.balance_factor(right) > 0 {
                    let rotated = self.rotate_right(right);
                    self.nodes[n].right = Some(rotated);
                }
            }
            return self.rotate_left(n);
        }

        n
    }

    fn rotate_left(&mut self, n: NodeId) -> NodeId {
        let Some(pivot) = self.nodes[n].right else {
            return n;
        };
        self.nodes[n].right = self.nodes[pivot].left;
        self.nodes[pivot].left = Some(n);
        self.update_height(n);
        self.update_height(pivot);
        self.rotations += 1;
        pivot
    }

    fn rotate_right(&mut self, n: NodeId) -> NodeId {
        let Some(pivot) = self.nodes[n].left else {
            return n;
        };
        self.nodes[n].left = self.nodes[pivot].right;
        self.nodes[pivot].right = Some(n);
        self.update_height(n);
        self.update_height(pivot);
        self.rotations += 1;
        pivot
    }

    /// Number of distinct years
    pub fn key_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of filed records
    pub fn record_count(&self) -> usize {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the tree, 0 when empty
    pub fn height(&self) -> u32 {
        self.height_of(self.root)
    }

    /// Rotations performed since construction
    pub fn rotation_count(&self) -> u64 {
        self.rotations
    }

    /// Verifies ordering, stored heights, balance factors and buckets.
    pub fn check_invariants(&self) -> IndexResult<()> {
        let mut seen_records = 0;
        self.verify(self.root, None, None, &mut seen_records)?;
        ensure_invariant!(
            seen_records == self.records,
            STRUCTURE,
            "tree holds {} records but counter says {}",
            seen_records,
            self.records
        );
        Ok(())
    }

    fn verify(
        &self,
        node: Option<NodeId>,
        lower: Option<i32>,
        upper: Option<i32>,
        seen_records: &mut usize,
    ) -> IndexResult<u32> {
        let Some(n) = node else {
            return Ok(0);
        };
        let current = &self.nodes[n];

        ensure_invariant!(
            lower.map_or(true, |lo| current.year > lo) && upper.map_or(true, |hi| current.year < hi),
            STRUCTURE,
            "year {} breaks in-order key ordering",
            current.year
        );
        ensure_invariant!(
            !current.bucket.is_empty(),
            STRUCTURE,
            "year {} has an empty bucket",
            current.year
        );
        *seen_records += current.bucket.len();

        let left = self.verify(current.left, lower, Some(current.year), seen_records)?;
        let right = self.verify(current.right, Some(current.year), upper, seen_records)?;

        ensure_invariant!(
            left.abs_diff(right) <= 1,
            STRUCTURE,
            "year {} has balance factor {}",
            current.year,
            i64::from(left) - i64::from(right)
        );
        let height = 1 + left.max(right);
        ensure_invariant!(
            height == current.height,
            STRUCTURE,
            "year {} stores height {} but has height {}",
            current.year,
            current.height,
            height
        );

        Ok(height)
    }
}
