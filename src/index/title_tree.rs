//! Red-black tree keyed by exact title.
//!
//! Nodes carry a bucket so records sharing a title (different authors or
//! editions) are all kept. Parent links are arena handles; a missing child
//! is the nil leaf and counts as black.
//!
//! # Invariants
//!
//! - In-order traversal yields strictly increasing titles
//! - The root is black
//! - No red node has a red child
//! - Every root-to-nil path crosses the same number of black nodes

use std::cmp::Ordering;

use super::arena::{Arena, NodeId};
use super::errors::{ensure_invariant, IndexResult};
use crate::record::RecordId;

const STRUCTURE: &str = "title_tree";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

#[derive(Debug, Clone)]
struct TitleNode {
    title: String,
    bucket: Vec<RecordId>,
    color: Color,
    left: Option<NodeId>,
    right: Option<NodeId>,
    parent: Option<NodeId>,
}

/// Red-black title index
#[derive(Debug, Clone, Default)]
pub struct TitleTree {
    nodes: Arena<TitleNode>,
    root: Option<NodeId>,
    records: usize,
}

impl TitleTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files `id` under `title`.
    ///
    /// An existing title grows its bucket; a new title is attached as a red
    /// leaf and the tree is repaired bottom-up.
    pub fn insert(&mut self, title: &str, id: RecordId) {
        let mut parent = None;
        let mut went_left = false;
        let mut current = self.root;

        while let Some(n) = current {
            let node = &mut self.nodes[n];
            match title.cmp(node.title.as_str()) {
                Ordering::Less => {
                    parent = Some(n);
                    went_left = true;
                    current = node.left;
                }
                Ordering::Greater => {
                    parent = Some(n);
                    went_left = false;
                    current = node.right;
                }
                Ordering::Equal => {
                    node.bucket.push(id);
                    self.records += 1;
                    return;
                }
            }
        }

        let z = self.nodes.alloc(TitleNode {
            title: title.to_string(),
            bucket: vec![id],
            color: Color::Red,
            left: None,
            right: None,
            parent,
        });
        match parent {
            None => self.root = Some(z),
            Some(p) if went_left => self.nodes[p].left = Some(z),
            Some(p) => self.nodes[p].right = Some(z),
        }
        self.records += 1;

        self.insert_fixup(z);
    }

    fn insert_fixup(&mut self, mut z: NodeId) {
        while let Some(p) = self.nodes[z].parent {
            if self.color_of(Some(p)) == Color::Black {
                break;
            }
            // A red parent is never the root, so the grandparent exists.
            let Some(g) = self.nodes[p].parent else { break };

            if self.nodes[g].left == Some(p) {
                let uncle = self.nodes[g].right;
                if self.color_of(uncle) == Color::Red {
                    if let Some(u) = uncle {
                        self.nodes[u].color = Color::Black;
                    }
                    self.nodes[p].color = Color::Black;
                    self.nodes[g].color = Color::Red;
                    z = g;
                    continue;
                }

                if self.nodes[p].right == Some(z) {
                    z = p;
                    self.rotate_left(z);
                }
                let Some(p) = self.nodes[z].parent else { break };
                self.nodes[p].color = Color::Black;
                self.nodes[g].color = Color::Red;
                self.rotate_right(g);
            } else {
                let uncle = self.nodes[g].left;
                if self.color_of(uncle) == Color::Red {
                    if let Some(u) = uncle {
                        self.nodes[u].color = Color::Black;
                    }
                    self.nodes[p].color = Color::Black;
                    self.nodes[g].color = Color::Red;
                    z = g;
                    continue;
                }

                if self.nodes[p].left == Some(z) {
                    z = p;
                    self.rotate_right(z);
                }
                let Some(p) = self.nodes[z].parent else { break };
                self.nodes[p].color = Color::Black;
                self.nodes[g].color = Color::Red;
                self.rotate_left(g);
            }
        }

        if let Some(root) = self.root {
            self.nodes[root].color = Color::Black;
        }
    }

    /// Returns the bucket for exactly `title`.
    pub fn search(&self, title: &str) -> &[RecordId] {
        match self.find(title) {
            Some(n) => &self.nodes[n].bucket,
            None => &[],
        }
    }

    fn find(&self, title: &str) -> Option<NodeId> {
        let mut current = self.root;
        while let Some(n) = current {
            let node = &self.nodes[n];
            current = match title.cmp(node.title.as_str()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(n),
            };
        }
        None
    }

    /// Removes `id` from the bucket of `title`, deleting the node when the
    /// bucket empties. Returns false if the id was not filed there.
    pub fn remove(&mut self, title: &str, id: RecordId) -> bool {
        let Some(z) = self.find(title) else {
            return false;
        };

        let bucket = &mut self.nodes[z].bucket;
        let Some(pos) = bucket.iter().position(|&x| x == id) else {
            return false;
        };
        bucket.remove(pos);
        self.records -= 1;

        if bucket.is_empty() {
            self.delete_node(z);
        }
        true
    }

    fn delete_node(&mut self, z: NodeId) {
        let mut removed_color = self.nodes[z].color;
        let x;
        let x_parent;

        match (self.nodes[z].left, self.nodes[z].right) {
            (None, right) => {
                x = right;
                x_parent = self.nodes[z].parent;
                self.transplant(z, right);
            }
            (left, None) => {
                x = left;
                x_parent = self.nodes[z].parent;
                self.transplant(z, left);
            }
            (Some(left), Some(right)) => {
                let y = self.minimum(right);
                removed_color = self.nodes[y].color;
                x = self.nodes[y].right;

                if self.nodes[y].parent == Some(z) {
                    x_parent = Some(y);
                } else {
                    x_parent = self.nodes[y].parent;
                    let y_right = self.nodes[y].right;
                    self.transplant(y, y_right);
                    self.nodes[y].right = Some(right);
                    self.nodes[right].parent = Some(y);
                }

                self.transplant(z, Some(y));
                self.nodes[y].left = Some(left);
                self.nodes[left].parent = Some(y);
                self.nodes[y].color = self.nodes[z].color;
            }
        }

        self.nodes.free(z);

        if removed_color == Color::Black {
            self.delete_fixup(x, x_parent);
        }
    }

    /// Repairs the extra black carried by `x`, whose parent is tracked
    /// separately because `x` may be nil.
    fn delete_fixup(&mut self, mut x: Option<NodeId>, mut parent: Option<NodeId>) {
        while x != self.root && self.color_of(x) == Color::Black {
            let Some(p) = parent else { break };

            if self.nodes[p].left == x {
                let Some(mut w) = self.nodes[p].right else { break };
                if self.nodes[w].color == Color::Red {
                    self.nodes[w].color = Color::Black;
                    self.nodes[p].color = Color::Red;
                    self.rotate_left(p);
                    let Some(sibling) = self.nodes[p].right else { break };
                    w = sibling;
                }

                if self.color_of(self.nodes[w].left) == Color::Black
                    && self.color_of(self.nodes[w].right) == Color::Black
                {
                    self.nodes[w].color = Color::Red;
                    x = Some(p);
                    parent = self.nodes[p].parent;
                } else {
                    if self.color_of(self.nodes[w].right) == Color::Black {
                        if let Some(wl) = self.nodes[w].left {
                            self.nodes[wl].color = Color::Black;
                        }
                        self.nodes[w].color = Color::Red;
                        self.rotate_right(w);
                        let Some(sibling) = self.nodes[p].right else { break };
                        w = sibling;
                    }
                    self.nodes[w].color = self.nodes[p].color;
                    self.nodes[p].color = Color::Black;
                    if let Some(wr) = self.nodes[w].right {
                        self.nodes[wr].color = Color::Black;
                    }
                    self.rotate_left(p);
                    x = self.root;
                    parent = None;
                }
            } else {
                let Some(mut w) = self.nodes[p].left else { break };
                if self.nodes[w].color == Color::Red {
                    self.nodes[w].color = Color::Black;
                    self.nodes[p].color = Color::Red;
                    self.rotate_right(p);
                    let Some(sibling) = self.nodes[p].left else { break };
                    w = sibling;
                }

                if self.color_of(self.nodes[w].left) == Color::Black
                    && self.color_of(self.nodes[w].right) == Color::Black
                {
                    self.nodes[w].color = Color::Red;
                    x = Some(p);
                    parent = self.nodes[p].parent;
                } else {
                    if self.color_of(self.nodes[w].left) == Color::Black {
                        if let Some(wr) = self.nodes[w].right {
                            self.nodes[wr].color = Color::Black;
                        }
                        self.nodes[w].color = Color::Red;
                        self.rotate_left(w);
                        let Some(sibling) = self.nodes[p].left else { break };
                        w = sibling;
                    }
                    self.nodes[w].color = self.nodes[p].color;
                    self.nodes[p].color = Color::Black;
                    if let Some(wl) = self.nodes[w].left {
                        self.nodes[wl].color = Color::Black;
                    }
                    self.rotate_right(p);
                    x = self.root;
                    parent = None;
                }
            }
        }

        if let Some(x) = x {
            self.nodes[x].color = Color::Black;
        }
    }

    fn color_of(&self, node: Option<NodeId>) -> Color {
        node.map_or(Color::Black, |n| self.nodes[n].color)
    }

    fn minimum(&self, mut n: NodeId) -> NodeId {
        while let Some(left) = self.nodes[n].left {
            n = left;
        }
        n
    }

    /// Points `parent`'s link that held `old` at `new`, or the root when
    /// `parent` is nil.
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            None => self.root = new,
            Some(p) if self.nodes[p].left == Some(old) => self.nodes[p].left = new,
            Some(p) => self.nodes[p].right = new,
        }
    }

    fn transplant(&mut self, u: NodeId, v: Option<NodeId>) {
        let parent = self.nodes[u].parent;
        self.replace_child(parent, u, v);
        if let Some(v) = v {
            self.nodes[v].parent = parent;
        }
    }

    fn rotate_left(&mut self, x: NodeId) {
        let Some(y) = self.nodes[x].right else { return };

        let inner = self.nodes[y].left;
        self.nodes[x].right = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(x);
        }

        let parent = self.nodes[x].parent;
        self.nodes[y].parent = parent;
        self.replace_child(parent, x, Some(y));

        self.nodes[y].left = Some(x);
        self.nodes[x].parent = Some(y);
    }

    fn rotate_right(&mut self, x: NodeId) {
        let Some(y) = self.nodes[x].left else { return };

        let inner = self.nodes[y].right;
        self.nodes[x].left = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(x);
        }

        let parent = self.nodes[x].parent;
        self.nodes[y].parent = parent;
        self.replace_child(parent, x, Some(y));

        self.nodes[y].right = Some(x);
        self.nodes[x].parent = Some(y);
    }

    pub fn key_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn record_count(&self) -> usize {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Verifies ordering, parent links, coloring and black height.
    pub fn check_invariants(&self) -> IndexResult<()> {
        let Some(root) = self.root else {
            ensure_invariant!(
                self.records == 0,
                STRUCTURE,
                "empty tree claims {} records",
                self.records
            );
            return Ok(());
        };

        ensure_invariant!(
            self.nodes[root].parent.is_none(),
            STRUCTURE,
            "root '{}' has a parent",
            self.nodes[root].title
        );
        ensure_invariant!(
            self.nodes[root].color == Color::Black,
            STRUCTURE,
            "root '{}' is red",
            self.nodes[root].title
        );

        let mut seen_records = 0;
        self.verify(root, None, None, &mut seen_records)?;
        ensure_invariant!(
            seen_records == self.records,
            STRUCTURE,
            "tree holds {} records but counter says {}",
            seen_records,
            self.records
        );
        Ok(())
    }

    /// Returns the black height of the subtree at `n`, nil counting as one.
    fn verify(
        &self,
        n: NodeId,
        lower: Option<&str>,
        upper: Option<&str>,
        seen_records: &mut usize,
    ) -> IndexResult<usize> {
        let node = &self.nodes[n];
        let title = node.title.as_str();

        ensure_invariant!(
            lower.map_or(true, |lo| title > lo) && upper.map_or(true, |hi| title < hi),
            STRUCTURE,
            "title '{}' breaks in-order key ordering",
            title
        );
        ensure_invariant!(
            !node.bucket.is_empty(),
            STRUCTURE,
            "title '{}' has an empty bucket",
            title
        );
        *seen_records += node.bucket.len();

        let mut heights = [1usize; 2];
        for (slot, child) in [node.left, node.right].into_iter().enumerate() {
            let Some(c) = child else { continue };
            let child_node = &self.nodes[c];

            ensure_invariant!(
                child_node.parent == Some(n),
                STRUCTURE,
                "'{}' does not link back to parent '{}'",
                child_node.title,
                title
            );
            ensure_invariant!(
                !(node.color == Color::Red && child_node.color == Color::Red),
                STRUCTURE,
                "red node '{}' has red child '{}'",
                title,
                child_node.title
            );

            heights[slot] = if slot == 0 {
                self.verify(c, lower, Some(title), seen_records)?
            } else {
                self.verify(c, Some(title), upper, seen_records)?
            };
        }

        ensure_invariant!(
            heights[0] == heights[1],
            STRUCTURE,
            "'{}' has black heights {} and {}",
            title,
            heights[0],
            heights[1]
        );

        let own = usize::from(node.color == Color::Black);
        Ok(heights[0] + own)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> RecordId {
        RecordId::new(n)
    }

    #[test]
    fn test_insert_and_search() {
        let mut tree = TitleTree::new();
        tree.insert("Dune", id(1));
        tree.insert("Emma", id(2));
        tree.insert("Dune", id(3));

        assert_eq!(tree.search("Dune"), &[id(1), id(3)]);
        assert_eq!(tree.search("Emma"), &[id(2)]);
        assert!(tree.search("dune").is_empty());
        assert_eq!(tree.key_count(), 2);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_sorted_inserts_keep_invariants() {
        let mut tree = TitleTree::new();
        for i in 0..200 {
            tree.insert(&format!("title-{:04}", i), id(i));
            tree.check_invariants().unwrap();
        }

        assert_eq!(tree.key_count(), 200);
        assert_eq!(tree.record_count(), 200);
        assert_eq!(tree.search("title-0123"), &[id(123)]);
    }

    #[test]
    fn test_remove_keeps_invariants() {
        let mut tree = TitleTree::new();
        for i in 0..128 {
            tree.insert(&format!("t{:03}", i), id(i));
        }

        for i in (0..128).filter(|i| i % 3 != 1) {
            assert!(tree.remove(&format!("t{:03}", i), id(i)));
            tree.check_invariants().unwrap();
        }

        assert!(tree.search("t000").is_empty());
        assert_eq!(tree.search("t001"), &[id(1)]);
        assert_eq!(tree.key_count(), 43);
    }

    #[test]
    fn test_remove_until_empty() {
        let mut tree = TitleTree::new();
        let titles = ["m", "d", "t", "a", "g", "p", "w", "b", "e"];
        for (i, t) in titles.iter().enumerate() {
            tree.insert(t, id(i as u64));
        }
        for (i, t) in titles.iter().enumerate().rev() {
            assert!(tree.remove(t, id(i as u64)));
            tree.check_invariants().unwrap();
        }
        assert!(tree.is_empty());
    }

    #[test]
    fn test_remove_from_shared_bucket() {
        let mut tree = TitleTree::new();
        tree.insert("Dune", id(1));
        tree.insert("Dune", id(2));

        assert!(tree.remove("Dune", id(1)));
        assert_eq!(tree.search("Dune"), &[id(2)]);
        assert!(!tree.remove("Dune", id(1)));
        assert!(!tree.remove("Missing", id(2)));
    }
}
