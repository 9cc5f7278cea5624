//! Slot arena for tree and trie nodes.
//!
//! Nodes refer to each other by `NodeId` instead of owning pointers, which
//! keeps rotations and parent links free of aliasing. Freed slots are
//! recycled through a free list, so a `NodeId` is only stable while its
//! node is alive.

use std::ops::{Index, IndexMut};

/// Handle to a node stored in an `Arena`
pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<NodeId>,
    live: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Stores `value` and returns its handle, reusing a freed slot if any.
    pub fn alloc(&mut self, value: T) -> NodeId {
        self.live += 1;
        match self.free.pop() {
            Some(id) => {
                self.slots[id] = Some(value);
                id
            }
            None => {
                self.slots.push(Some(value));
                self.slots.len() - 1
            }
        }
    }

    /// Removes the node at `id`, returning it. Freeing twice returns `None`.
    pub fn free(&mut self, id: NodeId) -> Option<T> {
        let value = self.slots.get_mut(id)?.take()?;
        self.free.push(id);
        self.live -= 1;
        Some(value)
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.slots.get(id).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.slots.get_mut(id).and_then(Option::as_mut)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
    }
}

impl<T> Index<NodeId> for Arena<T> {
    type Output = T;

    fn index(&self, id: NodeId) -> &T {
        match self.get(id) {
            Some(node) => node,
            None => panic!("arena node {} is not live", id),
        }
    }
}

impl<T> IndexMut<NodeId> for Arena<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut T {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("arena node {} is not live", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_and_index() {
        let mut arena = Arena::new();
        let a = arena.alloc("a");
        let b = arena.alloc("b");

        assert_eq!(arena[a], "a");
        assert_eq!(arena[b], "b");
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_free_recycles_slot() {
        let mut arena = Arena::new();
        let a = arena.alloc(1);
        let _b = arena.alloc(2);

        assert_eq!(arena.free(a), Some(1));
        assert_eq!(arena.free(a), None);
        assert!(arena.get(a).is_none());

        let c = arena.alloc(3);
        assert_eq!(c, a);
        assert_eq!(arena[c], 3);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    #[should_panic(expected = "not live")]
    fn test_index_freed_slot_panics() {
        let mut arena = Arena::new();
        let a = arena.alloc(1);
        arena.free(a);
        let _ = arena[a];
    }
}
