//! Separately chained hash index over tagged keys.
//!
//! The slot count is fixed at construction. Hashing uses `DefaultHasher`
//! with its fixed default keys, so slot assignment is identical across runs.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use super::errors::{ensure_invariant, IndexResult};
use crate::record::RecordId;

const STRUCTURE: &str = "hash_index";

/// Default number of slots
pub const DEFAULT_HASH_SLOTS: usize = 101;

/// Key dimension for the hash index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum HashKey {
    Title(String),
    Genre(String),
    Year(i32),
}

impl fmt::Display for HashKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashKey::Title(t) => write!(f, "title:{}", t),
            HashKey::Genre(g) => write!(f, "genre:{}", g),
            HashKey::Year(y) => write!(f, "year:{}", y),
        }
    }
}

#[derive(Debug, Clone)]
struct ChainEntry<K> {
    key: K,
    bucket: Vec<RecordId>,
}

/// Occupancy figures for a hash index
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HashStats {
    pub slots: usize,
    pub entries: usize,
    pub load_factor: f64,
    pub longest_chain: usize,
    pub empty_slots: usize,
}

#[derive(Debug, Clone)]
pub struct HashIndex<K = HashKey> {
    slots: Vec<Vec<ChainEntry<K>>>,
    entries: usize,
}

impl<K: Hash + Eq + Clone> Default for HashIndex<K> {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_SLOTS)
    }
}

impl<K: Hash + Eq + Clone> HashIndex<K> {
    /// Creates an index with `slots` chains. A zero count is raised to one.
    pub fn new(slots: usize) -> Self {
        let slots = slots.max(1);
        Self {
            slots: (0..slots).map(|_| Vec::new()).collect(),
            entries: 0,
        }
    }

    fn slot_of(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.slots.len() as u64) as usize
    }

    /// Appends `id` to `key`'s entry, creating the entry at the end of its
    /// chain.
    pub fn insert(&mut self, key: K, id: RecordId) {
        let slot = self.slot_of(&key);
        let chain = &mut self.slots[slot];

        match chain.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => entry.bucket.push(id),
            None => {
                chain.push(ChainEntry {
                    key,
                    bucket: vec![id],
                });
                self.entries += 1;
            }
        }
    }

    pub fn search(&self, key: &K) -> &[RecordId] {
        self.slots[self.slot_of(key)]
            .iter()
            .find(|entry| entry.key == *key)
            .map(|entry| entry.bucket.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, key: &K) -> bool {
        !self.search(key).is_empty()
    }

    /// Removes one id; the entry is unlinked when its bucket empties.
    pub fn remove(&mut self, key: &K, id: RecordId) -> bool {
        let slot = self.slot_of(key);
        let chain = &mut self.slots[slot];

        let Some(pos) = chain.iter().position(|entry| entry.key == *key) else {
            return false;
        };
        let bucket = &mut chain[pos].bucket;
        let Some(at) = bucket.iter().position(|&x| x == id) else {
            return false;
        };
        bucket.remove(at);

        if bucket.is_empty() {
            chain.remove(pos);
            self.entries -= 1;
        }
        true
    }

    /// Unlinks the whole entry for `key`.
    pub fn delete(&mut self, key: &K) -> bool {
        let slot = self.slot_of(key);
        let chain = &mut self.slots[slot];

        match chain.iter().position(|entry| entry.key == *key) {
            Some(pos) => {
                chain.remove(pos);
                self.entries -= 1;
                true
            }
            None => false,
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Distinct keys per slot
    pub fn load_factor(&self) -> f64 {
        self.entries as f64 / self.slots.len() as f64
    }

    pub fn longest_chain(&self) -> usize {
        self.slots.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn stats(&self) -> HashStats {
        HashStats {
            slots: self.slots.len(),
            entries: self.entries,
            load_factor: self.load_factor(),
            longest_chain: self.longest_chain(),
            empty_slots: self.slots.iter().filter(|chain| chain.is_empty()).count(),
        }
    }

    /// Verifies the entry count, that every entry sits in its key's slot,
    /// and that no entry is kept with an empty bucket.
    pub fn check_invariants(&self) -> IndexResult<()> {
        let mut chained = 0;

        for (slot, chain) in self.slots.iter().enumerate() {
            for entry in chain {
                chained += 1;
                let home = self.slot_of(&entry.key);
                ensure_invariant!(
                    home == slot,
                    STRUCTURE,
                    "entry filed in slot {} hashes to slot {}",
                    slot,
                    home
                );
                ensure_invariant!(
                    !entry.bucket.is_empty(),
                    STRUCTURE,
                    "slot {} keeps an entry with an empty bucket",
                    slot
                );
            }
        }

        ensure_invariant!(
            chained == self.entries,
            STRUCTURE,
            "{} chained entries but {} counted",
            chained,
            self.entries
        );
        Ok(())
    }
}
