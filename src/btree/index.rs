//! Ordered index abstraction.
//!
//! The point operations every ordered key-value structure offers, so that
//! callers comparing structures can be written once and monomorphized per
//! implementation instead of inspecting types at runtime.

use crate::btree::BTree;
use std::collections::btree_map::{BTreeMap, Entry};

/// Ordered key-value index with first-write-wins insertion
pub trait OrderedIndex<K, V> {
    /// Insert a pair; returns false and keeps the old value if `key` exists
    fn insert(&mut self, key: K, value: V) -> bool;

    /// Look up the value stored under `key`
    fn search(&self, key: &K) -> Option<&V>;

    /// Remove `key`; returns true if it was present
    fn delete(&mut self, key: &K) -> bool;

    /// Number of stored entries
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Ord, V> OrderedIndex<K, V> for BTree<K, V> {
    fn insert(&mut self, key: K, value: V) -> bool {
        BTree::insert(self, key, value)
    }

    fn search(&self, key: &K) -> Option<&V> {
        BTree::search(self, key)
    }

    fn delete(&mut self, key: &K) -> bool {
        BTree::delete(self, key)
    }

    fn len(&self) -> usize {
        BTree::len(self)
    }
}

impl<K: Ord, V> OrderedIndex<K, V> for BTreeMap<K, V> {
    fn insert(&mut self, key: K, value: V) -> bool {
        match self.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    fn search(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    fn delete(&mut self, key: &K) -> bool {
        self.remove(key).is_some()
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }
}
