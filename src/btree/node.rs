//! B-tree node and the structural algorithms that operate on it.
//!
//! A node holds a sorted row of keys, a parallel row of values and, unless
//! it is a leaf, exactly one more child than it has keys. Children are owned
//! directly; there is no parent link; every restructuring happens top-down
//! while descending, so a node only ever touches itself and its children.

use crate::error::{IndexError, Result};
use crate::TreeNode;
use std::fmt::Display;
use std::mem;
use tracing::trace;

/// A variable-fanout B-tree node
#[derive(Debug, Clone)]
pub(crate) struct Node<K, V> {
    /// Strictly increasing keys
    keys: Vec<K>,
    /// `values[i]` belongs to `keys[i]`
    values: Vec<V>,
    /// Empty for leaves, otherwise `keys.len() + 1` subtrees
    children: Vec<Node<K, V>>,
    /// Minimum degree `t`, shared by every node of a tree
    min_degree: usize,
}

impl<K, V> Node<K, V> {
    /// Create an empty node
    pub(crate) fn new(min_degree: usize) -> Self {
        Self {
            keys: Vec::with_capacity(2 * min_degree - 1),
            values: Vec::with_capacity(2 * min_degree - 1),
            children: Vec::new(),
            min_degree,
        }
    }

    /// Create a leaf holding a single entry
    pub(crate) fn leaf(min_degree: usize, key: K, value: V) -> Self {
        let mut node = Self::new(min_degree);
        node.keys.push(key);
        node.values.push(value);
        node
    }

    /// Create an interior node with one separator and two subtrees
    pub(crate) fn branch(key: K, value: V, left: Self, right: Self) -> Self {
        let mut node = Self::new(left.min_degree);
        node.keys.push(key);
        node.values.push(value);
        node.children.push(left);
        node.children.push(right);
        node
    }

    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn value_at(&self, idx: usize) -> Option<&V> {
        self.values.get(idx)
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.keys.len() == self.max_keys()
    }

    fn max_keys(&self) -> usize {
        2 * self.min_degree - 1
    }

    /// Number of levels from this node down to its leaves
    pub(crate) fn height(&self) -> usize {
        1 + self.children.first().map_or(0, Node::height)
    }

    /// Consume an emptied root, keeping its only remaining subtree
    pub(crate) fn into_first_child(self) -> Option<Self> {
        self.children.into_iter().next()
    }

    /// Consume the subtree, returning its entries in key order
    pub(crate) fn into_entries(self) -> Vec<(K, V)> {
        let mut out = Vec::new();
        self.collect_entries(&mut out);
        out
    }

    fn collect_entries(self, out: &mut Vec<(K, V)>) {
        let mut children = self.children.into_iter();
        for entry in self.keys.into_iter().zip(self.values) {
            if let Some(child) = children.next() {
                child.collect_entries(out);
            }
            out.push(entry);
        }
        if let Some(last) = children.next() {
            last.collect_entries(out);
        }
    }

    /// Emit this node's values, then every child left to right
    pub(crate) fn preorder<'a>(&'a self, out: &mut Vec<&'a V>) {
        out.extend(self.values.iter());
        for child in &self.children {
            child.preorder(out);
        }
    }

    /// Emit values in ascending key order
    pub(crate) fn inorder<'a>(&'a self, out: &mut Vec<&'a V>) {
        for (i, value) in self.values.iter().enumerate() {
            if let Some(child) = self.children.get(i) {
                child.inorder(out);
            }
            out.push(value);
        }
        if let Some(last) = self.children.get(self.keys.len()) {
            last.inorder(out);
        }
    }

    /// Emit every child left to right, then this node's values
    pub(crate) fn postorder<'a>(&'a self, out: &mut Vec<&'a V>) {
        for child in &self.children {
            child.postorder(out);
        }
        out.extend(self.values.iter());
    }

    /// Snapshot of the subtree for visualization
    pub(crate) fn export(&self) -> TreeNode
    where
        K: Display,
        V: Display,
    {
        TreeNode {
            is_leaf: self.is_leaf(),
            keys: self.keys.iter().map(ToString::to_string).collect(),
            values: self.values.iter().map(ToString::to_string).collect(),
            children: self.children.iter().map(Node::export).collect(),
        }
    }
}

impl<K: Ord, V> Node<K, V> {
    /// Position of the first key `>= key`
    fn find_index(&self, key: &K) -> usize {
        self.keys.partition_point(|k| k < key)
    }

    /// Find the node holding `key` and the key's slot within it
    pub(crate) fn search(&self, key: &K) -> Option<(&Self, usize)> {
        let idx = self.find_index(key);
        if self.keys.get(idx) == Some(key) {
            return Some((self, idx));
        }
        self.children.get(idx)?.search(key)
    }

    /// Borrow the value stored under `key` mutably
    pub(crate) fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let idx = self.find_index(key);
        if self.keys.get(idx) == Some(key) {
            return self.values.get_mut(idx);
        }
        self.children.get_mut(idx)?.get_mut(key)
    }

    /// Make a new parent above a full root and split the old root under it
    pub(crate) fn split_root(root: Self) -> Self {
        let mut parent = Self::new(root.min_degree);
        parent.children.push(root);
        parent.split_child(0);
        parent
    }

    /// Insert into a node that has room for one more key
    ///
    /// Full children met on the way down are split before descending, so
    /// the recursion never has to push a key back up.
    pub(crate) fn insert_non_full(&mut self, key: K, value: V) {
        assert!(!self.is_full(), "insert_non_full called on a full node");

        let mut idx = self.find_index(&key);
        debug_assert!(self.keys.get(idx) != Some(&key), "duplicate key");

        if self.is_leaf() {
            self.keys.insert(idx, key);
            self.values.insert(idx, value);
            return;
        }

        if self.children[idx].is_full() {
            self.split_child(idx);
            if key > self.keys[idx] {
                idx += 1;
            }
        }
        self.children[idx].insert_non_full(key, value);
    }

    /// Split the full child at `index` around its median
    ///
    /// The upper `t-1` entries (and upper `t` children) move to a new right
    /// sibling, the median moves up into this node at `index`.
    pub(crate) fn split_child(&mut self, index: usize) {
        let t = self.min_degree;
        let full = &mut self.children[index];
        assert_eq!(full.keys.len(), 2 * t - 1, "split_child needs a full child");

        let mut sibling = Self::new(t);
        sibling.keys = full.keys.split_off(t);
        sibling.values = full.values.split_off(t);
        if !full.is_leaf() {
            sibling.children = full.children.split_off(t);
        }

        let median_key = full.keys.pop().expect("full child has a median key");
        let median_value = full.values.pop().expect("full child has a median value");

        self.keys.insert(index, median_key);
        self.values.insert(index, median_value);
        self.children.insert(index + 1, sibling);
        trace!(index, min_degree = t, "split full child");
    }

    /// Remove `key` from the subtree, returning the removed entry
    ///
    /// Every child the search descends into is first topped up to at least
    /// `t` keys, so removing from a leaf never underflows it.
    pub(crate) fn delete(&mut self, key: &K) -> Option<(K, V)> {
        let idx = self.find_index(key);

        if self.keys.get(idx) == Some(key) {
            if self.is_leaf() {
                return Some((self.keys.remove(idx), self.values.remove(idx)));
            }
            return self.delete_internal(idx, key);
        }

        if self.is_leaf() {
            return None;
        }

        let was_last = idx == self.keys.len();
        if self.children[idx].len() < self.min_degree {
            self.rebalance(idx);
        }

        // A merge with the left sibling shifts the target subtree down by one
        if was_last && idx > self.keys.len() {
            self.children[idx - 1].delete(key)
        } else {
            self.children[idx].delete(key)
        }
    }

    fn delete_internal(&mut self, idx: usize, key: &K) -> Option<(K, V)> {
        let t = self.min_degree;

        if self.children[idx].len() >= t {
            let (k, v) = self.take_predecessor(idx)?;
            Some(self.replace_entry(idx, k, v))
        } else if self.children[idx + 1].len() >= t {
            let (k, v) = self.take_successor(idx)?;
            Some(self.replace_entry(idx, k, v))
        } else {
            self.merge_children(idx);
            self.children[idx].delete(key)
        }
    }

    fn replace_entry(&mut self, idx: usize, key: K, value: V) -> (K, V) {
        (
            mem::replace(&mut self.keys[idx], key),
            mem::replace(&mut self.values[idx], value),
        )
    }

    /// Remove and return the largest entry below `children[index]`
    pub(crate) fn take_predecessor(&mut self, index: usize) -> Option<(K, V)> {
        self.children.get_mut(index)?.pop_last()
    }

    /// Remove and return the smallest entry below `children[index + 1]`
    pub(crate) fn take_successor(&mut self, index: usize) -> Option<(K, V)> {
        self.children.get_mut(index + 1)?.pop_first()
    }

    fn pop_last(&mut self) -> Option<(K, V)> {
        if self.is_leaf() {
            let key = self.keys.pop()?;
            let value = self.values.pop()?;
            return Some((key, value));
        }

        let last = self.children.len() - 1;
        if self.children[last].len() < self.min_degree {
            self.rebalance(last);
        }
        self.children.last_mut()?.pop_last()
    }

    fn pop_first(&mut self) -> Option<(K, V)> {
        if self.is_leaf() {
            if self.keys.is_empty() {
                return None;
            }
            return Some((self.keys.remove(0), self.values.remove(0)));
        }

        if self.children[0].len() < self.min_degree {
            self.rebalance(0);
        }
        self.children.first_mut()?.pop_first()
    }

    /// Bring the undersized child at `index` up to at least `t` keys
    ///
    /// Borrows through the parent from a sibling with a spare key, left
    /// first; otherwise merges with whichever sibling exists.
    pub(crate) fn rebalance(&mut self, index: usize) {
        let t = self.min_degree;

        if index > 0 && self.children[index - 1].len() >= t {
            self.borrow_from_prev(index);
        } else if index < self.keys.len() && self.children[index + 1].len() >= t {
            self.borrow_from_next(index);
        } else if index < self.keys.len() {
            self.merge_children(index);
        } else {
            self.merge_children(index - 1);
        }
    }

    fn borrow_from_prev(&mut self, index: usize) {
        let (left, right) = self.children.split_at_mut(index);
        let sibling = &mut left[index - 1];
        let child = &mut right[0];
        assert!(
            sibling.keys.len() >= self.min_degree,
            "borrow from a left sibling without a spare key"
        );

        let key = sibling.keys.pop().expect("left sibling has a spare key");
        let value = sibling.values.pop().expect("left sibling has a spare value");
        child
            .keys
            .insert(0, mem::replace(&mut self.keys[index - 1], key));
        child
            .values
            .insert(0, mem::replace(&mut self.values[index - 1], value));

        if let Some(grandchild) = sibling.children.pop() {
            child.children.insert(0, grandchild);
        }
        trace!(index, "borrowed from left sibling");
    }

    fn borrow_from_next(&mut self, index: usize) {
        let (left, right) = self.children.split_at_mut(index + 1);
        let child = &mut left[index];
        let sibling = &mut right[0];
        assert!(
            sibling.keys.len() >= self.min_degree,
            "borrow from a right sibling without a spare key"
        );

        let key = sibling.keys.remove(0);
        let value = sibling.values.remove(0);
        child.keys.push(mem::replace(&mut self.keys[index], key));
        child.values.push(mem::replace(&mut self.values[index], value));

        if !sibling.children.is_empty() {
            child.children.push(sibling.children.remove(0));
        }
        trace!(index, "borrowed from right sibling");
    }

    /// Fold `keys[index]` and `children[index + 1]` into `children[index]`
    pub(crate) fn merge_children(&mut self, index: usize) {
        let merged_len = self.children[index].len() + 1 + self.children[index + 1].len();
        assert!(
            merged_len <= self.max_keys(),
            "sibling merge would overflow: {} keys",
            merged_len
        );

        let right = self.children.remove(index + 1);
        let separator_key = self.keys.remove(index);
        let separator_value = self.values.remove(index);

        let left = &mut self.children[index];
        left.keys.push(separator_key);
        left.values.push(separator_value);
        left.keys.extend(right.keys);
        left.values.extend(right.values);
        left.children.extend(right.children);
        trace!(index, merged_len, "merged sibling nodes");
    }

    /// Join another leaf row into this one in key order
    ///
    /// Keys already present here are kept and the other row's entry for
    /// them is dropped. Returns how many entries were added. The row may
    /// exceed `2t-1` keys afterwards; see [`Node::split_overflow`].
    pub(crate) fn splice(&mut self, other: Self) -> usize {
        assert!(
            self.is_leaf() && other.is_leaf(),
            "splice only joins leaf rows"
        );

        let mut added = 0;
        for (key, value) in other.keys.into_iter().zip(other.values) {
            let idx = self.find_index(&key);
            if self.keys.get(idx) == Some(&key) {
                continue;
            }
            self.keys.insert(idx, key);
            self.values.insert(idx, value);
            added += 1;
        }
        trace!(added, len = self.keys.len(), "spliced leaf rows");
        added
    }

    /// Split an overflowing row in two, returning the promoted median and
    /// the new right half for the caller to link in above
    pub(crate) fn split_overflow(&mut self) -> Option<(K, V, Self)> {
        let len = self.keys.len();
        if len <= self.max_keys() {
            return None;
        }
        assert!(
            len <= 2 * self.max_keys(),
            "row of {} keys cannot be split into two legal nodes",
            len
        );

        let mid = len / 2;
        let mut right = Self::new(self.min_degree);
        right.keys = self.keys.split_off(mid + 1);
        right.values = self.values.split_off(mid + 1);
        if !self.is_leaf() {
            right.children = self.children.split_off(mid + 1);
        }

        let key = self.keys.pop()?;
        let value = self.values.pop()?;
        trace!(len, mid, "split overflowing row");
        Some((key, value, right))
    }

    /// Check invariants for this subtree, returning the depth of its leaves
    ///
    /// `lower` and `upper` are the exclusive key bounds imposed by the
    /// separators above this node.
    pub(crate) fn validate(
        &self,
        is_root: bool,
        lower: Option<&K>,
        upper: Option<&K>,
    ) -> Result<usize> {
        let t = self.min_degree;
        let len = self.keys.len();

        if self.values.len() != len {
            return Err(IndexError::corruption(format!(
                "node has {} keys but {} values",
                len,
                self.values.len()
            )));
        }
        if len > self.max_keys() {
            return Err(IndexError::corruption(format!(
                "node has {} keys (max: {})",
                len,
                self.max_keys()
            )));
        }
        if !is_root && len < t - 1 {
            return Err(IndexError::corruption(format!(
                "non-root node has {} keys (min: {})",
                len,
                t - 1
            )));
        }
        if !self.is_leaf() && self.children.len() != len + 1 {
            return Err(IndexError::corruption(format!(
                "node has {} keys but {} children",
                len,
                self.children.len()
            )));
        }
        if !self.keys.windows(2).all(|pair| pair[0] < pair[1]) {
            return Err(IndexError::corruption("keys are not strictly increasing"));
        }
        if let (Some(lo), Some(first)) = (lower, self.keys.first()) {
            if first <= lo {
                return Err(IndexError::corruption("key not above its left separator"));
            }
        }
        if let (Some(hi), Some(last)) = (upper, self.keys.last()) {
            if last >= hi {
                return Err(IndexError::corruption("key not below its right separator"));
            }
        }

        let mut leaf_depth = None;
        for (i, child) in self.children.iter().enumerate() {
            if child.min_degree != t {
                return Err(IndexError::corruption(format!(
                    "child has minimum degree {} under a node of degree {}",
                    child.min_degree, t
                )));
            }
            let lo = if i == 0 { lower } else { self.keys.get(i - 1) };
            let hi = if i < len { self.keys.get(i) } else { upper };
            let depth = child.validate(false, lo, hi)?;
            match leaf_depth {
                None => leaf_depth = Some(depth),
                Some(expected) if expected != depth => {
                    return Err(IndexError::corruption(format!(
                        "leaves at depths {} and {}",
                        expected, depth
                    )));
                }
                Some(_) => {}
            }
        }

        Ok(1 + leaf_depth.unwrap_or(0))
    }
}
