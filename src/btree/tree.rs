//! B-tree core implementation.
//!
//! This module provides the main BTree struct with operations for:
//! - insert: Insertions that keep the first value written for a key
//! - search: Point lookups
//! - delete: Removals with top-down rebalancing
//! - preorder/inorder/postorder: Full traversals
//! - merge: Union of two trees

use crate::btree::node::Node;
use crate::error::{IndexError, Result};
use crate::types::TreeConfig;
use crate::TreeNode;
use std::fmt::Display;
use tracing::debug;

/// An in-memory B-tree mapping unique keys to values
#[derive(Debug, Clone)]
pub struct BTree<K, V> {
    /// Root node (None means empty tree)
    root: Option<Node<K, V>>,
    /// Branching parameters shared by every node
    config: TreeConfig,
    /// Number of stored entries
    len: usize,
}

impl<K, V> Default for BTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> BTree<K, V> {
    /// Create an empty tree with the default minimum degree
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    /// Create an empty tree with the given configuration
    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            root: None,
            config,
            len: 0,
        }
    }

    /// Create an empty tree with minimum degree `t`
    pub fn with_min_degree(min_degree: usize) -> Result<Self> {
        Ok(Self::with_config(TreeConfig::new(min_degree)?))
    }

    /// Get the tree configuration
    pub fn config(&self) -> TreeConfig {
        self.config
    }

    /// Get the minimum degree `t`
    pub fn min_degree(&self) -> usize {
        self.config.min_degree()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the height of the tree (0 when empty)
    pub fn height(&self) -> usize {
        self.root.as_ref().map_or(0, Node::height)
    }

    /// Values with each node's entries before its children
    pub fn preorder(&self) -> Vec<&V> {
        let mut out = Vec::with_capacity(self.len);
        if let Some(root) = &self.root {
            root.preorder(&mut out);
        }
        out
    }

    /// Values in ascending key order
    pub fn inorder(&self) -> Vec<&V> {
        let mut out = Vec::with_capacity(self.len);
        if let Some(root) = &self.root {
            root.inorder(&mut out);
        }
        out
    }

    /// Values with every child's entries before the node's own
    pub fn postorder(&self) -> Vec<&V> {
        let mut out = Vec::with_capacity(self.len);
        if let Some(root) = &self.root {
            root.postorder(&mut out);
        }
        out
    }

    /// Consume the tree, returning its entries in ascending key order
    pub fn into_entries(self) -> Vec<(K, V)> {
        self.root.map_or_else(Vec::new, Node::into_entries)
    }

    /// Export the node structure for visualization
    pub fn export_tree(&self) -> Option<TreeNode>
    where
        K: Display,
        V: Display,
    {
        self.root.as_ref().map(Node::export)
    }
}

impl<K: Ord, V> BTree<K, V> {
    /// Insert a key-value pair
    ///
    /// Returns false, leaving the tree untouched, if the key is already
    /// present: the first value written for a key wins.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        if self.contains_key(&key) {
            return false;
        }

        let root = match self.root.take() {
            None => Node::leaf(self.config.min_degree(), key, value),
            Some(root) if root.is_full() => {
                let mut root = Node::split_root(root);
                debug!(height = root.height(), "split full root");
                root.insert_non_full(key, value);
                root
            }
            Some(mut root) => {
                root.insert_non_full(key, value);
                root
            }
        };

        self.root = Some(root);
        self.len += 1;
        true
    }

    /// Look up a key and return its value
    pub fn search(&self, key: &K) -> Option<&V> {
        let (node, idx) = self.root.as_ref()?.search(key)?;
        node.value_at(idx)
    }

    /// Look up a key and return its value for in-place update
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.root.as_mut()?.get_mut(key)
    }

    /// Check if a key exists
    pub fn contains_key(&self, key: &K) -> bool {
        self.search(key).is_some()
    }

    /// Delete a key from the tree
    ///
    /// Returns true if the key was found and deleted.
    pub fn delete(&mut self, key: &K) -> bool {
        self.remove(key).is_some()
    }

    /// Delete a key, returning the value it held
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let root = self.root.as_mut()?;
        let removed = root.delete(key);

        // Rebalancing on the way down can drain the root even when the key
        // turns out to be missing
        if root.len() == 0 {
            let emptied = self.root.take();
            self.root = emptied.and_then(Node::into_first_child);
            debug!(height = self.height(), "collapsed empty root");
        }

        let (_, value) = removed?;
        self.len -= 1;
        Some(value)
    }

    /// Merge another tree into this one
    ///
    /// Afterwards this tree holds every entry of both. On a key present in
    /// both trees the entry already held here is kept. Two leaf roots are
    /// spliced row to row; anything deeper is rebuilt by inserting the
    /// smaller tree's entries into the larger one.
    pub fn merge(&mut self, mut other: BTree<K, V>) -> bool {
        let Some(other_root) = other.root.take() else {
            return true;
        };

        if self.config != other.config {
            debug!(entries = other.len, "merging trees of different degree");
            self.insert_all(other_root.into_entries());
            return true;
        }

        if self.root.is_none() {
            debug!(entries = other.len, "adopting merged tree");
            self.root = Some(other_root);
            self.len = other.len;
            return true;
        }

        if let Some(root) = self.root.as_mut() {
            if root.is_leaf() && other_root.is_leaf() {
                self.len += root.splice(other_root);
                if let Some((key, value, right)) = root.split_overflow() {
                    if let Some(left) = self.root.take() {
                        self.root = Some(Node::branch(key, value, left, right));
                        debug!("split spliced root");
                    }
                }
                return true;
            }
        }

        if other.len > self.len {
            debug!(mine = self.len, theirs = other.len, "rebuilding into merged tree");
            let mine = self.root.replace(other_root);
            self.len = other.len;
            for (key, value) in mine.map_or_else(Vec::new, Node::into_entries) {
                self.upsert(key, value);
            }
        } else {
            debug!(mine = self.len, theirs = other.len, "rebuilding merged entries");
            self.insert_all(other_root.into_entries());
        }
        true
    }

    fn insert_all(&mut self, entries: Vec<(K, V)>) {
        for (key, value) in entries {
            self.insert(key, value);
        }
    }

    fn upsert(&mut self, key: K, value: V) {
        if let Some(slot) = self.get_mut(&key) {
            *slot = value;
        } else {
            self.insert(key, value);
        }
    }

    /// Check every B-tree invariant, reporting the first violation found
    pub fn validate(&self) -> Result<()> {
        if let Some(root) = &self.root {
            root.validate(true, None, None)?;
        }
        let counted = self.inorder().len();
        if counted != self.len {
            return Err(IndexError::corruption(format!(
                "tree reports {} entries but holds {}",
                self.len, counted
            )));
        }
        Ok(())
    }
}
