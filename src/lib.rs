//! # BTree Index
//!
//! An in-memory B-tree index mapping unique, totally ordered keys to values.
//!
//! ## Architecture
//!
//! - **B-Tree Layer** (`btree`): nodes with split, borrow and sibling merge,
//!   and the tree that handles the root and merging whole trees
//! - **Types** (`types`): tree configuration and the database record
//! - **Database** (`Database`): a record store guarded by a single
//!   reader-writer lock
//!
//! ## Usage
//!
//! ```rust
//! use btree_index::BTree;
//!
//! let mut tree = BTree::with_min_degree(2)?;
//!
//! assert!(tree.insert(10, "ten"));
//! assert!(!tree.insert(10, "again"));
//! assert_eq!(tree.search(&10), Some(&"ten"));
//!
//! tree.insert(5, "five");
//! assert_eq!(tree.inorder(), vec![&"five", &"ten"]);
//!
//! assert!(tree.delete(&10));
//! # Ok::<(), btree_index::IndexError>(())
//! ```

pub mod btree;
pub mod error;
pub mod types;

pub use error::{IndexError, Result};
pub use types::{Record, TreeConfig, DEFAULT_MIN_DEGREE, MIN_DEGREE};

// Re-export main public API
pub use btree::{BTree, OrderedIndex};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Node type for visualization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// Whether this is a leaf node
    pub is_leaf: bool,
    /// Keys in this node
    pub keys: Vec<String>,
    /// Values paired with the keys
    pub values: Vec<String>,
    /// Child nodes (only for interior nodes)
    pub children: Vec<TreeNode>,
}

/// Record store indexed by record id
///
/// All access goes through one reader-writer lock: lookups and listings
/// share it, mutations take it exclusively.
pub struct Database {
    index: RwLock<BTree<i64, Record>>,
}

impl Default for Database {
    fn default() -> Self {
        Self::open(TreeConfig::default())
    }
}

impl Database {
    /// Create an empty database with the given tree configuration
    pub fn open(config: TreeConfig) -> Self {
        Self {
            index: RwLock::new(BTree::with_config(config)),
        }
    }

    /// Create an empty database whose index has minimum degree `t`
    pub fn with_min_degree(min_degree: usize) -> Result<Self> {
        Ok(Self::open(TreeConfig::new(min_degree)?))
    }

    /// Get the index configuration
    pub fn config(&self) -> TreeConfig {
        self.index.read().config()
    }

    /// Insert a record
    ///
    /// Returns false if a record with this id already exists.
    pub fn insert_record(&self, id: i64, data: impl Into<String>) -> bool {
        let record = Record::new(id, data);
        self.index.write().insert(id, record)
    }

    /// Get a record by id
    pub fn find_record(&self, id: i64) -> Option<Record> {
        self.index.read().search(&id).cloned()
    }

    /// Delete a record by id
    ///
    /// Returns true if the record existed and was deleted.
    pub fn delete_record(&self, id: i64) -> bool {
        self.index.write().delete(&id)
    }

    /// All records in ascending id order
    pub fn list_inorder(&self) -> Vec<Record> {
        self.index.read().inorder().into_iter().cloned().collect()
    }

    /// All records, each node's before its children
    pub fn list_preorder(&self) -> Vec<Record> {
        self.index.read().preorder().into_iter().cloned().collect()
    }

    /// All records, each node's after its children
    pub fn list_postorder(&self) -> Vec<Record> {
        self.index.read().postorder().into_iter().cloned().collect()
    }

    /// Move every record of `other` into this database
    ///
    /// Records whose id already exists here keep their current contents.
    pub fn merge(&self, other: Database) -> bool {
        let other = other.index.into_inner();
        self.index.write().merge(other)
    }

    /// Get statistics about the database
    pub fn stats(&self) -> DbStats {
        let index = self.index.read();
        DbStats {
            record_count: index.len(),
            tree_height: index.height(),
            min_degree: index.min_degree(),
        }
    }

    /// Export the index structure for visualization
    pub fn export_tree(&self) -> Option<TreeNode> {
        self.index.read().export_tree()
    }

    /// Export the index structure as pretty-printed JSON
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export_tree())?)
    }

    /// Check the index invariants
    pub fn validate(&self) -> Result<()> {
        self.index.read().validate()
    }
}

/// Database statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DbStats {
    /// Number of stored records
    pub record_count: usize,
    /// Height of the B-tree
    pub tree_height: usize,
    /// Minimum degree of the B-tree
    pub min_degree: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() -> Result<()> {
        let db = Database::with_min_degree(2)?;

        assert!(db.insert_record(1, "first"));
        assert_eq!(db.find_record(1), Some(Record::new(1, "first")));

        // Duplicate ids keep the original record
        assert!(!db.insert_record(1, "second"));
        assert_eq!(db.find_record(1).map(|r| r.data), Some("first".to_string()));

        assert!(db.delete_record(1));
        assert_eq!(db.find_record(1), None);

        assert_eq!(db.find_record(42), None);
        assert!(!db.delete_record(42));
        db.validate()
    }

    #[test]
    fn test_listings() -> Result<()> {
        let db = Database::default();
        for id in [10, 20, 5, 6, 12, 30, 7, 17] {
            db.insert_record(id, format!("Data{}", id));
        }

        let ids = |records: Vec<Record>| records.into_iter().map(|r| r.id).collect::<Vec<_>>();
        assert_eq!(ids(db.list_inorder()), vec![5, 6, 7, 10, 12, 17, 20, 30]);
        assert_eq!(ids(db.list_preorder()), vec![10, 20, 5, 6, 7, 12, 17, 30]);
        assert_eq!(ids(db.list_postorder()), vec![5, 6, 7, 12, 17, 30, 10, 20]);
        assert_eq!(db.list_inorder()[0].to_string(), "ID: 5, Data: Data5");
        db.validate()
    }

    #[test]
    fn test_merge_databases() -> Result<()> {
        let db = Database::default();
        let other = Database::default();
        for id in 0..20 {
            db.insert_record(id, "local");
            other.insert_record(id + 10, "remote");
        }

        assert!(db.merge(other));
        assert_eq!(db.stats().record_count, 30);
        assert_eq!(db.find_record(15).map(|r| r.data), Some("local".to_string()));
        assert_eq!(db.find_record(25).map(|r| r.data), Some("remote".to_string()));
        db.validate()
    }

    #[test]
    fn test_stats_and_export() -> Result<()> {
        let db = Database::with_min_degree(3)?;
        assert_eq!(db.export_tree(), None);
        assert_eq!(db.export_json()?, "null");

        for id in 1..=6 {
            db.insert_record(id, "x");
        }
        let stats = db.stats();
        assert_eq!(stats.record_count, 6);
        assert_eq!(stats.tree_height, 2);
        assert_eq!(stats.min_degree, 3);
        assert_eq!(db.config().max_keys(), 5);

        let tree = db.export_tree().unwrap();
        assert_eq!(tree.keys, vec!["3"]);
        assert_eq!(tree.values, vec!["ID: 3, Data: x"]);

        let json = db.export_json()?;
        let parsed: TreeNode = serde_json::from_str(&json)?;
        assert_eq!(parsed, tree);
        assert!(json.contains("\"isLeaf\": false"));
        Ok(())
    }

    #[test]
    fn test_invalid_degree() {
        assert!(matches!(
            Database::with_min_degree(1),
            Err(IndexError::InvalidMinDegree { min_degree: 1, .. })
        ));
    }
}
