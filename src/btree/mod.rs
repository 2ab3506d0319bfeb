//! B-tree implementation.
//!
//! This module provides an in-memory B-tree that supports:
//! - Point lookups (search)
//! - Insertions (insert)
//! - Deletions (delete)
//! - Pre-, in- and post-order traversals
//! - Merging two trees

mod index;
mod node;
mod tree;

pub use index::OrderedIndex;
pub use tree::BTree;
