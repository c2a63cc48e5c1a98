//! Shared fixture constructors for unit tests in `bookgraph-core`.
//!
//! Integration tests under `crates/bookgraph-core/tests/` keep their own
//! helpers because this module is only compiled for the library's test build.
use crate::graph::TreeNode;
use crate::node_key::NodeKey;
use crate::relation::Relation;

/// Converts `(parent, child)` pairs into relations, preserving order.
pub fn rels<K: Clone>(pairs: &[(K, K)]) -> Vec<Relation<K>> {
    pairs
        .iter()
        .map(|(parent, child)| Relation::new(parent.clone(), child.clone()))
        .collect()
}

/// Shorthand for [`TreeNode::leaf`].
pub fn leaf<K: NodeKey>(id: K) -> TreeNode<K> {
    TreeNode::leaf(id)
}
