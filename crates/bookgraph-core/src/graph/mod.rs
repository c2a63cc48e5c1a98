//! Forest construction from parent → child relations.
//!
//! A build runs in three stages:
//! 1. **Ingest**: [`ingest`] folds the relation list into a
//!    [`RelationIndex`]: a children index (`parent → [child]`) and a parents
//!    index (`child → [parent]`), both in relation-arrival order.
//! 2. **Root discovery**: [`find_roots`] selects every parent that never
//!    appears as a child anywhere in the snapshot.
//! 3. **Expansion**: [`build`] runs a three-colour depth-first expansion
//!    from each root (see the [`build`](mod@build) submodule). A root whose
//!    expansion meets a back-edge is rejected as a whole; every other root
//!    produces a [`TreeNode`] and contributes to the [`RootsIndex`].
//!
//! The output types live in the [`forest`] submodule.
pub mod build;
pub mod forest;

pub use build::{BuildReport, Color, CycleDetected, VisitMap, build, build_graph, build_tree};
pub use forest::{BookGraph, Forest, RootsIndex, TreeNode, Walk};

use indexmap::IndexMap;

use crate::node_key::NodeKey;
use crate::relation::Relation;

/// `parent → children`, keyed in order of first appearance as a parent.
pub type ChildrenIndex<K> = IndexMap<K, Vec<K>>;

/// `child → parents`, keyed in order of first appearance as a child.
pub type ParentsIndex<K> = IndexMap<K, Vec<K>>;

/// Adjacency in both directions for one relation snapshot.
///
/// Duplicate relations are kept as duplicate list entries; they collapse
/// later because tree children are keyed by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationIndex<K: NodeKey> {
    children: ChildrenIndex<K>,
    parents: ParentsIndex<K>,
}

impl<K: NodeKey> Default for RelationIndex<K> {
    fn default() -> Self {
        Self {
            children: IndexMap::new(),
            parents: IndexMap::new(),
        }
    }
}

impl<K: NodeKey> RelationIndex<K> {
    /// Returns the children index.
    pub fn children(&self) -> &ChildrenIndex<K> {
        &self.children
    }

    /// Returns the parents index.
    pub fn parents(&self) -> &ParentsIndex<K> {
        &self.parents
    }

    /// Returns the children of `node` in relation order.
    ///
    /// Returns an empty slice for nodes that are never a parent.
    pub fn children_of(&self, node: &K) -> &[K] {
        self.children.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the parents of `node` in relation order.
    ///
    /// Returns an empty slice for nodes that are never a child.
    pub fn parents_of(&self, node: &K) -> &[K] {
        self.parents.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns `true` if at least one relation points at `node`.
    pub fn has_parent(&self, node: &K) -> bool {
        self.parents.contains_key(node)
    }

    /// Returns `true` if the snapshot contained no relations.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    fn push(&mut self, relation: &Relation<K>) {
        self.children
            .entry(relation.parent.clone())
            .or_default()
            .push(relation.child.clone());
        self.parents
            .entry(relation.child.clone())
            .or_default()
            .push(relation.parent.clone());
    }
}

/// Folds `relations` into a [`RelationIndex`], preserving input order.
///
/// Never fails; an empty slice yields empty indexes.
pub fn ingest<K: NodeKey>(relations: &[Relation<K>]) -> RelationIndex<K> {
    let mut index = RelationIndex::default();
    for relation in relations {
        index.push(relation);
    }
    index
}

/// Returns every parent in `index` that has no parent of its own.
///
/// The result follows children-index key order, i.e. the order in which the
/// roots first appeared as a parent. Nodes that only ever appear as children
/// are never roots.
pub fn find_roots<K: NodeKey>(index: &RelationIndex<K>) -> Vec<K> {
    index
        .children
        .keys()
        .filter(|node| !index.has_parent(node))
        .cloned()
        .collect()
}
