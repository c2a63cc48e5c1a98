//! Output types of a forest build and the read-only queries over them.
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::node_key::NodeKey;

/// `root → tree`, in root processing order.
pub type Forest<K> = IndexMap<K, TreeNode<K>>;

/// `node → roots that reach it`, each set in root processing order.
pub type RootsIndex<K> = IndexMap<K, IndexSet<K>>;

/// One node of a built tree.
///
/// Every occurrence of a node under a root is its own owned value; a node
/// shared by two roots is duplicated, not referenced.
///
/// Serialized form omits absent fields:
/// `{"id": 1, "children": {"2": {"id": 2}}, "nodes": [1, 2]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(serialize = "K: Serialize", deserialize = "K: Deserialize<'de>"))]
pub struct TreeNode<K: NodeKey> {
    id: K,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<IndexMap<K, TreeNode<K>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nodes: Option<Vec<K>>,
}

impl<K: NodeKey> TreeNode<K> {
    /// Creates a node with no children and no visit list.
    pub fn leaf(id: K) -> Self {
        Self {
            id,
            children: None,
            nodes: None,
        }
    }

    pub(crate) fn from_parts(
        id: K,
        children: IndexMap<K, TreeNode<K>>,
        nodes: Option<Vec<K>>,
    ) -> Self {
        Self {
            id,
            children: (!children.is_empty()).then_some(children),
            nodes,
        }
    }

    /// Appends `child`, replacing an existing child with the same id in place.
    #[must_use]
    pub fn with_child(mut self, child: TreeNode<K>) -> Self {
        self.children
            .get_or_insert_with(IndexMap::new)
            .insert(child.id.clone(), child);
        self
    }

    /// Sets the visit list carried by a root node.
    #[must_use]
    pub fn with_nodes(mut self, nodes: Vec<K>) -> Self {
        self.nodes = Some(nodes);
        self
    }

    /// The node's identifier.
    pub fn id(&self) -> &K {
        &self.id
    }

    /// The keyed children map, or `None` for a leaf.
    pub fn children(&self) -> Option<&IndexMap<K, TreeNode<K>>> {
        self.children.as_ref()
    }

    /// Iterates over the direct children in order.
    pub fn child_nodes(&self) -> impl DoubleEndedIterator<Item = &TreeNode<K>> {
        self.children.iter().flat_map(IndexMap::values)
    }

    /// Looks up a direct child by id.
    pub fn child(&self, id: &K) -> Option<&TreeNode<K>> {
        self.children.as_ref().and_then(|c| c.get(id))
    }

    /// Returns `true` if the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// The ids visited while building this tree, in first-visit order.
    ///
    /// Present only on a tree's root node.
    pub fn nodes(&self) -> Option<&[K]> {
        self.nodes.as_deref()
    }

    /// Number of edges on the longest downward path from this node.
    pub fn depth(&self) -> usize {
        self.walk().map(|(depth, _)| depth).max().unwrap_or(0)
    }

    /// Pre-order traversal yielding `(depth, node)` pairs, starting with
    /// `(0, self)`.
    pub fn walk(&self) -> Walk<'_, K> {
        Walk {
            stack: vec![(0, self)],
        }
    }
}

impl<K: NodeKey> Drop for TreeNode<K> {
    // Detaches descendants onto a heap stack so a long chain is not dropped
    // through one nested call per level.
    fn drop(&mut self) {
        let Some(children) = self.children.take() else {
            return;
        };
        let mut pending: Vec<TreeNode<K>> = children.into_values().collect();
        while let Some(mut node) = pending.pop() {
            if let Some(grandchildren) = node.children.take() {
                pending.extend(grandchildren.into_values());
            }
        }
    }
}

/// Pre-order iterator returned by [`TreeNode::walk`].
#[derive(Debug)]
pub struct Walk<'a, K: NodeKey> {
    stack: Vec<(usize, &'a TreeNode<K>)>,
}

impl<'a, K: NodeKey> Iterator for Walk<'a, K> {
    type Item = (usize, &'a TreeNode<K>);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.child_nodes().rev().map(|c| (depth + 1, c)));
        Some((depth, node))
    }
}

/// The result of one forest build: the trees and the reverse roots index.
///
/// This is the value held by a [`Book`](crate::book::Book) and written to its
/// cache store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(serialize = "K: Serialize", deserialize = "K: Deserialize<'de>"))]
pub struct BookGraph<K: NodeKey> {
    trees: Forest<K>,
    roots: RootsIndex<K>,
}

impl<K: NodeKey> Default for BookGraph<K> {
    fn default() -> Self {
        Self {
            trees: IndexMap::new(),
            roots: IndexMap::new(),
        }
    }
}

impl<K: NodeKey> BookGraph<K> {
    pub(crate) fn new(trees: Forest<K>, roots: RootsIndex<K>) -> Self {
        Self { trees, roots }
    }

    /// Returns the forest, optionally restricted to the roots in `filter`.
    ///
    /// Ids in `filter` without a tree are ignored. The result keeps forest
    /// order regardless of the order of `filter`.
    pub fn trees(&self, filter: Option<&[K]>) -> Forest<K> {
        match filter {
            None => self.trees.clone(),
            Some(wanted) => self
                .trees
                .iter()
                .filter(|(root, _)| wanted.contains(root))
                .map(|(root, tree)| (root.clone(), tree.clone()))
                .collect(),
        }
    }

    /// Borrows the full forest.
    pub fn forest(&self) -> &Forest<K> {
        &self.trees
    }

    /// Returns the tree rooted at `root`, if one was built.
    pub fn tree(&self, root: &K) -> Option<&TreeNode<K>> {
        self.trees.get(root)
    }

    /// Borrows the full roots index.
    pub fn roots(&self) -> &RootsIndex<K> {
        &self.roots
    }

    /// Returns the roots that reach `node`.
    ///
    /// `None` for roots themselves and for nodes outside every valid tree.
    pub fn roots_of(&self, node: &K) -> Option<&IndexSet<K>> {
        self.roots.get(node)
    }

    /// Number of trees in the forest.
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Returns `true` if no tree was built.
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}
