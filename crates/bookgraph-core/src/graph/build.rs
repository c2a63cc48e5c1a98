//! Per-root depth-first expansion with three-colour cycle detection.
//!
//! Each root gets its own [`VisitMap`], created by [`build`] and threaded by
//! `&mut` through every recursive [`build_tree`] call for that root:
//!
//! - absent: white, not yet reached from this root;
//! - [`Color::Gray`]: on the active path;
//! - [`Color::Black`]: fully expanded.
//!
//! Reaching a gray node is a back-edge and rejects the whole root. Reaching
//! a black node (a second path to an already expanded descendant) is legal
//! and expands it again as an independent subtree copy.
//!
//! Roots-index entries for a root are committed only after its expansion
//! succeeds, from the root's visit map, so a rejected root leaves no trace in
//! the output.
use std::fmt;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::graph::forest::{BookGraph, Forest, RootsIndex, TreeNode};
use crate::graph::{RelationIndex, find_roots, ingest};
use crate::node_key::NodeKey;
use crate::relation::Relation;

/// Traversal state of a node reached from the current root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// On the active DFS path.
    Gray,
    /// Expansion finished.
    Black,
}

/// Visit state for one root's traversal, in first-visit order.
pub type VisitMap<K> = IndexMap<K, Color>;

/// A back-edge found while expanding `root`.
///
/// `node` is the gray node that was re-entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleDetected<K> {
    /// The root whose tree was rejected.
    pub root: K,
    /// The node whose re-entry closed the cycle.
    pub node: K,
}

impl<K: fmt::Debug> fmt::Display for CycleDetected<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cycle through {:?} while expanding root {:?}",
            self.node, self.root
        )
    }
}

impl<K: fmt::Debug> std::error::Error for CycleDetected<K> {}

/// A built graph together with the roots rejected for containing a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport<K: NodeKey> {
    /// Trees of every accepted root and their roots index.
    pub graph: BookGraph<K>,
    /// One entry per rejected root, in root processing order.
    pub cycles: Vec<CycleDetected<K>>,
}

/// Expands `node` beneath `root`.
///
/// Blank child ids are skipped. A child that fails propagates its
/// [`CycleDetected`] immediately; no partial tree is returned. When
/// `node == root` the returned node carries the visit list.
///
/// The expansion keeps its own stack of open nodes, so chain length is
/// bounded by memory rather than by the thread's call stack.
///
/// # Errors
///
/// Returns [`CycleDetected`] if `node`, or any descendant, is re-entered
/// while gray.
pub fn build_tree<K: NodeKey>(
    index: &RelationIndex<K>,
    node: &K,
    root: &K,
    visited: &mut VisitMap<K>,
) -> Result<TreeNode<K>, CycleDetected<K>> {
    let mut current = Frame::enter(index, node, root, visited)?;
    let mut open: Vec<Frame<'_, K>> = Vec::new();

    loop {
        if let Some(child) = current.pending.find(|child| !child.is_blank()) {
            let entered = Frame::enter(index, child, root, visited)?;
            open.push(std::mem::replace(&mut current, entered));
            continue;
        }

        let tree = current.finish(root, visited);
        match open.pop() {
            Some(mut parent) => {
                parent.children.insert(tree.id().clone(), tree);
                current = parent;
            }
            None => return Ok(tree),
        }
    }
}

/// A gray node whose children are still being expanded.
struct Frame<'a, K: NodeKey> {
    id: K,
    pending: std::slice::Iter<'a, K>,
    children: IndexMap<K, TreeNode<K>>,
}

impl<'a, K: NodeKey> Frame<'a, K> {
    fn enter(
        index: &'a RelationIndex<K>,
        node: &K,
        root: &K,
        visited: &mut VisitMap<K>,
    ) -> Result<Self, CycleDetected<K>> {
        if visited.get(node) == Some(&Color::Gray) {
            return Err(CycleDetected {
                root: root.clone(),
                node: node.clone(),
            });
        }
        visited.insert(node.clone(), Color::Gray);
        Ok(Self {
            id: node.clone(),
            pending: index.children_of(node).iter(),
            children: IndexMap::new(),
        })
    }

    fn finish(self, root: &K, visited: &mut VisitMap<K>) -> TreeNode<K> {
        visited.insert(self.id.clone(), Color::Black);
        let nodes = (self.id == *root).then(|| visited.keys().cloned().collect());
        TreeNode::from_parts(self.id, self.children, nodes)
    }
}

/// Builds the forest and roots index for `relations`.
///
/// Roots are processed in order of first appearance as a parent. Rejected
/// roots are reported in [`BuildReport::cycles`] and logged at `warn`.
pub fn build<K: NodeKey>(relations: &[Relation<K>]) -> BuildReport<K> {
    let index = ingest(relations);
    let roots = find_roots(&index);
    debug!(
        relations = relations.len(),
        parents = index.children().len(),
        roots = roots.len(),
        "relation index built"
    );

    let mut trees = Forest::new();
    let mut roots_index = RootsIndex::new();
    let mut cycles = Vec::new();

    for root in roots {
        let mut visited = VisitMap::new();
        match build_tree(&index, &root, &root, &mut visited) {
            Ok(tree) => {
                for node in visited.keys().filter(|node| **node != root) {
                    roots_index
                        .entry(node.clone())
                        .or_default()
                        .insert(root.clone());
                }
                trees.insert(root, tree);
            }
            Err(cycle) => {
                warn!(root = ?cycle.root, node = ?cycle.node, "cycle detected, root excluded");
                cycles.push(cycle);
            }
        }
    }

    debug!(
        trees = trees.len(),
        indexed_nodes = roots_index.len(),
        rejected = cycles.len(),
        "forest built"
    );

    BuildReport {
        graph: BookGraph::new(trees, roots_index),
        cycles,
    }
}

/// Builds the forest for `relations`, discarding the list of rejected roots.
pub fn build_graph<K: NodeKey>(relations: &[Relation<K>]) -> BookGraph<K> {
    build(relations).graph
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use indexmap::IndexSet;

    use super::*;
    use crate::test_helpers::{leaf, rels};

    fn set<K: NodeKey>(items: &[K]) -> IndexSet<K> {
        items.iter().cloned().collect()
    }

    // -----------------------------------------------------------------------
    // build_tree
    // -----------------------------------------------------------------------

    #[test]
    fn build_tree_marks_everything_black() {
        let index = ingest(&rels(&[(1, 2), (2, 3), (1, 4)]));
        let mut visited = VisitMap::new();
        build_tree(&index, &1, &1, &mut visited).expect("acyclic");
        let order: Vec<i32> = visited.keys().copied().collect();
        assert_eq!(order, vec![1, 2, 3, 4]);
        assert!(visited.values().all(|c| *c == Color::Black));
    }

    #[test]
    fn build_tree_below_root_has_no_nodes_list() {
        let index = ingest(&rels(&[(1, 2), (2, 3)]));
        let mut visited = VisitMap::new();
        let sub = build_tree(&index, &2, &1, &mut visited).expect("acyclic");
        assert!(sub.nodes().is_none());
        assert_eq!(sub, leaf(2).with_child(leaf(3)));
    }

    #[test]
    fn build_tree_reports_reentered_node() {
        let index = ingest(&rels(&[(9, 1), (1, 2), (2, 3), (3, 1)]));
        let mut visited = VisitMap::new();
        let err = build_tree(&index, &9, &9, &mut visited).expect_err("cycle");
        assert_eq!(err, CycleDetected { root: 9, node: 1 });
        assert!(err.to_string().contains("root 9"));
    }

    // -----------------------------------------------------------------------
    // build: literal scenarios
    // -----------------------------------------------------------------------

    #[test]
    fn empty_relations_build_nothing() {
        let report = build::<u32>(&[]);
        assert!(report.graph.is_empty());
        assert!(report.graph.roots().is_empty());
        assert!(report.cycles.is_empty());
    }

    #[test]
    fn single_relation() {
        let graph = build_graph(&rels(&[(1, 2)]));
        assert_eq!(
            graph.tree(&1),
            Some(&leaf(1).with_child(leaf(2)).with_nodes(vec![1, 2]))
        );
        assert_eq!(graph.tree_count(), 1);
        assert_eq!(graph.roots_of(&2), Some(&set(&[1])));
        assert_eq!(graph.roots().len(), 1);
    }

    #[test]
    fn chain_nests_children() {
        let graph = build_graph(&rels(&[(1, 2), (2, 3)]));
        let expected = leaf(1)
            .with_child(leaf(2).with_child(leaf(3)))
            .with_nodes(vec![1, 2, 3]);
        assert_eq!(graph.tree(&1), Some(&expected));
        assert_eq!(graph.roots_of(&2), Some(&set(&[1])));
        assert_eq!(graph.roots_of(&3), Some(&set(&[1])));
    }

    #[test]
    fn mutual_parents_produce_no_roots() {
        let report = build(&rels(&[(1, 2), (2, 1), (2, 3)]));
        assert!(report.graph.is_empty());
        assert!(report.graph.roots().is_empty());
        // No root ever reaches the cycle, so nothing is reported either.
        assert!(report.cycles.is_empty());
    }

    #[test]
    fn books_share_a_page() {
        let graph = build_graph(&rels(&[
            ("book 1", "page 1"),
            ("page 1", "page 1, 1"),
            ("book 1", "page 2"),
            ("book 2", "page 2"),
            ("book 2", "page 3"),
        ]));

        let book1 = leaf("book 1")
            .with_child(leaf("page 1").with_child(leaf("page 1, 1")))
            .with_child(leaf("page 2"))
            .with_nodes(vec!["book 1", "page 1", "page 1, 1", "page 2"]);
        let book2 = leaf("book 2")
            .with_child(leaf("page 2"))
            .with_child(leaf("page 3"))
            .with_nodes(vec!["book 2", "page 2", "page 3"]);

        assert_eq!(graph.tree(&"book 1"), Some(&book1));
        assert_eq!(graph.tree(&"book 2"), Some(&book2));
        assert_eq!(graph.roots_of(&"page 2"), Some(&set(&["book 1", "book 2"])));
        assert_eq!(graph.roots_of(&"page 1, 1"), Some(&set(&["book 1"])));
        assert_eq!(graph.roots_of(&"page 3"), Some(&set(&["book 2"])));
        assert!(graph.roots_of(&"book 1").is_none());
    }

    // -----------------------------------------------------------------------
    // build: cycles
    // -----------------------------------------------------------------------

    #[test]
    fn cycle_below_root_rejects_whole_root() {
        let report = build(&rels(&[(0, 1), (1, 2), (2, 1), (0, 5)]));
        assert!(report.graph.tree(&0).is_none());
        assert!(report.graph.roots().is_empty());
        assert_eq!(report.cycles, vec![CycleDetected { root: 0, node: 1 }]);
    }

    #[test]
    fn rejected_root_does_not_affect_other_roots() {
        let report = build(&rels(&[(10, 11), (11, 12), (12, 11), (20, 12), (30, 31)]));
        assert_eq!(report.cycles.len(), 2);
        assert_eq!(report.graph.tree_count(), 1);
        assert!(report.graph.tree(&30).is_some());
        assert_eq!(report.graph.roots_of(&31), Some(&set(&[30])));
        assert!(report.graph.roots_of(&11).is_none());
        assert!(report.graph.roots_of(&12).is_none());
    }

    #[test]
    fn self_loop_below_root_is_a_cycle() {
        let report = build(&rels(&[(1, 2), (2, 2)]));
        assert!(report.graph.is_empty());
        assert_eq!(report.cycles, vec![CycleDetected { root: 1, node: 2 }]);
    }

    // -----------------------------------------------------------------------
    // build: fan-in and duplicates
    // -----------------------------------------------------------------------

    #[test]
    fn diamond_is_not_a_cycle_and_duplicates_the_shared_subtree() {
        // 1 → 2 → 4 → 5 and 1 → 3 → 4 → 5
        let graph = build_graph(&rels(&[(1, 2), (1, 3), (2, 4), (3, 4), (4, 5)]));
        let shared = leaf(4).with_child(leaf(5));
        let expected = leaf(1)
            .with_child(leaf(2).with_child(shared.clone()))
            .with_child(leaf(3).with_child(shared))
            .with_nodes(vec![1, 2, 4, 5, 3]);
        assert_eq!(graph.tree(&1), Some(&expected));
        assert_eq!(graph.roots_of(&4), Some(&set(&[1])));
    }

    #[test]
    fn wide_tree_keeps_relation_order() {
        let graph = build_graph(&rels(&[
            (1, 2),
            (2, 5),
            (2, 6),
            (1, 3),
            (3, 6),
            (3, 7),
            (1, 4),
            (4, 8),
        ]));
        let tree = graph.tree(&1).expect("tree for 1");
        let top: Vec<i32> = tree.child_nodes().map(|c| *c.id()).collect();
        assert_eq!(top, vec![2, 3, 4]);
        assert_eq!(tree.nodes(), Some(&[1, 2, 5, 6, 3, 7, 4, 8][..]));
        assert_eq!(graph.roots_of(&6), Some(&set(&[1])));
    }

    #[test]
    fn duplicate_relation_collapses_into_one_child() {
        let graph = build_graph(&rels(&[(1, 2), (1, 3), (1, 2)]));
        let tree = graph.tree(&1).expect("tree for 1");
        let ids: Vec<i32> = tree.child_nodes().map(|c| *c.id()).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(tree.nodes(), Some(&[1, 2, 3][..]));
    }

    #[test]
    fn blank_children_are_skipped() {
        let graph = build_graph(&rels(&[("a", ""), ("a", "b")]));
        let tree = graph.tree(&"a").expect("tree for a");
        assert_eq!(tree, &leaf("a").with_child(leaf("b")).with_nodes(vec!["a", "b"]));
        assert!(graph.roots_of(&"").is_none());
    }

    #[test]
    fn root_with_only_blank_children_is_a_bare_tree() {
        let graph = build_graph(&rels(&[(7, 0)]));
        assert_eq!(graph.tree(&7), Some(&leaf(7).with_nodes(vec![7])));
        assert!(graph.roots().is_empty());
    }

    #[test]
    fn roots_are_listed_in_processing_order() {
        let graph = build_graph(&rels(&[(3, 9), (1, 9), (2, 9)]));
        let keys: Vec<i32> = graph.forest().keys().copied().collect();
        assert_eq!(keys, vec![3, 1, 2]);
        assert_eq!(graph.roots_of(&9), Some(&set(&[3, 1, 2])));
    }

    #[test]
    fn building_twice_is_identical() {
        let relations = rels(&[(1, 2), (2, 3), (4, 3), (5, 6), (6, 5)]);
        assert_eq!(build(&relations), build(&relations));
    }
}
