//! Post-build invariant checkers for correctness validation.

use std::collections::HashSet;

use bookgraph_core::{BookGraph, BuildReport, NodeKey, Relation, TreeNode};

/// Verifies that every tree is keyed by a node that has children and no
/// parent, and that the tree's own id matches its key.
pub fn check_forest_roots<K: NodeKey>(
    relations: &[Relation<K>],
    graph: &BookGraph<K>,
) -> Result<(), String> {
    let children: HashSet<&K> = relations.iter().map(|r| &r.child).collect();
    let parents: HashSet<&K> = relations.iter().map(|r| &r.parent).collect();

    for (root, tree) in graph.forest() {
        if tree.id() != root {
            return Err(format!("tree keyed {root:?} has id {:?}", tree.id()));
        }
        if children.contains(root) {
            return Err(format!("tree root {root:?} has a parent"));
        }
        if !parents.contains(root) {
            return Err(format!("tree root {root:?} has no children"));
        }
    }
    Ok(())
}

/// Verifies every root's visit list:
/// - starts with the root
/// - holds no duplicates
/// - names exactly the ids present in the tree
pub fn check_visit_lists<K: NodeKey>(graph: &BookGraph<K>) -> Result<(), String> {
    for (root, tree) in graph.forest() {
        let nodes = tree
            .nodes()
            .ok_or_else(|| format!("tree {root:?} has no visit list"))?;
        if nodes.first() != Some(root) {
            return Err(format!("visit list of {root:?} does not start with it"));
        }
        let unique: HashSet<&K> = nodes.iter().collect();
        if unique.len() != nodes.len() {
            return Err(format!("visit list of {root:?} repeats a node"));
        }
        let in_tree: HashSet<&K> = tree.walk().map(|(_, n)| n.id()).collect();
        if unique != in_tree {
            return Err(format!("visit list of {root:?} differs from its tree"));
        }
    }
    Ok(())
}

/// Verifies that the roots index and the forest agree in both directions:
/// - every indexed root has a tree whose visit list contains the node
/// - every non-root node of a visit list is indexed under that root
/// - no root is indexed under itself
pub fn check_roots_index<K: NodeKey>(graph: &BookGraph<K>) -> Result<(), String> {
    for (node, roots) in graph.roots() {
        for root in roots {
            if root == node {
                return Err(format!("{node:?} indexed as its own root"));
            }
            let visited = graph
                .tree(root)
                .and_then(TreeNode::nodes)
                .ok_or_else(|| format!("{node:?} indexed under missing tree {root:?}"))?;
            if !visited.contains(node) {
                return Err(format!("{node:?} indexed under {root:?} but not visited"));
            }
        }
    }
    for (root, tree) in graph.forest() {
        for node in tree.nodes().unwrap_or(&[]).iter().skip(1) {
            let indexed = graph.roots_of(node).is_some_and(|r| r.contains(root));
            if !indexed {
                return Err(format!("{node:?} visited from {root:?} but not indexed"));
            }
        }
    }
    Ok(())
}

/// Verifies that every rejected root is absent from the forest and from
/// every roots-index entry.
pub fn check_rejections<K: NodeKey>(report: &BuildReport<K>) -> Result<(), String> {
    for cycle in &report.cycles {
        if report.graph.tree(&cycle.root).is_some() {
            return Err(format!("rejected root {:?} still has a tree", cycle.root));
        }
        if report
            .graph
            .roots()
            .values()
            .any(|roots| roots.contains(&cycle.root))
        {
            return Err(format!("rejected root {:?} still indexed", cycle.root));
        }
    }
    Ok(())
}

/// Verifies that, when nothing was rejected, every node with a parent is
/// indexed. Generated inputs hang every node beneath some root, so this
/// holds for any acyclic generator output.
pub fn check_full_coverage<K: NodeKey>(
    relations: &[Relation<K>],
    report: &BuildReport<K>,
) -> Result<(), String> {
    if !report.cycles.is_empty() {
        return Ok(());
    }
    for relation in relations {
        if relation.child.is_blank() {
            continue;
        }
        if report.graph.roots_of(&relation.child).is_none() {
            return Err(format!("{:?} has a parent but is not indexed", relation.child));
        }
    }
    Ok(())
}

/// Runs every checker above.
pub fn check_all<K: NodeKey>(
    relations: &[Relation<K>],
    report: &BuildReport<K>,
) -> Result<(), String> {
    check_forest_roots(relations, &report.graph)?;
    check_visit_lists(&report.graph)?;
    check_roots_index(&report.graph)?;
    check_rejections(report)?;
    check_full_coverage(relations, report)
}
