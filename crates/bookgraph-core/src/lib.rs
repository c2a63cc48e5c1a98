#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod book;
pub mod cache;
pub mod graph;
pub mod node_key;
pub mod relation;
pub mod source;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use book::{Book, BookError, Rebuilt};
pub use cache::{CACHE_KEY, CacheError, CacheStore, MemoryStore};
pub use graph::{
    BookGraph, BuildReport, ChildrenIndex, Color, CycleDetected, Forest, ParentsIndex,
    RelationIndex, RootsIndex, TreeNode, VisitMap, Walk, build, build_graph, build_tree,
    find_roots, ingest,
};
pub use node_key::NodeKey;
pub use relation::Relation;
pub use source::{RelationSource, SourceError};

/// Returns the current version of the bookgraph-core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
