//! Lazily built, cached access to the forest of a relation source.
//!
//! A [`Book`] answers tree and roots queries from the most recent build. It
//! resolves that build through two layers:
//!
//! 1. an in-process memo, shared by every query on the same `Book`;
//! 2. the injected [`CacheStore`], which survives the process.
//!
//! Only when both miss does it pull a fresh snapshot from the
//! [`RelationSource`], build, and write the result through to the store.
//! The memo lock is held for the whole resolution, so concurrent callers on
//! one `Book` wait for a single build instead of racing several.
use std::sync::Arc;

use indexmap::IndexSet;
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::{CACHE_KEY, CacheError, CacheStore, decode, encode};
use crate::graph::{BookGraph, CycleDetected, Forest, RootsIndex, TreeNode, build};
use crate::node_key::NodeKey;
use crate::source::{RelationSource, SourceError};

/// Errors surfaced by [`Book`] queries.
#[derive(Debug, Error)]
pub enum BookError {
    /// No snapshot could be obtained from the relation source.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// A fresh build could not be encoded for the cache, or the cached
    /// entry could not be removed.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// The outcome of a forced rebuild.
#[derive(Debug, Clone)]
pub struct Rebuilt<K: NodeKey> {
    /// The freshly built graph, now also memoized and stored.
    pub graph: Arc<BookGraph<K>>,
    /// Roots rejected because their expansion met a cycle.
    pub cycles: Vec<CycleDetected<K>>,
}

/// Cached forest over a relation source.
pub struct Book<K: NodeKey, S, C> {
    source: S,
    store: C,
    memo: Mutex<Option<Arc<BookGraph<K>>>>,
}

impl<K, S, C> Book<K, S, C>
where
    K: NodeKey + Serialize + DeserializeOwned,
    S: RelationSource<K>,
    C: CacheStore,
{
    /// Creates a book with an empty memo. Nothing is read or built until the
    /// first query.
    pub fn new(source: S, store: C) -> Self {
        Self {
            source,
            store,
            memo: Mutex::new(None),
        }
    }

    /// The relation source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The backing cache store.
    pub fn store(&self) -> &C {
        &self.store
    }

    /// Returns the current graph, building it on a cold cache.
    pub fn graph(&self) -> Result<Arc<BookGraph<K>>, BookError> {
        let mut memo = self.memo.lock();
        if let Some(graph) = memo.as_ref() {
            return Ok(Arc::clone(graph));
        }

        if let Some(graph) = self.read_store() {
            let graph = Arc::new(graph);
            *memo = Some(Arc::clone(&graph));
            return Ok(graph);
        }

        let rebuilt = self.build_and_store()?;
        *memo = Some(Arc::clone(&rebuilt.graph));
        Ok(rebuilt.graph)
    }

    /// Returns the forest, optionally restricted to the roots in `filter`.
    ///
    /// Ids without a tree are left out of the result.
    pub fn trees(&self, filter: Option<&[K]>) -> Result<Forest<K>, BookError> {
        Ok(self.graph()?.trees(filter))
    }

    /// Returns the tree rooted at `root`, if any.
    pub fn tree(&self, root: &K) -> Result<Option<TreeNode<K>>, BookError> {
        Ok(self.graph()?.tree(root).cloned())
    }

    /// Returns the whole roots index.
    pub fn roots(&self) -> Result<RootsIndex<K>, BookError> {
        Ok(self.graph()?.roots().clone())
    }

    /// Returns the roots that reach `node`, if any.
    pub fn roots_of(&self, node: &K) -> Result<Option<IndexSet<K>>, BookError> {
        Ok(self.graph()?.roots_of(node).cloned())
    }

    /// Builds from a fresh snapshot, ignoring the memo and the stored entry,
    /// and writes the result through.
    pub fn rebuild(&self) -> Result<Rebuilt<K>, BookError> {
        let mut memo = self.memo.lock();
        let rebuilt = self.build_and_store()?;
        *memo = Some(Arc::clone(&rebuilt.graph));
        Ok(rebuilt)
    }

    /// Drops the memo and the stored entry; the next query rebuilds.
    pub fn invalidate(&self) -> Result<(), BookError> {
        let mut memo = self.memo.lock();
        *memo = None;
        self.store.invalidate(CACHE_KEY)?;
        debug!(key = CACHE_KEY, "cache invalidated");
        Ok(())
    }

    fn read_store(&self) -> Option<BookGraph<K>> {
        match self.store.get(CACHE_KEY) {
            Ok(Some(bytes)) => match decode(&bytes) {
                Ok(graph) => {
                    debug!(key = CACHE_KEY, "graph loaded from cache");
                    Some(graph)
                }
                Err(e) => {
                    warn!(error = %e, "discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => {
                debug!(key = CACHE_KEY, "cache miss");
                None
            }
            Err(e) => {
                warn!(error = %e, "cache read failed, rebuilding");
                None
            }
        }
    }

    fn build_and_store(&self) -> Result<Rebuilt<K>, BookError> {
        let relations = self.source.relations()?;
        let report = build(&relations);
        info!(
            relations = relations.len(),
            trees = report.graph.tree_count(),
            rejected = report.cycles.len(),
            "graph rebuilt"
        );

        let bytes = encode(&report.graph)?;
        if let Err(e) = self.store.set(CACHE_KEY, bytes) {
            warn!(error = %e, "cache write failed, serving uncached graph");
        }

        Ok(Rebuilt {
            graph: Arc::new(report.graph),
            cycles: report.cycles,
        })
    }
}
