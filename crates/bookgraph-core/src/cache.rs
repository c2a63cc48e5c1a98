//! Persistent storage for built graphs.
//!
//! A [`CacheStore`] is a byte-oriented key-value store. The built
//! [`BookGraph`] is written as JSON under [`CACHE_KEY`] and read back on the
//! next cold start, so a process only rebuilds when the store is empty,
//! unreadable, or explicitly bypassed with [`Book::rebuild`].
//!
//! The payload lists each tree flat, in pre-order, with every node pointing
//! at its parent's position:
//!
//! ```json
//! {"trees": [[{"id": "a", "nodes": ["a", "b"]}, {"id": "b", "parent": 0}]],
//!  "roots": {"b": ["a"]}}
//! ```
//!
//! Nesting never grows with tree depth, so arbitrarily long chains encode
//! and decode without hitting the JSON parser's nesting limit.
//!
//! [`Book::rebuild`]: crate::book::Book::rebuild
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::{BookGraph, Forest, RootsIndex, TreeNode};
use crate::node_key::NodeKey;

/// Key under which the latest build is stored.
pub const CACHE_KEY: &str = "bookgraph:latest";

/// Errors raised by cache stores and by the cache payload codec.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The store could not read, write or remove an entry.
    #[error("cache I/O error for key {key:?}: {source}")]
    Io {
        /// The key being accessed.
        key: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A payload could not be encoded, or a stored payload could not be
    /// decoded.
    #[error("cache payload for key {key:?} is not a valid graph: {source}")]
    Codec {
        /// The key being accessed.
        key: String,
        /// The underlying serialization error.
        source: serde_json::Error,
    },
}

/// A byte-oriented key-value store holding built graphs.
///
/// Methods take `&self`; implementations provide their own synchronization.
pub trait CacheStore {
    /// Returns the bytes stored under `key`, or `None` on a miss.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Stores `value` under `key`, replacing any previous entry.
    fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError>;

    /// Removes the entry under `key`. Removing a missing key is not an error.
    fn invalidate(&self, key: &str) -> Result<(), CacheError>;
}

impl<C: CacheStore + ?Sized> CacheStore for &C {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        (**self).set(key, value)
    }

    fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        (**self).invalidate(key)
    }
}

impl<C: CacheStore + ?Sized> CacheStore for Arc<C> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        (**self).set(key, value)
    }

    fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        (**self).invalidate(key)
    }
}

/// Process-local [`CacheStore`] backed by a map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        self.entries.lock().insert(key.to_owned(), value);
        Ok(())
    }

    fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// One tree node of the stored payload.
#[derive(Serialize, Deserialize)]
#[serde(bound(serialize = "K: Serialize", deserialize = "K: Deserialize<'de>"))]
struct StoredNode<K> {
    id: K,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nodes: Option<Vec<K>>,
}

#[derive(Serialize, Deserialize)]
#[serde(bound(serialize = "K: Serialize", deserialize = "K: Deserialize<'de>"))]
struct StoredGraph<K: NodeKey> {
    trees: Vec<Vec<StoredNode<K>>>,
    roots: RootsIndex<K>,
}

fn codec_error(source: serde_json::Error) -> CacheError {
    CacheError::Codec {
        key: CACHE_KEY.to_owned(),
        source,
    }
}

fn flatten<K: NodeKey>(tree: &TreeNode<K>) -> Vec<StoredNode<K>> {
    let mut out = Vec::new();
    let mut stack = vec![(tree, None)];
    while let Some((node, parent)) = stack.pop() {
        let position = out.len();
        out.push(StoredNode {
            id: node.id().clone(),
            parent,
            nodes: node.nodes().map(<[K]>::to_vec),
        });
        stack.extend(node.child_nodes().rev().map(|c| (c, Some(position))));
    }
    out
}

/// Rebuilds one tree from its pre-order listing, deepest entries first.
fn unflatten<K: NodeKey>(entries: Vec<StoredNode<K>>) -> Result<TreeNode<K>, String> {
    let mut finished: Vec<Vec<TreeNode<K>>> = entries.iter().map(|_| Vec::new()).collect();
    let mut root = None;

    for (position, entry) in entries.into_iter().enumerate().rev() {
        let mut children = std::mem::take(&mut finished[position]);
        children.reverse();
        let children = children
            .into_iter()
            .map(|child| (child.id().clone(), child))
            .collect();
        let node = TreeNode::from_parts(entry.id, children, entry.nodes);

        match entry.parent {
            Some(parent) if parent < position => finished[parent].push(node),
            Some(parent) => {
                return Err(format!(
                    "entry {position} names parent {parent}, which does not precede it"
                ));
            }
            None if position == 0 => root = Some(node),
            None => return Err(format!("entry {position} has no parent")),
        }
    }

    root.ok_or_else(|| "empty tree listing".to_owned())
}

/// Serializes `graph` into the payload stored under [`CACHE_KEY`].
pub fn encode<K>(graph: &BookGraph<K>) -> Result<Vec<u8>, CacheError>
where
    K: NodeKey + Serialize,
{
    let stored = StoredGraph {
        trees: graph.forest().values().map(flatten).collect(),
        roots: graph.roots().clone(),
    };
    serde_json::to_vec(&stored).map_err(codec_error)
}

/// Parses a payload previously produced by [`encode`].
pub fn decode<K>(bytes: &[u8]) -> Result<BookGraph<K>, CacheError>
where
    K: NodeKey + DeserializeOwned,
{
    let stored: StoredGraph<K> = serde_json::from_slice(bytes).map_err(codec_error)?;
    let mut trees = Forest::new();
    for entries in stored.trees {
        let tree = unflatten(entries)
            .map_err(|detail| codec_error(serde_json::Error::custom(detail)))?;
        trees.insert(tree.id().clone(), tree);
    }
    Ok(BookGraph::new(trees, stored.roots))
}
