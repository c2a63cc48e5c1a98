//! Directed parent → child relations, the only input of a forest build.
use serde::{Deserialize, Serialize};

/// A single directed edge from `parent` to `child`.
///
/// Relations are consumed in the order they are supplied; that order decides
/// the order of children inside every built tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation<K> {
    /// The node the edge leaves.
    pub parent: K,
    /// The node the edge enters.
    pub child: K,
}

impl<K> Relation<K> {
    /// Creates a relation from `parent` to `child`.
    pub fn new(parent: K, child: K) -> Self {
        Self { parent, child }
    }

    /// Converts a sequence of `(parent, child)` pairs into relations,
    /// preserving order.
    pub fn from_pairs<I, T>(pairs: I) -> Vec<Self>
    where
        I: IntoIterator<Item = (T, T)>,
        T: Into<K>,
    {
        pairs
            .into_iter()
            .map(|(parent, child)| Self::new(parent.into(), child.into()))
            .collect()
    }
}

impl<K> From<(K, K)> for Relation<K> {
    fn from((parent, child): (K, K)) -> Self {
        Self::new(parent, child)
    }
}
