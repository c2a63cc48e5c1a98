//! Where relation snapshots come from.
//!
//! `bookgraph-core` never touches a database or the filesystem. A
//! [`RelationSource`] hands the builder a complete, ordered snapshot; the
//! CLI supplies one backed by a JSON file and tests use a plain `Vec`.
use std::sync::Arc;

use thiserror::Error;

use crate::node_key::NodeKey;
use crate::relation::Relation;

/// Failure to obtain a relation snapshot.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The backing store could not be reached or read.
    #[error("relation source unavailable: {detail}")]
    Unavailable {
        /// Description of the underlying failure.
        detail: String,
    },

    /// The backing store returned data that is not a relation list.
    #[error("malformed relation data: {detail}")]
    Malformed {
        /// Description of what was wrong with the data.
        detail: String,
    },
}

/// A provider of ordered relation snapshots.
pub trait RelationSource<K: NodeKey> {
    /// Returns every relation, in the order that should drive child order.
    fn relations(&self) -> Result<Vec<Relation<K>>, SourceError>;
}

impl<K: NodeKey> RelationSource<K> for Vec<Relation<K>> {
    fn relations(&self) -> Result<Vec<Relation<K>>, SourceError> {
        Ok(self.clone())
    }
}

impl<K: NodeKey, S: RelationSource<K> + ?Sized> RelationSource<K> for &S {
    fn relations(&self) -> Result<Vec<Relation<K>>, SourceError> {
        (**self).relations()
    }
}

impl<K: NodeKey, S: RelationSource<K> + ?Sized> RelationSource<K> for Arc<S> {
    fn relations(&self) -> Result<Vec<Relation<K>>, SourceError> {
        (**self).relations()
    }
}
