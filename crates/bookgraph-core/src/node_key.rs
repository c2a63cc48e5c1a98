//! The identifier bound shared by every relation, tree and index type.
//!
//! Node identifiers are opaque: the builder only needs to compare them, hash
//! them, clone them into output structures and print them in diagnostics.
//! The one extra capability is [`NodeKey::is_blank`], which marks the
//! "empty" identifier of a type: zero for integers, and for strings either
//! the empty string or `"0"`, so an id read as text and the same id read as
//! an integer agree on blankness.
//! Blank child identifiers are skipped during tree construction so that
//! placeholder rows in a relation snapshot do not show up as nodes.
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;
use std::sync::Arc;

fn blank_text(id: &str) -> bool {
    id.is_empty() || id == "0"
}

/// An identifier usable as a node in a relation graph.
pub trait NodeKey: Clone + Eq + Hash + Debug {
    /// Returns `true` if this identifier is the blank value of its type.
    fn is_blank(&self) -> bool;
}

impl NodeKey for String {
    fn is_blank(&self) -> bool {
        blank_text(self)
    }
}

impl NodeKey for &str {
    fn is_blank(&self) -> bool {
        blank_text(self)
    }
}

impl NodeKey for Box<str> {
    fn is_blank(&self) -> bool {
        blank_text(self)
    }
}

impl NodeKey for Rc<str> {
    fn is_blank(&self) -> bool {
        blank_text(self)
    }
}

impl NodeKey for Arc<str> {
    fn is_blank(&self) -> bool {
        blank_text(self)
    }
}

macro_rules! integer_node_key {
    ($($t:ty),* $(,)?) => {
        $(
            impl NodeKey for $t {
                fn is_blank(&self) -> bool {
                    *self == 0
                }
            }
        )*
    };
}

integer_node_key!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);
