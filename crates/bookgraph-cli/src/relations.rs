//! Relations file format.
//!
//! A relations file is a JSON array. Each element is either a
//! `[parent, child]` pair or a `{"id": parent, "child_id": child}` row as
//! exported from a relation table. Ids may be JSON strings or integers;
//! integers are read as their decimal string so `1` and `"1"` name the same
//! node. A row with a `null` or missing `child_id` contributes a blank child,
//! which the build skips. A child id of `0` or `"0"` is blank as well.
use bookgraph_core::{Relation, RelationSource, SourceError};
use serde::Deserialize;
use serde_json::Value;

/// An id as it appears in the file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    fn into_key(self) -> Result<String, String> {
        match self {
            RawId::Text(s) => Ok(s),
            RawId::Number(n) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
            RawId::Number(n) => Err(format!("id {n} is not an integer")),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRelation {
    Pair(RawId, RawId),
    Row {
        id: RawId,
        #[serde(default)]
        child_id: Option<RawId>,
    },
}

/// Parses the text of a relations file, keeping element order.
///
/// # Errors
///
/// Returns [`SourceError::Malformed`] naming the first offending element.
pub fn parse_relations(text: &str) -> Result<Vec<Relation<String>>, SourceError> {
    let elements: Vec<Value> = serde_json::from_str(text).map_err(|e| SourceError::Malformed {
        detail: format!("expected a JSON array of relations: {e}"),
    })?;

    elements
        .into_iter()
        .enumerate()
        .map(|(i, element)| {
            parse_relation(element).map_err(|detail| SourceError::Malformed {
                detail: format!("relation {i}: {detail}"),
            })
        })
        .collect()
}

fn parse_relation(element: Value) -> Result<Relation<String>, String> {
    let raw: RawRelation = serde_json::from_value(element).map_err(|_| {
        "expected [parent, child] or {\"id\": .., \"child_id\": ..} with string or integer ids"
            .to_owned()
    })?;
    match raw {
        RawRelation::Pair(parent, child) => {
            Ok(Relation::new(parent.into_key()?, child.into_key()?))
        }
        RawRelation::Row { id, child_id } => {
            let child = match child_id {
                Some(child) => child.into_key()?,
                None => String::new(),
            };
            Ok(Relation::new(id.into_key()?, child))
        }
    }
}

/// [`RelationSource`] over the text of a relations file.
///
/// Parsing is deferred to [`RelationSource::relations`], so a command served
/// from the cache never parses the file.
#[derive(Debug, Clone)]
pub struct JsonRelations {
    text: String,
}

impl JsonRelations {
    /// Wraps the raw file text.
    pub fn new(text: String) -> Self {
        Self { text }
    }
}

impl RelationSource<String> for JsonRelations {
    fn relations(&self) -> Result<Vec<Relation<String>>, SourceError> {
        parse_relations(&self.text)
    }
}
