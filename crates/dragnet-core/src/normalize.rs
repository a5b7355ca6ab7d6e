//! Structural classification of query nodes.

use serde_json::{Map, Value};

/// The three shapes a query node can take. Classification is structural
/// only; leaf-value validation is the dictionary's concern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeShape<'a> {
    /// An array: OR of its elements.
    Disjunction(&'a [Value]),
    /// A non-array object: AND of its property terms.
    Conjunction(&'a Map<String, Value>),
    /// Anything else imposes no constraint.
    Always,
}

pub fn classify(node: &Value) -> NodeShape<'_> {
    match node {
        Value::Array(items) => NodeShape::Disjunction(items),
        Value::Object(map) => NodeShape::Conjunction(map),
        _ => NodeShape::Always,
    }
}
