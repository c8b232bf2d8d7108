//! The workflow graph model.
//!
//! A graph document is a JSON object keyed by node id. Each node is parsed once
//! into a [`Node`] whose inputs are classified into [`InputValue`]s, so that the
//! rewrite passes never have to sniff JSON shapes again. Everything the passes do
//! not interpret is carried through verbatim, in document order.

use crate::error::GraphError;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

mod node;
mod rewrite;
mod value;

pub use node::*;
pub use rewrite::*;
pub use value::*;

/// An insertion-ordered map keyed by node id or input name.
pub type NodeMap<V> = IndexMap<String, V, ahash::RandomState>;

/// One entry of the graph document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GraphEntry {
    Node(Node),
    /// A value that is not a JSON object. Kept verbatim and never rewritten.
    Opaque(Value),
}

impl GraphEntry {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => GraphEntry::Node(Node::from_map(map)),
            other => GraphEntry::Opaque(other),
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            GraphEntry::Node(node) => Some(node),
            GraphEntry::Opaque(_) => None,
        }
    }

    pub fn as_node_mut(&mut self) -> Option<&mut Node> {
        match self {
            GraphEntry::Node(node) => Some(node),
            GraphEntry::Opaque(_) => None,
        }
    }
}

/// A workflow graph: node id to node, in document order.
///
/// Graphs have value semantics. A batch clones its template once per item and
/// rewrites the clone, so no two items ever share mutable state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Graph {
    entries: NodeMap<GraphEntry>,
}

/// A reference whose source node is not in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub node_id: String,
    pub input: String,
    pub source: String,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a graph document. Only a root that is not a JSON object is an error.
    pub fn from_json_str(text: &str) -> Result<Self, GraphError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| GraphError::Json(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, GraphError> {
        match value {
            Value::Object(map) => Ok(Self {
                entries: map
                    .into_iter()
                    .map(|(id, entry)| (id, GraphEntry::from_value(entry)))
                    .collect(),
            }),
            other => Err(GraphError::NotAnObject {
                found: json_kind(&other),
            }),
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(id, entry)| {
                    let value = match entry {
                        GraphEntry::Node(node) => node.to_value(),
                        GraphEntry::Opaque(value) => value.clone(),
                    };
                    (id.clone(), value)
                })
                .collect(),
        )
    }

    pub fn to_json_pretty(&self) -> Result<String, GraphError> {
        serde_json::to_string_pretty(self).map_err(|e| GraphError::Json(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn entry(&self, id: &str) -> Option<&GraphEntry> {
        self.entries.get(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.entries.get(id)?.as_node()
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.entries.get_mut(id)?.as_node_mut()
    }

    /// Well-formed nodes in document order.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries
            .iter()
            .filter_map(|(id, entry)| Some((id.as_str(), entry.as_node()?)))
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.entries.values_mut().filter_map(GraphEntry::as_node_mut)
    }

    /// Inserts or replaces a node. A replaced node keeps its position.
    pub fn insert_node(&mut self, id: impl Into<String>, node: Node) -> Option<GraphEntry> {
        self.entries.insert(id.into(), GraphEntry::Node(node))
    }

    /// Writes a literal input on node `id`. Returns `false` if there is no such node.
    pub fn set_input(&mut self, id: &str, key: &str, value: Value) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.set_input(key, value);
                true
            }
            None => false,
        }
    }

    /// Every reference whose source is not a key of this graph.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        self.nodes()
            .flat_map(|(id, node)| {
                node.references()
                    .into_iter()
                    .filter(move |(_, reference)| !self.contains(&reference.source.to_key()))
                    .map(move |(input, reference)| DanglingReference {
                        node_id: id.to_string(),
                        input: input.to_string(),
                        source: reference.source.to_key(),
                    })
            })
            .collect()
    }
}

/// The record left behind by one splice: which node went away and what its
/// consumers now read from (`None` when they were disconnected instead).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bypass {
    pub node_id: String,
    pub upstream: Option<Reference>,
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
