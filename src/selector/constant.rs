use super::kind::NodeKind;
use crate::graph::{Graph, InputValue, Node, Reference};
use ahash::AHashSet;
use serde_json::Value;

/// A value read from a constant-holder node.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl Constant {
    /// Numeric view; booleans count as 0 and 1.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Constant::Number(n) => Some(*n),
            Constant::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Constant::Text(_) => None,
        }
    }

    fn numeric(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(Constant::Number),
            Value::Bool(b) => Some(Constant::Bool(*b)),
            _ => None,
        }
    }

    fn number(value: &Value) -> Option<Self> {
        value.as_f64().map(Constant::Number)
    }

    fn scalar(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Constant::Text(s.clone())),
            other => Self::numeric(other),
        }
    }
}

/// Bounded backward lookup of the constant feeding a reference.
///
/// Only constant holders are read, and only `Any Switch` nodes are walked
/// through (via their first data connection). Revisiting a node ends the walk
/// unresolved, so cycles are harmless. The graph is never modified.
pub struct ConstantResolver<'a> {
    graph: &'a Graph,
    visited: AHashSet<String>,
}

impl<'a> ConstantResolver<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        Self {
            graph,
            visited: AHashSet::new(),
        }
    }

    pub fn resolve(mut self, reference: &Reference) -> Option<Constant> {
        self.walk(reference)
    }

    fn walk(&mut self, reference: &Reference) -> Option<Constant> {
        let id = reference.source.to_key();
        if !self.visited.insert(id.clone()) {
            return None;
        }
        let node = self.graph.node(&id)?;

        match NodeKind::of(node.class_type()) {
            NodeKind::NumericConstant => literal(node, "value").and_then(Constant::numeric),
            NodeKind::StringConstant => node
                .input("string")
                .or_else(|| node.input("value"))
                .and_then(InputValue::as_literal)
                .and_then(Constant::scalar),
            NodeKind::Slider => literal(node, "Xi").and_then(Constant::number),
            NodeKind::AnySwitch => {
                let upstream = node.first_data_connection()?;
                self.walk(&upstream)
            }
            _ => None,
        }
    }
}

fn literal<'n>(node: &'n Node, key: &str) -> Option<&'n Value> {
    node.input(key)?.as_literal()
}

/// Resolves the constant behind `reference` in `graph`.
pub fn resolve_constant(graph: &Graph, reference: &Reference) -> Option<Constant> {
    ConstantResolver::new(graph).resolve(reference)
}
