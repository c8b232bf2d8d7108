use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Input keys that configure a selector rather than carry data.
pub const CONTROL_INPUT_KEYS: [&str; 3] = ["select", "sel_mode", "mode"];

/// Returns `true` if `key` names a selector configuration input.
pub fn is_control_input(key: &str) -> bool {
    CONTROL_INPUT_KEYS.contains(&key)
}

/// The node a reference points at, kept in the JSON form it arrived in so that
/// untouched wiring is written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum SourceId {
    Text(String),
    Integer(i64),
}

impl SourceId {
    /// Compares against a graph key without allocating.
    pub fn matches(&self, key: &str) -> bool {
        match self {
            SourceId::Text(id) => id == key,
            SourceId::Integer(id) => itoa::Buffer::new().format(*id) == key,
        }
    }

    /// The graph key this id refers to.
    pub fn to_key(&self) -> String {
        match self {
            SourceId::Text(id) => id.clone(),
            SourceId::Integer(id) => itoa::Buffer::new().format(*id).to_string(),
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceId::Text(id) => write!(f, "{}", id),
            SourceId::Integer(id) => write!(f, "{}", id),
        }
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        SourceId::Text(id.to_string())
    }
}

impl From<String> for SourceId {
    fn from(id: String) -> Self {
        SourceId::Text(id)
    }
}

/// A connection to one output slot of another node, encoded as
/// `["<node id>", <output index>]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub source: SourceId,
    pub output: i64,
}

impl Reference {
    pub fn new(source: impl Into<SourceId>, output: i64) -> Self {
        Self {
            source: source.into(),
            output,
        }
    }

    /// Returns `true` if this reference reads from the node keyed `node_id`.
    pub fn points_to(&self, node_id: &str) -> bool {
        self.source.matches(node_id)
    }

    /// Recognizes the reference shape: a 2-element array whose first element is a
    /// string or integer and whose second element is an integer.
    pub fn from_value(value: &Value) -> Option<Self> {
        let [source, output] = value.as_array()?.as_slice() else {
            return None;
        };
        let source = match source {
            Value::String(id) => SourceId::Text(id.clone()),
            Value::Number(n) => SourceId::Integer(n.as_i64()?),
            _ => return None,
        };
        Some(Self {
            source,
            output: output.as_i64()?,
        })
    }

    pub fn to_value(&self) -> Value {
        let source = match &self.source {
            SourceId::Text(id) => Value::String(id.clone()),
            SourceId::Integer(id) => Value::from(*id),
        };
        Value::Array(vec![source, Value::from(self.output)])
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.source, self.output)
    }
}

impl Serialize for Reference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.source, self.output).serialize(serializer)
    }
}

/// The value held by one input slot of a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InputValue {
    /// Any JSON value that is not wiring.
    Literal(Value),
    /// A wire from another node's output.
    Reference(Reference),
    /// An array that carries at least one reference among other items. Items are
    /// only ever `Literal` or `Reference`.
    ReferenceList(Vec<InputValue>),
}

impl InputValue {
    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            InputValue::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            InputValue::Literal(value) => Some(value),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            InputValue::Literal(value) => value.clone(),
            InputValue::Reference(reference) => reference.to_value(),
            InputValue::ReferenceList(items) => {
                Value::Array(items.iter().map(InputValue::to_value).collect())
            }
        }
    }
}

impl<'de> Deserialize<'de> for InputValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(classify_input)
    }
}

/// Classifies a raw input value. Total: anything that is not recognizably wiring
/// is a literal.
pub fn classify_input(value: Value) -> InputValue {
    if let Some(reference) = Reference::from_value(&value) {
        return InputValue::Reference(reference);
    }
    match value {
        Value::Array(items) if items.iter().any(|item| Reference::from_value(item).is_some()) => {
            InputValue::ReferenceList(
                items
                    .into_iter()
                    .map(|item| match Reference::from_value(&item) {
                        Some(reference) => InputValue::Reference(reference),
                        None => InputValue::Literal(item),
                    })
                    .collect(),
            )
        }
        other => InputValue::Literal(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_ids_compare_against_string_keys() {
        let reference = Reference::from_value(&json!([42, 1])).unwrap();
        assert!(reference.points_to("42"));
        assert!(!reference.points_to("042"));
        assert_eq!(reference.to_value(), json!([42, 1]));
    }

    #[test]
    fn float_output_index_is_not_a_reference() {
        assert!(Reference::from_value(&json!(["7", 0.5])).is_none());
        assert!(Reference::from_value(&json!(["7", 0, 1])).is_none());
        assert!(Reference::from_value(&json!([true, 0])).is_none());
    }
}
