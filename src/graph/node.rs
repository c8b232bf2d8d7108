use super::NodeMap;
use super::value::{InputValue, Reference, classify_input, is_control_input};
use itertools::Itertools;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

/// The inputs of a node, in document order.
pub type NodeInputs = NodeMap<InputValue>;

const INPUTS_KEY: &str = "inputs";
const CLASS_TYPE_KEY: &str = "class_type";

/// A single node of a workflow graph.
///
/// Only `class_type` and `inputs` are interpreted. Every other key (`_meta`,
/// editor state, ...) is carried through untouched and in its original position.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    class_type: String,
    inputs: Option<NodeInputs>,
    /// The node's original object. While `inputs` is parsed, the `inputs` slot
    /// holds a `Null` placeholder that only marks its position.
    fields: Map<String, Value>,
}

impl Node {
    /// Creates a node from scratch, laid out the way workflow exports do.
    pub fn new(class_type: &str, inputs: impl IntoIterator<Item = (String, Value)>) -> Self {
        let mut fields = Map::new();
        fields.insert(INPUTS_KEY.to_string(), Value::Null);
        fields.insert(
            CLASS_TYPE_KEY.to_string(),
            Value::String(class_type.to_string()),
        );
        Self {
            class_type: class_type.to_string(),
            inputs: Some(
                inputs
                    .into_iter()
                    .map(|(key, value)| (key, classify_input(value)))
                    .collect(),
            ),
            fields,
        }
    }

    /// Parses a node object. A missing or non-string `class_type` reads as empty,
    /// and a non-object `inputs` leaves the node without rewritable inputs.
    pub fn from_map(mut fields: Map<String, Value>) -> Self {
        let class_type = fields
            .get(CLASS_TYPE_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let inputs = match fields.get_mut(INPUTS_KEY) {
            Some(slot) if slot.is_object() => match slot.take() {
                Value::Object(raw) => Some(
                    raw.into_iter()
                        .map(|(key, value)| (key, classify_input(value)))
                        .collect(),
                ),
                _ => None,
            },
            _ => None,
        };

        Self {
            class_type,
            inputs,
            fields,
        }
    }

    pub fn class_type(&self) -> &str {
        &self.class_type
    }

    /// The `_meta.title` display name, if the node carries one.
    pub fn title(&self) -> Option<&str> {
        self.fields.get("_meta")?.get("title")?.as_str()
    }

    /// Any key of the node object other than `inputs`.
    pub fn field(&self, key: &str) -> Option<&Value> {
        match key {
            INPUTS_KEY if self.inputs.is_some() => None,
            _ => self.fields.get(key),
        }
    }

    pub fn inputs(&self) -> Option<&NodeInputs> {
        self.inputs.as_ref()
    }

    pub fn inputs_mut(&mut self) -> Option<&mut NodeInputs> {
        self.inputs.as_mut()
    }

    pub fn input(&self, key: &str) -> Option<&InputValue> {
        self.inputs.as_ref()?.get(key)
    }

    pub fn has_input(&self, key: &str) -> bool {
        self.input(key).is_some()
    }

    /// Writes a literal input, creating the `inputs` object if the node has none
    /// (or has a malformed one).
    pub fn set_input(&mut self, key: &str, value: Value) {
        if self.inputs.is_none() {
            self.fields.insert(INPUTS_KEY.to_string(), Value::Null);
        }
        self.inputs
            .get_or_insert_with(NodeInputs::default)
            .insert(key.to_string(), classify_input(value));
    }

    /// All wired, non-control inputs, sorted by input key.
    ///
    /// The order decides which upstream counts as "first" for a selector or a
    /// bypassed node, so it must only depend on the keys.
    pub fn data_connections(&self) -> Vec<(&str, &Reference)> {
        self.inputs
            .iter()
            .flatten()
            .filter(|(key, _)| !is_control_input(key))
            .filter_map(|(key, value)| Some((key.as_str(), value.as_reference()?)))
            .sorted_by_key(|(key, _)| *key)
            .collect()
    }

    /// The upstream a bypass of this node would splice in.
    pub fn first_data_connection(&self) -> Option<Reference> {
        self.data_connections()
            .into_iter()
            .next()
            .map(|(_, reference)| reference.clone())
    }

    /// Every reference held by this node, including those inside reference lists.
    pub fn references(&self) -> Vec<(&str, &Reference)> {
        let mut found = Vec::new();
        for (key, value) in self.inputs.iter().flatten() {
            match value {
                InputValue::Reference(reference) => found.push((key.as_str(), reference)),
                InputValue::ReferenceList(items) => found.extend(
                    items
                        .iter()
                        .filter_map(InputValue::as_reference)
                        .map(|reference| (key.as_str(), reference)),
                ),
                InputValue::Literal(_) => {}
            }
        }
        found
    }

    pub fn to_value(&self) -> Value {
        let object = self
            .fields
            .iter()
            .map(|(key, value)| match (key.as_str(), &self.inputs) {
                (INPUTS_KEY, Some(inputs)) => (
                    key.clone(),
                    Value::Object(
                        inputs
                            .iter()
                            .map(|(k, v)| (k.clone(), v.to_value()))
                            .collect(),
                    ),
                ),
                _ => (key.clone(), value.clone()),
            })
            .collect();
        Value::Object(object)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            match (key.as_str(), &self.inputs) {
                (INPUTS_KEY, Some(inputs)) => map.serialize_entry(key, inputs)?,
                _ => map.serialize_entry(key, value)?,
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: Value) -> Node {
        match value {
            Value::Object(map) => Node::from_map(map),
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn field_order_survives_serialization() {
        let raw = json!({
            "_meta": {"title": "Loader"},
            "inputs": {"z": 1, "image": ["3", 0]},
            "class_type": "LoadImage",
            "extra": [1, 2]
        });
        let parsed = node(raw.clone());
        assert_eq!(
            serde_json::to_string(&parsed).unwrap(),
            serde_json::to_string(&raw).unwrap()
        );
        assert_eq!(parsed.title(), Some("Loader"));
    }

    #[test]
    fn malformed_inputs_are_preserved_but_not_rewritable() {
        let parsed = node(json!({"class_type": "X", "inputs": [1, 2]}));
        assert!(parsed.inputs().is_none());
        assert!(parsed.data_connections().is_empty());
        assert_eq!(parsed.to_value(), json!({"class_type": "X", "inputs": [1, 2]}));
    }

    #[test]
    fn set_input_creates_missing_inputs() {
        let mut parsed = node(json!({"class_type": "X"}));
        parsed.set_input("start_index", json!(3));
        assert_eq!(
            parsed.to_value(),
            json!({"class_type": "X", "inputs": {"start_index": 3}})
        );
    }
}
