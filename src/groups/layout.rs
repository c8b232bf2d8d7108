//! Group extraction from an editor layout document.
//!
//! The layout (the editor's own save format, not the executable graph) defines
//! subgraphs with `groups` and positioned `nodes`. Each group of the chosen
//! subgraph becomes a [`Group`] whose members are either listed explicitly or
//! found by position inside the group's bounds, and whose triggers come from
//! its title.

use super::{Group, triggers_from_title};
use crate::error::LayoutError;
use itertools::Itertools;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Name of the subgraph holding the model loader groups.
pub const DEFAULT_SUBGRAPH: &str = "ModelLoader";

/// An axis-aligned rectangle: origin plus size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    /// Inclusive on every edge.
    pub fn contains(&self, (px, py): (f64, f64)) -> bool {
        self.x <= px && px <= self.x + self.w && self.y <= py && py <= self.y + self.h
    }

    /// Reads `{x, y, w, h}` or `{left, top, width, height}`.
    fn from_object(object: &Map<String, Value>) -> Option<Self> {
        Some(Self {
            x: either(object, "x", "left")?,
            y: either(object, "y", "top")?,
            w: either(object, "w", "width")?,
            h: either(object, "h", "height")?,
        })
    }

    /// The bounds of a group: a `bounding` array, else the first of the
    /// `bounds`/`rect`/`bounding` objects, else rectangle keys on the group itself.
    pub fn of_group(group: &Map<String, Value>) -> Option<Self> {
        if let Some(Value::Array(bounding)) = group.get("bounding") {
            if let [x, y, w, h, ..] = bounding.as_slice() {
                if let (Some(x), Some(y), Some(w), Some(h)) =
                    (number(x), number(y), number(w), number(h))
                {
                    return Some(Self { x, y, w, h });
                }
            }
        }
        ["bounds", "rect", "bounding"]
            .iter()
            .filter_map(|key| group.get(*key)?.as_object())
            .find_map(Self::from_object)
            .or_else(|| Self::from_object(group))
    }
}

/// Reads a layout document from disk.
pub fn load_layout(path: impl AsRef<Path>) -> Result<Value, LayoutError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| LayoutError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| LayoutError::Json(e.to_string()))
}

/// Extracts the groups of the subgraph named `subgraph_name`. A layout without
/// that subgraph yields no groups.
pub fn extract_groups(layout: &Value, subgraph_name: &str) -> Vec<Group> {
    let Some(subgraph) = layout
        .pointer("/definitions/subgraphs")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
        .find(|sg| sg.get("name").and_then(Value::as_str) == Some(subgraph_name))
    else {
        return Vec::new();
    };

    let instance_id = subgraph
        .get("id")
        .and_then(id_string)
        .and_then(|subgraph_id| instance_of(layout, &subgraph_id));

    let nodes: Vec<(String, Option<(f64, f64)>)> = array(subgraph, "nodes")
        .filter_map(Value::as_object)
        .filter_map(|node| {
            let id = ["id", "node_id", "uuid"]
                .iter()
                .find_map(|key| node.get(*key).and_then(id_string))?;
            Some((id, position(node)))
        })
        .collect();

    array(subgraph, "groups")
        .filter_map(Value::as_object)
        .map(|group| Group {
            subgraph_id: instance_id.clone(),
            triggers: triggers_from_title(title(group)),
            node_ids: members(group, &nodes),
        })
        .collect()
}

/// One line per group with its triggers joined by `", "`.
pub fn trigger_summary(groups: &[Group]) -> String {
    groups.iter().map(|group| group.triggers.join(", ")).join("\n")
}

/// Writes a group list as pretty-printed JSON, creating parent directories.
pub fn write_groups(path: impl AsRef<Path>, groups: &[Group]) -> Result<(), LayoutError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| LayoutError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(groups).map_err(|e| LayoutError::Json(e.to_string()))?;
    fs::write(path, json).map_err(|e| LayoutError::io(path, e))
}

/// The id of the first root node instantiating `subgraph_id`.
fn instance_of(layout: &Value, subgraph_id: &str) -> Option<String> {
    let instance = layout
        .get("nodes")?
        .as_array()?
        .iter()
        .filter_map(Value::as_object)
        .find(|node| node.get("type").and_then(id_string).as_deref() == Some(subgraph_id))?;
    instance.get("id").and_then(id_string)
}

/// Explicitly listed members that exist in the subgraph; without a list, the
/// nodes whose position falls inside the group's bounds.
fn members(group: &Map<String, Value>, nodes: &[(String, Option<(f64, f64)>)]) -> Vec<String> {
    let listed: Vec<String> = array(group, "nodes").filter_map(id_string).collect();
    if !listed.is_empty() {
        return listed
            .into_iter()
            .filter(|id| nodes.iter().any(|(known, _)| known == id))
            .unique()
            .collect();
    }
    let Some(bounds) = Rect::of_group(group) else {
        return Vec::new();
    };
    nodes
        .iter()
        .filter(|(_, pos)| pos.is_some_and(|pos| bounds.contains(pos)))
        .map(|(id, _)| id.clone())
        .collect()
}

fn title(group: &Map<String, Value>) -> &str {
    ["title", "name", "label"]
        .iter()
        .filter_map(|key| group.get(*key)?.as_str())
        .find(|title| !title.is_empty())
        .unwrap_or_default()
}

/// A node's position from `position`, `pos` or `xy` (object or `[x, y]`
/// array), else from `x`/`y` on the node itself.
fn position(node: &Map<String, Value>) -> Option<(f64, f64)> {
    let declared = ["position", "pos", "xy"]
        .iter()
        .filter_map(|key| node.get(*key))
        .find(|value| match value {
            Value::Object(object) => !object.is_empty(),
            Value::Array(items) => !items.is_empty(),
            _ => false,
        });
    match declared {
        Some(Value::Object(pos)) => Some((either(pos, "x", "left")?, either(pos, "y", "top")?)),
        Some(Value::Array(pos)) => match pos.as_slice() {
            [x, y, ..] => Some((number(x)?, number(y)?)),
            _ => None,
        },
        _ => Some((number(node.get("x")?)?, number(node.get("y")?)?)),
    }
}

fn array<'a>(object: &'a Map<String, Value>, key: &str) -> impl Iterator<Item = &'a Value> {
    object
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

/// `object[primary]` if present, else `object[fallback]`, as a number.
fn either(object: &Map<String, Value>, primary: &str, fallback: &str) -> Option<f64> {
    number(object.get(primary).or_else(|| object.get(fallback))?)
}

/// Numbers, and strings that parse as numbers.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
