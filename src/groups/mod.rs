//! Conditional group elision.
//!
//! A [`Group`] is a set of nodes gated by trigger words. For each batch item,
//! groups whose triggers do not occur in the item's path are cut out of the
//! graph: every member is bypassed onto its first upstream, or disconnected when
//! it has none.

use crate::error::LayoutError;
use crate::graph::{Bypass, Graph, RedirectOptions};
use ahash::AHashSet;
use indexmap::IndexSet;
use log::debug;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

pub mod layout;
mod trigger;

pub use trigger::*;

/// A trigger-gated set of nodes, as written by the layout extraction step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Id of the subgraph instance the members live in; members are addressed
    /// as `"<subgraph_id>:<node_id>"` when set.
    #[serde(default)]
    pub subgraph_id: Option<String>,
    #[serde(rename = "trigger_folder_name", default, deserialize_with = "list_or_null")]
    pub triggers: Vec<String>,
    #[serde(default, deserialize_with = "node_id_list")]
    pub node_ids: Vec<String>,
}

/// A list that may be written as `null`.
fn list_or_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Node ids written as strings or numbers, or `null` for none.
fn node_id_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Option::<Vec<Value>>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .map(|id| match id {
            Value::String(id) => Ok(id),
            Value::Number(id) => Ok(id.to_string()),
            other => Err(D::Error::custom(format!(
                "node id must be a string or a number, found {}",
                other
            ))),
        })
        .collect()
}

impl Group {
    /// Whether an item at `path` keeps this group's nodes.
    pub fn keeps(&self, path: &Path) -> bool {
        path_matches_any(path, &self.triggers)
    }

    /// Member ids as they appear in the skip set.
    pub fn qualified_ids(&self) -> impl Iterator<Item = String> + '_ {
        self.node_ids.iter().map(|id| match &self.subgraph_id {
            Some(prefix) => format!("{}:{}", prefix, id),
            None => id.clone(),
        })
    }
}

/// Reads a group list. A missing file means there are no groups.
pub fn load_groups(path: impl AsRef<Path>) -> Result<Vec<Group>, LayoutError> {
    let path = path.as_ref();
    if !path.exists() {
        debug!("no group list at '{}'", path.display());
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path).map_err(|e| LayoutError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| LayoutError::Json(e.to_string()))
}

/// Node ids to cut from one item's graph, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipSet {
    ids: IndexSet<String, ahash::RandomState>,
}

impl SkipSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the members of every group the item at `path` does not keep.
    pub fn for_path(groups: &[Group], path: &Path) -> Self {
        let mut skip = Self::new();
        for group in groups.iter().filter(|group| !group.keeps(path)) {
            skip.extend(group.qualified_ids());
        }
        skip
    }

    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Maps skip entries onto graph keys.
    ///
    /// Qualified entries (`"sg:id"`) must match a key exactly. A plain entry
    /// matches every qualified key ending in `":<id>"`, and only when none does,
    /// the plain key itself. Entries matching nothing are ignored.
    pub fn resolve(&self, graph: &Graph) -> Vec<String> {
        let mut targets: IndexSet<String, ahash::RandomState> = IndexSet::default();
        let (qualified, plain): (Vec<&str>, Vec<&str>) =
            self.iter().partition(|id| id.contains(':'));

        for id in qualified {
            if graph.contains(id) {
                targets.insert(id.to_string());
            }
        }

        let mut matched: AHashSet<&str> = AHashSet::new();
        for key in graph.ids().filter(|key| key.contains(':')) {
            if let Some(id) = plain.iter().find(|id| is_qualified_form_of(key, id)) {
                targets.insert(key.to_string());
                matched.insert(*id);
            }
        }

        for id in plain {
            if !matched.contains(id) && graph.contains(id) {
                targets.insert(id.to_string());
            }
        }
        targets.into_iter().collect()
    }
}

impl<S: Into<String>> Extend<S> for SkipSet {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        self.ids.extend(iter.into_iter().map(Into::into));
    }
}

impl<S: Into<String>> FromIterator<S> for SkipSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut skip = Self::new();
        skip.extend(iter);
        skip
    }
}

fn is_qualified_form_of(key: &str, id: &str) -> bool {
    key.strip_suffix(id)
        .is_some_and(|head| head.ends_with(':'))
}

/// Cuts every node named by `skip` out of `graph`.
///
/// Each target's consumers are redirected to its first data connection, output
/// index notwithstanding, or lose the input when there is none. Targets are
/// processed in order against the graph as rewritten so far, and are deleted
/// only after every redirect is done.
pub fn bypass_nodes(graph: &mut Graph, skip: &SkipSet) -> Vec<Bypass> {
    let targets = skip.resolve(graph);
    let mut bypassed = Vec::with_capacity(targets.len());

    for id in targets {
        let upstream = graph
            .node(&id)
            .and_then(|node| node.first_data_connection())
            .filter(|upstream| !upstream.points_to(&id));
        match &upstream {
            Some(reference) => {
                graph.redirect_references(&id, reference, RedirectOptions::all());
                debug!("bypassed '{}' -> {}", id, reference);
            }
            None => {
                let dropped = graph.drop_all_references(&id);
                debug!("disconnected '{}' ({} references dropped)", id, dropped);
            }
        }
        bypassed.push(Bypass {
            node_id: id,
            upstream,
        });
    }

    for bypass in &bypassed {
        graph.delete_node(&bypass.node_id);
    }
    bypassed
}
