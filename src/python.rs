use crate::graph::Graph;
use crate::groups::{SkipSet, bypass_nodes};
use crate::selector::strip_switches_json;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

/// Removes every switch node from a workflow graph.
///
/// Consumers of each switch are rewired to the input the switch selects. A
/// `select` input wired to a constant node is honoured; otherwise the first
/// data input (by name) is used.
///
/// Args:
///     graph_json (str): The workflow graph in API format, a JSON object keyed
///         by node id.
///
/// Returns:
///     str: The rewritten graph as pretty-printed JSON.
///
/// Raises:
///     ValueError: If the text is not JSON or its root is not an object.
#[pyfunction]
fn strip_switches(graph_json: &str) -> PyResult<String> {
    strip_switches_json(graph_json).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Cuts the given nodes out of a workflow graph, then removes its switches.
///
/// Each node's consumers are rewired to its first data input, or lose that
/// input when the node has none. Plain ids also match subgraph-qualified keys
/// (`"<subgraph>:<id>"`).
///
/// Args:
///     graph_json (str): The workflow graph in API format.
///     node_ids (list[str]): Ids of the nodes to cut.
///
/// Returns:
///     str: The rewritten graph as pretty-printed JSON.
///
/// Raises:
///     ValueError: If the text is not JSON or its root is not an object.
#[pyfunction]
fn bypass(graph_json: &str, node_ids: Vec<String>) -> PyResult<String> {
    let to_py = |e: crate::error::GraphError| PyValueError::new_err(e.to_string());
    let mut graph = Graph::from_json_str(graph_json).map_err(to_py)?;
    let skip: SkipSet = node_ids.into_iter().collect();
    bypass_nodes(&mut graph, &skip);
    crate::selector::strip_switches(&mut graph);
    graph.to_json_pretty().map_err(to_py)
}

/// Per-item workflow graph rewriting.
///
/// This module provides Python bindings to the tsugite Rust library: switch
/// removal and group bypassing for node-based image workflows.
#[pymodule]
fn tsugite(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(strip_switches, m)?)?;
    m.add_function(wrap_pyfunction!(bypass, m)?)?;
    Ok(())
}
