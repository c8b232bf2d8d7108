//! Switch elision: splices selector nodes out of a graph.
//!
//! Each switch is replaced by the upstream it would route at runtime, as far as
//! that can be told statically. When the `select` input is wired to a constant
//! holder the constant decides; otherwise the first data connection (by input
//! name) wins.

use crate::error::GraphError;
use crate::graph::{Bypass, Graph, InputValue, Node, RedirectOptions, Reference};
use log::{debug, warn};

mod constant;
mod kind;

pub use constant::*;
pub use kind::*;

/// The splice decided for one selector.
#[derive(Debug, Clone, PartialEq)]
struct SwitchPlan {
    rule: SelectorRule,
    upstream: Reference,
    options: RedirectOptions,
}

/// Removes every selector node from `graph`, wiring its consumers to the chosen
/// upstream. Returns one [`Bypass`] per removed node.
///
/// Selectors are processed in document order against the graph as rewritten so
/// far, which lets chains of switches collapse onto their final producer. All
/// redirects happen before any node is deleted. A switch with no data
/// connection has nothing to bypass to and is left in place.
pub fn strip_switches(graph: &mut Graph) -> Vec<Bypass> {
    let candidates: Vec<String> = graph
        .nodes()
        .filter(|(_, node)| SelectorRule::of(node).is_some())
        .map(|(id, _)| id.to_string())
        .collect();

    let mut bypassed = Vec::with_capacity(candidates.len());
    for id in candidates {
        let Some(plan) = graph.node(&id).and_then(|node| plan_switch(graph, &id, node)) else {
            debug!("switch '{}' has no data input; leaving it in place", id);
            continue;
        };

        let upstream = if plan.upstream.points_to(&id) {
            graph.drop_all_references(&id);
            None
        } else {
            graph.redirect_references(&id, &plan.upstream, plan.options);
            Some(plan.upstream)
        };
        debug!(
            "bypassed switch '{}' ({:?}) -> {}",
            id,
            plan.rule,
            upstream
                .as_ref()
                .map_or_else(|| "disconnected".to_string(), Reference::to_string)
        );
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

/// Parses `text`, strips its switches and returns pretty-printed JSON.
pub fn strip_switches_json(text: &str) -> Result<String, GraphError> {
    let mut graph = Graph::from_json_str(text)?;
    strip_switches(&mut graph);
    graph.to_json_pretty()
}

fn plan_switch(graph: &Graph, id: &str, node: &Node) -> Option<SwitchPlan> {
    let connections = node.data_connections();
    let rule = SelectorRule::of(node)?;

    if rule == SelectorRule::InverseBinary {
        if let (Some((_, input)), Some(selected)) =
            (connections.first(), resolve_select(graph, node))
        {
            let output = inverse_output_index(selected);
            return Some(SwitchPlan {
                rule,
                upstream: (*input).clone(),
                options: RedirectOptions::only_output(output).dropping_others(),
            });
        }
    }

    if node.has_input(SELECT_INPUT) && !connections.is_empty() {
        let index = match resolve_select(graph, node) {
            Some(selected) => indexed_choice(id, selected, connections.len()),
            None => 0,
        };
        return Some(SwitchPlan {
            rule: SelectorRule::Indexed,
            upstream: connections[index].1.clone(),
            options: RedirectOptions::all(),
        });
    }

    connections.first().map(|(_, input)| SwitchPlan {
        rule: SelectorRule::Generic,
        upstream: (*input).clone(),
        options: RedirectOptions::all(),
    })
}

/// The numeric constant wired into the `select` input. A literal `select` has
/// no upstream to read and stays unresolved.
fn resolve_select(graph: &Graph, node: &Node) -> Option<f64> {
    match node.input(SELECT_INPUT)? {
        InputValue::Reference(reference) => resolve_constant(graph, reference)?.as_number(),
        InputValue::Literal(_) | InputValue::ReferenceList(_) => None,
    }
}

/// Maps a `select` value onto output 0 or 1 of an inverse switch. `select` is
/// 1-based, so 1 and 2 shift down; anything else is clamped.
pub fn inverse_output_index(selected: f64) -> i64 {
    let index = selected.round_ties_even() as i64;
    let index = if index == 1 || index == 2 { index - 1 } else { index };
    index.clamp(0, 1)
}

/// Picks a data connection from a 1-based `select` value, clamping values that
/// fall outside the connection list.
pub fn indexed_choice(id: &str, selected: f64, len: usize) -> usize {
    let n = selected.round_ties_even() as i64;
    let last = len.saturating_sub(1) as i64;
    if n >= 1 && n - 1 <= last {
        return (n - 1) as usize;
    }
    let clamped = n.clamp(0, last);
    if clamped != n {
        warn!(
            "switch '{}' selects input {} but only has {}; using index {}",
            id, n, len, clamped
        );
    }
    clamped as usize
}
