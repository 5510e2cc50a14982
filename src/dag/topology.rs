// src/dag/topology.rs

//! Diagnostic-only structural checks over a shape.
//!
//! The projector trusts the upstream acyclicity invariant; these helpers are
//! used by the CLI inspection output to report when it does not hold.

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::dag::shape::StepShape;

fn build_graph(shape: &[StepShape]) -> DiGraphMap<&str, ()> {
    // Edge direction: parent -> child, dangling children skipped.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for step in shape {
        graph.add_node(step.step_id.as_str());
    }

    for step in shape {
        for child in &step.children_step_ids {
            if graph.contains_node(child.as_str()) {
                graph.add_edge(step.step_id.as_str(), child.as_str(), ());
            }
        }
    }

    graph
}

/// Return a step id involved in a cycle, if the shape has one.
pub fn find_cycle(shape: &[StepShape]) -> Option<String> {
    let graph = build_graph(shape);
    match toposort(&graph, None) {
        Ok(_) => None,
        Err(cycle) => Some(cycle.node_id().to_string()),
    }
}

/// Step ids in dependency order (parents before children).
///
/// Returns `None` when the shape is cyclic.
pub fn topological_order(shape: &[StepShape]) -> Option<Vec<String>> {
    let graph = build_graph(shape);
    toposort(&graph, None)
        .ok()
        .map(|order| order.into_iter().map(str::to_string).collect())
}
