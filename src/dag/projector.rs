// src/dag/projector.rs

//! Merge a static shape with the latest run list into a graph projection.
//!
//! [`project`] is a pure function of its two inputs: it is recomputed from
//! scratch on every poll tick instead of patching cached graph state.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::dag::shape::{ShapeIndex, StepShape};
use crate::dag::task_run::TaskRun;
use crate::types::{StepId, TaskRunStatus};

/// Position of a node within the DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// No other step lists this one as a child (entry point).
    Source,
    /// Has a parent and at least one child.
    Interior,
    /// Has a parent but no children.
    Sink,
}

impl NodeRole {
    pub fn classify(has_parent: bool, has_child: bool) -> Self {
        match (has_parent, has_child) {
            (true, true) => NodeRole::Interior,
            (true, false) => NodeRole::Sink,
            (false, _) => NodeRole::Source,
        }
    }

    /// Whether the node is drawn with an incoming connection handle.
    pub fn has_input_handle(self) -> bool {
        !matches!(self, NodeRole::Source)
    }

    /// Whether the node is drawn with an outgoing connection handle.
    pub fn has_output_handle(self) -> bool {
        !matches!(self, NodeRole::Sink)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub step_id: StepId,
    pub task_name: String,
    pub role: NodeRole,
    /// Latest run for this step; absent while the step has not started.
    pub run: Option<TaskRun>,
    pub spawned_children: u32,
}

impl GraphNode {
    pub fn status(&self) -> Option<TaskRunStatus> {
        self.run.as_ref().map(|r| r.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub from: StepId,
    pub to: StepId,
    /// True iff the target step is currently running.
    pub active: bool,
}

impl GraphEdge {
    /// Stable edge id in `from-to` form.
    pub fn id(&self) -> String {
        format!("{}-{}", self.from, self.to)
    }
}

/// A child reference that points at a step missing from the shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedEdge {
    pub from: StepId,
    pub to: StepId,
}

/// Non-fatal anomalies observed while projecting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectionDiagnostics {
    pub dropped_edges: Vec<DroppedEdge>,
    /// Step ids that had more than one task run; the first one was used.
    pub duplicate_runs: Vec<StepId>,
}

impl ProjectionDiagnostics {
    pub fn dropped_edge_count(&self) -> usize {
        self.dropped_edges.len()
    }

    pub fn is_clean(&self) -> bool {
        self.dropped_edges.is_empty() && self.duplicate_runs.is_empty()
    }
}

/// Renderable node/edge view of a workflow run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DagProjection {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    #[serde(skip_serializing_if = "ProjectionDiagnostics::is_clean")]
    pub diagnostics: ProjectionDiagnostics,
}

impl DagProjection {
    pub fn node(&self, step_id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.step_id == step_id)
    }

    pub fn active_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(|e| e.active)
    }

    /// Task run behind a node, used to resolve node clicks.
    pub fn run_for_step(&self, step_id: &str) -> Option<&TaskRun> {
        self.node(step_id).and_then(|n| n.run.as_ref())
    }

    /// True when every node has a run in a terminal status.
    ///
    /// An empty projection is never considered terminal.
    pub fn all_terminal(&self) -> bool {
        !self.nodes.is_empty()
            && self
                .nodes
                .iter()
                .all(|n| n.status().is_some_and(TaskRunStatus::is_terminal))
    }
}

/// Project a shape and run list into nodes and edges.
///
/// - Nodes follow input shape order, one per shape entry.
/// - Edges whose target is missing from the shape are dropped and recorded.
/// - When several runs share a step id, the first one wins.
pub fn project(shape: &[StepShape], runs: &[TaskRun]) -> DagProjection {
    let index = ShapeIndex::from_shape(shape);
    let mut diagnostics = ProjectionDiagnostics::default();

    let mut runs_by_step: HashMap<&str, &TaskRun> = HashMap::with_capacity(runs.len());
    for run in runs {
        if runs_by_step.contains_key(run.step_id.as_str()) {
            if !diagnostics.duplicate_runs.contains(&run.step_id) {
                debug!(
                    step = %run.step_id,
                    run_id = %run.run_id,
                    "duplicate task run for step; keeping the first"
                );
                diagnostics.duplicate_runs.push(run.step_id.clone());
            }
            continue;
        }
        runs_by_step.insert(run.step_id.as_str(), run);
    }

    let nodes = shape
        .iter()
        .map(|step| {
            let has_parent = !index.parents_of(&step.step_id).is_empty();
            let has_child = !step.children_step_ids.is_empty();
            let run = runs_by_step.get(step.step_id.as_str()).map(|r| (*r).clone());
            let spawned_children = run.as_ref().map_or(0, |r| r.num_spawned_children);

            GraphNode {
                step_id: step.step_id.clone(),
                task_name: step.task_name.clone(),
                role: NodeRole::classify(has_parent, has_child),
                run,
                spawned_children,
            }
        })
        .collect();

    let mut edges = Vec::new();
    for step in shape {
        for child in &step.children_step_ids {
            if !index.contains(child) {
                warn!(
                    from = %step.step_id,
                    to = %child,
                    "dropping edge to step missing from shape"
                );
                diagnostics.dropped_edges.push(DroppedEdge {
                    from: step.step_id.clone(),
                    to: child.clone(),
                });
                continue;
            }

            let active = runs_by_step
                .get(child.as_str())
                .is_some_and(|r| r.status == TaskRunStatus::Running);

            edges.push(GraphEdge {
                from: step.step_id.clone(),
                to: child.clone(),
                active,
            });
        }
    }

    DagProjection {
        nodes,
        edges,
        diagnostics,
    }
}
