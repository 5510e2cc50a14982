// src/dag/mod.rs

//! Workflow-run DAG model and projection.
//!
//! - [`shape`] holds the static step DAG and an adjacency index over it.
//! - [`task_run`] holds the per-poll run state delivered by the backend.
//! - [`projector`] merges both into nodes (with roles) and edges (with an
//!   activity flag).
//! - [`filter`] narrows a run list by status, creation window and metadata.
//! - [`topology`] offers diagnostic cycle detection for inspection output.

pub mod filter;
pub mod projector;
pub mod shape;
pub mod task_run;
pub mod topology;

pub use filter::RunFilter;
pub use projector::{
    project, DagProjection, DroppedEdge, GraphEdge, GraphNode, NodeRole, ProjectionDiagnostics,
};
pub use shape::{ShapeIndex, StepShape};
pub use task_run::{TaskOutput, TaskRun, WorkflowRunSnapshot};
