// src/engine/core.rs

//! Pure core refresh state machine.
//!
//! This module contains a synchronous, deterministic "core" that consumes
//! [`RefreshEvent`]s and produces:
//! - an updated view state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Runtime`) is responsible for:
//! - driving the poll timer
//! - running fetches against a `SnapshotSource`
//! - publishing projections and task-run details to a `ProjectionSink`
//!
//! The core is unit tested without any Tokio, channels or IO.

use crate::dag::{project, DagProjection, ShapeIndex, StepShape, TaskRun};
use crate::engine::event_handlers::{
    handle_fetch_failed, handle_node_click, handle_snapshot, handle_surface_closed,
    handle_surface_opened, handle_tick, CoreStep,
};
use crate::engine::{RefreshEvent, RefreshPolicy, RuntimeOptions};
use crate::types::RunId;

/// Mutable state of one workflow-run view session.
#[derive(Debug, Default)]
pub struct ViewState {
    /// Shape kept for the whole session; set by the first snapshot.
    pub(crate) shape: Option<Vec<StepShape>>,
    /// Latest run list, replaced wholesale on every snapshot.
    pub(crate) runs: Vec<TaskRun>,
    /// Number of currently open modals/sheets.
    pub(crate) open_surfaces: usize,
    pub(crate) fetch_in_flight: bool,
    pub(crate) published: u64,
    /// Run shown in the detail sheet, if open.
    pub(crate) selected_run: Option<RunId>,
}

impl ViewState {
    pub(crate) fn projection(&self) -> Option<DagProjection> {
        self.shape
            .as_deref()
            .map(|shape| project(shape, &self.runs))
    }
}

/// Pure core refresh runtime.
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug)]
pub struct CoreRefresher {
    state: ViewState,
    policy: RefreshPolicy,
    options: RuntimeOptions,
}

impl CoreRefresher {
    pub fn new(policy: RefreshPolicy, options: RuntimeOptions) -> Self {
        Self {
            state: ViewState::default(),
            policy,
            options,
        }
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    /// Whether poll ticks are currently being skipped.
    pub fn is_paused(&self) -> bool {
        self.policy.pause_while_ui_open && self.state.open_surfaces > 0
    }

    pub fn open_surfaces(&self) -> usize {
        self.state.open_surfaces
    }

    pub fn fetch_in_flight(&self) -> bool {
        self.state.fetch_in_flight
    }

    pub fn published_count(&self) -> u64 {
        self.state.published
    }

    pub fn selected_run(&self) -> Option<&str> {
        self.state.selected_run.as_deref()
    }

    pub fn shape(&self) -> Option<&[StepShape]> {
        self.state.shape.as_deref()
    }

    pub fn runs(&self) -> &[TaskRun] {
        &self.state.runs
    }

    /// Adjacency index over the session shape (empty before the first poll).
    pub fn shape_index(&self) -> ShapeIndex {
        ShapeIndex::from_shape(self.shape().unwrap_or(&[]))
    }

    /// Projection of the current snapshot, recomputed on every call.
    pub fn projection(&self) -> Option<DagProjection> {
        self.state.projection()
    }

    /// Handle a single event, updating state and returning the resulting
    /// commands for the IO shell.
    pub fn step(&mut self, event: RefreshEvent) -> CoreStep {
        match event {
            RefreshEvent::Tick => handle_tick(&mut self.state, &self.policy),
            RefreshEvent::SnapshotFetched(snapshot) => {
                handle_snapshot(&mut self.state, &self.options, snapshot)
            }
            RefreshEvent::FetchFailed(reason) => handle_fetch_failed(&mut self.state, reason),
            RefreshEvent::SurfaceOpened => handle_surface_opened(&mut self.state),
            RefreshEvent::SurfaceClosed => handle_surface_closed(&mut self.state),
            RefreshEvent::NodeClicked(step_id) => handle_node_click(&mut self.state, &step_id),
            RefreshEvent::ShutdownRequested => CoreStep::stop(),
        }
    }
}
