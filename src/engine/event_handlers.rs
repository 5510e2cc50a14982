// src/engine/event_handlers.rs

//! Event handling logic for the core refresher.

use tracing::{debug, info, warn};

use crate::dag::{DagProjection, TaskRun, WorkflowRunSnapshot};
use crate::engine::core::ViewState;
use crate::engine::{RefreshPolicy, RuntimeOptions};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    /// Poll the data source for a fresh snapshot.
    FetchSnapshot,
    /// Hand a fresh projection to the UI layer.
    Publish(DagProjection),
    /// Open the detail view for this run.
    SelectTaskRun(TaskRun),
    /// Request that the process exits.
    RequestExit,
}

/// Decision returned by the core after handling a single event.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub fn idle() -> Self {
        Self {
            commands: Vec::new(),
            keep_running: true,
        }
    }

    pub fn stop() -> Self {
        Self {
            commands: Vec::new(),
            keep_running: false,
        }
    }

    fn with(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Handle a poll timer tick.
///
/// Skipped while a surface is open (when the policy says so) and while a
/// previous fetch has not come back yet. In-flight fetches are never
/// aborted; they are simply not re-issued.
pub fn handle_tick(state: &mut ViewState, policy: &RefreshPolicy) -> CoreStep {
    if policy.pause_while_ui_open && state.open_surfaces > 0 {
        debug!(
            open_surfaces = state.open_surfaces,
            "refresh paused while UI surface is open; skipping tick"
        );
        return CoreStep::idle();
    }

    if state.fetch_in_flight {
        debug!("previous fetch still in flight; skipping tick");
        return CoreStep::idle();
    }

    state.fetch_in_flight = true;
    CoreStep::with(vec![CoreCommand::FetchSnapshot])
}

/// Handle a completed poll.
///
/// - The first snapshot's shape is kept for the rest of the session.
/// - The run list is replaced as a whole.
/// - A fresh projection is published.
pub fn handle_snapshot(
    state: &mut ViewState,
    options: &RuntimeOptions,
    snapshot: WorkflowRunSnapshot,
) -> CoreStep {
    state.fetch_in_flight = false;

    match &state.shape {
        None => {
            info!(steps = snapshot.shape.len(), "loaded workflow shape");
            state.shape = Some(snapshot.shape);
        }
        Some(existing) if *existing != snapshot.shape => {
            debug!("snapshot carries a different shape; keeping the session shape");
        }
        Some(_) => {}
    }

    state.runs = snapshot.task_runs;

    let Some(projection) = state.projection() else {
        return CoreStep::idle();
    };

    if projection.diagnostics.dropped_edge_count() > 0 {
        warn!(
            dropped = projection.diagnostics.dropped_edge_count(),
            "projection dropped edges to unknown steps"
        );
    }

    state.published += 1;
    let all_terminal = projection.all_terminal();
    let mut commands = vec![CoreCommand::Publish(projection)];

    if options.exit_after_first_publish {
        info!("first projection published; exiting");
        commands.push(CoreCommand::RequestExit);
        return CoreStep {
            commands,
            keep_running: false,
        };
    }

    if options.exit_when_terminal && all_terminal {
        info!("every step reached a terminal status; exiting");
        commands.push(CoreCommand::RequestExit);
        return CoreStep {
            commands,
            keep_running: false,
        };
    }

    CoreStep::with(commands)
}

pub fn handle_fetch_failed(state: &mut ViewState, reason: String) -> CoreStep {
    state.fetch_in_flight = false;
    warn!(%reason, "snapshot fetch failed; will retry on next tick");
    CoreStep::idle()
}

pub fn handle_surface_opened(state: &mut ViewState) -> CoreStep {
    state.open_surfaces += 1;
    debug!(open_surfaces = state.open_surfaces, "UI surface opened");
    CoreStep::idle()
}

pub fn handle_surface_closed(state: &mut ViewState) -> CoreStep {
    if state.open_surfaces == 0 {
        warn!("surface closed with none open; ignoring");
        return CoreStep::idle();
    }

    state.open_surfaces -= 1;
    if state.open_surfaces == 0 {
        state.selected_run = None;
    }
    debug!(open_surfaces = state.open_surfaces, "UI surface closed");
    CoreStep::idle()
}

/// Handle a click on a graph node.
///
/// A node without a run (step not started yet) is not selectable. Selecting
/// a run opens the detail sheet, which counts as an open surface.
pub fn handle_node_click(state: &mut ViewState, step_id: &str) -> CoreStep {
    let Some(run) = state.runs.iter().find(|r| r.step_id == step_id).cloned() else {
        debug!(step = %step_id, "clicked node has no task run; ignoring");
        return CoreStep::idle();
    };

    info!(step = %step_id, run_id = %run.run_id, "task run selected");
    state.selected_run = Some(run.run_id.clone());
    state.open_surfaces += 1;

    CoreStep::with(vec![CoreCommand::SelectTaskRun(run)])
}
