// src/engine/mod.rs

//! Refresh engine for a workflow-run view.
//!
//! This module ties together:
//! - the periodic poll of the task-run list
//! - the "pause while a modal/sheet is open" guard
//! - node clicks that open a task-run detail view
//! - publishing fresh projections to the UI layer
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use std::time::Duration;

use crate::config::PollConfig;
use crate::dag::WorkflowRunSnapshot;
use crate::types::StepId;

/// Refresh policy handed to the core: the pause guard is explicit
/// configuration, not ambient shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub interval: Duration,
    pub pause_while_ui_open: bool,
}

impl From<&PollConfig> for RefreshPolicy {
    fn from(cfg: &PollConfig) -> Self {
        Self {
            interval: cfg.interval(),
            pause_while_ui_open: cfg.pause_while_ui_open,
        }
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        RefreshPolicy::from(&PollConfig::default())
    }
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// Exit right after the first projection is published (`--once`).
    pub exit_after_first_publish: bool,
    /// Exit once every step has a run in a terminal status.
    pub exit_when_terminal: bool,
}

/// Events flowing into the refresh core.
#[derive(Debug, Clone)]
pub enum RefreshEvent {
    /// The poll timer fired.
    Tick,
    /// A poll completed.
    SnapshotFetched(WorkflowRunSnapshot),
    /// A poll failed; the next tick retries.
    FetchFailed(String),
    /// A modal or sheet was opened in the UI.
    SurfaceOpened,
    /// A modal or sheet was closed in the UI.
    SurfaceClosed,
    /// The user clicked a node in the graph.
    NodeClicked(StepId),
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use core::CoreRefresher;
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::{ConsoleSink, ProjectionSink, Runtime};
