// src/status/dispatch.rs

//! Status → render strategy table.

use serde::Serialize;

use crate::types::TaskRunStatus;

/// What to show for a task run in a given status.
///
/// `Backoff` has no strategy of its own; it is rendered like `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStrategy {
    Cancelled,
    Pending,
    PendingAssignment,
    Assigned,
    Running,
    Succeeded,
    Failed,
    Cancelling,
}

impl RenderStrategy {
    /// Whether rendering needs the stored output fetched by run id.
    pub fn requires_output(self) -> bool {
        matches!(self, RenderStrategy::Succeeded | RenderStrategy::Failed)
    }
}

/// Map every status to exactly one strategy.
///
/// No wildcard arm: a new status variant fails to compile until it is given
/// an entry here.
pub fn dispatch_status(status: TaskRunStatus) -> RenderStrategy {
    match status {
        TaskRunStatus::Cancelled => RenderStrategy::Cancelled,
        TaskRunStatus::Pending => RenderStrategy::Pending,
        TaskRunStatus::PendingAssignment => RenderStrategy::PendingAssignment,
        TaskRunStatus::Assigned => RenderStrategy::Assigned,
        TaskRunStatus::Running => RenderStrategy::Running,
        TaskRunStatus::Succeeded => RenderStrategy::Succeeded,
        TaskRunStatus::Failed => RenderStrategy::Failed,
        TaskRunStatus::Cancelling => RenderStrategy::Cancelling,
        TaskRunStatus::Backoff => RenderStrategy::Pending,
    }
}
