use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a step inside a workflow version's shape.
pub type StepId = String;

/// Identifier of a single task run (one execution of a step).
pub type RunId = String;

/// Status of a task run as reported by the orchestration backend.
///
/// Transitions are never computed locally; every refresh replaces the
/// status wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskRunStatus {
    Cancelled,
    Pending,
    PendingAssignment,
    Assigned,
    Running,
    Succeeded,
    Failed,
    Cancelling,
    Backoff,
}

impl TaskRunStatus {
    pub const ALL: [TaskRunStatus; 9] = [
        TaskRunStatus::Cancelled,
        TaskRunStatus::Pending,
        TaskRunStatus::PendingAssignment,
        TaskRunStatus::Assigned,
        TaskRunStatus::Running,
        TaskRunStatus::Succeeded,
        TaskRunStatus::Failed,
        TaskRunStatus::Cancelling,
        TaskRunStatus::Backoff,
    ];

    /// Whether the backend will never move this run to another status.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskRunStatus::Succeeded | TaskRunStatus::Failed | TaskRunStatus::Cancelled
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskRunStatus::Cancelled => "CANCELLED",
            TaskRunStatus::Pending => "PENDING",
            TaskRunStatus::PendingAssignment => "PENDING_ASSIGNMENT",
            TaskRunStatus::Assigned => "ASSIGNED",
            TaskRunStatus::Running => "RUNNING",
            TaskRunStatus::Succeeded => "SUCCEEDED",
            TaskRunStatus::Failed => "FAILED",
            TaskRunStatus::Cancelling => "CANCELLING",
            TaskRunStatus::Backoff => "BACKOFF",
        }
    }
}

impl fmt::Display for TaskRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskRunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_uppercase().replace(['-', ' '], "_");
        TaskRunStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalised)
            .ok_or_else(|| format!("invalid task run status: {s}"))
    }
}
