// src/dag/task_run.rs

//! Dynamic run-state types delivered by each poll.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dag::shape::StepShape;
use crate::types::{RunId, StepId, TaskRunStatus};

/// One execution instance of a step.
///
/// Never mutated in place: the whole run list is swapped on every refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRun {
    pub step_id: StepId,
    pub run_id: RunId,
    pub status: TaskRunStatus,
    #[serde(default)]
    pub num_spawned_children: u32,
    /// Machine-readable cancellation reason, e.g. `TIMED_OUT`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Key/value metadata attached when the run was triggered.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_metadata: BTreeMap<String, String>,
}

impl TaskRun {
    pub fn new(
        step_id: impl Into<StepId>,
        run_id: impl Into<RunId>,
        status: TaskRunStatus,
    ) -> Self {
        Self {
            step_id: step_id.into(),
            run_id: run_id.into(),
            status,
            num_spawned_children: 0,
            cancelled_reason: None,
            created_at: None,
            finished_at: None,
            additional_metadata: BTreeMap::new(),
        }
    }

    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn finished(mut self, at: DateTime<Utc>) -> Self {
        self.finished_at = Some(at);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_metadata.insert(key.into(), value.into());
        self
    }
}

/// Stored result of a finished task run, fetched on demand by run id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskOutput {
    pub run_id: RunId,
    pub status: TaskRunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// A single poll result for one workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRunSnapshot {
    #[serde(default)]
    pub shape: Vec<StepShape>,
    #[serde(default)]
    pub task_runs: Vec<TaskRun>,
}
