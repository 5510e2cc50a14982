// src/dag/filter.rs

//! Run-list filtering by status, creation window and trigger metadata.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chart::TimeRange;
use crate::dag::task_run::TaskRun;
use crate::types::TaskRunStatus;

/// Filter over a run list. An empty filter keeps every run.
///
/// - `statuses`: keep runs in any of these statuses (empty = any).
/// - `since` / `until`: inclusive bounds on `created_at`; a run without a
///   creation time never matches a bounded window.
/// - `additional_metadata`: every pair must be present on the run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunFilter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statuses: Vec<TaskRunStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_metadata: BTreeMap<String, String>,
}

impl RunFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: TaskRunStatus) -> Self {
        if !self.statuses.contains(&status) {
            self.statuses.push(status);
        }
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_metadata.insert(key.into(), value.into());
        self
    }

    /// Narrow the creation window to a zoomed chart range.
    pub fn zoomed(mut self, range: TimeRange) -> Self {
        self.since = Some(range.start);
        self.until = Some(range.end);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
            && self.since.is_none()
            && self.until.is_none()
            && self.additional_metadata.is_empty()
    }

    pub fn matches(&self, run: &TaskRun) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&run.status) {
            return false;
        }

        if self.since.is_some() || self.until.is_some() {
            let Some(created) = run.created_at else {
                return false;
            };
            if self.since.is_some_and(|since| created < since) {
                return false;
            }
            if self.until.is_some_and(|until| created > until) {
                return false;
            }
        }

        self.additional_metadata
            .iter()
            .all(|(k, v)| run.additional_metadata.get(k) == Some(v))
    }

    /// Runs that pass the filter, in input order.
    pub fn apply(&self, runs: &[TaskRun]) -> Vec<TaskRun> {
        let kept: Vec<TaskRun> = runs.iter().filter(|r| self.matches(r)).cloned().collect();
        debug!(total = runs.len(), kept = kept.len(), "applied run filter");
        kept
    }
}
