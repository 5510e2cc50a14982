#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use rundag::chart::DataPoint;
use rundag::dag::{StepShape, TaskRun, WorkflowRunSnapshot};
use rundag::types::TaskRunStatus;

/// Builder for a shape (ordered list of steps) to simplify test setup.
///
/// Task names default to the step id.
pub struct ShapeBuilder {
    steps: Vec<StepShape>,
}

impl ShapeBuilder {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Add a step with the given children.
    pub fn step(mut self, id: &str, children: &[&str]) -> Self {
        self.steps
            .push(StepShape::new(id, id).with_children(children.iter().copied()));
        self
    }

    /// Add a step with an explicit task name.
    pub fn named_step(mut self, id: &str, task_name: &str, children: &[&str]) -> Self {
        self.steps
            .push(StepShape::new(id, task_name).with_children(children.iter().copied()));
        self
    }

    pub fn build(self) -> Vec<StepShape> {
        self.steps
    }
}

impl Default for ShapeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A run for `step` with run id `run-<step>`.
pub fn run(step: &str, status: TaskRunStatus) -> TaskRun {
    TaskRun::new(step, format!("run-{step}"), status)
}

pub fn snapshot(shape: Vec<StepShape>, runs: Vec<TaskRun>) -> WorkflowRunSnapshot {
    WorkflowRunSnapshot {
        shape,
        task_runs: runs,
    }
}

/// Fixed base instant used by chart tests: 2024-05-01 10:00:00 UTC.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0)
        .single()
        .expect("valid base time")
}

/// `count` evenly spaced points starting at `start`, `gap` apart.
pub fn uniform_points(start: DateTime<Utc>, gap: Duration, count: usize) -> Vec<DataPoint> {
    (0..count)
        .map(|i| {
            DataPoint::new(start + gap * i as i32)
                .with_value("SUCCEEDED", i as f64)
                .with_value("FAILED", 0.0)
        })
        .collect()
}
