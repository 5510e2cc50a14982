// src/source/file.rs

//! JSON-file backed data source.
//!
//! The file is re-read on every fetch, so an external process can rewrite
//! it between polls:
//!
//! ```json
//! {
//!   "shape": [{ "stepId": "a", "taskName": "fetch", "childrenStepIds": ["b"] }],
//!   "taskRuns": [{ "stepId": "a", "runId": "r1", "status": "RUNNING" }],
//!   "outputs": { "r1": { "runId": "r1", "status": "SUCCEEDED", "output": {} } }
//! }
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use serde::Deserialize;
use tracing::debug;

use crate::dag::{StepShape, TaskOutput, TaskRun, WorkflowRunSnapshot};
use crate::errors::{Result, RundagError};
use crate::source::{OutputSource, SnapshotSource};
use crate::types::RunId;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotFile {
    #[serde(default)]
    shape: Vec<StepShape>,
    #[serde(default)]
    task_runs: Vec<TaskRun>,
    #[serde(default)]
    outputs: HashMap<RunId, TaskOutput>,
}

#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    path: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<SnapshotFile> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let file: SnapshotFile = serde_json::from_str(&contents)?;
        debug!(
            path = ?self.path,
            steps = file.shape.len(),
            runs = file.task_runs.len(),
            "read snapshot file"
        );
        Ok(file)
    }
}

impl SnapshotSource for FileSnapshotSource {
    fn fetch_snapshot(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<WorkflowRunSnapshot>> + Send + '_>> {
        Box::pin(async move {
            let file = self.read().await?;
            Ok(WorkflowRunSnapshot {
                shape: file.shape,
                task_runs: file.task_runs,
            })
        })
    }
}

impl OutputSource for FileSnapshotSource {
    fn fetch_output<'a>(
        &'a self,
        run_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<TaskOutput>> + Send + 'a>> {
        Box::pin(async move {
            let mut file = self.read().await?;
            file.outputs
                .remove(run_id)
                .ok_or_else(|| RundagError::OutputUnavailable {
                    run_id: run_id.to_string(),
                    reason: "no stored output for this run".to_string(),
                })
        })
    }
}
