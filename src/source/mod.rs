// src/source/mod.rs

//! Pluggable data-source abstractions.
//!
//! The refresh runtime talks to a [`SnapshotSource`] for the periodic poll
//! and to an [`OutputSource`] for on-demand task output, instead of a
//! concrete backend. Production uses [`FileSnapshotSource`]; tests can
//! provide in-memory fakes.

use std::future::Future;
use std::pin::Pin;

use crate::dag::{TaskOutput, WorkflowRunSnapshot};
use crate::errors::Result;

pub mod file;

pub use file::FileSnapshotSource;

/// Polling data source returning the shape and run list of one workflow run.
pub trait SnapshotSource: Send + Sync {
    fn fetch_snapshot(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<WorkflowRunSnapshot>> + Send + '_>>;
}

/// Fetch-by-id operation for a finished task's stored output or error.
pub trait OutputSource: Send + Sync {
    fn fetch_output<'a>(
        &'a self,
        run_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<TaskOutput>> + Send + 'a>>;
}
