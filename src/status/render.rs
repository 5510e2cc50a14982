// src/status/render.rs

//! Read-only views produced by each render strategy.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::dag::{ShapeIndex, TaskOutput, TaskRun};
use crate::errors::Result;
use crate::source::OutputSource;
use crate::status::dispatch::{dispatch_status, RenderStrategy};

/// Description of what to show for a task run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatusView {
    /// A single status line.
    Line { text: String },
    /// A syntax-highlighted payload.
    Code { language: String, code: String },
    /// An error display.
    Error { message: String },
}

impl StatusView {
    pub fn line(text: impl Into<String>) -> Self {
        StatusView::Line { text: text.into() }
    }

    pub fn json(code: impl Into<String>) -> Self {
        StatusView::Code {
            language: "json".to_string(),
            code: code.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        StatusView::Error {
            message: message.into(),
        }
    }
}

impl fmt::Display for StatusView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusView::Line { text } => f.write_str(text),
            StatusView::Code { code, .. } => f.write_str(code),
            StatusView::Error { message } => write!(f, "error: {message}"),
        }
    }
}

/// Inputs a strategy may read besides the fetched output.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    pub run: &'a TaskRun,
    /// Task names of the step's parents, in shape order.
    pub parent_names: Vec<String>,
}

impl<'a> RenderContext<'a> {
    pub fn new(run: &'a TaskRun, index: &ShapeIndex) -> Self {
        Self {
            run,
            parent_names: index.parent_names_of(&run.step_id),
        }
    }
}

/// Turn a machine reason like `TIMED_OUT` into `timed out`.
pub fn readable_reason(reason: &str) -> String {
    reason.to_lowercase().split('_').collect::<Vec<_>>().join(" ")
}

impl RenderStrategy {
    /// Render this strategy.
    ///
    /// `output` is only consulted by strategies that
    /// [require it](RenderStrategy::requires_output); a failed fetch is
    /// shown inline as an error view.
    pub fn render(self, ctx: &RenderContext<'_>, output: Option<&Result<TaskOutput>>) -> StatusView {
        match self {
            RenderStrategy::Cancelled => match ctx.run.cancelled_reason.as_deref() {
                Some(reason) if !reason.is_empty() => StatusView::line(format!(
                    "Step run was cancelled: {}",
                    readable_reason(reason)
                )),
                _ => StatusView::line("Step run was cancelled"),
            },
            RenderStrategy::Pending => {
                if ctx.parent_names.is_empty() {
                    StatusView::line("Waiting to start...")
                } else {
                    StatusView::line(format!(
                        "Waiting for parent steps to complete: {}",
                        ctx.parent_names.join(", ")
                    ))
                }
            }
            RenderStrategy::PendingAssignment => {
                StatusView::line("Step is waiting to be assigned to a worker")
            }
            RenderStrategy::Assigned => {
                StatusView::line("Step has been assigned and will start shortly")
            }
            RenderStrategy::Running => StatusView::line("Step is currently running..."),
            RenderStrategy::Cancelling => StatusView::line("Step run is being cancelled"),
            RenderStrategy::Succeeded => match output {
                Some(Err(e)) => StatusView::error(format!("Failed to load task output: {e}")),
                Some(Ok(out)) => match &out.output {
                    Some(value) => StatusView::json(
                        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
                    ),
                    None => StatusView::json("{}"),
                },
                None => StatusView::json("{}"),
            },
            RenderStrategy::Failed => match output {
                Some(Err(e)) => StatusView::error(format!("Failed to load task output: {e}")),
                Some(Ok(TaskOutput {
                    error_message: Some(msg),
                    ..
                })) if !msg.is_empty() => StatusView::error(msg.clone()),
                _ => StatusView::line("Step run failed with no error message"),
            },
        }
    }
}

/// Dispatch a run's status and render it, fetching stored output first when
/// the strategy needs it.
pub async fn render_task_run<S>(run: &TaskRun, index: &ShapeIndex, outputs: &S) -> StatusView
where
    S: OutputSource + ?Sized,
{
    let strategy = dispatch_status(run.status);
    let ctx = RenderContext::new(run, index);

    if !strategy.requires_output() {
        return strategy.render(&ctx, None);
    }

    debug!(run_id = %run.run_id, ?strategy, "fetching stored output for task run");
    let fetched = outputs.fetch_output(&run.run_id).await;
    if let Err(ref e) = fetched {
        warn!(run_id = %run.run_id, error = %e, "could not fetch task output");
    }

    strategy.render(&ctx, Some(&fetched))
}
