// src/status/mod.rs

//! Status-driven rendering.
//!
//! [`dispatch`] maps each [`TaskRunStatus`](crate::types::TaskRunStatus) to
//! exactly one [`RenderStrategy`]; [`render`] turns a strategy into a
//! [`StatusView`] for a concrete task run.

pub mod dispatch;
pub mod render;

pub use dispatch::{dispatch_status, RenderStrategy};
pub use render::{readable_reason, render_task_run, RenderContext, StatusView};
