// src/events/mod.rs

//! Event-push client (single, bulk, task-run log lines and output streams).
//!
//! Sibling interface to the DAG view: it shares configuration, logging and
//! error handling with the rest of the crate but no graph state.

pub mod client;
pub mod retry;
pub mod transport;

pub use client::{apply_namespace, EventClient, EventWithMetadata, PushEventOptions};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use transport::{
    BulkPushEventRequest, EventTransport, JsonLinesTransport, LogLevel, PushEventRequest,
    PushedEvent, PutLogRequest, PutStreamRequest,
};
