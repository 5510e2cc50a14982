// src/chart/mod.rs

//! Metrics chart: status-count series, zoom selection and axis labelling.

pub mod axis;
pub mod metrics;
pub mod zoom;

pub use axis::TickFormat;
pub use metrics::{status_counts, status_totals, CHART_SERIES};
pub use zoom::{next_boundary, prev_boundary, DataPoint, TimeRange, ZoomSelection};
