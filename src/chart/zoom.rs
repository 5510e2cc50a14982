// src/chart/zoom.rs

//! Drag-to-zoom selection over a time-bucketed series.
//!
//! The pointer gesture reports the label (bucket date) under the cursor.
//! Boundaries snap outwards to the neighbouring bucket so the selected
//! buckets are fully covered:
//!
//! - pointer down snaps the left edge to the previous bucket, or
//!   extrapolates one gap before the first bucket;
//! - pointer move snaps the right edge to the next bucket, or extrapolates
//!   one gap past the last bucket;
//! - pointer up emits the sorted range and resets.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One bucket of the chart: a date and the series values at that date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub date: DateTime<Utc>,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

impl DataPoint {
    pub fn new(date: DateTime<Utc>) -> Self {
        Self {
            date,
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: f64) -> Self {
        self.values.insert(key.into(), value);
        self
    }
}

/// A non-inverted time interval: `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(a: DateTime<Utc>, b: DateTime<Utc>) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }
}

fn position_of(label: DateTime<Utc>, data: &[DataPoint]) -> Option<usize> {
    data.iter().position(|d| d.date == label)
}

/// Right boundary for a label: the next bucket, or one gap past the last.
///
/// `None` when the label is not a bucket, there are fewer than two buckets
/// (the gap is undefined), or the extrapolated date is out of range.
pub fn next_boundary(label: DateTime<Utc>, data: &[DataPoint]) -> Option<DateTime<Utc>> {
    if data.len() < 2 {
        return None;
    }
    let idx = position_of(label, data)?;

    if idx == data.len() - 1 {
        let last = data[idx].date;
        let gap = last - data[idx - 1].date;
        return last.checked_add_signed(gap);
    }

    Some(data[idx + 1].date)
}

/// Left boundary for a label: the previous bucket, or one gap before the
/// first. A label that is not a bucket is kept as-is.
///
/// `None` when there are fewer than two buckets or the extrapolated date is
/// out of range.
pub fn prev_boundary(label: DateTime<Utc>, data: &[DataPoint]) -> Option<DateTime<Utc>> {
    if data.len() < 2 {
        return None;
    }
    let Some(idx) = position_of(label, data) else {
        return Some(label);
    };

    if idx == 0 {
        let first = data[0].date;
        let gap = data[1].date - first;
        return first.checked_sub_signed(gap);
    }

    Some(data[idx - 1].date)
}

/// State of an in-progress drag selection.
#[derive(Debug, Clone, Default)]
pub struct ZoomSelection {
    ref_left: Option<DateTime<Utc>>,
    ref_right: Option<DateTime<Utc>>,
    actual_left: Option<DateTime<Utc>>,
    actual_right: Option<DateTime<Utc>>,
    selecting: bool,
}

impl ZoomSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selecting(&self) -> bool {
        self.selecting
    }

    /// Raw labels under the pointer while dragging, for highlighting.
    pub fn reference_area(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.ref_left?, self.ref_right?))
    }

    pub fn pointer_down(&mut self, active_label: Option<DateTime<Utc>>, data: &[DataPoint]) {
        if let Some(label) = active_label {
            self.ref_left = Some(label);
            self.actual_left = prev_boundary(label, data);
            self.selecting = true;
        }
    }

    pub fn pointer_move(&mut self, active_label: Option<DateTime<Utc>>, data: &[DataPoint]) {
        if !self.selecting {
            return;
        }
        if let Some(label) = active_label {
            self.ref_right = Some(label);
            self.actual_right = next_boundary(label, data);
        }
    }

    /// Finish the gesture, returning the range to zoom into (if any).
    pub fn pointer_up(&mut self) -> Option<TimeRange> {
        let range = match (self.actual_left, self.actual_right) {
            (Some(left), Some(right)) => Some(TimeRange::new(left, right)),
            _ => None,
        };

        if let Some(r) = range {
            debug!(start = %r.start, end = %r.end, "zoom selection emitted");
        }

        *self = Self::default();
        range
    }
}
