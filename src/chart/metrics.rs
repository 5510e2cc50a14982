// src/chart/metrics.rs

//! Status-count series feeding the zoomable chart.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::chart::zoom::DataPoint;
use crate::dag::TaskRun;
use crate::types::TaskRunStatus;

/// Series every bucket carries even when zero.
pub const CHART_SERIES: [TaskRunStatus; 2] = [TaskRunStatus::Succeeded, TaskRunStatus::Failed];

fn bucket_start(at: DateTime<Utc>, bucket_ms: i64) -> Option<DateTime<Utc>> {
    let ms = at.timestamp_millis();
    DateTime::from_timestamp_millis(ms - ms.rem_euclid(bucket_ms))
}

/// Count runs per status in fixed-width buckets of `created_at`.
///
/// Buckets are aligned to the Unix epoch and returned in date order; only
/// buckets holding at least one run are emitted. Runs without a creation
/// time are skipped. A non-positive `bucket` yields an empty series.
pub fn status_counts(runs: &[TaskRun], bucket: Duration) -> Vec<DataPoint> {
    let bucket_ms = bucket.num_milliseconds();
    if bucket_ms <= 0 {
        return Vec::new();
    }

    let mut buckets: BTreeMap<DateTime<Utc>, DataPoint> = BTreeMap::new();
    for run in runs {
        let Some(start) = run.created_at.and_then(|at| bucket_start(at, bucket_ms)) else {
            continue;
        };
        let point = buckets.entry(start).or_insert_with(|| {
            CHART_SERIES
                .iter()
                .fold(DataPoint::new(start), |p, s| p.with_value(s.as_str(), 0.0))
        });
        *point.values.entry(run.status.as_str().to_string()).or_insert(0.0) += 1.0;
    }

    buckets.into_values().collect()
}

/// Number of runs per status, in [`TaskRunStatus::ALL`] order, omitting
/// statuses with no runs.
pub fn status_totals(runs: &[TaskRun]) -> Vec<(TaskRunStatus, usize)> {
    TaskRunStatus::ALL
        .into_iter()
        .map(|status| (status, runs.iter().filter(|r| r.status == status).count()))
        .filter(|(_, count)| *count > 0)
        .collect()
}
