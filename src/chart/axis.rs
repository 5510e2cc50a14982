// src/chart/axis.rs

use chrono::{DateTime, Duration, Utc};

use crate::chart::zoom::DataPoint;

/// Granularity of x-axis tick labels, chosen from the span of the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFormat {
    /// `Mar 4` — spans longer than seven days.
    MonthDay,
    /// `Mar 4 13:05` — spans longer than a day.
    MonthDayTime,
    /// `13:05`
    Time,
}

impl TickFormat {
    pub fn for_span(min: DateTime<Utc>, max: DateTime<Utc>) -> Self {
        let span = max - min;
        if span > Duration::days(7) {
            TickFormat::MonthDay
        } else if span > Duration::days(1) {
            TickFormat::MonthDayTime
        } else {
            TickFormat::Time
        }
    }

    /// Pick a format for a series; empty series use `Time`.
    pub fn for_data(data: &[DataPoint]) -> Self {
        let min = data.iter().map(|d| d.date).min();
        let max = data.iter().map(|d| d.date).max();
        match (min, max) {
            (Some(min), Some(max)) => Self::for_span(min, max),
            _ => TickFormat::Time,
        }
    }

    pub fn format(self, date: DateTime<Utc>) -> String {
        let pattern = match self {
            TickFormat::MonthDay => "%b %-d",
            TickFormat::MonthDayTime => "%b %-d %H:%M",
            TickFormat::Time => "%H:%M",
        };
        date.format(pattern).to_string()
    }
}
