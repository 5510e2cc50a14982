// tests/zoom_selection.rs

use chrono::{Duration, TimeZone, Utc};
use rundag::chart::{next_boundary, prev_boundary, DataPoint, TickFormat, TimeRange, ZoomSelection};
use rundag_test_utils::builders::{base_time, uniform_points};

fn at(h: u32, m: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, h, m, 0).single().expect("valid time")
}

#[test]
fn drag_ending_on_last_bucket_extrapolates_one_gap() {
    // buckets at 10:00, 10:05, 10:10
    let data = uniform_points(base_time(), Duration::minutes(5), 3);
    let mut zoom = ZoomSelection::new();

    zoom.pointer_down(Some(at(10, 10)), &data);
    zoom.pointer_move(Some(at(10, 10)), &data);
    let range = zoom.pointer_up();

    assert_eq!(range, Some(TimeRange::new(at(10, 5), at(10, 15))));
}

#[test]
fn boundaries_extrapolate_past_both_ends_with_uniform_spacing() {
    let gap = Duration::hours(1);
    let data = uniform_points(base_time(), gap, 6);
    let first = data[0].date;
    let last = data[5].date;

    assert_eq!(next_boundary(last, &data), Some(last + gap));
    assert_eq!(prev_boundary(first, &data), Some(first - gap));
}

#[test]
fn interior_labels_snap_to_neighbouring_buckets() {
    let data = uniform_points(base_time(), Duration::minutes(5), 4);

    assert_eq!(next_boundary(at(10, 5), &data), Some(at(10, 10)));
    assert_eq!(prev_boundary(at(10, 10), &data), Some(at(10, 5)));
}

#[test]
fn no_boundaries_with_fewer_than_two_buckets() {
    let one = uniform_points(base_time(), Duration::minutes(5), 1);

    assert_eq!(next_boundary(base_time(), &one), None);
    assert_eq!(prev_boundary(base_time(), &one), None);
    assert_eq!(next_boundary(base_time(), &[]), None);

    let mut zoom = ZoomSelection::new();
    zoom.pointer_down(Some(base_time()), &one);
    zoom.pointer_move(Some(base_time()), &one);
    assert_eq!(zoom.pointer_up(), None);
}

#[test]
fn unknown_labels_keep_left_edge_but_give_no_right_edge() {
    let data = uniform_points(base_time(), Duration::minutes(5), 3);
    let off_grid = at(10, 7);

    assert_eq!(prev_boundary(off_grid, &data), Some(off_grid));
    assert_eq!(next_boundary(off_grid, &data), None);
}

#[test]
fn dragging_right_to_left_yields_a_sorted_range() {
    let data = uniform_points(base_time(), Duration::minutes(5), 4);
    let mut zoom = ZoomSelection::new();

    zoom.pointer_down(Some(at(10, 15)), &data);
    zoom.pointer_move(Some(at(10, 0)), &data);
    let range = zoom.pointer_up().expect("range");

    assert_eq!(range.start, at(10, 5));
    assert_eq!(range.end, at(10, 10));
}

#[test]
fn gesture_state_tracks_reference_area_and_resets_on_release() {
    let data = uniform_points(base_time(), Duration::minutes(5), 3);
    let mut zoom = ZoomSelection::new();

    // Moves before a press are ignored.
    zoom.pointer_move(Some(at(10, 5)), &data);
    assert!(!zoom.is_selecting());
    assert_eq!(zoom.reference_area(), None);

    // A press outside the plot area does not start a selection.
    zoom.pointer_down(None, &data);
    assert!(!zoom.is_selecting());

    zoom.pointer_down(Some(at(10, 0)), &data);
    assert!(zoom.is_selecting());
    assert_eq!(zoom.reference_area(), None);

    zoom.pointer_move(Some(at(10, 5)), &data);
    assert_eq!(zoom.reference_area(), Some((at(10, 0), at(10, 5))));

    assert_eq!(zoom.pointer_up(), Some(TimeRange::new(at(9, 55), at(10, 10))));
    assert!(!zoom.is_selecting());
    assert_eq!(zoom.reference_area(), None);
    assert_eq!(zoom.pointer_up(), None);
}

#[test]
fn release_without_move_emits_nothing() {
    let data = uniform_points(base_time(), Duration::minutes(5), 3);
    let mut zoom = ZoomSelection::new();

    zoom.pointer_down(Some(at(10, 5)), &data);

    assert_eq!(zoom.pointer_up(), None);
}

#[test]
fn tick_format_depends_on_data_span() {
    let start = base_time();

    assert_eq!(TickFormat::for_span(start, start + Duration::hours(3)), TickFormat::Time);
    assert_eq!(TickFormat::for_span(start, start + Duration::days(2)), TickFormat::MonthDayTime);
    assert_eq!(TickFormat::for_span(start, start + Duration::days(30)), TickFormat::MonthDay);
    assert_eq!(TickFormat::for_data(&[]), TickFormat::Time);

    let weekly = uniform_points(start, Duration::days(3), 4);
    assert_eq!(TickFormat::for_data(&weekly), TickFormat::MonthDay);

    assert_eq!(TickFormat::MonthDay.format(at(13, 5)), "May 1");
    assert_eq!(TickFormat::MonthDayTime.format(at(13, 5)), "May 1 13:05");
    assert_eq!(TickFormat::Time.format(at(13, 5)), "13:05");
}

#[test]
fn data_points_flatten_series_values() {
    let point = DataPoint::new(base_time()).with_value("SUCCEEDED", 4.0);

    let value = serde_json::to_value(&point).expect("serialise");

    assert_eq!(value["SUCCEEDED"], serde_json::json!(4.0));
    assert!(value.get("date").is_some());
}

#[test]
fn extrapolation_past_the_representable_range_yields_no_boundary() {
    let gap = Duration::days(1);

    let near_max = chrono::DateTime::<Utc>::MAX_UTC - Duration::minutes(1);
    let late = vec![DataPoint::new(near_max - gap), DataPoint::new(near_max)];
    assert_eq!(next_boundary(near_max, &late), None);
    assert_eq!(prev_boundary(near_max, &late), Some(near_max - gap));

    let near_min = chrono::DateTime::<Utc>::MIN_UTC + Duration::minutes(1);
    let early = vec![DataPoint::new(near_min), DataPoint::new(near_min + gap)];
    assert_eq!(prev_boundary(near_min, &early), None);
    assert_eq!(next_boundary(near_min, &early), Some(near_min + gap));

    let mut zoom = ZoomSelection::new();
    zoom.pointer_down(Some(near_max - gap), &late);
    zoom.pointer_move(Some(near_max), &late);
    assert_eq!(zoom.pointer_up(), None);

    zoom.pointer_down(Some(near_min), &early);
    zoom.pointer_move(Some(near_min + gap), &early);
    assert_eq!(zoom.pointer_up(), None);
}
