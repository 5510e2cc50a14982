// tests/core_refresher.rs

use std::time::Duration;

use rundag::dag::NodeRole;
use rundag::engine::{CoreCommand, CoreRefresher, RefreshEvent, RefreshPolicy, RuntimeOptions};
use rundag::types::TaskRunStatus;
use rundag_test_utils::builders::{run, snapshot, ShapeBuilder};
use rundag_test_utils::init_tracing;

fn policy(pause_while_ui_open: bool) -> RefreshPolicy {
    RefreshPolicy {
        interval: Duration::from_millis(5000),
        pause_while_ui_open,
    }
}

fn fan_out() -> rundag::dag::WorkflowRunSnapshot {
    let shape = ShapeBuilder::new()
        .step("A", &["B", "C"])
        .step("B", &[])
        .step("C", &[])
        .build();
    snapshot(
        shape,
        vec![run("A", TaskRunStatus::Succeeded), run("B", TaskRunStatus::Running)],
    )
}

fn is_fetch(cmds: &[CoreCommand]) -> bool {
    matches!(cmds, [CoreCommand::FetchSnapshot])
}

#[test]
fn default_policy_polls_every_five_seconds_and_pauses() {
    let policy = RefreshPolicy::default();
    assert_eq!(policy.interval, Duration::from_millis(5000));
    assert!(policy.pause_while_ui_open);
}

#[test]
fn tick_requests_a_fetch_and_skips_while_in_flight() {
    init_tracing();
    let mut core = CoreRefresher::new(policy(true), RuntimeOptions::default());

    let first = core.step(RefreshEvent::Tick);
    assert!(is_fetch(&first.commands));
    assert!(first.keep_running);
    assert!(core.fetch_in_flight());

    let second = core.step(RefreshEvent::Tick);
    assert!(second.commands.is_empty());

    core.step(RefreshEvent::SnapshotFetched(fan_out()));
    assert!(!core.fetch_in_flight());
    assert!(is_fetch(&core.step(RefreshEvent::Tick).commands));
}

#[test]
fn snapshot_publishes_a_projection() {
    init_tracing();
    let mut core = CoreRefresher::new(policy(true), RuntimeOptions::default());
    core.step(RefreshEvent::Tick);

    let step = core.step(RefreshEvent::SnapshotFetched(fan_out()));

    let [CoreCommand::Publish(projection)] = step.commands.as_slice() else {
        panic!("expected a single publish, got {:?}", step.commands);
    };
    assert_eq!(projection.nodes.len(), 3);
    assert_eq!(projection.node("A").map(|n| n.role), Some(NodeRole::Source));
    assert_eq!(projection.active_edges().count(), 1);
    assert_eq!(core.published_count(), 1);
}

#[test]
fn open_surface_pauses_polling_until_closed() {
    init_tracing();
    let mut core = CoreRefresher::new(policy(true), RuntimeOptions::default());

    core.step(RefreshEvent::SurfaceOpened);
    assert!(core.is_paused());
    assert!(core.step(RefreshEvent::Tick).commands.is_empty());
    assert!(!core.fetch_in_flight());

    core.step(RefreshEvent::SurfaceOpened);
    core.step(RefreshEvent::SurfaceClosed);
    assert!(core.is_paused());
    assert!(core.step(RefreshEvent::Tick).commands.is_empty());

    core.step(RefreshEvent::SurfaceClosed);
    assert!(!core.is_paused());
    assert!(is_fetch(&core.step(RefreshEvent::Tick).commands));
}

#[test]
fn polling_continues_with_open_surface_when_pause_is_disabled() {
    let mut core = CoreRefresher::new(policy(false), RuntimeOptions::default());

    core.step(RefreshEvent::SurfaceOpened);

    assert!(!core.is_paused());
    assert!(is_fetch(&core.step(RefreshEvent::Tick).commands));
}

#[test]
fn unmatched_close_is_ignored() {
    init_tracing();
    let mut core = CoreRefresher::new(policy(true), RuntimeOptions::default());

    let step = core.step(RefreshEvent::SurfaceClosed);

    assert!(step.keep_running);
    assert_eq!(core.open_surfaces(), 0);
}

#[test]
fn shape_from_first_snapshot_is_kept_while_runs_are_replaced() {
    init_tracing();
    let mut core = CoreRefresher::new(policy(true), RuntimeOptions::default());
    core.step(RefreshEvent::SnapshotFetched(fan_out()));

    let reshaped = snapshot(
        ShapeBuilder::new().step("X", &[]).build(),
        vec![run("C", TaskRunStatus::Pending)],
    );
    let step = core.step(RefreshEvent::SnapshotFetched(reshaped));

    let ids: Vec<_> = core.shape().unwrap_or(&[]).iter().map(|s| s.step_id.as_str()).collect();
    assert_eq!(ids, vec!["A", "B", "C"]);
    assert_eq!(core.runs().len(), 1);

    let [CoreCommand::Publish(projection)] = step.commands.as_slice() else {
        panic!("expected a publish");
    };
    assert!(projection.node("A").and_then(|n| n.run.as_ref()).is_none());
    assert_eq!(projection.node("C").and_then(|n| n.status()), Some(TaskRunStatus::Pending));
}

#[test]
fn clicking_a_started_step_selects_its_run_and_pauses() {
    init_tracing();
    let mut core = CoreRefresher::new(policy(true), RuntimeOptions::default());
    core.step(RefreshEvent::SnapshotFetched(fan_out()));

    let step = core.step(RefreshEvent::NodeClicked("B".to_string()));

    let [CoreCommand::SelectTaskRun(selected)] = step.commands.as_slice() else {
        panic!("expected a selection, got {:?}", step.commands);
    };
    assert_eq!(selected.run_id, "run-B");
    assert_eq!(core.selected_run(), Some("run-B"));
    assert!(core.is_paused());

    core.step(RefreshEvent::SurfaceClosed);
    assert_eq!(core.selected_run(), None);
    assert!(!core.is_paused());
}

#[test]
fn clicking_a_step_without_a_run_does_nothing() {
    init_tracing();
    let mut core = CoreRefresher::new(policy(true), RuntimeOptions::default());
    core.step(RefreshEvent::SnapshotFetched(fan_out()));

    let step = core.step(RefreshEvent::NodeClicked("C".to_string()));

    assert!(step.commands.is_empty());
    assert_eq!(core.open_surfaces(), 0);
    assert_eq!(core.selected_run(), None);
}

#[test]
fn failed_fetch_clears_in_flight_and_keeps_previous_view() {
    init_tracing();
    let mut core = CoreRefresher::new(policy(true), RuntimeOptions::default());
    core.step(RefreshEvent::SnapshotFetched(fan_out()));
    core.step(RefreshEvent::Tick);

    let step = core.step(RefreshEvent::FetchFailed("connection refused".to_string()));

    assert!(step.keep_running);
    assert!(step.commands.is_empty());
    assert!(!core.fetch_in_flight());
    assert_eq!(core.runs().len(), 2);
    assert!(core.projection().is_some());
}

#[test]
fn once_option_exits_after_first_publish() {
    let options = RuntimeOptions {
        exit_after_first_publish: true,
        exit_when_terminal: false,
    };
    let mut core = CoreRefresher::new(policy(true), options);

    let step = core.step(RefreshEvent::SnapshotFetched(fan_out()));

    assert!(!step.keep_running);
    assert!(matches!(
        step.commands.as_slice(),
        [CoreCommand::Publish(_), CoreCommand::RequestExit]
    ));
}

#[test]
fn until_done_option_exits_when_every_step_is_terminal() {
    let options = RuntimeOptions {
        exit_after_first_publish: false,
        exit_when_terminal: true,
    };
    let mut core = CoreRefresher::new(policy(true), options);

    let running = core.step(RefreshEvent::SnapshotFetched(fan_out()));
    assert!(running.keep_running);

    let shape = ShapeBuilder::new()
        .step("A", &["B", "C"])
        .step("B", &[])
        .step("C", &[])
        .build();
    let finished = snapshot(
        shape,
        vec![
            run("A", TaskRunStatus::Succeeded),
            run("B", TaskRunStatus::Failed),
            run("C", TaskRunStatus::Cancelled),
        ],
    );
    let step = core.step(RefreshEvent::SnapshotFetched(finished));

    assert!(!step.keep_running);
    assert!(matches!(step.commands.last(), Some(CoreCommand::RequestExit)));
}

#[test]
fn shutdown_stops_the_loop() {
    let mut core = CoreRefresher::new(policy(true), RuntimeOptions::default());

    let step = core.step(RefreshEvent::ShutdownRequested);

    assert!(!step.keep_running);
    assert!(step.commands.is_empty());
}
