use std::collections::HashSet;

use chrono::Duration;
use proptest::prelude::*;
use rundag::chart::{DataPoint, ZoomSelection};
use rundag::dag::{project, StepShape, TaskRun};
use rundag::status::dispatch_status;
use rundag::types::TaskRunStatus;
use rundag_test_utils::builders::{base_time, uniform_points};

fn status_strategy() -> impl Strategy<Value = TaskRunStatus> {
    proptest::sample::select(TaskRunStatus::ALL.to_vec())
}

// Strategy to generate a shape plus runs.
// Children are drawn from a pool larger than the shape so that some of them
// dangle; only later steps are used as real children to keep it acyclic.
fn shape_and_runs_strategy(
    max_steps: usize,
) -> impl Strategy<Value = (Vec<StepShape>, Vec<TaskRun>)> {
    (1..=max_steps).prop_flat_map(|num_steps| {
        let children = proptest::collection::vec(
            proptest::collection::vec(0..num_steps + 3, 0..4),
            num_steps,
        );
        let runs = proptest::collection::vec(
            proptest::option::of(status_strategy()),
            num_steps,
        );

        (children, runs).prop_map(move |(raw_children, raw_runs)| {
            let shape: Vec<StepShape> = raw_children
                .into_iter()
                .enumerate()
                .map(|(i, kids)| {
                    let mut seen = HashSet::new();
                    let children: Vec<String> = kids
                        .into_iter()
                        .filter(|&k| k > i)
                        .filter(|k| seen.insert(*k))
                        .map(|k| format!("step_{k}"))
                        .collect();
                    StepShape::new(format!("step_{i}"), format!("task_{i}")).with_children(children)
                })
                .collect();

            let runs: Vec<TaskRun> = raw_runs
                .into_iter()
                .enumerate()
                .filter_map(|(i, status)| {
                    status.map(|s| TaskRun::new(format!("step_{i}"), format!("run_{i}"), s))
                })
                .collect();

            (shape, runs)
        })
    })
}

proptest! {
    #[test]
    fn every_step_yields_exactly_one_node((shape, runs) in shape_and_runs_strategy(12)) {
        let projection = project(&shape, &runs);

        prop_assert_eq!(projection.nodes.len(), shape.len());
        for (node, step) in projection.nodes.iter().zip(shape.iter()) {
            prop_assert_eq!(&node.step_id, &step.step_id);
        }
    }

    #[test]
    fn every_edge_targets_a_known_step((shape, runs) in shape_and_runs_strategy(12)) {
        let projection = project(&shape, &runs);
        let known: HashSet<&str> = shape.iter().map(|s| s.step_id.as_str()).collect();

        for edge in &projection.edges {
            prop_assert!(known.contains(edge.to.as_str()));
        }

        let listed: usize = shape.iter().map(|s| s.children_step_ids.len()).sum();
        prop_assert_eq!(
            projection.edges.len() + projection.diagnostics.dropped_edge_count(),
            listed
        );
    }

    #[test]
    fn edge_is_active_iff_target_is_running((shape, runs) in shape_and_runs_strategy(12)) {
        let projection = project(&shape, &runs);

        for edge in &projection.edges {
            let running = runs
                .iter()
                .find(|r| r.step_id == edge.to)
                .is_some_and(|r| r.status == TaskRunStatus::Running);
            prop_assert_eq!(edge.active, running);
        }
    }

    #[test]
    fn dispatch_is_total(status in status_strategy()) {
        let strategy = dispatch_status(status);
        prop_assert_eq!(strategy.requires_output(), matches!(status, TaskRunStatus::Succeeded | TaskRunStatus::Failed));
    }

    #[test]
    fn zoom_range_is_never_inverted(
        count in 0usize..8,
        gap_minutes in 1i64..120,
        gestures in proptest::collection::vec((0usize..10, proptest::collection::vec(0usize..10, 0..4)), 1..6),
    ) {
        let data: Vec<DataPoint> = uniform_points(base_time(), Duration::minutes(gap_minutes), count);
        let label_at = |i: usize| {
            data.get(i).map(|d| d.date).or(Some(base_time() + Duration::minutes(i as i64 * 7 + 1)))
        };

        let mut zoom = ZoomSelection::new();
        for (down, moves) in gestures {
            zoom.pointer_down(label_at(down), &data);
            for m in moves {
                zoom.pointer_move(label_at(m), &data);
            }
            if let Some(range) = zoom.pointer_up() {
                prop_assert!(count >= 2);
                prop_assert!(range.start <= range.end);
            }
        }
    }
}
