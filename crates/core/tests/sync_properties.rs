//! Property-style tests for reconciliation, diffing and the daemon state machine.

mod common;

use common::*;
use fm_core::daemon::DaemonStateMachine;
use fm_core::reconcile::diff;
use fm_core::reconcile::reconcile;
use fm_core::reconcile::RenderedView;
use fm_core::reconcile::ViewDelta;
use fm_protocol::daemon_models::DaemonState;
use fm_protocol::process_models::LiveProcessRecord;
use fm_protocol::process_models::MergedProjectView;
use fm_protocol::process_models::ProcessStatus;

const NAMES: [&str; 5] = ["alpha", "beta", "delta", "epsilon", "gamma"];

/// Every subset of `NAMES`, as bit masks.
fn subsets() -> impl Iterator<Item = Vec<&'static str>> {
    (0u32..(1 << NAMES.len())).map(|mask| {
        NAMES
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1u32 << *i) != 0)
            .map(|(_, name)| *name)
            .collect()
    })
}

fn live_for(names: &[&str], status: ProcessStatus) -> Vec<LiveProcessRecord> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| live_record(name, i as u32, status))
        .collect()
}

fn names_of(views: &[MergedProjectView]) -> Vec<&str> {
    views.iter().map(MergedProjectView::name).collect()
}

#[test]
fn test_reconcile_output_is_sorted_and_exactly_declared() {
    for declared_names in subsets() {
        // Declare in reverse to make sorting observable.
        let mut reversed = declared_names.clone();
        reversed.reverse();
        let declared = declared(&reversed);

        for live_names in subsets().step_by(3) {
            let live = live_for(&live_names, ProcessStatus::Online);
            let views = reconcile(&declared, &live);

            assert_eq!(names_of(&views), declared_names);
            for view in &views {
                assert_eq!(view.is_deployed(), live_names.contains(&view.name()));
            }
        }
    }
}

#[test]
fn test_diff_is_idempotent() {
    let declared_sets: Vec<Vec<&str>> = subsets().step_by(2).collect();
    for before in &declared_sets {
        for after in &declared_sets {
            let previous = reconcile(&declared(before), &live_for(before, ProcessStatus::Stopped));
            let next = reconcile(&declared(after), &live_for(after, ProcessStatus::Online));

            let mut rows = previous.clone();
            diff(&previous, &next).apply_to(&mut rows);
            assert_eq!(rows, next);

            let again = diff(&rows, &next);
            assert!(again.is_empty(), "Second diff should be empty: {again:?}");
        }
    }
}

#[test]
fn test_rendered_view_keeps_rows_in_place() {
    let mut rendered = RenderedView::new();
    let declared = declared(&["a", "b", "c"]);

    assert!(matches!(
        rendered.apply(reconcile(&declared, &[])),
        ViewDelta::Rebuild(_)
    ));

    let live = vec![live_record("b", 0, ProcessStatus::Online)];
    match rendered.apply(reconcile(&declared, &live)) {
        ViewDelta::Patch(patch) => {
            assert!(patch.removed.is_empty());
            assert!(patch.inserted.is_empty());
            assert_eq!(names_of(&patch.updated), vec!["b"]);
        }
        other => panic!("Expected patch, got {other:?}"),
    }
}

#[test]
fn test_undeclared_live_entry_has_no_live_fields() {
    let views = reconcile(
        &declared(&["a", "b"]),
        &[live_record("a", 0, ProcessStatus::Online)],
    );

    assert_eq!(views[0].status(), ProcessStatus::Online);
    let b = &views[1];
    assert_eq!(b.name(), "b");
    assert_eq!(b.status(), ProcessStatus::Undeployed);
    assert!(b.live.is_none());
    assert!(b.out_log_path().is_none());
}

#[test]
fn test_state_machine_never_jumps_between_settled_states() {
    // Every sequence of up to six liveness answers and user requests.
    #[derive(Clone, Copy, Debug)]
    enum Input {
        Up,
        Down,
        Start,
        Kill,
    }
    let inputs = [Input::Up, Input::Down, Input::Start, Input::Kill];

    let mut sequences: Vec<Vec<Input>> = vec![Vec::new()];
    for _ in 0..6 {
        sequences = sequences
            .into_iter()
            .flat_map(|seq| {
                inputs.iter().map(move |input| {
                    let mut next = seq.clone();
                    next.push(*input);
                    next
                })
            })
            .collect();
    }

    for sequence in sequences {
        let mut machine = DaemonStateMachine::new();
        let mut observed = vec![machine.state()];
        for input in &sequence {
            let transitions = match input {
                Input::Up => machine.apply_liveness(true),
                Input::Down => machine.apply_liveness(false),
                Input::Start => machine.request_start_daemon().into_iter().collect(),
                Input::Kill => machine.request_kill_daemon().into_iter().collect(),
            };
            for transition in transitions {
                assert_eq!(transition.from, *observed.last().expect("non-empty"));
                assert_ne!(transition.from, transition.to);
                observed.push(transition.to);
            }
        }

        for pair in observed.windows(2) {
            let direct = matches!(
                (pair[0], pair[1]),
                (DaemonState::Running, DaemonState::Stopped)
                    | (DaemonState::Stopped, DaemonState::Running)
            );
            assert!(!direct, "Direct jump in {sequence:?}: {observed:?}");
        }
    }
}
