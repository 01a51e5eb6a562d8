//! Assertion helpers over emitted events.

use fm_protocol::ipc::Event;
use fm_protocol::process_models::LiveProcessRecord;

/// Count `Error` events.
#[allow(dead_code)]
pub fn error_count(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, Event::Error { .. }))
        .count()
}

/// Count `LogsReady` events.
#[allow(dead_code)]
pub fn logs_count(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, Event::LogsReady { .. }))
        .count()
}

/// Assert that `events` ends with one full refresh and return its list.
///
/// A refresh is a `DaemonStatus` immediately followed by a `ListReady`.
#[allow(dead_code)]
pub fn assert_ends_with_refresh(events: &[Event], running: bool) -> Vec<LiveProcessRecord> {
    assert!(
        events.len() >= 2,
        "Expected a trailing refresh, got: {events:?}"
    );
    let tail = &events[events.len() - 2..];
    assert_eq!(
        tail[0],
        Event::DaemonStatus { running },
        "Expected DaemonStatus before the list, got: {events:?}"
    );
    match &tail[1] {
        Event::ListReady { processes } => processes.clone(),
        other => panic!("Expected ListReady last, got: {other:?}"),
    }
}
