// Stats Aggregator Tests
//
// Counter, live-count and snapshot behavior of the StatsAggregator against
// an in-memory conference registry.

use std::sync::Arc;
use std::thread;

use confstats_core::{
    FailureEvent, InMemoryConferenceRegistry, SessionKind, SessionState, StatsAggregator,
};

fn aggregator_with_registry() -> (StatsAggregator, Arc<InMemoryConferenceRegistry>) {
    let aggregator = StatsAggregator::new();
    let registry = Arc::new(InMemoryConferenceRegistry::new());
    aggregator.set_registry(registry.clone());
    (aggregator, registry)
}

#[test]
fn test_failure_counts_are_independent_per_kind() {
    let aggregator = StatsAggregator::new();

    for _ in 0..5 {
        aggregator.handle_event(&FailureEvent::new(SessionKind::Recording));
    }

    assert_eq!(aggregator.total_recording_failures(), 5);
    assert_eq!(aggregator.total_sip_call_failures(), 0);
    assert_eq!(aggregator.total_live_streaming_failures(), 0);
}

#[test]
fn test_event_without_kind_changes_nothing() {
    let aggregator = StatsAggregator::new();
    aggregator.handle_event(&FailureEvent::new(SessionKind::SipCall));

    let before = aggregator.snapshot();
    aggregator.handle_event(&FailureEvent::from_tag(None));
    let after = aggregator.snapshot();

    assert_eq!(before, after);
}

#[test]
fn test_unrecognized_kind_changes_nothing() {
    let aggregator = StatsAggregator::new();

    let before = aggregator.snapshot();
    aggregator.handle_event(&FailureEvent::from_tag(Some("transcription")));
    aggregator.handle_event(&FailureEvent::from_tag(Some("")));
    let after = aggregator.snapshot();

    assert_eq!(before, after);
}

#[test]
fn test_excluded_conference_is_not_counted() {
    let (aggregator, registry) = aggregator_with_registry();

    let included = registry.create_conference(true);
    registry
        .add_session(&included, SessionKind::Recording, SessionState::Active)
        .unwrap();
    registry
        .add_session(&included, SessionKind::Recording, SessionState::Pending)
        .unwrap();

    let excluded = registry.create_conference(false);
    registry
        .add_session(&excluded, SessionKind::Recording, SessionState::Active)
        .unwrap();

    let live = aggregator.live_session_counts().unwrap();
    assert_eq!(live.recording_active, 1);
    assert_eq!(live.recording_pending, 1);
}

#[test]
fn test_live_counts_sum_across_included_conferences() {
    let (aggregator, registry) = aggregator_with_registry();

    for _ in 0..3 {
        let conf = registry.create_conference(true);
        registry
            .add_session(&conf, SessionKind::LiveStreaming, SessionState::Active)
            .unwrap();
        registry
            .add_session(&conf, SessionKind::SipCall, SessionState::Pending)
            .unwrap();
    }

    let live = aggregator.live_session_counts().unwrap();
    assert_eq!(live.live_streaming_active, 3);
    assert_eq!(live.sip_call_pending, 3);
    assert_eq!(live.recording_active, 0);
}

#[test]
fn test_terminal_states_are_ignored_for_live_counts() {
    let (aggregator, registry) = aggregator_with_registry();

    let conf = registry.create_conference(true);
    for state in [
        SessionState::Stopping,
        SessionState::Terminated,
        SessionState::Failed,
    ] {
        registry
            .add_session(&conf, SessionKind::Recording, state)
            .unwrap();
    }

    let live = aggregator.live_session_counts().unwrap();
    assert_eq!(live, Default::default());
}

#[test]
fn test_live_counts_are_idempotent_without_registry_changes() {
    let (aggregator, registry) = aggregator_with_registry();

    let conf = registry.create_conference(true);
    registry
        .add_session(&conf, SessionKind::SipCall, SessionState::Active)
        .unwrap();
    registry
        .add_session(&conf, SessionKind::Recording, SessionState::Pending)
        .unwrap();

    let first = aggregator.live_session_counts().unwrap();
    let second = aggregator.live_session_counts().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_live_counts_track_registry_changes() {
    let (aggregator, registry) = aggregator_with_registry();

    let conf = registry.create_conference(true);
    let session = registry
        .add_session(&conf, SessionKind::LiveStreaming, SessionState::Pending)
        .unwrap();
    assert_eq!(
        aggregator.live_session_counts().unwrap().live_streaming_pending,
        1
    );

    registry
        .update_session_state(&conf, &session, SessionState::Active)
        .unwrap();
    let live = aggregator.live_session_counts().unwrap();
    assert_eq!(live.live_streaming_pending, 0);
    assert_eq!(live.live_streaming_active, 1);

    registry.remove_conference(&conf).unwrap();
    assert_eq!(aggregator.live_session_counts().unwrap(), Default::default());
}

#[test]
fn test_counters_never_decrease() {
    let (aggregator, registry) = aggregator_with_registry();

    let mut last = [0u64; 3];
    let observe = |aggregator: &StatsAggregator, last: &mut [u64; 3]| {
        let current = [
            aggregator.total_sip_call_failures(),
            aggregator.total_recording_failures(),
            aggregator.total_live_streaming_failures(),
        ];
        for (now, before) in current.iter().zip(last.iter()) {
            assert!(now >= before);
        }
        *last = current;
    };

    aggregator.handle_event(&FailureEvent::new(SessionKind::SipCall));
    observe(&aggregator, &mut last);

    let conf = registry.create_conference(true);
    registry
        .add_session(&conf, SessionKind::SipCall, SessionState::Active)
        .unwrap();
    let _ = aggregator.snapshot();
    observe(&aggregator, &mut last);

    aggregator.handle_event(&FailureEvent::from_tag(None));
    aggregator.handle_event(&FailureEvent::new(SessionKind::Recording));
    observe(&aggregator, &mut last);

    aggregator.clear_registry();
    let _ = aggregator.snapshot();
    observe(&aggregator, &mut last);
}

#[test]
fn test_concurrent_increments_lose_no_updates() {
    const WRITERS: usize = 8;
    const EVENTS_PER_WRITER: usize = 250;

    let aggregator = StatsAggregator::new();

    let handles: Vec<_> = (0..WRITERS)
        .map(|_| {
            let aggregator = aggregator.clone();
            thread::spawn(move || {
                for _ in 0..EVENTS_PER_WRITER {
                    aggregator.handle_event(&FailureEvent::new(SessionKind::Recording));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(
        aggregator.total_recording_failures(),
        (WRITERS * EVENTS_PER_WRITER) as u64
    );
}

#[test]
fn test_concurrent_reads_during_increments() {
    const EVENTS: usize = 1000;

    let aggregator = StatsAggregator::new();

    let writer = {
        let aggregator = aggregator.clone();
        thread::spawn(move || {
            for _ in 0..EVENTS {
                aggregator.handle_event(&FailureEvent::new(SessionKind::SipCall));
            }
        })
    };

    // Readers must only ever observe monotonically non-decreasing values.
    let mut last = 0;
    while last < EVENTS as u64 {
        let now = aggregator.total_sip_call_failures();
        assert!(now >= last);
        assert!(now <= EVENTS as u64);
        last = now;
    }

    writer.join().unwrap();
    assert_eq!(aggregator.total_sip_call_failures(), EVENTS as u64);
}

#[test]
fn test_snapshot_without_registry_degrades() {
    let aggregator = StatsAggregator::new();
    aggregator.handle_event(&FailureEvent::new(SessionKind::LiveStreaming));

    let snapshot = aggregator.snapshot();
    assert!(snapshot.live.is_none());
    assert_eq!(snapshot.total_live_streaming_failures, 1);

    let json = snapshot.to_json();
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), 3);
    assert!(!object.contains_key("live_streaming_active"));
}

#[test]
fn test_snapshot_json_key_contract() {
    let (aggregator, registry) = aggregator_with_registry();

    let conf = registry.create_conference(true);
    registry
        .add_session(&conf, SessionKind::Recording, SessionState::Active)
        .unwrap();
    aggregator.handle_event(&FailureEvent::new(SessionKind::SipCall));

    let json = aggregator.snapshot().to_json();
    let object = json.as_object().unwrap();

    for key in [
        "live_streaming_active",
        "recording_active",
        "sip_call_active",
        "live_streaming_pending",
        "recording_pending",
        "sip_call_pending",
        "total_live_streaming_failures",
        "total_recording_failures",
        "total_sip_call_failures",
    ] {
        assert!(object.contains_key(key), "missing key {}", key);
    }

    assert_eq!(object["recording_active"], 1);
    assert_eq!(object["total_sip_call_failures"], 1);
}

#[test]
fn test_registry_can_be_detached_and_reattached() {
    let (aggregator, registry) = aggregator_with_registry();
    assert!(aggregator.snapshot().live.is_some());

    aggregator.clear_registry();
    assert!(aggregator.snapshot().live.is_none());

    aggregator.set_registry(registry);
    assert!(aggregator.snapshot().live.is_some());
}
