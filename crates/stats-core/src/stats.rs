//! Session statistics aggregation
//!
//! Listens for session "failed to start" events and computes point-in-time
//! statistics over the conference registry. The aggregator is passive: the
//! event delivery path is the only writer of the cumulative counters, while
//! snapshot and accessor queries may arrive concurrently from any number of
//! callers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::errors::{Result, StatsError};
use crate::events::{FailureEvent, FailureEventProcessor};
use crate::registry::ConferenceRegistry;
use crate::types::{SessionInfo, SessionKind};

/// Live session counts over all conferences included in statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LiveSessionCounts {
    pub live_streaming_active: u64,
    pub recording_active: u64,
    pub sip_call_active: u64,
    pub live_streaming_pending: u64,
    pub recording_pending: u64,
    pub sip_call_pending: u64,
}

/// Point-in-time statistics result.
///
/// The cumulative totals are always present. `live` is `None` when no
/// conference registry was attached at computation time; the snapshot is
/// then degraded, not failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub live: Option<LiveSessionCounts>,
    pub total_live_streaming_failures: u64,
    pub total_recording_failures: u64,
    pub total_sip_call_failures: u64,
}

impl StatsSnapshot {
    /// Flat key/value export with the stable wire keys.
    ///
    /// The six live-count keys are present only when the registry was
    /// reachable; the three failure totals are always present.
    pub fn to_json(&self) -> serde_json::Value {
        let mut stats = serde_json::Map::new();

        if let Some(live) = &self.live {
            stats.insert(
                "live_streaming_active".to_string(),
                live.live_streaming_active.into(),
            );
            stats.insert("recording_active".to_string(), live.recording_active.into());
            stats.insert("sip_call_active".to_string(), live.sip_call_active.into());
            stats.insert(
                "live_streaming_pending".to_string(),
                live.live_streaming_pending.into(),
            );
            stats.insert(
                "recording_pending".to_string(),
                live.recording_pending.into(),
            );
            stats.insert("sip_call_pending".to_string(), live.sip_call_pending.into());
        }

        stats.insert(
            "total_live_streaming_failures".to_string(),
            self.total_live_streaming_failures.into(),
        );
        stats.insert(
            "total_recording_failures".to_string(),
            self.total_recording_failures.into(),
        );
        stats.insert(
            "total_sip_call_failures".to_string(),
            self.total_sip_call_failures.into(),
        );

        serde_json::Value::Object(stats)
    }
}

/// Counts sessions of the given kind that pass the selector's test
fn count_sessions(
    sessions: &[SessionInfo],
    kind: SessionKind,
    selector: impl Fn(&SessionInfo) -> bool,
) -> u64 {
    let mut count = 0;

    for session in sessions {
        if session.kind == kind && selector(session) {
            count += 1;
        }
    }

    count
}

/// Computes statistics over conference sessions.
///
/// Keeps one cumulative "failed to start" counter per [`SessionKind`],
/// incremented from the failure event path, and merges them on demand with
/// live active/pending counts taken from the attached conference registry.
/// Clones share state, so one aggregator can be handed to the event loop
/// and to any number of query paths.
#[derive(Clone)]
pub struct StatsAggregator {
    /// How many times a SIP call session has failed to start
    total_sip_call_failures: Arc<AtomicU64>,
    /// How many times a live streaming session has failed to start
    total_live_streaming_failures: Arc<AtomicU64>,
    /// How many times a recording session has failed to start
    total_recording_failures: Arc<AtomicU64>,
    /// Registry collaborator; live counting degrades gracefully while absent
    registry: Arc<RwLock<Option<Arc<dyn ConferenceRegistry>>>>,
}

impl std::fmt::Debug for StatsAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsAggregator")
            .field(
                "total_sip_call_failures",
                &self.total_sip_call_failures.load(Ordering::SeqCst),
            )
            .field(
                "total_live_streaming_failures",
                &self.total_live_streaming_failures.load(Ordering::SeqCst),
            )
            .field(
                "total_recording_failures",
                &self.total_recording_failures.load(Ordering::SeqCst),
            )
            .field("has_registry", &self.registry.read().is_some())
            .finish()
    }
}

impl StatsAggregator {
    /// Create a new aggregator with zeroed counters and no registry
    pub fn new() -> Self {
        Self {
            total_sip_call_failures: Arc::new(AtomicU64::new(0)),
            total_live_streaming_failures: Arc::new(AtomicU64::new(0)),
            total_recording_failures: Arc::new(AtomicU64::new(0)),
            registry: Arc::new(RwLock::new(None)),
        }
    }

    /// Attach the conference registry used for live counts
    pub fn set_registry(&self, registry: Arc<dyn ConferenceRegistry>) {
        *self.registry.write() = Some(registry);
    }

    /// Detach the registry; later snapshots degrade to counters only
    pub fn clear_registry(&self) {
        *self.registry.write() = None;
    }

    /// Handle one failure notification.
    ///
    /// Events without a kind, and events whose kind this aggregator does not
    /// recognize, are logged and dropped without touching any counter.
    pub fn handle_event(&self, event: &FailureEvent) {
        let tag = match event.kind.as_deref() {
            Some(tag) => tag,
            None => {
                tracing::error!("No session kind attached to failure event");
                return;
            }
        };

        match SessionKind::parse(tag) {
            Some(SessionKind::SipCall) => {
                self.total_sip_call_failures.fetch_add(1, Ordering::SeqCst);
            }
            Some(SessionKind::Recording) => {
                self.total_recording_failures.fetch_add(1, Ordering::SeqCst);
            }
            Some(SessionKind::LiveStreaming) => {
                self.total_live_streaming_failures
                    .fetch_add(1, Ordering::SeqCst);
            }
            None => {
                tracing::error!("Unhandled session kind in failure event: {}", tag);
            }
        }
    }

    /// Subscribe to the failure event bus and spawn the delivery loop.
    ///
    /// The loop forwards every received event into [`Self::handle_event`]
    /// and ends when the bus is stopped. A lagged stream is logged and
    /// skipped over rather than ending the subscription.
    pub async fn subscribe_to(
        &self,
        events: &FailureEventProcessor,
    ) -> Result<tokio::task::JoinHandle<()>> {
        let mut subscriber = events.subscribe().await?;
        let aggregator = self.clone();

        let handle = tokio::spawn(async move {
            loop {
                match subscriber.receive().await {
                    Ok(event) => aggregator.handle_event(&event),
                    Err(StatsError::Lagged(skipped)) => {
                        tracing::warn!("Failure event stream lagged, {} events skipped", skipped);
                    }
                    Err(_) => {
                        tracing::debug!("Failure event channel closed, ending subscription");
                        break;
                    }
                }
            }
        });

        Ok(handle)
    }

    /// How many times a SIP call session has failed to start
    pub fn total_sip_call_failures(&self) -> u64 {
        self.total_sip_call_failures.load(Ordering::SeqCst)
    }

    /// How many times a live streaming session has failed to start
    pub fn total_live_streaming_failures(&self) -> u64 {
        self.total_live_streaming_failures.load(Ordering::SeqCst)
    }

    /// How many times a recording session has failed to start
    pub fn total_recording_failures(&self) -> u64 {
        self.total_recording_failures.load(Ordering::SeqCst)
    }

    /// Count live sessions per kind and phase, summed over every conference
    /// included in statistics.
    ///
    /// Returns `None` while no registry is attached. An attached but empty
    /// registry yields all zeros.
    pub fn live_session_counts(&self) -> Option<LiveSessionCounts> {
        let registry = self.registry.read().as_ref().map(Arc::clone)?;

        let mut counts = LiveSessionCounts::default();

        for conference in registry.list_conferences() {
            if !conference.include_in_statistics {
                continue;
            }

            let sessions = &conference.sessions;

            counts.live_streaming_active +=
                count_sessions(sessions, SessionKind::LiveStreaming, SessionInfo::is_active);
            counts.recording_active +=
                count_sessions(sessions, SessionKind::Recording, SessionInfo::is_active);
            counts.sip_call_active +=
                count_sessions(sessions, SessionKind::SipCall, SessionInfo::is_active);

            counts.live_streaming_pending += count_sessions(
                sessions,
                SessionKind::LiveStreaming,
                SessionInfo::is_pending,
            );
            counts.recording_pending +=
                count_sessions(sessions, SessionKind::Recording, SessionInfo::is_pending);
            counts.sip_call_pending +=
                count_sessions(sessions, SessionKind::SipCall, SessionInfo::is_pending);
        }

        Some(counts)
    }

    /// Produce a point-in-time snapshot.
    ///
    /// Cumulative counters are read directly; live counts are recomputed on
    /// every call, never cached. This never fails: with no registry attached
    /// the snapshot simply carries no live counts.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            live: self.live_session_counts(),
            total_live_streaming_failures: self.total_live_streaming_failures(),
            total_recording_failures: self.total_recording_failures(),
            total_sip_call_failures: self.total_sip_call_failures(),
        }
    }
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}
