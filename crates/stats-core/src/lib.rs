//! Conference session statistics for the confstats stack.
//!
//! This crate tracks the three kinds of transient work sessions managed by a
//! conference system (outbound SIP call bridging, recording, live streaming).
//! It accumulates cumulative "failed to start" counters by subscribing to
//! failure events, and produces point-in-time snapshots that merge those
//! counters with live active/pending counts taken from the conference
//! registry at query time.

// Core modules
pub mod config;
pub mod errors;
pub mod events;
pub mod logging;
pub mod registry;
pub mod stats;
pub mod types;

// Public re-exports of main types
pub use config::StatsConfig;
pub use errors::{Result, StatsError};
pub use events::{FailureEvent, FailureEventProcessor, FailureEventSubscriber};
pub use registry::{ConferenceRegistry, InMemoryConferenceRegistry};
pub use stats::{LiveSessionCounts, StatsAggregator, StatsSnapshot};
pub use types::{
    ConferenceId, ConferenceInfo, SessionId, SessionInfo, SessionKind, SessionState,
};

/// Commonly used types for embedding processes
pub mod prelude {
    pub use crate::{
        ConferenceRegistry, FailureEvent, FailureEventProcessor, InMemoryConferenceRegistry,
        SessionKind, SessionState, StatsAggregator, StatsSnapshot,
    };
}
