//! Core types for conference session statistics
//!
//! Read-only views of the conference registry plus the closed set of session
//! kinds tracked by the aggregator. The registry owns and mutates the real
//! session objects; everything here is a value snapshot handed across the
//! collaborator seam.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of transient work session tracked by the statistics core.
///
/// This is a closed set; the aggregator tolerates (and drops) events that
/// carry a kind outside of it, see [`crate::stats::StatsAggregator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    /// Outbound SIP call bridging into the conference
    SipCall,
    /// Recording of the conference
    Recording,
    /// Live streaming of the conference
    LiveStreaming,
}

impl SessionKind {
    /// All kinds, in wire order
    pub const ALL: [SessionKind; 3] = [
        SessionKind::SipCall,
        SessionKind::Recording,
        SessionKind::LiveStreaming,
    ];

    /// Wire tag for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::SipCall => "sip_call",
            SessionKind::Recording => "recording",
            SessionKind::LiveStreaming => "live_streaming",
        }
    }

    /// Parse a wire tag; unknown tags yield `None`
    pub fn parse(tag: &str) -> Option<SessionKind> {
        match tag {
            "sip_call" => Some(SessionKind::SipCall),
            "recording" => Some(SessionKind::Recording),
            "live_streaming" => Some(SessionKind::LiveStreaming),
            _ => None,
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of a session as reported by the registry.
///
/// Live counting only distinguishes `Pending` and `Active`; every other
/// state is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Requested but not yet started
    Pending,
    /// Running
    Active,
    /// Shutting down
    Stopping,
    /// Finished normally
    Terminated,
    /// Failed
    Failed,
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, SessionState::Pending)
    }
}

/// Unique identifier for a session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(format!("sess_{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a conference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConferenceId(pub String);

impl ConferenceId {
    pub fn new() -> Self {
        Self(format!("conf_{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConferenceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only view of one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: SessionId,
    pub kind: SessionKind,
    pub state: SessionState,
}

impl SessionInfo {
    pub fn new(kind: SessionKind, state: SessionState) -> Self {
        Self {
            id: SessionId::new(),
            kind,
            state,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }
}

/// Read-only view of one conference and its sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConferenceInfo {
    pub id: ConferenceId,
    /// Conferences with this flag unset are skipped by live counting
    pub include_in_statistics: bool,
    pub sessions: Vec<SessionInfo>,
}
