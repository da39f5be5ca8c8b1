//! Conference Registry
//!
//! Read-only seam between the statistics core and the conference management
//! system, plus an in-memory implementation for embedding processes and
//! tests.

use dashmap::DashMap;

use crate::errors::{Result, StatsError};
use crate::types::{
    ConferenceId, ConferenceInfo, SessionId, SessionInfo, SessionKind, SessionState,
};

/// Read-only view of the conference registry.
///
/// `list_conferences` must be a synchronous, non-blocking read; the snapshot
/// path walks it inline. Implementations own their synchronization.
pub trait ConferenceRegistry: Send + Sync {
    /// Enumerate all known conferences at this instant
    fn list_conferences(&self) -> Vec<ConferenceInfo>;
}

#[derive(Debug)]
struct ConferenceRecord {
    include_in_statistics: bool,
    /// Ordered by insertion
    sessions: Vec<SessionInfo>,
}

/// In-memory conference registry backed by a concurrent map
#[derive(Debug, Default)]
pub struct InMemoryConferenceRegistry {
    conferences: DashMap<ConferenceId, ConferenceRecord>,
}

impl InMemoryConferenceRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            conferences: DashMap::new(),
        }
    }

    /// Create a conference and return its id
    pub fn create_conference(&self, include_in_statistics: bool) -> ConferenceId {
        let id = ConferenceId::new();
        self.conferences.insert(
            id.clone(),
            ConferenceRecord {
                include_in_statistics,
                sessions: Vec::new(),
            },
        );

        tracing::debug!("Created conference {}", id);
        id
    }

    /// Remove a conference and all of its sessions
    pub fn remove_conference(&self, id: &ConferenceId) -> Result<()> {
        if self.conferences.remove(id).is_some() {
            tracing::debug!("Removed conference {}", id);
            Ok(())
        } else {
            Err(StatsError::conference_not_found(id.as_str()))
        }
    }

    /// Change whether a conference is visible to live counting
    pub fn set_include_in_statistics(&self, id: &ConferenceId, include: bool) -> Result<()> {
        if let Some(mut conference) = self.conferences.get_mut(id) {
            conference.include_in_statistics = include;
            Ok(())
        } else {
            Err(StatsError::conference_not_found(id.as_str()))
        }
    }

    /// Add a session to a conference and return its id
    pub fn add_session(
        &self,
        conference_id: &ConferenceId,
        kind: SessionKind,
        state: SessionState,
    ) -> Result<SessionId> {
        if let Some(mut conference) = self.conferences.get_mut(conference_id) {
            let session = SessionInfo::new(kind, state);
            let session_id = session.id.clone();
            conference.sessions.push(session);
            Ok(session_id)
        } else {
            Err(StatsError::conference_not_found(conference_id.as_str()))
        }
    }

    /// Update the lifecycle state of a session
    pub fn update_session_state(
        &self,
        conference_id: &ConferenceId,
        session_id: &SessionId,
        state: SessionState,
    ) -> Result<()> {
        if let Some(mut conference) = self.conferences.get_mut(conference_id) {
            if let Some(session) = conference
                .sessions
                .iter_mut()
                .find(|s| &s.id == session_id)
            {
                session.state = state;
                Ok(())
            } else {
                Err(StatsError::session_not_found(session_id.as_str()))
            }
        } else {
            Err(StatsError::conference_not_found(conference_id.as_str()))
        }
    }

    /// Remove a session from a conference
    pub fn remove_session(
        &self,
        conference_id: &ConferenceId,
        session_id: &SessionId,
    ) -> Result<()> {
        if let Some(mut conference) = self.conferences.get_mut(conference_id) {
            let before = conference.sessions.len();
            conference.sessions.retain(|s| &s.id != session_id);
            if conference.sessions.len() < before {
                Ok(())
            } else {
                Err(StatsError::session_not_found(session_id.as_str()))
            }
        } else {
            Err(StatsError::conference_not_found(conference_id.as_str()))
        }
    }

    /// Get count of known conferences
    pub fn conference_count(&self) -> usize {
        self.conferences.len()
    }
}

impl ConferenceRegistry for InMemoryConferenceRegistry {
    fn list_conferences(&self) -> Vec<ConferenceInfo> {
        self.conferences
            .iter()
            .map(|entry| ConferenceInfo {
                id: entry.key().clone(),
                include_in_statistics: entry.value().include_in_statistics,
                sessions: entry.value().sessions.clone(),
            })
            .collect()
    }
}
