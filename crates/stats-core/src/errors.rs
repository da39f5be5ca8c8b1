//! Error types for statistics operations

use thiserror::Error;

/// Main result type for statistics operations
pub type Result<T> = std::result::Result<T, StatsError>;

/// Main error type for statistics operations
///
/// Only the event transport and configuration paths are fallible. Counter
/// updates, accessors and snapshot assembly never fail; degraded inputs are
/// logged and dropped locally.
#[derive(Debug, Clone, Error)]
pub enum StatsError {
    #[error("Failure event bus is not running")]
    EventBusNotRunning,

    #[error("Failure event channel closed: {0}")]
    ChannelClosed(String),

    #[error("Failure event stream lagged, {0} events skipped")]
    Lagged(u64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Conference not found: {0}")]
    ConferenceNotFound(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

// Convenience constructors
impl StatsError {
    pub fn config(msg: &str) -> Self {
        StatsError::Config(msg.to_string())
    }

    pub fn conference_not_found(id: &str) -> Self {
        StatsError::ConferenceNotFound(id.to_string())
    }

    pub fn session_not_found(id: &str) -> Self {
        StatsError::SessionNotFound(id.to_string())
    }

    pub fn internal(msg: &str) -> Self {
        StatsError::Internal(msg.to_string())
    }
}
