//! Failure Event System
//!
//! Simple event system using tokio::sync::broadcast for delivering session
//! "failed to start" notifications to statistics subscribers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};

use crate::config::StatsConfig;
use crate::errors::{Result, StatsError};
use crate::types::SessionKind;

/// Notification that a session failed to start.
///
/// The kind travels as its wire tag rather than as [`SessionKind`] so a
/// subscriber can observe both a missing kind and a kind newer than the
/// set it recognizes. Events are consumed immediately and never retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEvent {
    /// Wire tag of the session kind, if the source attached one
    pub kind: Option<String>,
}

impl FailureEvent {
    /// Event for a recognized session kind
    pub fn new(kind: SessionKind) -> Self {
        Self {
            kind: Some(kind.as_str().to_string()),
        }
    }

    /// Event carrying a raw wire tag, or none at all
    pub fn from_tag(tag: Option<&str>) -> Self {
        Self {
            kind: tag.map(|t| t.to_string()),
        }
    }

    /// The parsed kind, when the tag is present and recognized
    pub fn session_kind(&self) -> Option<SessionKind> {
        self.kind.as_deref().and_then(SessionKind::parse)
    }
}

/// Simple subscriber wrapper for failure events
pub struct FailureEventSubscriber {
    receiver: broadcast::Receiver<FailureEvent>,
}

impl FailureEventSubscriber {
    pub fn new(receiver: broadcast::Receiver<FailureEvent>) -> Self {
        Self { receiver }
    }

    /// Receive the next event
    ///
    /// A lagged stream surfaces as [`StatsError::Lagged`]; the subscription
    /// stays usable and the next call resumes from the oldest retained event.
    pub async fn receive(&mut self) -> Result<FailureEvent> {
        match self.receiver.recv().await {
            Ok(event) => Ok(event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => Err(StatsError::Lagged(skipped)),
            Err(broadcast::error::RecvError::Closed) => Err(StatsError::ChannelClosed(
                "failure event sender dropped".to_string(),
            )),
        }
    }

    /// Try to receive an event without blocking
    pub fn try_receive(&mut self) -> Result<Option<FailureEvent>> {
        match self.receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(broadcast::error::TryRecvError::Empty) => Ok(None),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => Err(StatsError::Lagged(skipped)),
            Err(broadcast::error::TryRecvError::Closed) => Err(StatsError::ChannelClosed(
                "failure event sender dropped".to_string(),
            )),
        }
    }
}

/// Event processor for failure events using tokio::sync::broadcast
pub struct FailureEventProcessor {
    sender: Arc<RwLock<Option<broadcast::Sender<FailureEvent>>>>,
    capacity: usize,
}

impl std::fmt::Debug for FailureEventProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailureEventProcessor")
            .field(
                "has_sender",
                &self.sender.try_read().map(|s| s.is_some()).unwrap_or(false),
            )
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl FailureEventProcessor {
    /// Create a new failure event processor with the default buffer capacity
    pub fn new() -> Self {
        Self::with_config(StatsConfig::default())
    }

    /// Create a new failure event processor from configuration
    pub fn with_config(config: StatsConfig) -> Self {
        Self {
            sender: Arc::new(RwLock::new(None)),
            capacity: config.event_buffer_capacity,
        }
    }

    /// Start the event processor
    pub async fn start(&self) -> Result<()> {
        let (sender, _) = broadcast::channel(self.capacity);
        *self.sender.write().await = Some(sender);

        tracing::info!("Failure event processor started");
        Ok(())
    }

    /// Stop the event processor
    ///
    /// Dropping the sender closes the channel; subscriber loops observe the
    /// close after draining any buffered events.
    pub async fn stop(&self) -> Result<()> {
        *self.sender.write().await = None;

        tracing::info!("Failure event processor stopped");
        Ok(())
    }

    /// Publish a failure event
    pub async fn publish(&self, event: FailureEvent) -> Result<()> {
        let sender_guard = self.sender.read().await;
        if let Some(sender) = sender_guard.as_ref() {
            match sender.send(event) {
                Ok(_) => {}
                Err(broadcast::error::SendError(_)) => {
                    // No receivers are currently listening, which is fine
                    tracing::debug!("No subscribers listening for failure event");
                }
            }
        } else {
            tracing::warn!("Failure event processor not running, dropping event");
        }
        Ok(())
    }

    /// Subscribe to failure events
    pub async fn subscribe(&self) -> Result<FailureEventSubscriber> {
        let sender_guard = self.sender.read().await;
        if let Some(sender) = sender_guard.as_ref() {
            Ok(FailureEventSubscriber::new(sender.subscribe()))
        } else {
            Err(StatsError::EventBusNotRunning)
        }
    }

    /// Check if the event processor is running
    pub async fn is_running(&self) -> bool {
        self.sender.read().await.is_some()
    }
}

impl Default for FailureEventProcessor {
    fn default() -> Self {
        Self::new()
    }
}
