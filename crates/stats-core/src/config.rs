//! Configuration for the statistics core

use serde::{Deserialize, Serialize};

/// Default capacity of the failure event broadcast channel
pub const DEFAULT_EVENT_BUFFER_CAPACITY: usize = 1000;

/// Configuration consumed by [`crate::events::FailureEventProcessor`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Capacity of the failure event broadcast channel. Subscribers slower
    /// than this many pending events will observe a lag and skip ahead.
    pub event_buffer_capacity: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            event_buffer_capacity: DEFAULT_EVENT_BUFFER_CAPACITY,
        }
    }
}

impl StatsConfig {
    pub fn with_event_buffer_capacity(mut self, capacity: usize) -> Self {
        self.event_buffer_capacity = capacity;
        self
    }
}
