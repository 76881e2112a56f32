//! Collection configuration.
//!
//! [`CollectionConfig`] can be built in code or deserialized from any serde format;
//! missing fields fall back to their defaults.

use serde::{Deserialize, Serialize};

/// Default buffer size of the event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Default bound on publish tasks that may be in flight at once.
pub const DEFAULT_MAX_PENDING_PUBLISHES: usize = 100;

/// Tuning knobs for a collection's change notification.
///
/// # Example
///
/// ```ignore
/// use repollo_core::config::CollectionConfig;
///
/// let config: CollectionConfig = serde_json::from_str(r#"{ "event_capacity": 16 }"#).unwrap();
/// assert_eq!(config.event_capacity, 16);
/// assert_eq!(config.max_pending_publishes, 100);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CollectionConfig {
    /// Number of events the channel buffers before new events are dropped.
    pub event_capacity: usize,
    /// Number of detached publish tasks allowed to be outstanding at once. Past this
    /// bound deliveries are attempted inline; it never causes an event to be dropped.
    pub max_pending_publishes: usize,
}

impl CollectionConfig {
    /// Sets the event channel capacity.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Sets the bound on in-flight publish tasks.
    pub fn with_max_pending_publishes(mut self, max: usize) -> Self {
        self.max_pending_publishes = max;
        self
    }

    /// Returns the event capacity, clamped to at least one.
    pub fn effective_event_capacity(&self) -> usize {
        self.event_capacity.max(1)
    }

    /// Returns the publish bound, clamped to at least one.
    pub fn effective_max_pending_publishes(&self) -> usize {
        self.max_pending_publishes.max(1)
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            event_capacity: DEFAULT_EVENT_CAPACITY,
            max_pending_publishes: DEFAULT_MAX_PENDING_PUBLISHES,
        }
    }
}
