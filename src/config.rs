//! Configuration types
//!
//! Everything is serde-deserializable with sensible defaults so an embedding
//! application can load partial config from its own sources.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Core configuration for the store actor and live feeds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Channel buffer size for store commands
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,

    /// Capacity of the store change-event broadcast channel
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Channel buffer size for live feed snapshot delivery
    #[serde(default = "default_feed_buffer")]
    pub feed_buffer: usize,

    /// Max alerts returned by the open-alerts feed
    #[serde(default = "default_open_limit")]
    pub open_alerts_limit: usize,

    /// Max alerts returned by a citizen's own-alerts feed
    #[serde(default = "default_own_limit")]
    pub own_alerts_limit: usize,

    /// Max alerts returned by a responder's own-claims feed
    #[serde(default = "default_claims_limit")]
    pub claims_limit: usize,

    /// Max messages returned by a per-alert message feed
    #[serde(default = "default_messages_limit")]
    pub messages_limit: usize,

    /// Location acquisition settings
    #[serde(default)]
    pub location: LocationConfig,
}

fn default_command_buffer() -> usize {
    256
}

fn default_event_capacity() -> usize {
    1024
}

fn default_feed_buffer() -> usize {
    32
}

fn default_open_limit() -> usize {
    50
}

fn default_own_limit() -> usize {
    25
}

fn default_claims_limit() -> usize {
    50
}

fn default_messages_limit() -> usize {
    200
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            command_buffer: default_command_buffer(),
            event_capacity: default_event_capacity(),
            feed_buffer: default_feed_buffer(),
            open_alerts_limit: default_open_limit(),
            own_alerts_limit: default_own_limit(),
            claims_limit: default_claims_limit(),
            messages_limit: default_messages_limit(),
            location: LocationConfig::default(),
        }
    }
}

/// Location acquisition policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Give up after this many milliseconds
    #[serde(default = "default_location_timeout_ms")]
    pub timeout_ms: u64,

    /// Accuracy radius above which a fix is flagged low-accuracy (not rejected)
    #[serde(default = "default_max_accuracy_m")]
    pub max_accuracy_m: f64,

    /// Ask the source for high-accuracy positioning
    #[serde(default = "default_high_accuracy")]
    pub high_accuracy: bool,
}

fn default_location_timeout_ms() -> u64 {
    10_000
}

fn default_max_accuracy_m() -> f64 {
    200.0
}

fn default_high_accuracy() -> bool {
    true
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_location_timeout_ms(),
            max_accuracy_m: default_max_accuracy_m(),
            high_accuracy: default_high_accuracy(),
        }
    }
}

impl LocationConfig {
    /// Get the acquisition timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
