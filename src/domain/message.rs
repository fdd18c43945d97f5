//! Chat message record
//!
//! Messages belong to exactly one alert (subcollection keyed by alert id),
//! are immutable once written, and are delivered to readers in `created_at`
//! ascending order with ties broken by id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id;
use super::identity::PartyRef;

/// A single chat message exchanged on an alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique identifier
    pub id: String,

    /// Back-reference to the owning alert
    pub alert_id: String,

    /// Who sent it
    pub sender: PartyRef,

    /// Message body, stored trimmed and never empty
    pub text: String,

    /// True when the text came from voice transcription
    pub is_voice: bool,

    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a new message with a generated ID
    ///
    /// Callers validate and trim `text` before construction; see
    /// [`crate::repository::AlertRepository::append_message`].
    pub fn new(alert_id: impl Into<String>, sender: PartyRef, text: impl Into<String>, is_voice: bool) -> Self {
        Self {
            id: id::message_id(),
            alert_id: alert_id.into(),
            sender,
            text: text.into(),
            is_voice,
            created_at: Utc::now(),
        }
    }
}

/// Sort messages oldest first, ties broken by id
pub fn sort_chronological(messages: &mut [ChatMessage]) {
    messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}
