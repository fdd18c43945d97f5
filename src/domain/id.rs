//! Record ID generation
//!
//! All IDs use the format `{kind}-{uuidv7}`. UUIDv7 is time-ordered, so
//! lexicographic ID order doubles as insertion order for tie-breaking
//! records that share a `created_at` timestamp.

use uuid::Uuid;

/// Generate an ID for an alert record
pub fn alert_id() -> String {
    format!("alert-{}", Uuid::now_v7())
}

/// Generate an ID for a chat message record
pub fn message_id() -> String {
    format!("msg-{}", Uuid::now_v7())
}
