//! Domain types: alert and message records, identity, ID generation

pub mod alert;
pub mod id;
pub mod identity;
pub mod message;

pub use alert::{Alert, AlertKind, AlertStatus, GeoPoint, sort_newest_first};
pub use identity::{PartyRef, Principal, Role};
pub use message::{ChatMessage, sort_chronological};
