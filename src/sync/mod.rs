//! Live view synchronization
//!
//! Keeps each session's client-visible lists consistent with the store:
//! live queries push full result sets on every relevant change, and the
//! reconcilers turn those into stable, de-duplicated, correctly-ordered
//! views with reversible optimistic updates.

pub mod live;
pub mod reconcile;
pub mod views;

pub use live::{AlertQuery, LiveQuery, MessageQuery, SnapshotQuery, spawn_feed};
pub use reconcile::{OptimisticList, ResponderBoard};
pub use views::SessionViews;
