//! Authoritative record store
//!
//! In-process implementation of the backing store contract: equality +
//! ordering + limit queries with change notifications, one atomic
//! conditional update per transition, and a message subcollection per
//! alert. The engine is replaceable; the contract is what the rest of the
//! crate depends on.

pub mod manager;
pub mod messages;

pub use manager::AlertStore;
pub use messages::{StoreCommand, StoreEvent};
