//! soscore - emergency alert lifecycle and claim-coordination core
//!
//! The subsystem behind a citizen-to-responder alerting application: a
//! citizen raises an alert from a captured location, responders observe it
//! live, race to claim it, exchange messages with the citizen, and resolve
//! it. Presentation, identity-provider internals, and speech are the
//! embedding application's problem; this crate owns the data model, the
//! state machine, and the consistency contract.
//!
//! # Core guarantees
//!
//! - **Strictly forward lifecycle**: open → claimed → resolved, validated
//!   by pure rules in [`lifecycle`] and committed only inside the store
//!   actor's serialized mutation loop.
//! - **At most one claimant**: claim is an atomic conditional update; of N
//!   racing responders exactly one wins, the rest get `AlreadyClaimed` as
//!   an ordinary result.
//! - **Live views**: every read is a snapshot plus a push subscription that
//!   redelivers the full current result set on change, with synchronous,
//!   idempotent cancellation.
//!
//! # Modules
//!
//! - [`domain`] - alert and message records, identity, IDs
//! - [`store`] - authoritative store actor and its command/event contract
//! - [`lifecycle`] - transition rules and role gates
//! - [`coordinator`] - claim/resolve front door with per-alert serialization
//! - [`repository`] - validated reads and writes, live queries
//! - [`sync`] - live feeds, de-duplication, optimistic reconciliation
//! - [`location`] - coordinate acquisition with timeout/accuracy policy

pub mod config;
pub mod coordinator;
pub mod domain;
pub mod error;
pub mod lifecycle;
pub mod location;
pub mod repository;
pub mod store;
pub mod sync;

pub use config::{CoreConfig, LocationConfig};
pub use coordinator::ClaimCoordinator;
pub use domain::{Alert, AlertKind, AlertStatus, ChatMessage, GeoPoint, PartyRef, Principal, Role};
pub use error::{SosError, SosResult};
pub use location::{PositionSource, RawFix, acquire};
pub use repository::AlertRepository;
pub use store::{AlertStore, StoreEvent};
pub use sync::{AlertQuery, LiveQuery, MessageQuery, OptimisticList, ResponderBoard, SessionViews};
