//! Store actor messages
//!
//! Commands and change events for the actor pattern. Every command carries a
//! oneshot reply channel; change events fan out on a broadcast channel so
//! live feeds know when to re-run their queries.

use tokio::sync::oneshot;

use crate::domain::{Alert, ChatMessage, PartyRef};
use crate::error::SosResult;

/// Commands sent to the store actor
#[derive(Debug)]
pub enum StoreCommand {
    CreateAlert {
        alert: Alert,
        reply: oneshot::Sender<SosResult<String>>,
    },
    GetAlert {
        id: String,
        reply: oneshot::Sender<SosResult<Option<Alert>>>,
    },

    /// Atomic conditional update: claim only if the alert is still open
    /// at commit time. The check and the write happen together inside the
    /// actor's mutation loop.
    ClaimAlert {
        id: String,
        responder: PartyRef,
        reply: oneshot::Sender<SosResult<Alert>>,
    },

    /// Atomic conditional update: resolve only if currently claimed.
    ResolveAlert {
        id: String,
        resolver: PartyRef,
        notes: Option<String>,
        reply: oneshot::Sender<SosResult<Alert>>,
    },

    AppendMessage {
        message: ChatMessage,
        reply: oneshot::Sender<SosResult<String>>,
    },

    // Queries: equality filter + ordering + limit, matching the backing
    // store contract
    OpenAlerts {
        limit: usize,
        reply: oneshot::Sender<SosResult<Vec<Alert>>>,
    },
    AlertsByCitizen {
        citizen_id: String,
        limit: usize,
        reply: oneshot::Sender<SosResult<Vec<Alert>>>,
    },
    AlertsClaimedBy {
        responder_id: String,
        limit: usize,
        reply: oneshot::Sender<SosResult<Vec<Alert>>>,
    },
    Messages {
        alert_id: String,
        limit: usize,
        reply: oneshot::Sender<SosResult<Vec<ChatMessage>>>,
    },

    Shutdown,
}

/// Change notification broadcast after every committed mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// An alert was created or transitioned
    AlertChanged { alert_id: String },
    /// A message was appended to an alert's subcollection
    MessageAppended { alert_id: String },
}

impl StoreEvent {
    /// The alert this event concerns
    pub fn alert_id(&self) -> &str {
        match self {
            StoreEvent::AlertChanged { alert_id } => alert_id,
            StoreEvent::MessageAppended { alert_id } => alert_id,
        }
    }
}
