//! AlertStore - actor that owns the authoritative alert and message records
//!
//! The actor task is the single point of true concurrency in the system:
//! all mutations are serialized through its command channel, which is what
//! makes the claim/resolve conditional updates atomic. Handles are cheap
//! clones holding the command sender.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::config::CoreConfig;
use crate::domain::{Alert, ChatMessage, PartyRef, sort_chronological, sort_newest_first};
use crate::error::{SosError, SosResult};
use crate::lifecycle;

use super::messages::{StoreCommand, StoreEvent};

/// Handle to the store actor
#[derive(Clone)]
pub struct AlertStore {
    tx: mpsc::Sender<StoreCommand>,
    event_tx: broadcast::Sender<StoreEvent>,
}

impl AlertStore {
    /// Spawn the store actor and return a handle to it
    pub fn spawn(config: &CoreConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.command_buffer);
        let (event_tx, _) = broadcast::channel(config.event_capacity);

        tokio::spawn(actor_loop(rx, event_tx.clone()));
        info!("AlertStore spawned");

        Self { tx, event_tx }
    }

    /// Subscribe to change events
    ///
    /// Live feeds re-run their queries on every relevant event. Subscribing
    /// before the initial query guarantees no change is missed between
    /// snapshot and subscription.
    pub fn subscribe_events(&self) -> broadcast::Receiver<StoreEvent> {
        self.event_tx.subscribe()
    }

    /// Persist a new alert record
    pub async fn create_alert(&self, alert: Alert) -> SosResult<String> {
        debug!(alert_id = %alert.id, "create_alert: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(StoreCommand::CreateAlert { alert, reply: reply_tx })
            .await
            .map_err(|_| SosError::StoreClosed)?;
        reply_rx.await.map_err(|_| SosError::StoreClosed)?
    }

    /// Fetch a single alert by id
    pub async fn get_alert(&self, id: &str) -> SosResult<Option<Alert>> {
        debug!(%id, "get_alert: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(StoreCommand::GetAlert {
                id: id.to_string(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| SosError::StoreClosed)?;
        reply_rx.await.map_err(|_| SosError::StoreClosed)?
    }

    /// Atomically claim an alert if it is still open
    ///
    /// Returns the updated record on success, `AlreadyClaimed` when the
    /// precondition no longer held at commit time.
    pub async fn claim_alert(&self, id: &str, responder: PartyRef) -> SosResult<Alert> {
        debug!(%id, responder_id = %responder.id, "claim_alert: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(StoreCommand::ClaimAlert {
                id: id.to_string(),
                responder,
                reply: reply_tx,
            })
            .await
            .map_err(|_| SosError::StoreClosed)?;
        reply_rx.await.map_err(|_| SosError::StoreClosed)?
    }

    /// Atomically resolve an alert if it is currently claimed
    pub async fn resolve_alert(&self, id: &str, resolver: PartyRef, notes: Option<String>) -> SosResult<Alert> {
        debug!(%id, resolver_id = %resolver.id, "resolve_alert: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(StoreCommand::ResolveAlert {
                id: id.to_string(),
                resolver,
                notes,
                reply: reply_tx,
            })
            .await
            .map_err(|_| SosError::StoreClosed)?;
        reply_rx.await.map_err(|_| SosError::StoreClosed)?
    }

    /// Append a message to an alert's subcollection
    pub async fn append_message(&self, message: ChatMessage) -> SosResult<String> {
        debug!(alert_id = %message.alert_id, message_id = %message.id, "append_message: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(StoreCommand::AppendMessage {
                message,
                reply: reply_tx,
            })
            .await
            .map_err(|_| SosError::StoreClosed)?;
        reply_rx.await.map_err(|_| SosError::StoreClosed)?
    }

    /// Open alerts, newest first
    pub async fn open_alerts(&self, limit: usize) -> SosResult<Vec<Alert>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(StoreCommand::OpenAlerts { limit, reply: reply_tx })
            .await
            .map_err(|_| SosError::StoreClosed)?;
        reply_rx.await.map_err(|_| SosError::StoreClosed)?
    }

    /// Alerts created by a citizen, newest first
    pub async fn alerts_by_citizen(&self, citizen_id: &str, limit: usize) -> SosResult<Vec<Alert>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(StoreCommand::AlertsByCitizen {
                citizen_id: citizen_id.to_string(),
                limit,
                reply: reply_tx,
            })
            .await
            .map_err(|_| SosError::StoreClosed)?;
        reply_rx.await.map_err(|_| SosError::StoreClosed)?
    }

    /// Alerts currently claimed by a responder, newest first
    pub async fn alerts_claimed_by(&self, responder_id: &str, limit: usize) -> SosResult<Vec<Alert>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(StoreCommand::AlertsClaimedBy {
                responder_id: responder_id.to_string(),
                limit,
                reply: reply_tx,
            })
            .await
            .map_err(|_| SosError::StoreClosed)?;
        reply_rx.await.map_err(|_| SosError::StoreClosed)?
    }

    /// Messages for an alert, oldest first
    pub async fn messages(&self, alert_id: &str, limit: usize) -> SosResult<Vec<ChatMessage>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(StoreCommand::Messages {
                alert_id: alert_id.to_string(),
                limit,
                reply: reply_tx,
            })
            .await
            .map_err(|_| SosError::StoreClosed)?;
        reply_rx.await.map_err(|_| SosError::StoreClosed)?
    }

    /// Request shutdown of the store actor
    pub async fn shutdown(&self) -> SosResult<()> {
        self.tx
            .send(StoreCommand::Shutdown)
            .await
            .map_err(|_| SosError::StoreClosed)
    }
}

/// The actor task: owns all records, processes commands one at a time
async fn actor_loop(mut rx: mpsc::Receiver<StoreCommand>, event_tx: broadcast::Sender<StoreEvent>) {
    let mut alerts: HashMap<String, Alert> = HashMap::new();
    let mut messages: HashMap<String, Vec<ChatMessage>> = HashMap::new();

    info!("AlertStore actor started");

    while let Some(cmd) = rx.recv().await {
        match cmd {
            StoreCommand::CreateAlert { alert, reply } => {
                debug!(alert_id = %alert.id, "actor: create alert");
                let id = alert.id.clone();
                alerts.insert(id.clone(), alert);
                // No subscribers is fine; feeds come and go
                let _ = event_tx.send(StoreEvent::AlertChanged { alert_id: id.clone() });
                let _ = reply.send(Ok(id));
            }

            StoreCommand::GetAlert { id, reply } => {
                let _ = reply.send(Ok(alerts.get(&id).cloned()));
            }

            StoreCommand::ClaimAlert { id, responder, reply } => {
                let result = match alerts.get_mut(&id) {
                    Some(alert) => lifecycle::apply_claim(alert, responder, Utc::now()).map(|_| alert.clone()),
                    None => Err(SosError::NotFound(id.clone())),
                };
                match &result {
                    Ok(alert) => {
                        info!(alert_id = %id, claimant = %alert.claimant.as_ref().map(|c| c.id.as_str()).unwrap_or(""), "alert claimed");
                        let _ = event_tx.send(StoreEvent::AlertChanged { alert_id: id });
                    }
                    Err(e) => debug!(alert_id = %id, error = %e, "claim rejected"),
                }
                let _ = reply.send(result);
            }

            StoreCommand::ResolveAlert {
                id,
                resolver,
                notes,
                reply,
            } => {
                let result = match alerts.get_mut(&id) {
                    Some(alert) => lifecycle::apply_resolve(alert, resolver, notes, Utc::now()).map(|_| alert.clone()),
                    None => Err(SosError::NotFound(id.clone())),
                };
                match &result {
                    Ok(_) => {
                        info!(alert_id = %id, "alert resolved");
                        let _ = event_tx.send(StoreEvent::AlertChanged { alert_id: id });
                    }
                    Err(e) => debug!(alert_id = %id, error = %e, "resolve rejected"),
                }
                let _ = reply.send(result);
            }

            StoreCommand::AppendMessage { message, reply } => {
                let alert_id = message.alert_id.clone();
                if !alerts.contains_key(&alert_id) {
                    warn!(%alert_id, "append_message: unknown alert");
                    let _ = reply.send(Err(SosError::NotFound(alert_id)));
                    continue;
                }
                let msg_id = message.id.clone();
                messages.entry(alert_id.clone()).or_default().push(message);
                let _ = event_tx.send(StoreEvent::MessageAppended { alert_id });
                let _ = reply.send(Ok(msg_id));
            }

            StoreCommand::OpenAlerts { limit, reply } => {
                let mut items: Vec<Alert> = alerts.values().filter(|a| a.is_open()).cloned().collect();
                sort_newest_first(&mut items);
                items.truncate(limit);
                let _ = reply.send(Ok(items));
            }

            StoreCommand::AlertsByCitizen {
                citizen_id,
                limit,
                reply,
            } => {
                let mut items: Vec<Alert> = alerts.values().filter(|a| a.citizen.id == citizen_id).cloned().collect();
                sort_newest_first(&mut items);
                items.truncate(limit);
                let _ = reply.send(Ok(items));
            }

            StoreCommand::AlertsClaimedBy {
                responder_id,
                limit,
                reply,
            } => {
                // Claimant match only, with resolved alerts filtered out so
                // the feed shows active claims
                let mut items: Vec<Alert> = alerts
                    .values()
                    .filter(|a| a.is_claimed_by(&responder_id) && !a.is_resolved())
                    .cloned()
                    .collect();
                sort_newest_first(&mut items);
                items.truncate(limit);
                let _ = reply.send(Ok(items));
            }

            StoreCommand::Messages { alert_id, limit, reply } => {
                let mut items = messages.get(&alert_id).cloned().unwrap_or_default();
                sort_chronological(&mut items);
                items.truncate(limit);
                let _ = reply.send(Ok(items));
            }

            StoreCommand::Shutdown => {
                info!("AlertStore actor shutting down");
                break;
            }
        }
    }

    info!("AlertStore actor stopped");
}
